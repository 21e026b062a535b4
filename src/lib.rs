//! Team Matcher - team formation engine for case-competition events
//!
//! Groups survey respondents into teams of two to four. Hard constraints
//! (team size, UG/PG mix, availability) are enforced by a staged filter
//! pipeline; a greedy scorer picks among the survivors, and an iteration
//! controller retries the leftovers until no progress is made.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use core::{diagnose_unmatched, Matcher, RunControl};
pub use error::MatchingError;
pub use models::{IterativeResult, MatchingOptions, Participant, Team, TeamAssignment};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::with_default_options();
        assert!(matcher.options().use_iterative_matching);
        assert_eq!(matcher.form_teams(&[]), Err(MatchingError::EmptyInput));
    }
}
