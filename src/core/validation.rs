use std::collections::BTreeSet;

use crate::error::MatchingError;
use crate::models::Participant;

pub const MAX_CORE_STRENGTHS: usize = 3;
pub const MAX_PREFERRED_ROLES: usize = 2;
pub const MAX_CASE_PREFERENCES: usize = 3;

/// Reject malformed input before any matching work starts
///
/// Vocabulary is already enforced by the types; this checks the counts and
/// identities the types cannot express.
pub fn validate_participants(participants: &[Participant]) -> Result<(), MatchingError> {
    if participants.is_empty() {
        return Err(MatchingError::EmptyInput);
    }

    let mut ids = BTreeSet::new();
    for (index, p) in participants.iter().enumerate() {
        if p.id.trim().is_empty() {
            return Err(MatchingError::MissingId { index });
        }
        if !ids.insert(p.id.as_str()) {
            return Err(MatchingError::DuplicateParticipant { id: p.id.clone() });
        }
        if !(2..=4).contains(&p.preferred_team_size) {
            return Err(MatchingError::InvalidTeamSize {
                id: p.id.clone(),
                size: p.preferred_team_size,
            });
        }
        check_count(&p.id, "core strengths", MAX_CORE_STRENGTHS, p.core_strengths.len())?;
        check_count(&p.id, "preferred roles", MAX_PREFERRED_ROLES, p.preferred_roles.len())?;
        check_count(&p.id, "case preferences", MAX_CASE_PREFERENCES, p.case_preferences.len())?;
    }

    Ok(())
}

fn check_count(id: &str, field: &'static str, max: usize, actual: usize) -> Result<(), MatchingError> {
    if actual > max {
        return Err(MatchingError::TooManyValues {
            id: id.to_string(),
            field,
            max,
            actual,
        });
    }
    Ok(())
}
