use thiserror::Error;

/// Errors that can occur while forming teams
///
/// Running out of candidates is never an error: leftover participants
/// are reported as unmatched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchingError {
    #[error("No participants supplied")]
    EmptyInput,

    #[error("Participant at position {index} has an empty id")]
    MissingId { index: usize },

    #[error("Duplicate participant id: {id}")]
    DuplicateParticipant { id: String },

    #[error("Participant {id} prefers a team of {size}; only 2, 3 or 4 are supported")]
    InvalidTeamSize { id: String, size: u8 },

    #[error("Participant {id} lists {actual} {field}; at most {max} allowed")]
    TooManyValues {
        id: String,
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl MatchingError {
    /// True for errors caused by the caller's input rather than the engine
    pub fn is_input_error(&self) -> bool {
        !matches!(self, MatchingError::InvariantViolation(_))
    }
}
