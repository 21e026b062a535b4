// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Availability, AvailabilityLevel, CaseType, EducationLevel, Experience, IterationRecord, IterativeResult, LogLevel,
    MatchingOptions, MatchingResult, MatchingStatistics, Participant, Role, ScoringWeights, Skill, SkillArchetype,
    StopReason, StrictnessProfile, Team, TeamAssignment, TeamPreference,
};
pub use requests::{DiagnoseRequest, FormTeamsRequest, OptionOverrides};
pub use responses::{DiagnoseResponse, ErrorResponse, FormTeamsResponse, HealthResponse};
