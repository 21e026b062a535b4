use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{LogLevel, MatchingOptions, Participant};

/// Request to form teams from a participant pool
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FormTeamsRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "participants")]
    pub participants: Vec<Participant>,
    /// Layered over the server's configured defaults
    #[serde(default, rename = "options")]
    pub options: Option<OptionOverrides>,
    #[serde(default, alias = "include_diagnostics", rename = "includeDiagnostics")]
    pub include_diagnostics: bool,
}

/// Per-request option overrides; omitted fields keep the configured value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionOverrides {
    pub strict_team_size_matching: Option<bool>,
    pub strict_availability_matching: Option<bool>,
    pub use_iterative_matching: Option<bool>,
    pub max_iterations: Option<usize>,
    pub min_participants_per_iteration: Option<usize>,
    pub max_consecutive_failures: Option<usize>,
    pub min_team_score: Option<f64>,
    pub time_budget_ms: Option<u64>,
    pub log_level: Option<LogLevel>,
}

impl OptionOverrides {
    pub fn apply(&self, base: &MatchingOptions) -> MatchingOptions {
        MatchingOptions {
            strict_team_size_matching: self.strict_team_size_matching.unwrap_or(base.strict_team_size_matching),
            strict_availability_matching: self
                .strict_availability_matching
                .unwrap_or(base.strict_availability_matching),
            use_iterative_matching: self.use_iterative_matching.unwrap_or(base.use_iterative_matching),
            max_iterations: self.max_iterations.or(base.max_iterations),
            min_participants_per_iteration: self
                .min_participants_per_iteration
                .unwrap_or(base.min_participants_per_iteration),
            max_consecutive_failures: self.max_consecutive_failures.unwrap_or(base.max_consecutive_failures),
            min_team_score: self.min_team_score.unwrap_or(base.min_team_score),
            time_budget_ms: self.time_budget_ms.or(base.time_budget_ms),
            log_level: self.log_level.unwrap_or(base.log_level),
        }
    }
}

/// Request to explain an existing unmatched list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiagnoseRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "unmatched")]
    pub unmatched: Vec<Participant>,
}
