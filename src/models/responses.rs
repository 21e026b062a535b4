use serde::{Deserialize, Serialize};

use crate::core::diagnostics::UnmatchedReport;
use crate::models::domain::{
    IterationRecord, IterativeResult, MatchingStatistics, Participant, StopReason, Team, TeamAssignment,
};

/// Response for the form teams endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTeamsResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub teams: Vec<Team>,
    pub assignments: Vec<TeamAssignment>,
    pub unmatched: Vec<Participant>,
    pub statistics: MatchingStatistics,
    pub iterations: usize,
    #[serde(rename = "iterationHistory")]
    pub iteration_history: Vec<IterationRecord>,
    #[serde(rename = "stopReason")]
    pub stop_reason: StopReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<UnmatchedReport>,
}

impl FormTeamsResponse {
    pub fn new(run_id: String, outcome: IterativeResult, diagnostics: Option<UnmatchedReport>) -> Self {
        let assignments = outcome.result.assignments();
        let IterativeResult {
            result,
            iterations,
            iteration_history,
            stop_reason,
        } = outcome;

        Self {
            run_id,
            teams: result.teams,
            assignments,
            unmatched: result.unmatched,
            statistics: result.statistics,
            iterations,
            iteration_history,
            stop_reason,
            diagnostics,
        }
    }
}

/// Response for the diagnose endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseResponse {
    pub diagnostics: UnmatchedReport,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}
