use std::time::Duration;

use actix_web::{web, HttpResponse, Responder};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use crate::config::{Settings, WeightsConfig};
use crate::core::diagnostics::{diagnose_unmatched, DiagnosticsConfig};
use crate::core::{validate_participants, Matcher, RunControl};
use crate::error::MatchingError;
use crate::models::{
    DiagnoseRequest, DiagnoseResponse, ErrorResponse, FormTeamsRequest, FormTeamsResponse, HealthResponse,
    MatchingOptions, ScoringWeights,
};

/// Application state shared across all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub default_options: MatchingOptions,
    pub weight_overrides: WeightsConfig,
    pub diagnostics: DiagnosticsConfig,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_options: settings.matching.default_options(),
            weight_overrides: settings.scoring.weights,
            diagnostics: DiagnosticsConfig::from(&settings.diagnostics),
            request_timeout: Duration::from_millis(settings.matching.request_timeout_ms),
        }
    }

    /// Build a matcher for one request, layering configured weight
    /// overrides onto the request's profile
    pub fn matcher_for(&self, options: MatchingOptions) -> Matcher {
        let weights = self
            .weight_overrides
            .apply(ScoringWeights::for_profile(options.profile()));
        Matcher::new(options).with_weights(weights)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Configure all team-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/teams/form", web::post().to(form_teams))
        .route("/teams/diagnose", web::post().to(diagnose));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Form teams endpoint
///
/// POST /api/v1/teams/form
///
/// Request body:
/// ```json
/// {
///   "participants": [{ "id": "p1", "name": "...", "yearOfStudy": "UG Year 2", ... }],
///   "options": { "strictTeamSizeMatching": true },
///   "includeDiagnostics": true
/// }
/// ```
async fn form_teams(state: web::Data<AppState>, req: web::Json<FormTeamsRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for form_teams request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let FormTeamsRequest {
        participants,
        options,
        include_diagnostics,
    } = req.into_inner();
    let options = options.unwrap_or_default().apply(&state.default_options);
    let matcher = state.matcher_for(options);
    let diagnostics_config = state.diagnostics;
    let run_id = Uuid::new_v4().to_string();

    tracing::info!(
        "Run {}: forming teams for {} participants ({:?})",
        run_id,
        participants.len(),
        matcher.options().profile()
    );

    // Cancels the run if the client goes away and this future is dropped
    let cancel = CancellationToken::new();
    let control = RunControl::new()
        .with_timeout(state.request_timeout)
        .with_cancel(cancel.clone());
    let _guard = cancel.drop_guard();

    let outcome = web::block(move || {
        let outcome = matcher.form_teams_with_control(&participants, control)?;
        let report = include_diagnostics.then(|| diagnose_unmatched(&outcome.result.unmatched, &diagnostics_config));
        Ok::<_, MatchingError>((outcome, report))
    })
    .await;

    match outcome {
        Ok(Ok((outcome, report))) => HttpResponse::Ok().json(FormTeamsResponse::new(run_id, outcome, report)),
        Ok(Err(e)) => matching_error_response(&run_id, &e),
        Err(e) => {
            tracing::error!("Run {}: matching task failed: {}", run_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Matching task failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Diagnose endpoint
///
/// POST /api/v1/teams/diagnose
async fn diagnose(state: web::Data<AppState>, req: web::Json<DiagnoseRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for diagnose request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }
    if let Err(e) = validate_participants(&req.unmatched) {
        return bad_request("Invalid participants", e.to_string());
    }

    let report = diagnose_unmatched(&req.unmatched, &state.diagnostics);
    tracing::debug!("Diagnosed {} unmatched participants", report.total_unmatched);

    HttpResponse::Ok().json(DiagnoseResponse { diagnostics: report })
}

fn matching_error_response(run_id: &str, err: &MatchingError) -> HttpResponse {
    if err.is_input_error() {
        tracing::info!("Run {}: rejected input: {}", run_id, err);
        bad_request("Invalid participants", err.to_string())
    } else {
        tracing::error!("Run {}: {}", run_id, err);
        HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Matching failed".to_string(),
            message: err.to_string(),
            status_code: 500,
        })
    }
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}
