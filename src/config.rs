use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::diagnostics::DiagnosticsConfig;
use crate::models::{LogLevel, MatchingOptions, ScoringWeights};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub diagnostics: DiagnosticsSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Server-side defaults for requests that carry no `options`
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_true")]
    pub strict_team_size_matching: bool,
    #[serde(default = "default_true")]
    pub strict_availability_matching: bool,
    #[serde(default = "default_true")]
    pub use_iterative_matching: bool,
    pub max_iterations: Option<usize>,
    #[serde(default = "default_min_participants")]
    pub min_participants_per_iteration: usize,
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: usize,
    #[serde(default)]
    pub min_team_score: f64,
    #[serde(default)]
    pub log_level: LogLevel,
    /// Upper bound on a single HTTP-triggered run
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            strict_team_size_matching: true,
            strict_availability_matching: true,
            use_iterative_matching: true,
            max_iterations: None,
            min_participants_per_iteration: default_min_participants(),
            max_consecutive_failures: default_max_consecutive_failures(),
            min_team_score: 0.0,
            log_level: LogLevel::default(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl MatchingSettings {
    pub fn default_options(&self) -> MatchingOptions {
        MatchingOptions {
            strict_team_size_matching: self.strict_team_size_matching,
            strict_availability_matching: self.strict_availability_matching,
            use_iterative_matching: self.use_iterative_matching,
            max_iterations: self.max_iterations,
            min_participants_per_iteration: self.min_participants_per_iteration,
            max_consecutive_failures: self.max_consecutive_failures,
            min_team_score: self.min_team_score,
            time_budget_ms: None,
            log_level: self.log_level,
        }
    }
}

fn default_true() -> bool { true }
fn default_min_participants() -> usize { 2 }
fn default_max_consecutive_failures() -> usize { 8 }
fn default_request_timeout_ms() -> u64 { 30_000 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

/// Per-term overrides applied on top of the active profile's weights
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct WeightsConfig {
    pub experience_diversity: Option<f64>,
    pub case_overlap: Option<f64>,
    pub skill_uniqueness: Option<f64>,
    pub availability: Option<f64>,
    pub role_uniqueness: Option<f64>,
    pub education_diversity: Option<f64>,
    pub size_match: Option<f64>,
}

impl WeightsConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, base: ScoringWeights) -> ScoringWeights {
        ScoringWeights {
            experience_diversity: self.experience_diversity.unwrap_or(base.experience_diversity),
            case_overlap: self.case_overlap.unwrap_or(base.case_overlap),
            skill_uniqueness: self.skill_uniqueness.unwrap_or(base.skill_uniqueness),
            availability: self.availability.unwrap_or(base.availability),
            role_uniqueness: self.role_uniqueness.unwrap_or(base.role_uniqueness),
            education_diversity: self.education_diversity.unwrap_or(base.education_diversity),
            size_match: self.size_match.unwrap_or(base.size_match),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsSettings {
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,
    #[serde(default = "default_max_partner_suggestions")]
    pub max_partner_suggestions: usize,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            quality_threshold: default_quality_threshold(),
            max_partner_suggestions: default_max_partner_suggestions(),
        }
    }
}

impl From<&DiagnosticsSettings> for DiagnosticsConfig {
    fn from(settings: &DiagnosticsSettings) -> Self {
        DiagnosticsConfig {
            quality_threshold: settings.quality_threshold,
            max_partner_suggestions: settings.max_partner_suggestions,
        }
    }
}

fn default_quality_threshold() -> f64 { 70.0 }
fn default_max_partner_suggestions() -> usize { 3 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TEAMS__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TEAMS__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("TEAMS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
