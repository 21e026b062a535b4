// Core algorithm exports
pub mod builder;
pub mod compatibility;
pub mod diagnostics;
pub mod filters;
pub mod formation;
pub mod matcher;
pub mod scoring;
pub mod stats;
pub mod validation;

pub use compatibility::{availability_compatible, preferences_compatible};
pub use diagnostics::{diagnose_unmatched, DiagnosticsConfig, ReasonCategory, UnmatchedReport};
pub use filters::{FilterKind, FilterPipeline};
pub use matcher::{Matcher, RunControl};
pub use scoring::{pairwise_compatibility, team_compatibility, Scorer};
pub use stats::aggregate;
pub use validation::validate_participants;
