use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::core::{
    builder::TeamBuilder,
    filters::FilterPipeline,
    formation::Formation,
    scoring::Scorer,
    stats::{build_result, verify_partition},
    validation::validate_participants,
};
use crate::error::MatchingError;
use crate::models::{
    IterationRecord, IterativeResult, LogLevel, MatchingOptions, Participant, ScoringWeights, StopReason,
};

/// External stop signals for a run
///
/// Checked between iterations only, so a pass is never cut in half.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancellationToken>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn interrupted(&self) -> Option<StopReason> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(StopReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(StopReason::DeadlineExceeded);
        }
        None
    }
}

/// Team formation engine
///
/// Owns only immutable configuration; every call works on its own copy of
/// the participant list, so one `Matcher` can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct Matcher {
    options: MatchingOptions,
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(options: MatchingOptions) -> Self {
        let weights = ScoringWeights::for_profile(options.profile());
        Self { options, weights }
    }

    pub fn with_default_options() -> Self {
        Self::new(MatchingOptions::default())
    }

    /// Replace the profile's default scorer weights
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn options(&self) -> &MatchingOptions {
        &self.options
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    fn formation(&self) -> Formation {
        let profile = self.options.profile();
        let strict_availability = self.options.strict_availability_matching;
        let builder = TeamBuilder::new(
            FilterPipeline::for_profile(profile, strict_availability),
            Scorer::new(self.weights, strict_availability),
            self.options.min_team_score,
        );
        Formation::new(builder, profile, self.options.log_level)
    }

    /// Validate input and form teams with no external stop signals
    pub fn form_teams(&self, participants: &[Participant]) -> Result<IterativeResult, MatchingError> {
        self.form_teams_with_control(participants, RunControl::new())
    }

    /// Validate input and form teams, honouring `control` and the
    /// configured time budget
    pub fn form_teams_with_control(
        &self,
        participants: &[Participant],
        control: RunControl,
    ) -> Result<IterativeResult, MatchingError> {
        validate_participants(participants)?;

        let control = match self.options.time_budget_ms {
            Some(ms) => control.with_timeout(Duration::from_millis(ms)),
            None => control,
        };

        let started = Instant::now();
        let outcome = if self.options.use_iterative_matching {
            self.run_iterative(participants, &control)
        } else {
            self.run_single_pass(participants)
        };

        verify_partition(participants, &outcome.result)?;

        let stats = &outcome.result.statistics;
        tracing::info!(
            "Formed {} teams from {} participants ({} unmatched, {:.1}% efficiency) in {} iterations, {:?}, {:?}",
            stats.teams_formed,
            stats.total_participants,
            stats.unmatched_count,
            stats.matching_efficiency,
            outcome.iterations,
            outcome.stop_reason,
            started.elapsed()
        );

        Ok(outcome)
    }

    /// One formation pass over the whole pool
    pub fn run_single_pass(&self, participants: &[Participant]) -> IterativeResult {
        let pass = self.formation().run_pass(participants, 1);
        let record = iteration_record(1, participants.len(), pass.teams.len(), pass.unmatched.len());

        IterativeResult {
            result: build_result(pass.teams, pass.unmatched),
            iterations: 1,
            iteration_history: vec![record],
            stop_reason: StopReason::SinglePass,
        }
    }

    /// Re-run formation over the shrinking unmatched remainder
    ///
    /// Stop conditions, in priority order: remainder below the
    /// per-iteration minimum, iteration cap reached, nobody left, too many
    /// consecutive iterations without a new match, external stop signal.
    pub fn run_iterative(&self, participants: &[Participant], control: &RunControl) -> IterativeResult {
        let formation = self.formation();
        let max_iterations = self.options.effective_max_iterations(participants.len());
        let min_per_iteration = self.options.min_participants_per_iteration;
        let max_failures = self.options.max_consecutive_failures;
        let log_level = self.options.log_level;

        let mut remaining: Vec<Participant> = participants.to_vec();
        let mut teams = Vec::new();
        let mut history = Vec::new();
        let mut iteration = 0usize;
        let mut consecutive_failures = 0usize;

        let stop_reason = loop {
            if remaining.len() < min_per_iteration {
                break if remaining.is_empty() {
                    StopReason::Converged
                } else {
                    StopReason::BelowMinimum
                };
            }
            if iteration >= max_iterations {
                break StopReason::MaxIterations;
            }
            if remaining.is_empty() {
                break StopReason::Converged;
            }
            // only a failed pass counts, so a zero limit still runs once
            if consecutive_failures > 0 && consecutive_failures >= max_failures {
                break StopReason::Stagnated;
            }
            if let Some(reason) = control.interrupted() {
                tracing::warn!(
                    "Stopping after {} iterations with {} participants left: {:?}",
                    iteration,
                    remaining.len(),
                    reason
                );
                break reason;
            }

            iteration += 1;
            let processed = remaining.len();
            let pass = formation.run_pass(&remaining, iteration);
            let matched = processed - pass.unmatched.len();
            let record = iteration_record(iteration, processed, pass.teams.len(), pass.unmatched.len());

            if log_level >= LogLevel::Detailed {
                tracing::info!(
                    "Iteration {}: {} processed, {} teams, {} matched, {} remaining",
                    record.iteration,
                    record.participants_processed,
                    record.teams_formed,
                    record.participants_matched,
                    record.remaining_unmatched
                );
            }

            if matched > 0 {
                consecutive_failures = 0;
            } else {
                consecutive_failures += 1;
            }

            history.push(record);
            teams.extend(pass.teams);
            remaining = pass.unmatched;
        };

        IterativeResult {
            result: build_result(teams, remaining),
            iterations: iteration,
            iteration_history: history,
            stop_reason,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_options()
    }
}

fn iteration_record(iteration: usize, processed: usize, teams_formed: usize, remaining: usize) -> IterationRecord {
    let matched = processed - remaining;
    let efficiency = if processed > 0 {
        matched as f64 / processed as f64 * 100.0
    } else {
        0.0
    };

    IterationRecord {
        iteration,
        participants_processed: processed,
        teams_formed,
        participants_matched: matched,
        remaining_unmatched: remaining,
        efficiency,
    }
}
