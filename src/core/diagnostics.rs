//! Post-hoc explanations for unmatched participants.
//!
//! Read-only: nothing here retries matching or touches formed teams.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::compatibility::{availability_compatible, preferences_compatible, self_consistent};
use crate::core::formation::BUCKET_ORDER;
use crate::core::scoring::pairwise_compatibility;
use crate::models::{Participant, TeamPreference};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsConfig {
    /// Pairwise score a peer needs to count as a good partner. Independent
    /// of the formation-side `minTeamScore`.
    pub quality_threshold: f64,
    pub max_partner_suggestions: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 70.0,
            max_partner_suggestions: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCategory {
    TeamSize,
    TeamPreference,
    Availability,
    QualityThreshold,
    InsufficientCandidates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedReason {
    pub category: ReasonCategory,
    pub severity: Severity,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Suggestion {
    Partner {
        #[serde(rename = "participantId")]
        participant_id: String,
        name: String,
        #[serde(rename = "compatibilityScore")]
        compatibility_score: f64,
        #[serde(rename = "preferredTeamSize")]
        preferred_team_size: u8,
        #[serde(rename = "preferenceCompatible")]
        preference_compatible: bool,
    },
    ChangeTeamSize {
        size: u8,
        #[serde(rename = "availablePeers")]
        available_peers: usize,
    },
    ChangeTeamPreference {
        preference: TeamPreference,
        #[serde(rename = "availablePeers")]
        available_peers: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantDiagnostic {
    #[serde(rename = "participantId")]
    pub participant_id: String,
    pub name: String,
    #[serde(rename = "preferredTeamSize")]
    pub preferred_team_size: u8,
    #[serde(rename = "sameSizePeers")]
    pub same_size_peers: usize,
    #[serde(rename = "preferenceCompatiblePeers")]
    pub preference_compatible_peers: usize,
    #[serde(rename = "availabilityCompatiblePeers")]
    pub availability_compatible_peers: usize,
    #[serde(rename = "qualityPeers")]
    pub quality_peers: usize,
    pub reason: UnmatchedReason,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedReport {
    #[serde(rename = "totalUnmatched")]
    pub total_unmatched: usize,
    #[serde(rename = "reasonCounts")]
    pub reason_counts: BTreeMap<ReasonCategory, usize>,
    pub participants: Vec<ParticipantDiagnostic>,
}

/// Explain, for every unmatched participant, why no team formed
pub fn diagnose_unmatched(unmatched: &[Participant], config: &DiagnosticsConfig) -> UnmatchedReport {
    let participants: Vec<ParticipantDiagnostic> = unmatched
        .iter()
        .enumerate()
        .map(|(i, p)| diagnose_one(i, p, unmatched, config))
        .collect();

    let mut reason_counts = BTreeMap::new();
    for d in &participants {
        *reason_counts.entry(d.reason.category).or_insert(0) += 1;
    }

    UnmatchedReport {
        total_unmatched: unmatched.len(),
        reason_counts,
        participants,
    }
}

fn diagnose_one(
    index: usize,
    participant: &Participant,
    unmatched: &[Participant],
    config: &DiagnosticsConfig,
) -> ParticipantDiagnostic {
    let others: Vec<&Participant> = unmatched
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != index)
        .map(|(_, o)| o)
        .collect();

    // funnel: each stage narrows the previous one
    let size_peers: Vec<&Participant> = others
        .iter()
        .copied()
        .filter(|o| o.preferred_team_size == participant.preferred_team_size)
        .collect();
    let preference_peers: Vec<&Participant> = size_peers
        .iter()
        .copied()
        .filter(|o| preferences_compatible(participant, o))
        .collect();
    let availability_peers: Vec<&Participant> = preference_peers
        .iter()
        .copied()
        .filter(|o| availability_compatible(participant, o))
        .collect();
    let quality_peers = availability_peers
        .iter()
        .filter(|o| pairwise_compatibility(participant, o) >= config.quality_threshold)
        .count();

    let needed = participant.preferred_team_size.saturating_sub(1) as usize;
    let reason = classify(
        participant,
        needed,
        size_peers.len(),
        preference_peers.len(),
        availability_peers.len(),
        quality_peers,
        config.quality_threshold,
    );

    let mut suggestions = partner_suggestions(participant, &others, config.max_partner_suggestions);
    suggestions.extend(preference_changes(participant, &others));

    ParticipantDiagnostic {
        participant_id: participant.id.clone(),
        name: participant.name.clone(),
        preferred_team_size: participant.preferred_team_size,
        same_size_peers: size_peers.len(),
        preference_compatible_peers: preference_peers.len(),
        availability_compatible_peers: availability_peers.len(),
        quality_peers,
        reason,
        suggestions,
    }
}

/// First funnel stage that leaves fewer peers than a full team needs
fn classify(
    participant: &Participant,
    needed: usize,
    size_peers: usize,
    preference_peers: usize,
    availability_peers: usize,
    quality_peers: usize,
    threshold: f64,
) -> UnmatchedReason {
    let size = participant.preferred_team_size;

    if !self_consistent(participant) {
        return UnmatchedReason {
            category: ReasonCategory::TeamPreference,
            severity: Severity::High,
            detail: format!(
                "Asked for {:?} but year of study '{}' places them at {:?}",
                participant.team_preference,
                participant.year_of_study,
                participant.education_level()
            ),
        };
    }

    if size_peers == 0 {
        return UnmatchedReason {
            category: ReasonCategory::TeamSize,
            severity: Severity::High,
            detail: format!("No other unmatched participant wants a team of {}", size),
        };
    }

    if size_peers < needed {
        return UnmatchedReason {
            category: ReasonCategory::InsufficientCandidates,
            severity: Severity::Medium,
            detail: format!(
                "Only {} other participant(s) want a team of {}; {} needed",
                size_peers, size, needed
            ),
        };
    }

    if preference_peers < needed {
        return UnmatchedReason {
            category: ReasonCategory::TeamPreference,
            severity: Severity::High,
            detail: format!(
                "{} of {} same-size peers are compatible with {:?}; {} needed",
                preference_peers, size_peers, participant.team_preference, needed
            ),
        };
    }

    if availability_peers < needed {
        return UnmatchedReason {
            category: ReasonCategory::Availability,
            severity: Severity::Medium,
            detail: format!(
                "{} of {} compatible peers have workable availability; {} needed",
                availability_peers, preference_peers, needed
            ),
        };
    }

    if quality_peers < needed {
        return UnmatchedReason {
            category: ReasonCategory::QualityThreshold,
            severity: Severity::Low,
            detail: format!(
                "{} of {} compatible peers score at least {:.0}; {} needed",
                quality_peers, availability_peers, threshold, needed
            ),
        };
    }

    UnmatchedReason {
        category: ReasonCategory::InsufficientCandidates,
        severity: Severity::Low,
        detail: format!(
            "{} compatible peers exist but no full team of {} could be assembled from them",
            availability_peers, size
        ),
    }
}

fn partner_suggestions(participant: &Participant, others: &[&Participant], limit: usize) -> Vec<Suggestion> {
    let mut scored: Vec<(&Participant, f64)> = others
        .iter()
        .map(|o| (*o, pairwise_compatibility(participant, o)))
        .collect();
    // stable: equal scores keep unmatched-list order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(limit)
        .map(|(o, score)| Suggestion::Partner {
            participant_id: o.id.clone(),
            name: o.name.clone(),
            compatibility_score: score,
            preferred_team_size: o.preferred_team_size,
            preference_compatible: preferences_compatible(participant, o),
        })
        .collect()
}

fn preference_changes(participant: &Participant, others: &[&Participant]) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if self_consistent(participant) {
        for size in BUCKET_ORDER {
            if size == participant.preferred_team_size {
                continue;
            }
            let peers = others
                .iter()
                .filter(|o| {
                    o.preferred_team_size == size
                        && preferences_compatible(participant, o)
                        && availability_compatible(participant, o)
                })
                .count();
            if peers >= (size - 1) as usize {
                suggestions.push(Suggestion::ChangeTeamSize {
                    size,
                    available_peers: peers,
                });
            }
        }
    }

    if participant.team_preference != TeamPreference::EitherUgOrPg {
        let needed = participant.preferred_team_size.saturating_sub(1) as usize;
        let peers = others
            .iter()
            .filter(|o| {
                o.team_preference == TeamPreference::EitherUgOrPg
                    && o.preferred_team_size == participant.preferred_team_size
                    && availability_compatible(participant, o)
            })
            .count();
        if peers >= needed {
            suggestions.push(Suggestion::ChangeTeamPreference {
                preference: TeamPreference::EitherUgOrPg,
                available_peers: peers,
            });
        }
    }

    suggestions
}
