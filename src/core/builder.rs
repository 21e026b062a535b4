use std::collections::BTreeMap;

use crate::core::filters::{FilterOutcome, FilterPipeline};
use crate::core::scoring::{team_compatibility, Scorer};
use crate::models::{CaseType, Participant, Team};

/// Stable pre-pass ordering a bucket by anchor priority
///
/// Experience descending, then availability descending; equal keys keep
/// their input order.
pub fn priority_order(pool: &[Participant]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| {
        pool[b]
            .experience
            .cmp(&pool[a].experience)
            .then_with(|| pool[b].availability.cmp(&pool[a].availability))
    });
    order
}

/// Greedy one-team-at-a-time constructor
///
/// No backtracking and no lookahead: the anchor is the first remaining
/// candidate and every step appends the best-scoring admissible candidate.
#[derive(Debug, Clone)]
pub struct TeamBuilder {
    pipeline: FilterPipeline,
    scorer: Scorer,
    min_team_score: f64,
}

impl TeamBuilder {
    pub fn new(pipeline: FilterPipeline, scorer: Scorer, min_team_score: f64) -> Self {
        Self {
            pipeline,
            scorer,
            min_team_score,
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Try to build one team of exactly `target_size` from `remaining`
    /// (indices into `pool`, already in priority order)
    ///
    /// Returns the chosen indices in join order, or `None` if the team
    /// could not be completed. Nothing is consumed on failure.
    pub fn build_one_team(
        &self,
        pool: &[Participant],
        remaining: &[usize],
        target_size: u8,
    ) -> Option<Vec<usize>> {
        let target = target_size as usize;
        if target == 0 || remaining.len() < target {
            return None;
        }

        let anchor = remaining[0];
        let mut chosen = vec![anchor];
        let mut team = vec![pool[anchor].clone()];
        let mut candidates: Vec<usize> = remaining[1..].to_vec();

        while team.len() < target {
            let admissible = match self.pipeline.apply(&team, pool, &candidates, target_size) {
                FilterOutcome::Candidates(indices) => indices,
                FilterOutcome::Exhausted(kind) => {
                    tracing::trace!(
                        "Anchor {} stuck at {}/{} members: {:?} filter left no candidates",
                        pool[anchor].id,
                        team.len(),
                        target,
                        kind
                    );
                    return None;
                }
            };

            let mut best: Option<(usize, f64)> = None;
            for &i in &admissible {
                let score = self.scorer.score(&team, &pool[i], target_size);
                // strict comparison keeps the earliest candidate on ties
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((i, score));
                }
            }

            let (next, _) = best?;
            chosen.push(next);
            team.push(pool[next].clone());
            candidates.retain(|&i| i != next);
        }

        if self.min_team_score > 0.0 {
            let score = team_compatibility(&team);
            if score < self.min_team_score {
                tracing::trace!(
                    "Discarding team anchored by {}: score {:.1} below floor {:.1}",
                    pool[anchor].id,
                    score,
                    self.min_team_score
                );
                return None;
            }
        }

        Some(chosen)
    }
}

/// Freeze a set of members into a `Team`
pub fn assemble_team(id: String, members: Vec<Participant>) -> Team {
    let size = members.len();
    let team_size = size as u8;

    let compatibility_score = team_compatibility(&members);
    let common_case_types = common_case_types(&members);

    let average_experience = if size > 0 {
        members.iter().map(|m| m.experience.ordinal() as f64).sum::<f64>() / size as f64
    } else {
        0.0
    };

    let preferred_team_size_match = if size > 0 {
        let matching = members
            .iter()
            .filter(|m| m.preferred_team_size == team_size)
            .count();
        matching as f64 / size as f64 * 100.0
    } else {
        0.0
    };

    Team {
        id,
        members,
        team_size,
        compatibility_score,
        common_case_types,
        average_experience,
        preferred_team_size_match,
    }
}

/// Case types wanted by at least half the members, most shared first,
/// capped at three
pub fn common_case_types(members: &[Participant]) -> Vec<CaseType> {
    let mut counts: BTreeMap<CaseType, usize> = BTreeMap::new();
    for member in members {
        for case in &member.case_preferences {
            *counts.entry(*case).or_insert(0) += 1;
        }
    }

    let mut shared: Vec<(CaseType, usize)> = counts
        .into_iter()
        .filter(|(_, count)| count * 2 >= members.len())
        .collect();
    shared.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shared.into_iter().take(3).map(|(case, _)| case).collect()
}
