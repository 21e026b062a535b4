use crate::core::builder::{assemble_team, priority_order, TeamBuilder};
use crate::core::compatibility::self_consistent;
use crate::models::{LogLevel, Participant, StrictnessProfile, Team, TeamPreference};

/// Bucket processing order. Greedy packing is order dependent, so this is
/// fixed for every profile.
pub const BUCKET_ORDER: [u8; 3] = [2, 3, 4];

/// Formation categories, each formed independently
pub const CATEGORY_ORDER: [TeamPreference; 3] = [
    TeamPreference::UndergradsOnly,
    TeamPreference::PostgradsOnly,
    TeamPreference::EitherUgOrPg,
];

/// Hands out run-unique team ids scoped to one iteration
#[derive(Debug)]
pub struct TeamIdSequence {
    iteration: usize,
    next: usize,
}

impl TeamIdSequence {
    pub fn new(iteration: usize) -> Self {
        Self { iteration, next: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("team-{}-{}", self.iteration, self.next);
        self.next += 1;
        id
    }
}

/// Output of one formation pass
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    pub teams: Vec<Team>,
    /// In input order
    pub unmatched: Vec<Participant>,
}

/// One full pass: partition by category and size, then exhaust each bucket
#[derive(Debug, Clone)]
pub struct Formation {
    builder: TeamBuilder,
    profile: StrictnessProfile,
    log_level: LogLevel,
}

impl Formation {
    pub fn new(builder: TeamBuilder, profile: StrictnessProfile, log_level: LogLevel) -> Self {
        Self {
            builder,
            profile,
            log_level,
        }
    }

    pub fn run_pass(&self, participants: &[Participant], iteration: usize) -> PassOutcome {
        let mut ids = TeamIdSequence::new(iteration);
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut unmatched: Vec<usize> = Vec::new();

        for category in CATEGORY_ORDER {
            let mut members: Vec<usize> = Vec::new();
            for (i, p) in participants.iter().enumerate() {
                if p.team_preference != category {
                    continue;
                }
                if self_consistent(p) {
                    members.push(i);
                } else {
                    if self.log_level >= LogLevel::Verbose {
                        tracing::debug!(
                            "Participant {} asked for {:?} but studies at {:?}; cannot be placed",
                            p.id,
                            category,
                            p.education_level()
                        );
                    }
                    unmatched.push(i);
                }
            }

            let (formed, leftover) = self.form_category(participants, &members);
            groups.extend(formed);
            unmatched.extend(leftover);
        }

        unmatched.sort_unstable();

        let teams: Vec<Team> = groups
            .into_iter()
            .map(|group| {
                let members = group.into_iter().map(|i| participants[i].clone()).collect();
                assemble_team(ids.next_id(), members)
            })
            .collect();

        if self.log_level >= LogLevel::Verbose {
            for team in &teams {
                tracing::debug!(
                    "Formed {} with {:?} (size {}, score {:.1})",
                    team.id,
                    team.member_ids(),
                    team.team_size,
                    team.compatibility_score
                );
            }
        }

        PassOutcome {
            teams,
            unmatched: unmatched.into_iter().map(|i| participants[i].clone()).collect(),
        }
    }

    /// Form teams inside one homogeneous category
    ///
    /// Returns member groups and the leftover indices, both as indices into
    /// `participants`.
    fn form_category(
        &self,
        participants: &[Participant],
        members: &[usize],
    ) -> (Vec<Vec<usize>>, Vec<usize>) {
        let mut groups = Vec::new();
        let mut leftover = Vec::new();

        for size in BUCKET_ORDER {
            let bucket: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&i| participants[i].preferred_team_size == size)
                .collect();
            let (formed, rest) = self.form_bucket(participants, &bucket, size);
            groups.extend(formed);
            leftover.extend(rest);
        }

        if self.profile == StrictnessProfile::Flexible && !leftover.is_empty() {
            leftover.sort_unstable();
            for size in BUCKET_ORDER {
                let bucket: Vec<usize> = leftover
                    .iter()
                    .copied()
                    .filter(|&i| participants[i].preferred_team_size.abs_diff(size) <= 1)
                    .collect();
                let (formed, _) = self.form_bucket(participants, &bucket, size);
                for group in &formed {
                    leftover.retain(|i| !group.contains(i));
                }
                groups.extend(formed);
            }
        }

        (groups, leftover)
    }

    /// Call the builder until it fails, consuming members as teams form
    fn form_bucket(
        &self,
        participants: &[Participant],
        bucket: &[usize],
        size: u8,
    ) -> (Vec<Vec<usize>>, Vec<usize>) {
        if bucket.len() < size as usize {
            return (Vec::new(), bucket.to_vec());
        }

        // working copy, never aliasing the caller's list
        let pool: Vec<Participant> = bucket.iter().map(|&i| participants[i].clone()).collect();
        let mut remaining = priority_order(&pool);
        let mut groups = Vec::new();

        while let Some(chosen) = self.builder.build_one_team(&pool, &remaining, size) {
            remaining.retain(|i| !chosen.contains(i));
            groups.push(chosen.into_iter().map(|i| bucket[i]).collect());
        }

        if self.log_level >= LogLevel::Verbose {
            tracing::debug!(
                "Bucket size {}: {} candidates, {} teams, {} left",
                size,
                bucket.len(),
                groups.len(),
                remaining.len()
            );
        }

        let leftover = remaining.into_iter().map(|i| bucket[i]).collect();
        (groups, leftover)
    }
}
