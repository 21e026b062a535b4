use std::collections::BTreeSet;

use crate::core::compatibility::{admits, availability_compatible, team_mode};
use crate::models::{CaseType, Participant, Role, SkillArchetype, StrictnessProfile, TeamPreference};

/// Per-team facts shared by every filter stage for one extension step
pub struct StageContext<'a> {
    pub team: &'a [Participant],
    pub target_size: u8,
    pub mode: TeamPreference,
    team_cases: BTreeSet<CaseType>,
}

impl<'a> StageContext<'a> {
    fn new(team: &'a [Participant], target_size: u8, mode: TeamPreference) -> Self {
        let team_cases = team
            .iter()
            .flat_map(|m| m.case_preferences.iter().copied())
            .collect();
        Self {
            team,
            target_size,
            mode,
            team_cases,
        }
    }
}

/// A single admission predicate
pub type FilterFn = fn(&StageContext<'_>, &Participant) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    TeamSize,
    TeamPreference,
    Availability,
    CaseTypeDiversity,
    RoleConflict,
    SkillComplementarity,
}

/// A strict predicate paired with the fallback tried when it leaves nobody
#[derive(Clone, Copy)]
pub struct FilterStage {
    pub kind: FilterKind,
    pub strict: FilterFn,
    pub relaxed: Option<FilterFn>,
}

impl std::fmt::Debug for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStage")
            .field("kind", &self.kind)
            .field("has_fallback", &self.relaxed.is_some())
            .finish()
    }
}

/// Result of running the pipeline for one extension step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Surviving pool indices, in pool order
    Candidates(Vec<usize>),
    /// The named stage left nobody even after its fallback
    Exhausted(FilterKind),
}

/// Ordered list of filter stages
#[derive(Debug, Clone)]
pub struct FilterPipeline {
    stages: Vec<FilterStage>,
}

impl FilterPipeline {
    pub fn new(stages: Vec<FilterStage>) -> Self {
        Self { stages }
    }

    /// Stage table for a strictness profile
    ///
    /// | stage          | strict                  | fallback                       |
    /// |----------------|-------------------------|--------------------------------|
    /// | team size      | pref == target          | \|pref - target\| <= 1 (flexible) |
    /// | team pref      | admission rule          | none                           |
    /// | availability   | compatible with all     | with any (unless strict avail) |
    /// | case type      | adds a new case type    | shares one, or team < 3        |
    /// | role conflict  | no role above 2         | no role above 3                |
    /// | skill archetype| covers >= 2 archetypes  | covers >= 1                    |
    pub fn for_profile(profile: StrictnessProfile, strict_availability: bool) -> Self {
        let availability_fallback: Option<FilterFn> = if strict_availability {
            None
        } else {
            Some(available_with_any)
        };

        let mut stages = vec![
            FilterStage {
                kind: FilterKind::TeamSize,
                strict: exact_team_size,
                relaxed: match profile {
                    StrictnessProfile::AbsoluteStrict => None,
                    StrictnessProfile::Flexible => Some(team_size_within_one),
                },
            },
            FilterStage {
                kind: FilterKind::TeamPreference,
                strict: team_preference_admits,
                relaxed: None,
            },
            FilterStage {
                kind: FilterKind::Availability,
                strict: available_with_all,
                relaxed: availability_fallback,
            },
            FilterStage {
                kind: FilterKind::CaseTypeDiversity,
                strict: adds_new_case_type,
                relaxed: Some(shares_case_type_or_small_team),
            },
        ];

        if profile == StrictnessProfile::Flexible {
            stages.push(FilterStage {
                kind: FilterKind::RoleConflict,
                strict: roles_within_two,
                relaxed: Some(roles_within_three),
            });
            stages.push(FilterStage {
                kind: FilterKind::SkillComplementarity,
                strict: covers_two_archetypes,
                relaxed: Some(covers_one_archetype),
            });
        }

        Self { stages }
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Narrow `candidates` (indices into `pool`) to those admissible as the
    /// next member of `team`
    pub fn apply(
        &self,
        team: &[Participant],
        pool: &[Participant],
        candidates: &[usize],
        target_size: u8,
    ) -> FilterOutcome {
        let Some(mode) = team_mode(team) else {
            let ids: Vec<&str> = team.iter().map(|m| m.id.as_str()).collect();
            debug_assert!(false, "team {:?} has inconsistent team preferences", ids);
            tracing::error!(
                "Invariant violation: team {:?} has inconsistent team preferences, refusing to extend it",
                ids
            );
            return FilterOutcome::Exhausted(FilterKind::TeamPreference);
        };

        let ctx = StageContext::new(team, target_size, mode);
        let mut current: Vec<usize> = candidates.to_vec();

        for stage in &self.stages {
            let strict: Vec<usize> = current
                .iter()
                .copied()
                .filter(|&i| (stage.strict)(&ctx, &pool[i]))
                .collect();

            if !strict.is_empty() {
                current = strict;
                continue;
            }

            let relaxed: Vec<usize> = match stage.relaxed {
                Some(relaxed) => current
                    .iter()
                    .copied()
                    .filter(|&i| relaxed(&ctx, &pool[i]))
                    .collect(),
                None => Vec::new(),
            };

            if relaxed.is_empty() {
                return FilterOutcome::Exhausted(stage.kind);
            }
            current = relaxed;
        }

        FilterOutcome::Candidates(current)
    }
}

fn exact_team_size(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    candidate.preferred_team_size == ctx.target_size
}

fn team_size_within_one(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    candidate.preferred_team_size.abs_diff(ctx.target_size) <= 1
}

fn team_preference_admits(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    admits(ctx.mode, ctx.team, candidate)
}

fn available_with_all(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    ctx.team.iter().all(|m| availability_compatible(m, candidate))
}

fn available_with_any(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    ctx.team.iter().any(|m| availability_compatible(m, candidate))
}

fn adds_new_case_type(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    candidate
        .case_preferences
        .iter()
        .any(|c| !ctx.team_cases.contains(c))
}

fn shares_case_type_or_small_team(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    ctx.team.len() < 3
        || candidate
            .case_preferences
            .iter()
            .any(|c| ctx.team_cases.contains(c))
}

fn max_role_count(team: &[Participant], candidate: &Participant) -> usize {
    candidate
        .preferred_roles
        .iter()
        .map(|role| 1 + count_role(team, *role))
        .max()
        .unwrap_or(0)
}

#[inline]
fn count_role(team: &[Participant], role: Role) -> usize {
    team.iter().filter(|m| m.preferred_roles.contains(&role)).count()
}

fn roles_within_two(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    max_role_count(ctx.team, candidate) <= 2
}

fn roles_within_three(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    max_role_count(ctx.team, candidate) <= 3
}

fn archetypes_covered(team: &[Participant], candidate: &Participant) -> usize {
    team.iter()
        .chain(std::iter::once(candidate))
        .flat_map(|m| m.core_strengths.iter().map(|s| s.archetype()))
        .collect::<BTreeSet<SkillArchetype>>()
        .len()
}

fn covers_two_archetypes(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    archetypes_covered(ctx.team, candidate) >= 2
}

fn covers_one_archetype(ctx: &StageContext<'_>, candidate: &Participant) -> bool {
    archetypes_covered(ctx.team, candidate) >= 1
}
