use std::collections::BTreeSet;

use crate::core::compatibility::availability_compatible;
use crate::models::{EducationLevel, Participant, ScoringWeights, StrictnessProfile};

/// Greedy candidate scorer
///
/// Scoring formula (each term independently weighted, zero disables it):
/// score = (
///     experience_diversity     # candidate's experience not yet on the team
///   + overlap * case_overlap   # case types shared with the team
///   + new_skills * skill_uniqueness
///   + availability           # compatible with all (strict) or any member
///   + new_roles * role_uniqueness
///   + education_diversity    # fills the UG/PG gap, or team already mixed
///   + size_match             # candidate's preferred size equals target
/// )
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    weights: ScoringWeights,
    availability_requires_all: bool,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, availability_requires_all: bool) -> Self {
        Self {
            weights,
            availability_requires_all,
        }
    }

    pub fn for_profile(profile: StrictnessProfile, strict_availability: bool) -> Self {
        Self::new(ScoringWeights::for_profile(profile), strict_availability)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score `candidate` as the next member of `team` (higher is better)
    pub fn score(&self, team: &[Participant], candidate: &Participant, target_size: u8) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        if !team.iter().any(|m| m.experience == candidate.experience) {
            score += w.experience_diversity;
        }

        let team_cases: BTreeSet<_> = team.iter().flat_map(|m| m.case_preferences.iter()).collect();
        let case_overlap = candidate
            .case_preferences
            .iter()
            .filter(|c| team_cases.contains(c))
            .count();
        score += case_overlap as f64 * w.case_overlap;

        let team_skills: BTreeSet<_> = team.iter().flat_map(|m| m.core_strengths.iter()).collect();
        let new_skills = candidate
            .core_strengths
            .iter()
            .filter(|s| !team_skills.contains(s))
            .count();
        score += new_skills as f64 * w.skill_uniqueness;

        let availability_ok = if self.availability_requires_all {
            team.iter().all(|m| availability_compatible(m, candidate))
        } else {
            team.iter().any(|m| availability_compatible(m, candidate))
        };
        if availability_ok {
            score += w.availability;
        }

        let team_roles: BTreeSet<_> = team.iter().flat_map(|m| m.preferred_roles.iter()).collect();
        let new_roles = candidate
            .preferred_roles
            .iter()
            .filter(|r| !team_roles.contains(r))
            .count();
        score += new_roles as f64 * w.role_uniqueness;

        if w.education_diversity > 0.0 && education_bonus_applies(team, candidate) {
            score += w.education_diversity;
        }

        if candidate.preferred_team_size == target_size {
            score += w.size_match;
        }

        score
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::for_profile(StrictnessProfile::AbsoluteStrict, true)
    }
}

fn education_bonus_applies(team: &[Participant], candidate: &Participant) -> bool {
    let has_ug = team.iter().any(|m| m.education_level() == EducationLevel::Undergraduate);
    let has_pg = team.iter().any(|m| m.education_level() == EducationLevel::Postgraduate);
    match (has_ug, has_pg) {
        (true, true) => true,
        (true, false) => candidate.education_level() == EducationLevel::Postgraduate,
        (false, true) => candidate.education_level() == EducationLevel::Undergraduate,
        (false, false) => false,
    }
}

/// Pairwise compatibility (0-100) between two individuals
///
/// Scoring formula:
/// score = (
///     case_jaccard * 35 +         # shared case interests
///     skill_complement * 25 +     # share of skills only one of them has
///     experience_proximity * 20 + # 1 - gap / 3
///     availability * 15 +         # 1 same level, 0.6 compatible, 0 otherwise
///     size_match * 5              # same preferred team size
/// )
pub fn pairwise_compatibility(a: &Participant, b: &Participant) -> f64 {
    let case_score = jaccard(&a.case_preferences, &b.case_preferences);

    let skill_union = a.core_strengths.union(&b.core_strengths).count();
    let skill_score = if skill_union > 0 {
        a.core_strengths.symmetric_difference(&b.core_strengths).count() as f64 / skill_union as f64
    } else {
        0.0
    };

    let gap = a.experience.ordinal().abs_diff(b.experience.ordinal()) as f64;
    let experience_score = 1.0 - gap / 3.0;

    let availability_score = if a.availability.level() == b.availability.level() {
        1.0
    } else if availability_compatible(a, b) {
        0.6
    } else {
        0.0
    };

    let size_score = if a.preferred_team_size == b.preferred_team_size { 1.0 } else { 0.0 };

    let total = case_score * 35.0
        + skill_score * 25.0
        + experience_score * 20.0
        + availability_score * 15.0
        + size_score * 5.0;

    total.clamp(0.0, 100.0)
}

/// Mean pairwise compatibility of a team, clamped to 0-100
pub fn team_compatibility(members: &[Participant]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            total += pairwise_compatibility(a, b);
            pairs += 1;
        }
    }

    if pairs == 0 {
        return 0.0;
    }
    (total / pairs as f64).clamp(0.0, 100.0)
}

#[inline]
fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
