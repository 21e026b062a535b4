use std::collections::{BTreeMap, BTreeSet};

use crate::error::MatchingError;
use crate::models::{MatchingResult, MatchingStatistics, Participant, Team};

/// Compute summary statistics for a fixed `(teams, unmatched)` pair
///
/// Pure: the same input always yields the same statistics.
pub fn aggregate(teams: &[Team], unmatched: &[Participant]) -> MatchingStatistics {
    let total_matched: usize = teams.iter().map(|t| t.members.len()).sum();
    let unmatched_count = unmatched.len();
    let total_participants = total_matched + unmatched_count;
    let teams_formed = teams.len();

    let matching_efficiency = if total_participants > 0 {
        total_matched as f64 / total_participants as f64 * 100.0
    } else {
        0.0
    };

    let average_team_size = if teams_formed > 0 {
        total_matched as f64 / teams_formed as f64
    } else {
        0.0
    };

    let average_compatibility_score = if teams_formed > 0 {
        teams.iter().map(|t| t.compatibility_score).sum::<f64>() / teams_formed as f64
    } else {
        0.0
    };

    let mut team_size_distribution = BTreeMap::new();
    let mut case_type_distribution = BTreeMap::new();
    for team in teams {
        *team_size_distribution.entry(team.team_size).or_insert(0) += 1;
        for case in &team.common_case_types {
            *case_type_distribution.entry(*case).or_insert(0) += 1;
        }
    }

    MatchingStatistics {
        total_participants,
        teams_formed,
        total_matched,
        unmatched_count,
        matching_efficiency,
        average_team_size,
        average_compatibility_score,
        team_size_distribution,
        case_type_distribution,
    }
}

pub fn build_result(teams: Vec<Team>, unmatched: Vec<Participant>) -> MatchingResult {
    let statistics = aggregate(&teams, &unmatched);
    MatchingResult {
        teams,
        unmatched,
        statistics,
    }
}

/// Every input participant must appear exactly once across teams and
/// unmatched
pub fn verify_partition(input: &[Participant], result: &MatchingResult) -> Result<(), MatchingError> {
    let mut seen = BTreeSet::new();
    let placed = result
        .teams
        .iter()
        .flat_map(|t| t.members.iter())
        .chain(result.unmatched.iter());

    for participant in placed {
        if !seen.insert(participant.id.as_str()) {
            return Err(MatchingError::InvariantViolation(format!(
                "participant {} placed more than once",
                participant.id
            )));
        }
    }

    if let Some(lost) = input.iter().find(|p| !seen.contains(p.id.as_str())) {
        return Err(MatchingError::InvariantViolation(format!(
            "participant {} missing from result",
            lost.id
        )));
    }

    if seen.len() != input.len() {
        return Err(MatchingError::InvariantViolation(format!(
            "result holds {} participants but input had {}",
            seen.len(),
            input.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::assemble_team;
    use crate::models::{Availability, CaseType, Experience, TeamPreference};

    fn create_participant(id: &str, size: u8, cases: &[CaseType]) -> Participant {
        Participant {
            id: id.to_string(),
            name: format!("Student {}", id),
            email: String::new(),
            year_of_study: "UG 1".to_string(),
            preferred_team_size: size,
            team_preference: TeamPreference::EitherUgOrPg,
            availability: Availability::Full,
            experience: Experience::None,
            core_strengths: Default::default(),
            preferred_roles: Default::default(),
            case_preferences: cases.iter().copied().collect(),
        }
    }

    #[test]
    fn test_aggregate_distributions() {
        let pair = assemble_team(
            "team-1-1".into(),
            vec![
                create_participant("a", 2, &[CaseType::Finance]),
                create_participant("b", 2, &[CaseType::Finance]),
            ],
        );
        let trio = assemble_team(
            "team-1-2".into(),
            vec![
                create_participant("c", 3, &[CaseType::Finance, CaseType::Product]),
                create_participant("d", 3, &[CaseType::Product]),
                create_participant("e", 3, &[CaseType::Policy]),
            ],
        );
        let unmatched = vec![create_participant("f", 4, &[])];

        let stats = aggregate(&[pair, trio], &unmatched);

        assert_eq!(stats.total_participants, 6);
        assert_eq!(stats.teams_formed, 2);
        assert_eq!(stats.total_matched, 5);
        assert!((stats.matching_efficiency - 500.0 / 6.0).abs() < 1e-9);
        assert_eq!(stats.average_team_size, 2.5);
        assert_eq!(stats.team_size_distribution.get(&2), Some(&1));
        assert_eq!(stats.team_size_distribution.get(&3), Some(&1));
        assert_eq!(stats.case_type_distribution.get(&CaseType::Finance), Some(&1));
        assert_eq!(stats.case_type_distribution.get(&CaseType::Product), Some(&1));
    }

    #[test]
    fn test_aggregate_empty_guards() {
        let stats = aggregate(&[], &[]);
        assert_eq!(stats.matching_efficiency, 0.0);
        assert_eq!(stats.average_team_size, 0.0);

        let unmatched = vec![create_participant("a", 2, &[])];
        let stats = aggregate(&[], &unmatched);
        assert_eq!(stats.matching_efficiency, 0.0);
        assert_eq!(stats.unmatched_count, 1);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let team = assemble_team(
            "team-1-1".into(),
            vec![create_participant("a", 2, &[]), create_participant("b", 2, &[])],
        );
        let teams = vec![team];
        assert_eq!(aggregate(&teams, &[]), aggregate(&teams, &[]));
        assert_eq!(aggregate(&teams, &[]).matching_efficiency, 100.0);
    }

    #[test]
    fn test_verify_partition() {
        let input = vec![create_participant("a", 2, &[]), create_participant("b", 2, &[])];
        let ok = build_result(Vec::new(), input.clone());
        assert!(verify_partition(&input, &ok).is_ok());

        let lost = build_result(Vec::new(), vec![input[0].clone()]);
        assert!(matches!(
            verify_partition(&input, &lost),
            Err(MatchingError::InvariantViolation(_))
        ));

        let doubled = build_result(
            vec![assemble_team("team-1-1".into(), input.clone())],
            vec![input[1].clone()],
        );
        assert!(verify_partition(&input, &doubled).is_err());
    }
}
