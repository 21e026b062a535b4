// Integration tests for Team Matcher

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;

use team_matcher::core::compatibility::{admits, availability_compatible, team_mode};
use team_matcher::core::diagnostics::{diagnose_unmatched, DiagnosticsConfig, ReasonCategory};
use team_matcher::core::{aggregate, Matcher, RunControl};
use team_matcher::models::{
    Availability, CaseType, Experience, IterativeResult, MatchingOptions, Participant, Role, Skill, StopReason,
    TeamPreference,
};

const SKILLS: [Skill; 12] = [
    Skill::Research,
    Skill::DataAnalysis,
    Skill::FinancialModeling,
    Skill::Technical,
    Skill::Strategy,
    Skill::ProblemSolving,
    Skill::Leadership,
    Skill::Presentation,
    Skill::Communication,
    Skill::Storytelling,
    Skill::Design,
    Skill::Prototyping,
];

const ROLES: [Role; 6] = [
    Role::Lead,
    Role::Researcher,
    Role::Analyst,
    Role::Designer,
    Role::Presenter,
    Role::Coordinator,
];

const CASES: [CaseType; 8] = [
    CaseType::Consulting,
    CaseType::Finance,
    CaseType::Marketing,
    CaseType::Product,
    CaseType::Operations,
    CaseType::Technology,
    CaseType::SocialImpact,
    CaseType::Policy,
];

fn create_test_participant(id: &str, size: u8, preference: TeamPreference, availability: Availability) -> Participant {
    Participant {
        id: id.to_string(),
        name: format!("Student {}", id),
        email: format!("{}@example.edu", id),
        year_of_study: "UG Year 2".to_string(),
        preferred_team_size: size,
        team_preference: preference,
        availability,
        experience: Experience::Participated1to2,
        core_strengths: [Skill::Research, Skill::Strategy].into_iter().collect(),
        preferred_roles: [Role::Analyst].into_iter().collect(),
        case_preferences: [CaseType::Consulting, CaseType::Finance].into_iter().collect(),
    }
}

/// A varied pool built from index arithmetic so every run sees the same data
fn generate_pool(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| Participant {
            id: format!("p{:04}", i),
            name: format!("Student {}", i),
            email: format!("p{}@example.edu", i),
            year_of_study: if i % 5 == 0 { "PG Year 1" } else { "UG Year 3" }.to_string(),
            preferred_team_size: (i * 7 % 3) as u8 + 2,
            team_preference: match i % 6 {
                0 => TeamPreference::PostgradsOnly,
                1 | 2 => TeamPreference::UndergradsOnly,
                _ => TeamPreference::EitherUgOrPg,
            },
            availability: match i * 3 % 4 {
                0 => Availability::Full,
                1 => Availability::Moderate,
                2 => Availability::Light,
                _ => Availability::NotAvailable,
            },
            experience: match i % 4 {
                0 => Experience::None,
                1 => Experience::Participated1to2,
                2 => Experience::Participated3Plus,
                _ => Experience::FinalistWinner,
            },
            core_strengths: [SKILLS[i % 12], SKILLS[(i * 5 + 3) % 12]].into_iter().collect(),
            preferred_roles: [ROLES[i % 6], ROLES[(i + 2) % 6]].into_iter().collect(),
            case_preferences: [CASES[i % 8], CASES[(i * 3 + 1) % 8], CASES[(i / 2) % 8]]
                .into_iter()
                .collect(),
        })
        .collect()
}

fn flexible_options() -> MatchingOptions {
    MatchingOptions {
        strict_team_size_matching: false,
        strict_availability_matching: true,
        ..Default::default()
    }
}

fn assert_partition(input: &[Participant], outcome: &IterativeResult) {
    let result = &outcome.result;
    let placed: Vec<&str> = result
        .teams
        .iter()
        .flat_map(|t| t.members.iter())
        .chain(result.unmatched.iter())
        .map(|p| p.id.as_str())
        .collect();
    let unique: BTreeSet<&str> = placed.iter().copied().collect();

    assert_eq!(placed.len(), input.len());
    assert_eq!(unique.len(), input.len());
    for p in input {
        assert!(unique.contains(p.id.as_str()), "{} lost", p.id);
    }
}

fn assert_team_invariants(outcome: &IterativeResult, strict_size: bool, strict_availability: bool) {
    for team in &outcome.result.teams {
        assert_eq!(team.members.len(), team.team_size as usize);
        assert!((2..=4).contains(&team.team_size));
        if strict_size {
            assert_eq!(team.preferred_team_size_match, 100.0, "{}", team.id);
        }

        let mode = team_mode(&team.members).expect("team members share a consistent mode");
        for (i, member) in team.members.iter().enumerate() {
            assert!(admits(mode, &team.members[..i], member), "{} breaks {:?}", member.id, mode);
            if !strict_availability {
                continue;
            }
            for other in &team.members[i + 1..] {
                assert!(
                    availability_compatible(member, other),
                    "{} and {} cannot meet",
                    member.id,
                    other.id
                );
            }
        }
    }
}

#[test]
fn test_integration_end_to_end_matching() {
    let pool = generate_pool(120);

    for options in [MatchingOptions::default(), flexible_options()] {
        let strict_size = options.strict_team_size_matching;
        let outcome = Matcher::new(options).form_teams(&pool).unwrap();

        assert_partition(&pool, &outcome);
        assert_team_invariants(&outcome, strict_size, true);
        assert!(outcome.result.statistics.teams_formed > 0);
    }
}

#[test]
fn test_relaxed_availability_keeps_partition_and_preferences() {
    let pool = generate_pool(120);
    let relaxed = MatchingOptions {
        strict_availability_matching: false,
        ..Default::default()
    };
    let relaxed_flexible = MatchingOptions {
        strict_availability_matching: false,
        ..flexible_options()
    };

    for options in [relaxed, relaxed_flexible] {
        let strict_size = options.strict_team_size_matching;
        let outcome = Matcher::new(options).form_teams(&pool).unwrap();

        assert_partition(&pool, &outcome);
        assert_team_invariants(&outcome, strict_size, false);
        assert!(outcome.result.statistics.teams_formed > 0);

        // every member still shares availability with someone on the team
        for team in &outcome.result.teams {
            for member in &team.members {
                assert!(team
                    .members
                    .iter()
                    .any(|other| other.id != member.id && availability_compatible(member, other)));
            }
        }
    }
}

#[test]
fn test_relaxed_availability_admits_bridging_member() {
    let either = TeamPreference::EitherUgOrPg;
    // b bridges a (High) and c (Low); only the any-member fallback accepts c
    let participants = vec![
        create_test_participant("a", 3, either, Availability::Full),
        create_test_participant("b", 3, either, Availability::Moderate),
        create_test_participant("c", 3, either, Availability::Light),
    ];

    let strict = Matcher::with_default_options().form_teams(&participants).unwrap();
    assert!(strict.result.teams.is_empty());

    let relaxed = MatchingOptions {
        strict_availability_matching: false,
        ..Default::default()
    };
    let outcome = Matcher::new(relaxed).form_teams(&participants).unwrap();
    assert_eq!(outcome.result.teams.len(), 1);
    assert_eq!(outcome.result.teams[0].member_ids(), vec!["a", "b", "c"]);
    assert_partition(&participants, &outcome);
}

#[test]
fn test_team_ids_are_unique_across_iterations() {
    let pool = generate_pool(90);
    let outcome = Matcher::with_default_options().form_teams(&pool).unwrap();

    let ids: BTreeSet<&str> = outcome.result.teams.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), outcome.result.teams.len());
    assert!(ids.iter().all(|id| id.starts_with("team-")));
}

#[test]
fn test_determinism() {
    let pool = generate_pool(80);

    for options in [MatchingOptions::default(), flexible_options()] {
        let matcher = Matcher::new(options);
        let first = matcher.form_teams(&pool).unwrap();
        let second = matcher.form_teams(&pool).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_efficiency_bounds() {
    for n in [2, 7, 33, 64] {
        let pool = generate_pool(n);
        let outcome = Matcher::with_default_options().form_teams(&pool).unwrap();
        let stats = &outcome.result.statistics;

        assert!((0.0..=100.0).contains(&stats.matching_efficiency));
        assert_eq!(stats.matching_efficiency == 100.0, outcome.result.unmatched.is_empty());
        assert_eq!(aggregate(&outcome.result.teams, &outcome.result.unmatched), *stats);
    }
}

#[test]
fn test_scenario_two_pairs() {
    let either = TeamPreference::EitherUgOrPg;
    let participants: Vec<Participant> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| create_test_participant(id, 2, either, Availability::Moderate))
        .collect();

    let outcome = Matcher::with_default_options().form_teams(&participants).unwrap();
    let stats = &outcome.result.statistics;

    assert_eq!(stats.teams_formed, 2);
    assert!(outcome.result.teams.iter().all(|t| t.team_size == 2));
    assert_eq!(stats.unmatched_count, 0);
    assert_eq!(stats.matching_efficiency, 100.0);
    assert_eq!(outcome.stop_reason, StopReason::Converged);
}

#[test]
fn test_scenario_insufficient_candidates() {
    let either = TeamPreference::EitherUgOrPg;
    let participants: Vec<Participant> = ["a", "b", "c"]
        .iter()
        .map(|id| create_test_participant(id, 4, either, Availability::Full))
        .collect();

    let outcome = Matcher::with_default_options().form_teams(&participants).unwrap();
    assert!(outcome.result.teams.is_empty());
    assert_eq!(outcome.result.unmatched.len(), 3);

    let report = diagnose_unmatched(&outcome.result.unmatched, &DiagnosticsConfig::default());
    assert!(report
        .participants
        .iter()
        .all(|d| d.reason.category == ReasonCategory::InsufficientCandidates));
}

#[test]
fn test_scenario_preference_conflict() {
    let ug = create_test_participant("ug", 2, TeamPreference::UndergradsOnly, Availability::Full);
    let mut pg = create_test_participant("pg", 2, TeamPreference::PostgradsOnly, Availability::Full);
    pg.year_of_study = "PG Year 1".to_string();

    let outcome = Matcher::with_default_options().form_teams(&[ug, pg]).unwrap();
    assert!(outcome.result.teams.is_empty());
    assert_eq!(outcome.result.unmatched.len(), 2);

    let report = diagnose_unmatched(&outcome.result.unmatched, &DiagnosticsConfig::default());
    assert_eq!(report.reason_counts.get(&ReasonCategory::TeamPreference), Some(&2));
}

#[test]
fn test_scenario_iteration_stops_on_stagnation() {
    let either = TeamPreference::EitherUgOrPg;
    let mut participants = vec![
        create_test_participant("a", 2, either, Availability::Full),
        create_test_participant("b", 2, either, Availability::Full),
        create_test_participant("c", 2, either, Availability::Moderate),
        create_test_participant("d", 2, either, Availability::Moderate),
    ];
    // three UG-only and three PG-only students who each want a team of four
    for i in 0..3 {
        participants.push(create_test_participant(
            &format!("ug{}", i),
            4,
            TeamPreference::UndergradsOnly,
            Availability::Full,
        ));
        let mut pg = create_test_participant(&format!("pg{}", i), 4, TeamPreference::PostgradsOnly, Availability::Full);
        pg.year_of_study = "MBA Year 1".to_string();
        participants.push(pg);
    }

    let options = MatchingOptions {
        max_consecutive_failures: 3,
        ..Default::default()
    };
    let outcome = Matcher::new(options).form_teams(&participants).unwrap();

    assert_eq!(outcome.result.statistics.teams_formed, 2);
    assert_eq!(outcome.result.unmatched.len(), 6);
    assert_eq!(outcome.stop_reason, StopReason::Stagnated);
    assert_eq!(outcome.iterations, 4);
    assert!(outcome.iterations < 10);
    assert_eq!(outcome.iteration_history[0].participants_matched, 4);
    assert!(outcome.iteration_history[1..].iter().all(|r| r.participants_matched == 0));
}

#[test]
fn test_single_pass_mode() {
    let pool = generate_pool(40);
    let options = MatchingOptions {
        use_iterative_matching: false,
        ..Default::default()
    };
    let outcome = Matcher::new(options).form_teams(&pool).unwrap();

    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.stop_reason, StopReason::SinglePass);
    assert_partition(&pool, &outcome);
}

#[test]
fn test_assignments_mirror_teams() {
    let pool = generate_pool(50);
    let outcome = Matcher::with_default_options().form_teams(&pool).unwrap();
    let assignments = outcome.result.assignments();

    assert_eq!(assignments.len(), outcome.result.teams.len());
    for (assignment, team) in assignments.iter().zip(&outcome.result.teams) {
        assert_eq!(assignment.team_id, team.id);
        assert_eq!(assignment.members, team.member_ids());
        assert_eq!(assignment.team_size, team.team_size);
    }
}

#[test]
fn test_result_serializes_with_survey_labels() {
    let either = TeamPreference::EitherUgOrPg;
    let participants = vec![
        create_test_participant("a", 2, either, Availability::Full),
        create_test_participant("b", 2, either, Availability::Full),
    ];
    let outcome = Matcher::with_default_options().form_teams(&participants).unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["stopReason"], "converged");
    assert_eq!(json["result"]["teams"][0]["teamId"], "team-1-1");
    assert_eq!(json["result"]["teams"][0]["members"][0]["teamPreference"], "Either UG or PG");
    assert_eq!(json["result"]["statistics"]["matchingEfficiency"], 100.0);
}

#[tokio::test]
async fn test_cancelled_run_still_partitions() {
    let pool = generate_pool(60);
    let token = CancellationToken::new();
    token.cancel();

    let matcher = Matcher::with_default_options();
    let control = RunControl::new().with_cancel(token);
    let input = pool.clone();
    let outcome = tokio::task::spawn_blocking(move || matcher.form_teams_with_control(&input, control))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::Cancelled);
    assert_eq!(outcome.iterations, 0);
    assert_eq!(outcome.result.unmatched.len(), pool.len());
    assert_partition(&pool, &outcome);
}
