use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declared preference for the education mix of a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamPreference {
    #[serde(rename = "Undergrads only")]
    UndergradsOnly,
    #[serde(rename = "Postgrads only")]
    PostgradsOnly,
    #[serde(rename = "Either UG or PG")]
    EitherUgOrPg,
}

/// Education level derived from the year-of-study answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "UG")]
    Undergraduate,
    #[serde(rename = "PG")]
    Postgraduate,
}

impl EducationLevel {
    /// Anything mentioning "PG" or "MBA" counts as postgraduate
    pub fn from_year_of_study(year: &str) -> Self {
        let upper = year.to_uppercase();
        if upper.contains("PG") || upper.contains("MBA") {
            EducationLevel::Postgraduate
        } else {
            EducationLevel::Undergraduate
        }
    }
}

/// Availability during the competition window, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "Not Available")]
    NotAvailable,
    #[serde(rename = "Lightly Available")]
    Light,
    #[serde(rename = "Moderately Available")]
    Moderate,
    #[serde(rename = "Fully Available")]
    Full,
}

impl Availability {
    pub fn ordinal(self) -> u8 {
        match self {
            Availability::NotAvailable => 0,
            Availability::Light => 1,
            Availability::Moderate => 2,
            Availability::Full => 3,
        }
    }

    pub fn level(self) -> AvailabilityLevel {
        match self {
            Availability::Full => AvailabilityLevel::High,
            Availability::Moderate => AvailabilityLevel::Medium,
            Availability::Light | Availability::NotAvailable => AvailabilityLevel::Low,
        }
    }
}

/// Collapsed availability used by the compatibility matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityLevel {
    High,
    Medium,
    Low,
}

/// Prior case-competition experience, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Experience {
    #[serde(rename = "None")]
    None,
    #[serde(rename = "Participated 1-2 times")]
    Participated1to2,
    #[serde(rename = "Participated 3+ times")]
    Participated3Plus,
    #[serde(rename = "Finalist/Winner")]
    FinalistWinner,
}

impl Experience {
    pub fn ordinal(self) -> u8 {
        match self {
            Experience::None => 0,
            Experience::Participated1to2 => 1,
            Experience::Participated3Plus => 2,
            Experience::FinalistWinner => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    #[serde(rename = "Research")]
    Research,
    #[serde(rename = "Data Analysis")]
    DataAnalysis,
    #[serde(rename = "Financial Modeling")]
    FinancialModeling,
    #[serde(rename = "Technical")]
    Technical,
    #[serde(rename = "Strategy")]
    Strategy,
    #[serde(rename = "Problem Solving")]
    ProblemSolving,
    #[serde(rename = "Leadership")]
    Leadership,
    #[serde(rename = "Presentation")]
    Presentation,
    #[serde(rename = "Communication")]
    Communication,
    #[serde(rename = "Storytelling")]
    Storytelling,
    #[serde(rename = "Design")]
    Design,
    #[serde(rename = "Prototyping")]
    Prototyping,
}

/// Role archetype a skill contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillArchetype {
    Strategist,
    Analyst,
    Communicator,
    Designer,
}

impl Skill {
    pub fn archetype(self) -> SkillArchetype {
        match self {
            Skill::Strategy | Skill::ProblemSolving | Skill::Leadership => SkillArchetype::Strategist,
            Skill::Research | Skill::DataAnalysis | Skill::FinancialModeling | Skill::Technical => {
                SkillArchetype::Analyst
            }
            Skill::Presentation | Skill::Communication | Skill::Storytelling => {
                SkillArchetype::Communicator
            }
            Skill::Design | Skill::Prototyping => SkillArchetype::Designer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Lead,
    Researcher,
    Analyst,
    Designer,
    Presenter,
    Coordinator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CaseType {
    Consulting,
    Finance,
    Marketing,
    Product,
    Operations,
    Technology,
    #[serde(rename = "Social Impact")]
    SocialImpact,
    Policy,
}

/// A normalized survey submission
///
/// Identity fields are opaque to the engine beyond equality of `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "yearOfStudy")]
    pub year_of_study: String,
    #[serde(rename = "preferredTeamSize")]
    pub preferred_team_size: u8,
    #[serde(rename = "teamPreference")]
    pub team_preference: TeamPreference,
    pub availability: Availability,
    pub experience: Experience,
    #[serde(rename = "coreStrengths", default)]
    pub core_strengths: BTreeSet<Skill>,
    #[serde(rename = "preferredRoles", default)]
    pub preferred_roles: BTreeSet<Role>,
    #[serde(rename = "casePreferences", default)]
    pub case_preferences: BTreeSet<CaseType>,
}

impl Participant {
    pub fn education_level(&self) -> EducationLevel {
        EducationLevel::from_year_of_study(&self.year_of_study)
    }
}

/// A formed team; immutable once built apart from id re-stamping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "teamId")]
    pub id: String,
    pub members: Vec<Participant>,
    #[serde(rename = "teamSize")]
    pub team_size: u8,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
    #[serde(rename = "commonCaseTypes")]
    pub common_case_types: Vec<CaseType>,
    #[serde(rename = "averageExperience")]
    pub average_experience: f64,
    #[serde(rename = "preferredTeamSizeMatch")]
    pub preferred_team_size_match: f64,
}

impl Team {
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }
}

/// Stable shape consumed by the persistence and notification layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAssignment {
    #[serde(rename = "teamId")]
    pub team_id: String,
    pub members: Vec<String>,
    #[serde(rename = "teamSize")]
    pub team_size: u8,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
}

impl From<&Team> for TeamAssignment {
    fn from(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            members: team.member_ids(),
            team_size: team.team_size,
            compatibility_score: team.compatibility_score,
        }
    }
}

/// Summary statistics over a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingStatistics {
    #[serde(rename = "totalParticipants")]
    pub total_participants: usize,
    #[serde(rename = "teamsFormed")]
    pub teams_formed: usize,
    #[serde(rename = "totalMatched")]
    pub total_matched: usize,
    #[serde(rename = "unmatchedCount")]
    pub unmatched_count: usize,
    #[serde(rename = "matchingEfficiency")]
    pub matching_efficiency: f64,
    #[serde(rename = "averageTeamSize")]
    pub average_team_size: f64,
    #[serde(rename = "averageCompatibilityScore")]
    pub average_compatibility_score: f64,
    #[serde(rename = "teamSizeDistribution")]
    pub team_size_distribution: BTreeMap<u8, usize>,
    #[serde(rename = "caseTypeDistribution")]
    pub case_type_distribution: BTreeMap<CaseType, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub teams: Vec<Team>,
    pub unmatched: Vec<Participant>,
    pub statistics: MatchingStatistics,
}

impl MatchingResult {
    pub fn assignments(&self) -> Vec<TeamAssignment> {
        self.teams.iter().map(TeamAssignment::from).collect()
    }
}

/// One entry of the append-only iteration log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    #[serde(rename = "participantsProcessed")]
    pub participants_processed: usize,
    #[serde(rename = "teamsFormed")]
    pub teams_formed: usize,
    #[serde(rename = "participantsMatched")]
    pub participants_matched: usize,
    #[serde(rename = "remainingUnmatched")]
    pub remaining_unmatched: usize,
    pub efficiency: f64,
}

/// Why the iteration controller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Nobody left to match
    Converged,
    /// Remainder smaller than the per-iteration minimum
    BelowMinimum,
    MaxIterations,
    /// Too many consecutive iterations without a new match
    Stagnated,
    Cancelled,
    DeadlineExceeded,
    /// Iterative mode was disabled
    SinglePass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterativeResult {
    pub result: MatchingResult,
    pub iterations: usize,
    #[serde(rename = "iterationHistory")]
    pub iteration_history: Vec<IterationRecord>,
    #[serde(rename = "stopReason")]
    pub stop_reason: StopReason,
}

/// Selects which filters run and how far they may relax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrictnessProfile {
    /// Exact team size, no bucket migration, filters 1-4 only
    #[default]
    AbsoluteStrict,
    /// Size may drift by one, role and skill filters enabled
    Flexible,
}

/// Verbosity of the engine's own progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Minimal,
    Detailed,
    Verbose,
}

/// Caller-facing knobs for one matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchingOptions {
    pub strict_team_size_matching: bool,
    pub strict_availability_matching: bool,
    pub use_iterative_matching: bool,
    /// Defaults to max(10, participant count)
    pub max_iterations: Option<usize>,
    pub min_participants_per_iteration: usize,
    pub max_consecutive_failures: usize,
    /// Teams scoring below this are abandoned during formation
    pub min_team_score: f64,
    pub time_budget_ms: Option<u64>,
    pub log_level: LogLevel,
}

impl Default for MatchingOptions {
    fn default() -> Self {
        Self {
            strict_team_size_matching: true,
            strict_availability_matching: true,
            use_iterative_matching: true,
            max_iterations: None,
            min_participants_per_iteration: 2,
            max_consecutive_failures: 8,
            min_team_score: 0.0,
            time_budget_ms: None,
            log_level: LogLevel::Minimal,
        }
    }
}

impl MatchingOptions {
    pub fn profile(&self) -> StrictnessProfile {
        if self.strict_team_size_matching {
            StrictnessProfile::AbsoluteStrict
        } else {
            StrictnessProfile::Flexible
        }
    }

    pub fn effective_max_iterations(&self, total_participants: usize) -> usize {
        self.max_iterations
            .unwrap_or_else(|| total_participants.max(10))
    }
}

/// Additive scorer weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub experience_diversity: f64,
    pub case_overlap: f64,
    pub skill_uniqueness: f64,
    pub availability: f64,
    pub role_uniqueness: f64,
    pub education_diversity: f64,
    /// Only non-zero where size preferences may differ from the target
    pub size_match: f64,
}

impl ScoringWeights {
    pub fn for_profile(profile: StrictnessProfile) -> Self {
        match profile {
            StrictnessProfile::AbsoluteStrict => Self {
                experience_diversity: 10.0,
                case_overlap: 15.0,
                skill_uniqueness: 10.0,
                availability: 20.0,
                role_uniqueness: 8.0,
                education_diversity: 0.0,
                size_match: 0.0,
            },
            StrictnessProfile::Flexible => Self {
                experience_diversity: 8.0,
                case_overlap: 10.0,
                skill_uniqueness: 8.0,
                availability: 15.0,
                role_uniqueness: 6.0,
                education_diversity: 5.0,
                size_match: 5.0,
            },
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::for_profile(StrictnessProfile::AbsoluteStrict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_education_level_from_year() {
        assert_eq!(EducationLevel::from_year_of_study("PG Year 1"), EducationLevel::Postgraduate);
        assert_eq!(EducationLevel::from_year_of_study("mba 2nd year"), EducationLevel::Postgraduate);
        assert_eq!(EducationLevel::from_year_of_study("UG Year 3"), EducationLevel::Undergraduate);
        assert_eq!(EducationLevel::from_year_of_study(""), EducationLevel::Undergraduate);
    }

    #[test]
    fn test_availability_levels() {
        assert_eq!(Availability::Full.level(), AvailabilityLevel::High);
        assert_eq!(Availability::Moderate.level(), AvailabilityLevel::Medium);
        assert_eq!(Availability::Light.level(), AvailabilityLevel::Low);
        assert_eq!(Availability::NotAvailable.level(), AvailabilityLevel::Low);
        assert!(Availability::Full > Availability::Light);
    }

    #[test]
    fn test_participant_deserializes_survey_labels() {
        let json = r#"{
            "id": "p1",
            "name": "Asha",
            "yearOfStudy": "MBA Year 1",
            "preferredTeamSize": 3,
            "teamPreference": "Either UG or PG",
            "availability": "Moderately Available",
            "experience": "Participated 1-2 times",
            "coreStrengths": ["Data Analysis", "Strategy"],
            "preferredRoles": ["Lead"],
            "casePreferences": ["Social Impact", "Finance"]
        }"#;

        let participant: Participant = serde_json::from_str(json).unwrap();
        assert_eq!(participant.education_level(), EducationLevel::Postgraduate);
        assert_eq!(participant.team_preference, TeamPreference::EitherUgOrPg);
        assert!(participant.case_preferences.contains(&CaseType::SocialImpact));
        assert_eq!(participant.email, "");
    }

    #[test]
    fn test_options_defaults_and_profile() {
        let options: MatchingOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, MatchingOptions::default());
        assert_eq!(options.profile(), StrictnessProfile::AbsoluteStrict);
        assert_eq!(options.effective_max_iterations(4), 10);
        assert_eq!(options.effective_max_iterations(25), 25);

        let flexible: MatchingOptions =
            serde_json::from_str(r#"{"strictTeamSizeMatching": false, "maxIterations": 3}"#).unwrap();
        assert_eq!(flexible.profile(), StrictnessProfile::Flexible);
        assert_eq!(flexible.effective_max_iterations(25), 3);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let json = r#"{
            "id": "p1",
            "name": "Asha",
            "yearOfStudy": "UG",
            "preferredTeamSize": 3,
            "teamPreference": "Anyone at all",
            "availability": "Moderately Available",
            "experience": "None"
        }"#;

        assert!(serde_json::from_str::<Participant>(json).is_err());
    }
}
