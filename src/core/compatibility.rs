use crate::models::{AvailabilityLevel, EducationLevel, Participant, TeamPreference};

/// Availability compatibility matrix
///
/// High pairs with {High, Medium}, Medium with everything, Low with
/// {Medium, Low}. High-Low is the only incompatible pair.
#[inline]
pub fn availability_compatible(a: &Participant, b: &Participant) -> bool {
    levels_compatible(a.availability.level(), b.availability.level())
}

#[inline]
pub fn levels_compatible(a: AvailabilityLevel, b: AvailabilityLevel) -> bool {
    !matches!(
        (a, b),
        (AvailabilityLevel::High, AvailabilityLevel::Low) | (AvailabilityLevel::Low, AvailabilityLevel::High)
    )
}

/// Whether a participant's own education level is consistent with the
/// team mix they asked for. A PG asking for undergrads only can never be
/// placed.
#[inline]
pub fn self_consistent(participant: &Participant) -> bool {
    fits_mode(participant.team_preference, participant)
}

/// Whether `participant` may sit on a team operating in `mode`
#[inline]
pub fn fits_mode(mode: TeamPreference, participant: &Participant) -> bool {
    let level = participant.education_level();
    match mode {
        TeamPreference::UndergradsOnly => {
            level == EducationLevel::Undergraduate
                && matches!(
                    participant.team_preference,
                    TeamPreference::UndergradsOnly | TeamPreference::EitherUgOrPg
                )
        }
        TeamPreference::PostgradsOnly => {
            level == EducationLevel::Postgraduate
                && matches!(
                    participant.team_preference,
                    TeamPreference::PostgradsOnly | TeamPreference::EitherUgOrPg
                )
        }
        TeamPreference::EitherUgOrPg => participant.team_preference == TeamPreference::EitherUgOrPg,
    }
}

/// The education mode a team is operating under, set by its anchor
///
/// Returns `None` for an empty team or one holding a member that does not
/// fit the anchor's mode, which means an upstream bucketing bug.
pub fn team_mode(team: &[Participant]) -> Option<TeamPreference> {
    let mode = team.first()?.team_preference;
    if team.iter().all(|m| fits_mode(mode, m)) {
        Some(mode)
    } else {
        None
    }
}

/// Team-preference admission rule for adding `candidate` to a team in `mode`
///
/// UG-only teams take UG candidates who asked for UG-only or either, and
/// only while no PG is on the team (mirrored for PG-only). Either-teams
/// take only candidates who also said either.
pub fn admits(mode: TeamPreference, team: &[Participant], candidate: &Participant) -> bool {
    if !fits_mode(mode, candidate) {
        return false;
    }
    match mode {
        TeamPreference::UndergradsOnly => team
            .iter()
            .all(|m| m.education_level() == EducationLevel::Undergraduate),
        TeamPreference::PostgradsOnly => team
            .iter()
            .all(|m| m.education_level() == EducationLevel::Postgraduate),
        TeamPreference::EitherUgOrPg => true,
    }
}

/// Pairwise form of the team-preference rule: could `a` and `b` land in
/// the same formation category and share a team?
pub fn preferences_compatible(a: &Participant, b: &Participant) -> bool {
    a.team_preference == b.team_preference
        && fits_mode(a.team_preference, a)
        && admits(a.team_preference, std::slice::from_ref(a), b)
}
