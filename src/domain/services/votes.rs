use std::collections::HashMap;

use serde::Serialize;

use crate::domain::models::detail::ParticipantDetail;

/// Tallies of all votes for one event: per-date count of available
/// participants and per-game signed vote sum.
#[derive(Debug, Default, Clone, Serialize)]
pub struct VoteTallies {
    pub date_counts: HashMap<String, i64>,
    pub game_scores: HashMap<String, i64>,
}

impl VoteTallies {
    pub fn date_count(&self, date_id: &str) -> i64 {
        self.date_counts.get(date_id).copied().unwrap_or(0)
    }

    pub fn game_score(&self, event_game_id: &str) -> i64 {
        self.game_scores.get(event_game_id).copied().unwrap_or(0)
    }
}

/// Reduces the participant set of one event into vote tallies.
///
/// Votes of declined participants are excluded: a stored vote only counts
/// while its owner is not declined, and re-surfaces if the participant flips
/// back to interested. Only `available = true` date votes count; a missing
/// date vote is "no opinion recorded", which ranks the same as unavailable.
pub fn tally_votes(participants: &[ParticipantDetail]) -> VoteTallies {
    let mut tallies = VoteTallies::default();

    for p in participants {
        if p.participant.status == crate::domain::models::participant::ParticipantStatus::Declined {
            continue;
        }

        for dv in &p.date_votes {
            if dv.available {
                *tallies.date_counts.entry(dv.date_id.clone()).or_insert(0) += 1;
            }
        }

        for gv in &p.game_votes {
            *tallies.game_scores.entry(gv.event_game_id.clone()).or_insert(0) += gv.vote as i64;
        }
    }

    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::detail::{ParticipantDetail, PublicUser};
    use crate::domain::models::participant::{DateVote, EventParticipant, GameVote, ParticipantStatus};

    fn participant(status: ParticipantStatus, date_votes: Vec<(&str, bool)>, game_votes: Vec<(&str, i32)>) -> ParticipantDetail {
        let mut p = EventParticipant::new("ev1".into(), "user".into());
        p.status = status;
        let pid = p.id.clone();
        ParticipantDetail {
            participant: p,
            user: PublicUser { id: "user".into(), name: "User".into(), avatar_url: None },
            date_votes: date_votes
                .into_iter()
                .map(|(d, a)| DateVote::new(pid.clone(), d.into(), a))
                .collect(),
            game_votes: game_votes
                .into_iter()
                .map(|(g, v)| GameVote::new(pid.clone(), g.into(), v))
                .collect(),
        }
    }

    #[test]
    fn counts_available_dates_and_sums_game_votes() {
        let participants = vec![
            participant(ParticipantStatus::Interested, vec![("d1", true), ("d2", true)], vec![("g1", 1)]),
            participant(ParticipantStatus::Interested, vec![("d1", true)], vec![("g1", 1), ("g2", -1)]),
            participant(ParticipantStatus::Confirmed, vec![("d2", true)], vec![("g2", -1)]),
        ];

        let tallies = tally_votes(&participants);
        assert_eq!(tallies.date_count("d1"), 2);
        assert_eq!(tallies.date_count("d2"), 2);
        assert_eq!(tallies.game_score("g1"), 2);
        assert_eq!(tallies.game_score("g2"), -2);
    }

    #[test]
    fn unavailable_votes_do_not_count() {
        let participants = vec![participant(ParticipantStatus::Interested, vec![("d1", false)], vec![])];
        let tallies = tally_votes(&participants);
        assert_eq!(tallies.date_count("d1"), 0);
    }

    #[test]
    fn declined_participants_are_excluded() {
        let participants = vec![
            participant(ParticipantStatus::Interested, vec![("d1", true)], vec![("g1", 1)]),
            participant(ParticipantStatus::Declined, vec![("d1", true)], vec![("g1", 1)]),
        ];

        let tallies = tally_votes(&participants);
        assert_eq!(tallies.date_count("d1"), 1);
        assert_eq!(tallies.game_score("g1"), 1);
    }

    #[test]
    fn missing_votes_read_as_zero() {
        let tallies = tally_votes(&[]);
        assert_eq!(tallies.date_count("unknown"), 0);
        assert_eq!(tallies.game_score("unknown"), 0);
    }
}
