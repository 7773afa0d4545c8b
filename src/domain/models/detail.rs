use serde::Serialize;

use crate::domain::models::event::{Event, EventDate, EventFinalGame, EventGame};
use crate::domain::models::game::Game;
use crate::domain::models::participant::{DateVote, EventParticipant, GameVote};
use crate::domain::models::user::User;

/// The fully loaded event aggregate: the event plus every child row, the shape
/// the consensus engine and both capability surfaces consume.
#[derive(Debug, Serialize, Clone)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: PublicUser,
    pub dates: Vec<EventDate>,
    pub games: Vec<EventGameDetail>,
    pub participants: Vec<ParticipantDetail>,
    pub final_games: Vec<FinalGameDetail>,
}

impl EventDetail {
    /// Count of participants whose status is interested or confirmed.
    pub fn attending_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.participant.status.is_attending())
            .count()
    }
}

/// User fields safe to expose to other participants.
#[derive(Debug, Serialize, Clone)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            avatar_url: u.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct EventGameDetail {
    #[serde(flatten)]
    pub entry: EventGame,
    pub game: Game,
    pub proposed_by_name: String,
    pub owner_name: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ParticipantDetail {
    #[serde(flatten)]
    pub participant: EventParticipant,
    pub user: PublicUser,
    pub date_votes: Vec<DateVote>,
    pub game_votes: Vec<GameVote>,
}

#[derive(Debug, Serialize, Clone)]
pub struct FinalGameDetail {
    #[serde(flatten)]
    pub entry: EventFinalGame,
    pub game_name: String,
    pub responsible_name: String,
}
