use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::Rng;

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Pending,
    Interested,
    Confirmed,
    Declined,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "pending",
            ParticipantStatus::Interested => "interested",
            ParticipantStatus::Confirmed => "confirmed",
            ParticipantStatus::Declined => "declined",
        }
    }

    /// Interested and confirmed participants count as attending for
    /// recommendation and responsibility purposes.
    pub fn is_attending(&self) -> bool {
        matches!(self, ParticipantStatus::Interested | ParticipantStatus::Confirmed)
    }
}

/// One invited user's relationship to one event. Unique per (event, user);
/// the whole vote model depends on that.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventParticipant {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub status: ParticipantStatus,
    pub invitation_token: String,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl EventParticipant {
    pub fn new(event_id: String, user_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            user_id,
            status: ParticipantStatus::Pending,
            invitation_token: generate_invitation_token(),
            invited_at: Utc::now(),
            responded_at: None,
        }
    }
}

/// Invite-link bearer capability: 24 random bytes, hex encoded (48 chars).
pub fn generate_invitation_token() -> String {
    let bytes: [u8; 24] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

/// A participant's availability for one proposed date. Absence of a row means
/// "no opinion recorded", not unavailability.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct DateVote {
    pub id: String,
    pub participant_id: String,
    pub date_id: String,
    pub available: bool,
}

impl DateVote {
    pub fn new(participant_id: String, date_id: String, available: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            participant_id,
            date_id,
            available,
        }
    }
}

/// A participant's thumbs-up/down for one proposed game. `vote` is -1 or +1;
/// a retracted vote is modeled by row absence, never a stored zero.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct GameVote {
    pub id: String,
    pub participant_id: String,
    pub event_game_id: String,
    pub vote: i32,
}

impl GameVote {
    pub fn new(participant_id: String, event_game_id: String, vote: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            participant_id,
            event_game_id,
            vote,
        }
    }
}
