use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
        }
    }
}

/// A directed friend request between two profiles. One row per pair; the
/// direction records who asked. Declining or unfriending deletes the row,
/// so a stored friendship is always pending or accepted.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Friendship {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub status: FriendshipStatus,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Friendship {
    pub fn new(requester_id: String, addressee_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            requester_id,
            addressee_id,
            status: FriendshipStatus::Pending,
            requested_at: Utc::now(),
            responded_at: None,
        }
    }

    /// The other side of the friendship, from `user_id`'s perspective.
    pub fn counterpart(&self, user_id: &str) -> &str {
        if self.requester_id == user_id {
            &self.addressee_id
        } else {
            &self.requester_id
        }
    }
}
