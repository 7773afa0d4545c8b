use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Lifecycle status of an event. `final_date_id` on the event is set if and
/// only if the status is `Confirmed` or `Completed`.
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Pending => "pending",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }

    /// Terminal states cannot be left through any organizer action.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Cancelled | EventStatus::Completed)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub organizer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub response_deadline: DateTime<Utc>,
    pub status: EventStatus,
    pub final_date_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub organizer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub response_deadline: DateTime<Utc>,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            organizer_id: params.organizer_id,
            title: params.title,
            description: params.description,
            location: params.location,
            response_deadline: params.response_deadline,
            status: EventStatus::Draft,
            final_date_id: None,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

/// A candidate date proposed for an event. Created with the event, immutable
/// afterwards. `proposed_date` is a calendar date (YYYY-MM-DD), times are
/// optional HH:MM strings.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventDate {
    pub id: String,
    pub event_id: String,
    pub proposed_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl EventDate {
    pub fn new(event_id: String, proposed_date: String, start_time: Option<String>, end_time: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            proposed_date,
            start_time,
            end_time,
        }
    }
}

/// A candidate game proposed for an event, referencing catalog metadata by
/// `game_id`. `owner_id` is the participant whose collection holds a physical
/// copy, when known.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventGame {
    pub id: String,
    pub event_id: String,
    pub game_id: i64,
    pub proposed_by: String,
    pub owner_id: Option<String>,
    pub is_recommended: bool,
}

impl EventGame {
    pub fn new(event_id: String, game_id: i64, proposed_by: String, owner_id: Option<String>, is_recommended: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            game_id,
            proposed_by,
            owner_id,
            is_recommended,
        }
    }
}

/// A game selected at confirmation time, paired with the participant
/// responsible for bringing it. Rows exist only for confirmed events.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EventFinalGame {
    pub id: String,
    pub event_id: String,
    pub game_id: i64,
    pub responsible_user_id: String,
}

/// Organizer's selection for one game at confirmation time, keyed by the
/// proposed `EventGame` row.
#[derive(Debug, Deserialize, Clone)]
pub struct FinalGameSelection {
    pub event_game_id: String,
    pub responsible_user_id: String,
}
