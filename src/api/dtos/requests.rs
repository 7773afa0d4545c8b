use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::models::event::FinalGameSelection;

#[derive(Deserialize)]
pub struct ProposedDateDto {
    /// Calendar date, YYYY-MM-DD.
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Deserialize)]
pub struct ProposedGameDto {
    pub game_id: i64,
    pub owner_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub response_deadline: DateTime<Utc>,
    pub dates: Vec<ProposedDateDto>,
    #[serde(default)]
    pub games: Vec<ProposedGameDto>,
    /// Invitee emails registered as pending participants; invitations are
    /// dispatched separately.
    #[serde(default)]
    pub invitees: Vec<String>,
}

#[derive(Deserialize)]
pub struct InvitationRequest {
    /// Additional invitees; already-invited users are skipped.
    #[serde(default)]
    pub emails: Vec<String>,
}

#[derive(Deserialize)]
pub struct ConfirmEventRequest {
    pub final_date_id: String,
    pub games: Vec<FinalGameSelection>,
}

#[derive(Deserialize)]
pub struct DateVoteDto {
    pub date_id: String,
    pub available: bool,
}

#[derive(Deserialize)]
pub struct GameVoteDto {
    pub event_game_id: String,
    pub vote: i32,
}

#[derive(Deserialize)]
pub struct RsvpRequest {
    /// "interested" or "declined".
    pub status: String,
    #[serde(default)]
    pub date_votes: Vec<DateVoteDto>,
    #[serde(default)]
    pub game_votes: Vec<GameVoteDto>,
}

#[derive(Deserialize)]
pub struct FriendRequestPayload {
    /// Profile id of the user being asked.
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bgg_username: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize)]
pub struct SyncCollectionRequest {
    /// Defaults to the caller's stored catalog username.
    pub username: Option<String>,
}
