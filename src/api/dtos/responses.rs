use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::detail::EventDetail;
use crate::domain::models::game::{CollectionEntry, Game};
use crate::domain::models::participant::EventParticipant;
use crate::domain::models::user::User;
use crate::domain::services::recommendations::{DateRecommendation, GameRecommendation};
use crate::domain::services::votes::VoteTallies;

/// Event detail plus derived data the clients would otherwise recompute.
#[derive(Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub detail: EventDetail,
    pub tallies: VoteTallies,
    /// "organizer" or "participant".
    pub viewer_role: &'static str,
}

#[derive(Serialize)]
pub struct RecommendationsResponse {
    pub dates: Vec<DateRecommendation>,
    pub games: Vec<GameRecommendation>,
    pub player_count: usize,
}

#[derive(Serialize)]
pub struct InvitationResponse {
    pub invited: usize,
    pub emails_sent: usize,
}

/// What the anonymous invite link resolves to: the participant row the token
/// belongs to plus the event it points at.
#[derive(Serialize)]
pub struct InviteView {
    pub participant: EventParticipant,
    pub event: EventDetail,
    pub tallies: VoteTallies,
}

#[derive(Serialize)]
pub struct CollectionSyncResponse {
    pub imported: usize,
}

/// One side of a friendship as the caller sees it: the other user's profile
/// plus the row id needed to act on it.
#[derive(Serialize)]
pub struct FriendEntry {
    pub friendship_id: String,
    pub user: User,
    pub requested_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct FriendsResponse {
    pub friends: Vec<FriendEntry>,
    /// Pending requests addressed to the caller.
    pub incoming: Vec<FriendEntry>,
    /// Pending requests the caller sent.
    pub outgoing: Vec<FriendEntry>,
}

#[derive(Serialize)]
pub struct FriendCollectionItem {
    #[serde(flatten)]
    pub entry: CollectionEntry,
    pub game: Game,
}

#[derive(Serialize)]
pub struct FriendCollectionResponse {
    pub user: User,
    pub games: Vec<FriendCollectionItem>,
}
