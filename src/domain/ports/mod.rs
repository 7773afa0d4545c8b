use crate::domain::models::{
    detail::EventDetail,
    event::{Event, EventDate, EventFinalGame, EventGame, EventStatus},
    friendship::Friendship,
    game::{CatalogGame, CollectionEntry, CollectionItem, Game},
    participant::{DateVote, EventParticipant, GameVote, ParticipantStatus},
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn upsert(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>, AppError>;
    /// Case-insensitive substring search on name and email.
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, AppError>;
}

#[async_trait]
pub trait FriendRepository: Send + Sync {
    async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Friendship>, AppError>;
    /// The friendship row between two users, in either direction.
    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Friendship>, AppError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Friendship>, AppError>;
    /// Guarded on the current pending status; an already-answered request
    /// surfaces as `Conflict`.
    async fn accept(&self, id: &str, responded_at: DateTime<Utc>) -> Result<(), AppError>;
    /// Declining a request and unfriending both delete the row.
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Inserts the event and its proposed dates and games as one unit.
    async fn create(&self, event: &Event, dates: &[EventDate], games: &[EventGame]) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    /// Loads the full aggregate: dates, games with metadata, participants
    /// with their votes, final games.
    async fn find_detail(&self, id: &str) -> Result<Option<EventDetail>, AppError>;
    /// Events the user organizes or is invited to.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Event>, AppError>;
    /// Status update guarded on the current status; a concurrent transition
    /// that got there first surfaces as `Conflict`.
    async fn update_status(&self, id: &str, from: EventStatus, to: EventStatus) -> Result<(), AppError>;
    /// The confirm transition as one transaction: status + final date update
    /// (guarded on `pending`), final-game inserts, and the bulk
    /// interested -> confirmed participant promotion. A second confirm on the
    /// same event must fail with `Conflict` and write nothing.
    async fn confirm(&self, event_id: &str, final_date_id: &str, final_games: &[EventFinalGame]) -> Result<(), AppError>;
}

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn create(&self, participant: &EventParticipant) -> Result<EventParticipant, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<EventParticipant>, AppError>;
    async fn find_by_event_and_user(&self, event_id: &str, user_id: &str) -> Result<Option<EventParticipant>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventParticipant>, AppError>;
    async fn update_status(&self, id: &str, status: ParticipantStatus, responded_at: Option<DateTime<Utc>>) -> Result<(), AppError>;
    /// An interested response in one transaction: participant status update
    /// plus replace-all of both vote sets. The whole vote set is the unit of
    /// write; partial updates are not supported.
    async fn submit_response(
        &self,
        participant_id: &str,
        status: ParticipantStatus,
        responded_at: DateTime<Utc>,
        date_votes: &[DateVote],
        game_votes: &[GameVote],
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait GameRepository: Send + Sync {
    async fn upsert_games(&self, games: &[Game]) -> Result<(), AppError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Game>, AppError>;
    async fn replace_collection(&self, user_id: &str, entries: &[CollectionEntry]) -> Result<(), AppError>;
    async fn collection_for_user(&self, user_id: &str) -> Result<Vec<CollectionEntry>, AppError>;
    /// (game_id, rating) pairs from the collections of the event's interested
    /// and confirmed participants, feeding the recommendation scorer.
    async fn attending_ratings(&self, event_id: &str) -> Result<Vec<(i64, f64)>, AppError>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn search_games(&self, query: &str) -> Result<Vec<CatalogGame>, AppError>;
    async fn get_game_details(&self, ids: &[i64]) -> Result<Vec<CatalogGame>, AppError>;
    /// Long-latency call; the implementation owns the retry budget. Callers
    /// see a single terminal failure once that budget is exhausted.
    async fn get_user_collection(&self, username: &str) -> Result<Vec<CollectionItem>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}
