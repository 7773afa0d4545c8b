pub mod postgres_event_repo;
pub mod postgres_friend_repo;
pub mod postgres_game_repo;
pub mod postgres_participant_repo;
pub mod postgres_user_repo;
pub mod sqlite_event_repo;
pub mod sqlite_friend_repo;
pub mod sqlite_game_repo;
pub mod sqlite_participant_repo;
pub mod sqlite_user_repo;
