use std::sync::Arc;
use crate::domain::ports::{
    CatalogService, EmailService, EventRepository, FriendRepository, GameRepository,
    ParticipantRepository, UserRepository,
};
use crate::domain::services::notifications::NotificationService;
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub friend_repo: Arc<dyn FriendRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub participant_repo: Arc<dyn ParticipantRepository>,
    pub game_repo: Arc<dyn GameRepository>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub email_service: Arc<dyn EmailService>,
    pub notifications: Arc<NotificationService>,
    pub templates: Arc<Tera>,
}
