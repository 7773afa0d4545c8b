use axum::{extract::State, response::IntoResponse, Json};
use crate::api::dtos::requests::UpdateProfileRequest;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn get_profile(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(user)
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(mut user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        user.name = name;
    }
    if let Some(bgg_username) = payload.bgg_username {
        user.bgg_username = if bgg_username.trim().is_empty() { None } else { Some(bgg_username.trim().to_string()) };
    }
    if let Some(avatar_url) = payload.avatar_url {
        user.avatar_url = if avatar_url.is_empty() { None } else { Some(avatar_url) };
    }

    let updated = state.user_repo.upsert(&user).await?;
    info!("Updated profile for user {}", updated.id);
    Ok(Json(updated))
}
