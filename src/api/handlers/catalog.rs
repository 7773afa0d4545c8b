use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use serde::Deserialize;
use crate::api::dtos::requests::SyncCollectionRequest;
use crate::api::dtos::responses::CollectionSyncResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::game::{CollectionEntry, Game};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct SearchParams {
    pub query: String,
}

pub async fn search_games(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Search query cannot be empty".into()));
    }
    let games = state.catalog_service.search_games(query).await?;
    Ok(Json(games))
}

pub async fn get_game(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(game_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut games = state.catalog_service.get_game_details(&[game_id]).await?;
    let game = games.pop().ok_or(AppError::NotFound("Game not found".into()))?;

    let cached = Game::from(game.clone());
    state.game_repo.upsert_games(std::slice::from_ref(&cached)).await?;

    Ok(Json(game))
}

pub async fn sync_collection(
    State(state): State<Arc<AppState>>,
    AuthUser(mut user): AuthUser,
    Json(payload): Json<SyncCollectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username
        .filter(|u| !u.trim().is_empty())
        .or_else(|| user.bgg_username.clone())
        .ok_or(AppError::Validation("No catalog username on file".into()))?;

    let items = state.catalog_service.get_user_collection(&username).await?;

    let games: Vec<Game> = items.iter().map(|i| Game::from(i.game.clone())).collect();
    state.game_repo.upsert_games(&games).await?;

    let entries: Vec<CollectionEntry> = items.iter()
        .map(|i| CollectionEntry::from_item(user.id.clone(), i))
        .collect();
    state.game_repo.replace_collection(&user.id, &entries).await?;

    if user.bgg_username.as_deref() != Some(username.as_str()) {
        user.bgg_username = Some(username.clone());
        state.user_repo.upsert(&user).await?;
    }

    info!("Imported {} collection items for user {}", entries.len(), user.id);
    Ok(Json(CollectionSyncResponse { imported: entries.len() }))
}
