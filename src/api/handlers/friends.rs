use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use crate::api::dtos::requests::FriendRequestPayload;
use crate::api::dtos::responses::{
    FriendCollectionItem, FriendCollectionResponse, FriendEntry, FriendsResponse,
};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::friendship::{Friendship, FriendshipStatus};
use crate::error::AppError;
use crate::state::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Deserialize)]
pub struct UserSearchParams {
    pub query: String,
}

/// Profiles matching the query, minus the caller and anyone they already
/// have a friendship row with.
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<UserSearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Search query cannot be empty".into()));
    }

    let candidates = state.user_repo.search(query, 10).await?;
    let mut results = Vec::new();
    for candidate in candidates {
        if candidate.id == user.id {
            continue;
        }
        if state.friend_repo.find_between(&user.id, &candidate.id).await?.is_none() {
            results.push(candidate);
        }
    }
    Ok(Json(results))
}

pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let friendships = state.friend_repo.list_for_user(&user.id).await?;

    let other_ids: Vec<String> = friendships.iter()
        .map(|f| f.counterpart(&user.id).to_string())
        .collect();
    let others: HashMap<String, _> = state.user_repo.find_by_ids(&other_ids).await?
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect();

    let mut response = FriendsResponse { friends: vec![], incoming: vec![], outgoing: vec![] };
    for friendship in friendships {
        let Some(other) = others.get(friendship.counterpart(&user.id)) else {
            continue;
        };
        let entry = FriendEntry {
            friendship_id: friendship.id.clone(),
            user: other.clone(),
            requested_at: friendship.requested_at,
        };
        match friendship.status {
            FriendshipStatus::Accepted => response.friends.push(entry),
            FriendshipStatus::Pending if friendship.addressee_id == user.id => {
                response.incoming.push(entry)
            }
            FriendshipStatus::Pending => response.outgoing.push(entry),
        }
    }
    Ok(Json(response))
}

pub async fn send_friend_request(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<FriendRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.user_id == user.id {
        return Err(AppError::Validation("You cannot befriend yourself".into()));
    }
    state.user_repo.find_by_id(&payload.user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;
    if state.friend_repo.find_between(&user.id, &payload.user_id).await?.is_some() {
        return Err(AppError::Conflict("A friendship with this user already exists".into()));
    }

    let friendship = Friendship::new(user.id.clone(), payload.user_id);
    let created = state.friend_repo.create(&friendship).await?;

    info!("User {} sent a friend request to {}", created.requester_id, created.addressee_id);
    Ok(Json(created))
}

pub async fn accept_friend_request(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(friendship_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let friendship = state.friend_repo.find_by_id(&friendship_id).await?
        .ok_or(AppError::NotFound("Friend request not found".into()))?;
    if friendship.addressee_id != user.id {
        return Err(AppError::Forbidden("Only the recipient can accept a friend request".into()));
    }

    state.friend_repo.accept(&friendship.id, Utc::now()).await?;
    let accepted = state.friend_repo.find_by_id(&friendship.id).await?
        .ok_or(AppError::NotFound("Friend request not found".into()))?;

    info!("User {} accepted friend request {}", user.id, accepted.id);
    Ok(Json(accepted))
}

/// Declining a pending request and unfriending are the same operation:
/// either party deletes the row.
pub async fn remove_friend(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(friendship_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let friendship = state.friend_repo.find_by_id(&friendship_id).await?
        .ok_or(AppError::NotFound("Friendship not found".into()))?;
    if friendship.requester_id != user.id && friendship.addressee_id != user.id {
        return Err(AppError::Forbidden("You are not part of this friendship".into()));
    }

    state.friend_repo.delete(&friendship.id).await?;
    Ok(Json(serde_json::json!({ "removed": true })))
}

/// A friend's imported collection, joined with the cached game metadata.
/// Only visible once the friendship is accepted.
pub async fn friend_collection(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(friendship_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let friendship = state.friend_repo.find_by_id(&friendship_id).await?
        .ok_or(AppError::NotFound("Friendship not found".into()))?;
    if friendship.requester_id != user.id && friendship.addressee_id != user.id {
        return Err(AppError::Forbidden("You are not part of this friendship".into()));
    }
    if friendship.status != FriendshipStatus::Accepted {
        return Err(AppError::Forbidden("You are not friends with this user".into()));
    }

    let friend_id = friendship.counterpart(&user.id);
    let friend = state.user_repo.find_by_id(friend_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let entries = state.game_repo.collection_for_user(&friend.id).await?;
    let game_ids: Vec<i64> = entries.iter().map(|e| e.game_id).collect();
    let games: HashMap<i64, _> = state.game_repo.find_by_ids(&game_ids).await?
        .into_iter()
        .map(|g| (g.bgg_id, g))
        .collect();

    let mut items: Vec<FriendCollectionItem> = entries.into_iter()
        .filter_map(|entry| games.get(&entry.game_id).map(|game| FriendCollectionItem {
            entry,
            game: game.clone(),
        }))
        .collect();
    items.sort_by(|a, b| a.game.name.cmp(&b.game.name));

    Ok(Json(FriendCollectionResponse { user: friend, games: items }))
}
