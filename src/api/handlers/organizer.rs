use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::{ConfirmEventRequest, InvitationRequest};
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::responses::{InvitationResponse, RecommendationsResponse};
use crate::api::handlers::event::{detail_response, load_detail_for, register_invitees};
use crate::domain::models::event::{Event, EventFinalGame, EventStatus};
use crate::domain::models::participant::ParticipantStatus;
use crate::domain::services::lifecycle::{ensure_transition, validate_confirmation};
use crate::domain::services::notifications::{ConfirmationDetails, InvitationNotice};
use crate::domain::services::recommendations::{recommend_dates, recommend_games, DateCandidate, GameCandidate};
use crate::domain::services::votes::tally_votes;
use crate::error::AppError;
use crate::state::AppState;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

async fn load_owned_event(state: &AppState, event_id: &str, user_id: &str) -> Result<Event, AppError> {
    let event = state.event_repo.find_by_id(event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    if event.organizer_id != user_id {
        return Err(AppError::Forbidden("Only the organizer can do this".into()));
    }
    Ok(event)
}

pub async fn send_invitations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<InvitationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_owned_event(&state, &event_id, &user.id).await?;
    if event.status != EventStatus::Draft && event.status != EventStatus::Pending {
        return Err(AppError::Conflict("Invitations are closed for this event".into()));
    }

    let invited = register_invitees(&state, &event.id, &user, &payload.emails).await?;

    // Everyone who has not responded yet gets (another) email.
    let participants = state.participant_repo.list_by_event(&event.id).await?;
    let pending: Vec<_> = participants.into_iter()
        .filter(|p| p.status == ParticipantStatus::Pending)
        .collect();

    let user_ids: Vec<String> = pending.iter().map(|p| p.user_id.clone()).collect();
    let users = state.user_repo.find_by_ids(&user_ids).await?;
    let emails: HashMap<String, String> = users.into_iter().map(|u| (u.id, u.email)).collect();

    let notices: Vec<InvitationNotice> = pending.iter()
        .filter_map(|p| emails.get(&p.user_id).map(|email| InvitationNotice {
            recipient: email.clone(),
            invite_token: p.invitation_token.clone(),
        }))
        .collect();

    let dates = state.event_repo.find_detail(&event.id).await?
        .map(|d| d.dates.iter().map(|date| date.proposed_date.clone()).collect::<Vec<_>>())
        .unwrap_or_default();

    let emails_sent = state.notifications
        .send_invitations(&event.title, &user.name, &dates, &notices)
        .await;

    if event.status == EventStatus::Draft {
        state.event_repo.update_status(&event.id, EventStatus::Draft, EventStatus::Pending).await?;
        info!("Event {} moved to pending on first invitation dispatch", event.id);
    }

    Ok(Json(InvitationResponse { invited, emails_sent }))
}

pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail = load_detail_for(&state, &event_id, &user.id).await?;
    let tallies = tally_votes(&detail.participants);
    let player_count = detail.attending_count();

    let date_candidates: Vec<DateCandidate> = detail.dates.iter()
        .map(|d| DateCandidate {
            date_id: d.id.clone(),
            proposed_date: d.proposed_date.clone(),
            available_count: tallies.date_count(&d.id),
        })
        .collect();

    let mut ratings_by_game: HashMap<i64, Vec<f64>> = HashMap::new();
    for (game_id, rating) in state.game_repo.attending_ratings(&event_id).await? {
        ratings_by_game.entry(game_id).or_default().push(rating);
    }

    let game_candidates: Vec<GameCandidate> = detail.games.iter()
        .map(|g| GameCandidate {
            event_game_id: g.entry.id.clone(),
            name: g.game.name.clone(),
            min_players: g.game.min_players,
            max_players: g.game.max_players,
            catalog_rating: g.game.bgg_rating,
            participant_ratings: ratings_by_game.get(&g.entry.game_id).cloned().unwrap_or_default(),
            votes: tallies.game_score(&g.entry.id),
        })
        .collect();

    Ok(Json(RecommendationsResponse {
        dates: recommend_dates(&date_candidates, player_count),
        games: recommend_games(&game_candidates, player_count as i32),
        player_count,
    }))
}

pub async fn confirm_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<ConfirmEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state.event_repo.find_detail(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    if detail.event.organizer_id != user.id {
        return Err(AppError::Forbidden("Only the organizer can confirm".into()));
    }

    validate_confirmation(&detail, &payload.final_date_id, &payload.games)?;

    let games_by_entry: HashMap<&str, i64> = detail.games.iter()
        .map(|g| (g.entry.id.as_str(), g.entry.game_id))
        .collect();
    let final_games: Vec<EventFinalGame> = payload.games.iter()
        .filter_map(|s| games_by_entry.get(s.event_game_id.as_str()).map(|game_id| EventFinalGame {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.clone(),
            game_id: *game_id,
            responsible_user_id: s.responsible_user_id.clone(),
        }))
        .collect();

    state.event_repo.confirm(&event_id, &payload.final_date_id, &final_games).await?;
    info!("Event {} confirmed on date {}", event_id, payload.final_date_id);

    let confirmed = state.event_repo.find_detail(&event_id).await?
        .ok_or(AppError::Internal)?;

    // Confirmed participants only; declined and silent invitees are not told.
    let attending_ids: Vec<String> = confirmed.participants.iter()
        .filter(|p| p.participant.status.is_attending())
        .map(|p| p.participant.user_id.clone())
        .collect();
    let recipients: Vec<String> = state.user_repo.find_by_ids(&attending_ids).await?
        .into_iter().map(|u| u.email).collect();

    let final_date = confirmed.dates.iter()
        .find(|d| confirmed.event.final_date_id.as_deref() == Some(d.id.as_str()));
    let notification = ConfirmationDetails {
        event_title: confirmed.event.title.clone(),
        final_date: final_date.map(|d| d.proposed_date.clone()).unwrap_or_default(),
        final_time: final_date.and_then(|d| d.start_time.clone()),
        location: confirmed.event.location.clone(),
        games: confirmed.final_games.iter()
            .map(|f| (f.game_name.clone(), f.responsible_name.clone()))
            .collect(),
    };
    state.notifications.send_confirmations(&notification, &recipients).await;

    Ok(Json(detail_response(confirmed, &user.id)))
}

pub async fn cancel_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_owned_event(&state, &event_id, &user.id).await?;
    ensure_transition(event.status, EventStatus::Cancelled)?;
    state.event_repo.update_status(&event.id, event.status, EventStatus::Cancelled).await?;
    info!("Event {} cancelled", event.id);
    Ok(Json(serde_json::json!({ "status": "cancelled" })))
}

pub async fn complete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = load_owned_event(&state, &event_id, &user.id).await?;
    ensure_transition(event.status, EventStatus::Completed)?;
    state.event_repo.update_status(&event.id, event.status, EventStatus::Completed).await?;
    info!("Event {} completed", event.id);
    Ok(Json(serde_json::json!({ "status": "completed" })))
}
