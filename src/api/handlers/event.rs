use axum::{extract::{Path, State}, response::IntoResponse, Json};
use chrono::{NaiveDate, Utc};
use crate::api::dtos::requests::CreateEventRequest;
use crate::api::dtos::responses::EventDetailResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::detail::EventDetail;
use crate::domain::models::event::{Event, EventDate, EventGame, NewEventParams};
use crate::domain::models::game::Game;
use crate::domain::models::participant::EventParticipant;
use crate::domain::models::user::User;
use crate::domain::services::votes::tally_votes;
use crate::error::AppError;
use crate::state::AppState;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Attaches derived tallies and the caller's role to a loaded aggregate.
pub fn detail_response(detail: EventDetail, viewer_id: &str) -> EventDetailResponse {
    let tallies = tally_votes(&detail.participants);
    let viewer_role = if detail.event.organizer_id == viewer_id {
        "organizer"
    } else {
        "participant"
    };
    EventDetailResponse { detail, tallies, viewer_role }
}

/// Loads the aggregate and rejects callers who are neither the organizer nor
/// an invited participant.
pub async fn load_detail_for(state: &AppState, event_id: &str, viewer_id: &str) -> Result<EventDetail, AppError> {
    let detail = state.event_repo.find_detail(event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let is_participant = detail.participants.iter().any(|p| p.participant.user_id == viewer_id);
    if detail.event.organizer_id != viewer_id && !is_participant {
        return Err(AppError::Forbidden("You are not part of this event".into()));
    }
    Ok(detail)
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Title cannot be empty".into()));
    }
    if payload.dates.is_empty() {
        return Err(AppError::Validation("Propose at least one date".into()));
    }
    if payload.response_deadline <= Utc::now() {
        return Err(AppError::Validation("Response deadline must be in the future".into()));
    }
    for date in &payload.dates {
        if NaiveDate::parse_from_str(&date.date, "%Y-%m-%d").is_err() {
            return Err(AppError::Validation(format!("Invalid date: {}", date.date)));
        }
    }

    let event = Event::new(NewEventParams {
        organizer_id: user.id.clone(),
        title,
        description: payload.description,
        location: payload.location,
        response_deadline: payload.response_deadline,
    });

    let dates: Vec<EventDate> = payload.dates.iter()
        .map(|d| EventDate::new(event.id.clone(), d.date.clone(), d.start_time.clone(), d.end_time.clone()))
        .collect();

    // Proposing the same game twice is a no-op, not an error.
    let mut seen_games = HashSet::new();
    let proposed: Vec<_> = payload.games.into_iter()
        .filter(|g| seen_games.insert(g.game_id))
        .collect();

    // Refresh the local metadata cache before the rows referencing it exist.
    if !proposed.is_empty() {
        let ids: Vec<i64> = proposed.iter().map(|g| g.game_id).collect();
        let fetched = state.catalog_service.get_game_details(&ids).await?;
        let known: Vec<i64> = fetched.iter().map(|g| g.bgg_id).collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
            return Err(AppError::Validation(format!("Unknown game: {}", missing)));
        }
        let games: Vec<Game> = fetched.into_iter().map(Game::from).collect();
        state.game_repo.upsert_games(&games).await?;
    }

    let games: Vec<EventGame> = proposed.iter()
        .map(|g| EventGame::new(event.id.clone(), g.game_id, user.id.clone(), g.owner_id.clone(), false))
        .collect();

    let created = state.event_repo.create(&event, &dates, &games).await?;

    let invited = register_invitees(&state, &created.id, &user, &payload.invitees).await?;
    info!("Created event {} with {} dates, {} games, {} invitees", created.id, dates.len(), games.len(), invited);

    let detail = state.event_repo.find_detail(&created.id).await?
        .ok_or(AppError::Internal)?;
    Ok(Json(detail_response(detail, &user.id)))
}

/// Registers each email as a pending participant, creating profile stubs for
/// addresses the service has never seen. Returns how many were added.
pub async fn register_invitees(
    state: &AppState,
    event_id: &str,
    organizer: &User,
    emails: &[String],
) -> Result<usize, AppError> {
    let mut seen = HashSet::new();
    let mut added = 0;

    for email in emails {
        let email = email.trim().to_lowercase();
        if email.is_empty() || email == organizer.email.to_lowercase() || !seen.insert(email.clone()) {
            continue;
        }

        let invitee = match state.user_repo.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let name = email.split('@').next().unwrap_or(&email).to_string();
                state.user_repo.upsert(&User::new(Uuid::new_v4().to_string(), email.clone(), name)).await?
            }
        };

        if state.participant_repo.find_by_event_and_user(event_id, &invitee.id).await?.is_some() {
            continue;
        }

        let participant = EventParticipant::new(event_id.to_string(), invitee.id);
        state.participant_repo.create(&participant).await?;
        added += 1;
    }

    Ok(added)
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list_for_user(&user.id).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail = load_detail_for(&state, &event_id, &user.id).await?;
    Ok(Json(detail_response(detail, &user.id)))
}
