use axum::{extract::{Path, State}, response::IntoResponse, Json};
use chrono::Utc;
use crate::api::dtos::requests::RsvpRequest;
use crate::api::dtos::responses::InviteView;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::event::detail_response;
use crate::domain::models::detail::EventDetail;
use crate::domain::models::participant::{DateVote, EventParticipant, GameVote, ParticipantStatus};
use crate::domain::services::rsvp::{
    ensure_deadline_open, ensure_event_open_for_responses, ensure_participant_can_respond,
    sanitize_game_votes,
};
use crate::domain::services::votes::tally_votes;
use crate::error::AppError;
use crate::state::AppState;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Applies one RSVP to a participant row. Shared between the authenticated
/// and the invite-token surface; both enforce the same gates.
async fn apply_rsvp(
    state: &AppState,
    detail: &EventDetail,
    participant: &EventParticipant,
    payload: RsvpRequest,
) -> Result<(), AppError> {
    ensure_event_open_for_responses(&detail.event)?;
    ensure_deadline_open(&detail.event, Utc::now())?;
    ensure_participant_can_respond(participant.status)?;

    let now = Utc::now();
    match payload.status.as_str() {
        "declined" => {
            // Votes stay stored; the tally ignores them while declined.
            state.participant_repo.update_status(&participant.id, ParticipantStatus::Declined, Some(now)).await?;
        }
        "interested" => {
            let date_ids: HashSet<&str> = detail.dates.iter().map(|d| d.id.as_str()).collect();
            let game_ids: HashSet<&str> = detail.games.iter().map(|g| g.entry.id.as_str()).collect();

            let mut seen_dates = HashSet::new();
            let mut date_votes = Vec::new();
            for vote in &payload.date_votes {
                if !date_ids.contains(vote.date_id.as_str()) {
                    return Err(AppError::Validation(format!("Unknown date: {}", vote.date_id)));
                }
                if !seen_dates.insert(vote.date_id.as_str()) {
                    return Err(AppError::Validation(format!("Duplicate date vote: {}", vote.date_id)));
                }
                date_votes.push(DateVote::new(participant.id.clone(), vote.date_id.clone(), vote.available));
            }

            for vote in &payload.game_votes {
                if !game_ids.contains(vote.event_game_id.as_str()) {
                    return Err(AppError::Validation(format!("Unknown game: {}", vote.event_game_id)));
                }
            }
            let raw: Vec<(String, i32)> = payload.game_votes.iter()
                .map(|v| (v.event_game_id.clone(), v.vote))
                .collect();
            let mut seen_games = HashSet::new();
            let game_votes: Vec<GameVote> = sanitize_game_votes(raw)?
                .into_iter()
                .filter(|(id, _)| seen_games.insert(id.clone()))
                .map(|(id, vote)| GameVote::new(participant.id.clone(), id, vote))
                .collect();

            state.participant_repo
                .submit_response(&participant.id, ParticipantStatus::Interested, now, &date_votes, &game_votes)
                .await?;
        }
        other => {
            return Err(AppError::Validation(format!("Unsupported RSVP status: {}", other)));
        }
    }

    info!("Participant {} responded '{}' to event {}", participant.id, payload.status, detail.event.id);
    Ok(())
}

pub async fn submit_rsvp(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<RsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state.event_repo.find_detail(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    let participant = state.participant_repo.find_by_event_and_user(&event_id, &user.id).await?
        .ok_or(AppError::Forbidden("You are not invited to this event".into()))?;

    apply_rsvp(&state, &detail, &participant, payload).await?;

    let refreshed = state.event_repo.find_detail(&event_id).await?
        .ok_or(AppError::Internal)?;
    Ok(Json(detail_response(refreshed, &user.id)))
}

pub async fn get_invite(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (participant, detail) = resolve_token(&state, &token).await?;
    let tallies = tally_votes(&detail.participants);
    Ok(Json(InviteView { participant, event: detail, tallies }))
}

pub async fn rsvp_by_token(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<RsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (participant, detail) = resolve_token(&state, &token).await?;

    apply_rsvp(&state, &detail, &participant, payload).await?;

    let (participant, refreshed) = resolve_token(&state, &token).await?;
    let tallies = tally_votes(&refreshed.participants);
    Ok(Json(InviteView { participant, event: refreshed, tallies }))
}

async fn resolve_token(state: &AppState, token: &str) -> Result<(EventParticipant, EventDetail), AppError> {
    let participant = state.participant_repo.find_by_token(token).await?
        .ok_or(AppError::NotFound("Invitation not found".into()))?;
    let detail = state.event_repo.find_detail(&participant.event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok((participant, detail))
}
