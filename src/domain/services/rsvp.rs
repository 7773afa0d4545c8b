use chrono::{DateTime, Utc};

use crate::domain::models::event::{Event, EventStatus};
use crate::domain::models::participant::ParticipantStatus;
use crate::error::AppError;

/// Responses are accepted strictly before the event's response deadline,
/// compared against wall-clock time at write time. No background job demotes
/// anything at deadline time; this comparison is the whole mechanism.
pub fn ensure_deadline_open(event: &Event, now: DateTime<Utc>) -> Result<(), AppError> {
    if now > event.response_deadline {
        return Err(AppError::DeadlinePassed(
            "The response deadline for this event has passed".to_string(),
        ));
    }
    Ok(())
}

/// RSVP and vote surfaces exist only while the event awaits responses.
/// Confirmed and completed events stay readable but reject writes.
pub fn ensure_event_open_for_responses(event: &Event) -> Result<(), AppError> {
    match event.status {
        EventStatus::Pending => Ok(()),
        EventStatus::Draft => Err(AppError::Conflict("Invitations have not been sent yet".to_string())),
        _ => Err(AppError::Conflict("This event is no longer accepting responses".to_string())),
    }
}

/// A participant may flip freely between interested and declined until the
/// organizer confirms; a confirmed participant no longer self-transitions.
pub fn ensure_participant_can_respond(status: ParticipantStatus) -> Result<(), AppError> {
    if status == ParticipantStatus::Confirmed {
        return Err(AppError::Conflict("Your attendance has already been confirmed".to_string()));
    }
    Ok(())
}

/// Drops zero votes (the "retract" state is row absence) and rejects anything
/// outside {-1, 0, 1}.
pub fn sanitize_game_votes(votes: Vec<(String, i32)>) -> Result<Vec<(String, i32)>, AppError> {
    for (_, vote) in &votes {
        if !(-1..=1).contains(vote) {
            return Err(AppError::Validation("Game votes must be -1, 0 or 1".to_string()));
        }
    }
    Ok(votes.into_iter().filter(|(_, vote)| *vote != 0).collect())
}
