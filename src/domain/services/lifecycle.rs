use std::collections::HashSet;

use crate::domain::models::detail::EventDetail;
use crate::domain::models::event::{EventStatus, FinalGameSelection};
use crate::error::AppError;

/// Legal organizer-driven status transitions. Everything not listed here is a
/// consistency error: the caller sees a `Conflict` and no state changes.
pub fn ensure_transition(from: EventStatus, to: EventStatus) -> Result<(), AppError> {
    let allowed = matches!(
        (from, to),
        (EventStatus::Draft, EventStatus::Pending)
            | (EventStatus::Pending, EventStatus::Confirmed)
            | (EventStatus::Draft, EventStatus::Cancelled)
            | (EventStatus::Pending, EventStatus::Cancelled)
            | (EventStatus::Confirmed, EventStatus::Cancelled)
            | (EventStatus::Confirmed, EventStatus::Completed)
    );

    if allowed {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "Event cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Server-side guard for the confirm transition. The organizer surface may
/// disable the button client-side, but this check is the invariant: one final
/// date belonging to the event, at least one selected game from the event's
/// proposals, and an interested or confirmed participant responsible for each.
pub fn validate_confirmation(
    detail: &EventDetail,
    final_date_id: &str,
    selections: &[FinalGameSelection],
) -> Result<(), AppError> {
    if detail.event.status != EventStatus::Pending {
        return Err(AppError::Conflict("Event is no longer pending".to_string()));
    }

    if !detail.dates.iter().any(|d| d.id == final_date_id) {
        return Err(AppError::Validation("Selected date does not belong to this event".to_string()));
    }

    if selections.is_empty() {
        return Err(AppError::Validation("Select at least one game".to_string()));
    }

    let proposed: HashSet<&str> = detail.games.iter().map(|g| g.entry.id.as_str()).collect();
    let attending: HashSet<&str> = detail
        .participants
        .iter()
        .filter(|p| p.participant.status.is_attending())
        .map(|p| p.participant.user_id.as_str())
        .collect();

    let mut seen = HashSet::new();
    for selection in selections {
        if !proposed.contains(selection.event_game_id.as_str()) {
            return Err(AppError::Validation("Selected game does not belong to this event".to_string()));
        }
        if !seen.insert(selection.event_game_id.as_str()) {
            return Err(AppError::Validation("Duplicate game selection".to_string()));
        }
        if !attending.contains(selection.responsible_user_id.as_str()) {
            return Err(AppError::Validation(
                "Every selected game needs a responsible participant who is attending".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::detail::{EventGameDetail, ParticipantDetail, PublicUser};
    use crate::domain::models::event::{Event, EventDate, EventGame, NewEventParams};
    use crate::domain::models::game::Game;
    use crate::domain::models::participant::{EventParticipant, ParticipantStatus};
    use chrono::{Duration, Utc};

    fn detail(status: EventStatus) -> EventDetail {
        let mut event = Event::new(NewEventParams {
            organizer_id: "org".into(),
            title: "Friday night".into(),
            description: None,
            location: None,
            response_deadline: Utc::now() + Duration::days(3),
        });
        event.status = status;
        let event_id = event.id.clone();

        let date = EventDate::new(event_id.clone(), "2026-09-12".into(), None, None);

        let entry = EventGame::new(event_id.clone(), 42, "org".into(), None, false);
        let game = Game {
            bgg_id: 42,
            name: "Cascadia".into(),
            thumbnail: None,
            image: None,
            min_players: 1,
            max_players: 4,
            playing_time: 45,
            bgg_rating: Some(7.9),
            year_published: Some(2021),
            description: None,
            updated_at: Utc::now(),
        };

        let mut alice = EventParticipant::new(event_id.clone(), "alice".into());
        alice.status = ParticipantStatus::Interested;
        let mut bob = EventParticipant::new(event_id.clone(), "bob".into());
        bob.status = ParticipantStatus::Declined;

        EventDetail {
            event,
            organizer: PublicUser { id: "org".into(), name: "Org".into(), avatar_url: None },
            dates: vec![date],
            games: vec![EventGameDetail {
                entry,
                game,
                proposed_by_name: "Org".into(),
                owner_name: None,
            }],
            participants: vec![
                ParticipantDetail {
                    participant: alice,
                    user: PublicUser { id: "alice".into(), name: "Alice".into(), avatar_url: None },
                    date_votes: vec![],
                    game_votes: vec![],
                },
                ParticipantDetail {
                    participant: bob,
                    user: PublicUser { id: "bob".into(), name: "Bob".into(), avatar_url: None },
                    date_votes: vec![],
                    game_votes: vec![],
                },
            ],
            final_games: vec![],
        }
    }

    fn selection(detail: &EventDetail, responsible: &str) -> Vec<FinalGameSelection> {
        vec![FinalGameSelection {
            event_game_id: detail.games[0].entry.id.clone(),
            responsible_user_id: responsible.into(),
        }]
    }

    #[test]
    fn transition_table() {
        assert!(ensure_transition(EventStatus::Draft, EventStatus::Pending).is_ok());
        assert!(ensure_transition(EventStatus::Pending, EventStatus::Confirmed).is_ok());
        assert!(ensure_transition(EventStatus::Pending, EventStatus::Cancelled).is_ok());
        assert!(ensure_transition(EventStatus::Confirmed, EventStatus::Completed).is_ok());

        assert!(ensure_transition(EventStatus::Draft, EventStatus::Confirmed).is_err());
        assert!(ensure_transition(EventStatus::Confirmed, EventStatus::Pending).is_err());
        assert!(ensure_transition(EventStatus::Completed, EventStatus::Cancelled).is_err());
        assert!(ensure_transition(EventStatus::Cancelled, EventStatus::Pending).is_err());
    }

    #[test]
    fn valid_confirmation_passes() {
        let d = detail(EventStatus::Pending);
        let date_id = d.dates[0].id.clone();
        assert!(validate_confirmation(&d, &date_id, &selection(&d, "alice")).is_ok());
    }

    #[test]
    fn confirmation_requires_pending_status() {
        let d = detail(EventStatus::Confirmed);
        let date_id = d.dates[0].id.clone();
        let err = validate_confirmation(&d, &date_id, &selection(&d, "alice")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn confirmation_rejects_foreign_date() {
        let d = detail(EventStatus::Pending);
        let err = validate_confirmation(&d, "not-a-date", &selection(&d, "alice")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn confirmation_requires_at_least_one_game() {
        let d = detail(EventStatus::Pending);
        let date_id = d.dates[0].id.clone();
        let err = validate_confirmation(&d, &date_id, &[]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn responsible_must_be_attending() {
        let d = detail(EventStatus::Pending);
        let date_id = d.dates[0].id.clone();
        // bob declined, so he cannot be responsible
        let err = validate_confirmation(&d, &date_id, &selection(&d, "bob")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn duplicate_selection_is_rejected() {
        let d = detail(EventStatus::Pending);
        let date_id = d.dates[0].id.clone();
        let mut sel = selection(&d, "alice");
        sel.push(sel[0].clone());
        let err = validate_confirmation(&d, &date_id, &sel).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
