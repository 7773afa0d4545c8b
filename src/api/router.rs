use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{catalog, event, friends, health, organizer, profile, rsvp};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Profile
        .route("/api/v1/profile", get(profile::get_profile).put(profile::update_profile))

        // Friends
        .route("/api/v1/users/search", get(friends::search_users))
        .route("/api/v1/friends", get(friends::list_friends))
        .route("/api/v1/friends/requests", post(friends::send_friend_request))
        .route("/api/v1/friends/requests/{id}/accept", post(friends::accept_friend_request))
        .route("/api/v1/friends/{id}", delete(friends::remove_friend))
        .route("/api/v1/friends/{id}/collection", get(friends::friend_collection))

        // Events (organizer + participant reads)
        .route("/api/v1/events", post(event::create_event).get(event::list_events))
        .route("/api/v1/events/{id}", get(event::get_event))
        .route("/api/v1/events/{id}/recommendations", get(organizer::get_recommendations))

        // Organizer lifecycle
        .route("/api/v1/events/{id}/invitations", post(organizer::send_invitations))
        .route("/api/v1/events/{id}/confirm", post(organizer::confirm_event))
        .route("/api/v1/events/{id}/cancel", post(organizer::cancel_event))
        .route("/api/v1/events/{id}/complete", post(organizer::complete_event))

        // Participant responses
        .route("/api/v1/events/{id}/rsvp", post(rsvp::submit_rsvp))

        // Anonymous invite-link flow
        .route("/api/v1/invite/{token}", get(rsvp::get_invite))
        .route("/api/v1/invite/{token}/rsvp", post(rsvp::rsvp_by_token))

        // Catalog proxy & collection import
        .route("/api/v1/catalog/search", get(catalog::search_games))
        .route("/api/v1/catalog/games/{id}", get(catalog::get_game))
        .route("/api/v1/collection/sync", post(catalog::sync_collection))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
