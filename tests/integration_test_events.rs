mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{catalog_game, TestApp};
use serde_json::json;

fn deadline() -> String {
    (Utc::now() + Duration::days(7)).to_rfc3339()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.get_anonymous("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app.get_anonymous("/api/v1/events").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mutation_without_csrf_header_is_rejected() {
    let app = TestApp::new().await;
    let auth = app.auth_for("org-1", "org@example.com", "Orga");

    let payload = json!({
        "title": "Untitled",
        "response_deadline": deadline(),
        "dates": [{ "date": "2026-09-12" }]
    });
    let response = app.router.clone().oneshot_without_csrf(&auth, "/api/v1/events", &payload).await;
    assert_eq!(response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_event_with_dates_games_and_invitees() {
    let app = TestApp::new().await;
    app.catalog.seed_game(catalog_game(13, "Catan", 3, 4, Some(7.1)));
    let auth = app.auth_for("org-1", "org@example.com", "Orga");

    let payload = json!({
        "title": "Friday game night",
        "description": "Bring snacks",
        "location": "My place",
        "response_deadline": deadline(),
        "dates": [
            { "date": "2026-09-11", "start_time": "19:00" },
            { "date": "2026-09-12" }
        ],
        "games": [{ "game_id": 13 }, { "game_id": 13 }],
        "invitees": ["alice@example.com", "bob@example.com", "alice@example.com"]
    });

    let (status, body) = app.post("/api/v1/events", &auth, &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "draft");
    assert_eq!(body["viewer_role"], "organizer");
    assert_eq!(body["dates"].as_array().unwrap().len(), 2);
    // Duplicate game and duplicate invitee collapse.
    assert_eq!(body["games"].as_array().unwrap().len(), 1);
    assert_eq!(body["games"][0]["game"]["name"], "Catan");
    assert_eq!(body["participants"].as_array().unwrap().len(), 2);
    assert_eq!(body["participants"][0]["status"], "pending");

    // Metadata landed in the local cache.
    let row: (String,) = sqlx::query_as("SELECT name FROM games WHERE bgg_id = 13")
        .fetch_one(&app.pool).await.unwrap();
    assert_eq!(row.0, "Catan");
}

#[tokio::test]
async fn test_create_event_validation_failures() {
    let app = TestApp::new().await;
    let auth = app.auth_for("org-1", "org@example.com", "Orga");

    let (status, _) = app.post("/api/v1/events", &auth, &json!({
        "title": "   ",
        "response_deadline": deadline(),
        "dates": [{ "date": "2026-09-12" }]
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/events", &auth, &json!({
        "title": "No dates",
        "response_deadline": deadline(),
        "dates": []
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/events", &auth, &json!({
        "title": "Past deadline",
        "response_deadline": (Utc::now() - Duration::days(1)).to_rfc3339(),
        "dates": [{ "date": "2026-09-12" }]
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/events", &auth, &json!({
        "title": "Bad date",
        "response_deadline": deadline(),
        "dates": [{ "date": "12.09.2026" }]
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A game the catalog does not know is rejected.
    let (status, _) = app.post("/api/v1/events", &auth, &json!({
        "title": "Unknown game",
        "response_deadline": deadline(),
        "dates": [{ "date": "2026-09-12" }],
        "games": [{ "game_id": 999 }]
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_visibility_and_access() {
    let app = TestApp::new().await;
    let organizer = app.auth_for("org-1", "org@example.com", "Orga");
    let invitee = app.auth_for("u-alice", "alice@example.com", "Alice");
    let outsider = app.auth_for("u-eve", "eve@example.com", "Eve");

    let (_, created) = app.post("/api/v1/events", &organizer, &json!({
        "title": "Private night",
        "response_deadline": deadline(),
        "dates": [{ "date": "2026-09-12" }],
        "invitees": ["alice@example.com"]
    })).await;
    let event_id = created["id"].as_str().unwrap();

    let (status, events) = app.get("/api/v1/events", &organizer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);

    // Alice logs in for the first time; her stub profile from the invitation
    // is adopted via the email claim, so she sees her invitation.
    let (_, events) = app.get("/api/v1/events", &invitee).await;
    assert_eq!(events.as_array().unwrap().len(), 1);

    let (status, detail) = app.get(&format!("/api/v1/events/{}", event_id), &invitee).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["viewer_role"], "participant");

    let (_, events) = app.get("/api/v1/events", &outsider).await;
    assert_eq!(events.as_array().unwrap().len(), 0);

    let (status, detail) = app.get(&format!("/api/v1/events/{}", event_id), &organizer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["viewer_role"], "organizer");

    let (status, _) = app.get(&format!("/api/v1/events/{}", event_id), &outsider).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/v1/events/no-such-event", &invitee).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// Small extension trait so the CSRF test can send a cookie without the header.
trait OneshotNoCsrf {
    async fn oneshot_without_csrf(self, auth: &common::AuthHeaders, uri: &str, payload: &serde_json::Value) -> StatusCode;
}

impl OneshotNoCsrf for axum::Router {
    async fn oneshot_without_csrf(self, auth: &common::AuthHeaders, uri: &str, payload: &serde_json::Value) -> StatusCode {
        use axum::{body::Body, http::{header, Request}};
        use tower::ServiceExt;

        let response = self.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .body(Body::from(payload.to_string()))
                .unwrap(),
        ).await.unwrap();
        response.status()
    }
}
