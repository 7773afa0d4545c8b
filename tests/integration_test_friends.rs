mod common;

use axum::http::StatusCode;
use common::{catalog_game, AuthHeaders, TestApp};
use gamenight_backend::domain::models::game::CollectionItem;
use serde_json::{json, Value};

/// Profiles are provisioned lazily on the first authenticated request, so
/// every user a test wants findable has to show up once.
async fn provision(app: &TestApp, auth: &AuthHeaders) {
    let (status, _) = app.get("/api/v1/profile", auth).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_search_excludes_self_and_existing_friendships() {
    let app = TestApp::new().await;
    let alice = app.auth_for("u-alice", "alice@example.com", "Alice");
    let bob = app.auth_for("u-bob", "bob@example.com", "Bob");
    let carol = app.auth_for("u-carol", "carol@example.com", "Carol");
    provision(&app, &alice).await;
    provision(&app, &bob).await;
    provision(&app, &carol).await;

    let (status, body) = app.get("/api/v1/users/search?query=example.com", &alice).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bob", "Carol"]);

    let (status, _) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    assert_eq!(status, StatusCode::OK);

    // A pending request already hides the user from further searches.
    let (_, body) = app.get("/api/v1/users/search?query=example.com", &alice).await;
    let names: Vec<&str> = body.as_array().unwrap().iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Carol"]);

    let (status, _) = app.get("/api/v1/users/search?query=%20", &alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_friend_request_and_accept_flow() {
    let app = TestApp::new().await;
    let alice = app.auth_for("u-alice", "alice@example.com", "Alice");
    let bob = app.auth_for("u-bob", "bob@example.com", "Bob");
    provision(&app, &alice).await;
    provision(&app, &bob).await;

    let (status, request) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(request["status"], "pending");
    let friendship_id = request["id"].as_str().unwrap().to_string();

    // Each side sees the pending request from their own perspective.
    let (_, alices) = app.get("/api/v1/friends", &alice).await;
    assert_eq!(alices["outgoing"][0]["user"]["name"], "Bob");
    assert!(alices["incoming"].as_array().unwrap().is_empty());
    assert!(alices["friends"].as_array().unwrap().is_empty());

    let (_, bobs) = app.get("/api/v1/friends", &bob).await;
    assert_eq!(bobs["incoming"][0]["user"]["name"], "Alice");
    assert_eq!(bobs["incoming"][0]["friendship_id"], friendship_id.as_str());

    let (status, accepted) = app.post(
        &format!("/api/v1/friends/requests/{}/accept", friendship_id), &bob, &json!({}),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");
    assert_ne!(accepted["responded_at"], Value::Null);

    let (_, alices) = app.get("/api/v1/friends", &alice).await;
    assert_eq!(alices["friends"][0]["user"]["name"], "Bob");
    assert!(alices["outgoing"].as_array().unwrap().is_empty());
    let (_, bobs) = app.get("/api/v1/friends", &bob).await;
    assert_eq!(bobs["friends"][0]["user"]["name"], "Alice");
}

#[tokio::test]
async fn test_friend_request_rejects_self_unknown_and_duplicates() {
    let app = TestApp::new().await;
    let alice = app.auth_for("u-alice", "alice@example.com", "Alice");
    let bob = app.auth_for("u-bob", "bob@example.com", "Bob");
    provision(&app, &alice).await;
    provision(&app, &bob).await;

    let (status, _) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-alice" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-nobody" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The reverse direction collides with the same row.
    let (status, _) = app.post("/api/v1/friends/requests", &bob, &json!({ "user_id": "u-alice" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_only_the_recipient_accepts_and_only_once() {
    let app = TestApp::new().await;
    let alice = app.auth_for("u-alice", "alice@example.com", "Alice");
    let bob = app.auth_for("u-bob", "bob@example.com", "Bob");
    let carol = app.auth_for("u-carol", "carol@example.com", "Carol");
    provision(&app, &alice).await;
    provision(&app, &bob).await;
    provision(&app, &carol).await;

    let (_, request) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    let friendship_id = request["id"].as_str().unwrap().to_string();
    let accept_uri = format!("/api/v1/friends/requests/{}/accept", friendship_id);

    let (status, _) = app.post(&accept_uri, &carol, &json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post(&accept_uri, &alice, &json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post(&accept_uri, &bob, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post(&accept_uri, &bob, &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_friend_collection_is_gated_on_acceptance() {
    let app = TestApp::new().await;
    let alice = app.auth_for("u-alice", "alice@example.com", "Alice");
    let bob = app.auth_for("u-bob", "bob@example.com", "Bob");
    let carol = app.auth_for("u-carol", "carol@example.com", "Carol");
    provision(&app, &alice).await;
    provision(&app, &bob).await;
    provision(&app, &carol).await;

    app.catalog.seed_collection("bob_bgg", vec![
        CollectionItem {
            game: catalog_game(13, "Catan", 3, 4, Some(7.1)),
            user_rating: Some(8.0),
            own: true,
            want_to_play: false,
            num_plays: 12,
        },
        CollectionItem {
            game: catalog_game(230802, "Azul", 2, 4, Some(7.8)),
            user_rating: None,
            own: true,
            want_to_play: true,
            num_plays: 2,
        },
    ]);
    let (status, _) = app.post("/api/v1/collection/sync", &bob, &json!({ "username": "bob_bgg" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, request) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    let friendship_id = request["id"].as_str().unwrap().to_string();
    let collection_uri = format!("/api/v1/friends/{}/collection", friendship_id);

    // Pending is not enough, and outsiders never see it.
    let (status, _) = app.get(&collection_uri, &alice).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&collection_uri, &carol).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.post(
        &format!("/api/v1/friends/requests/{}/accept", friendship_id), &bob, &json!({}),
    ).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&collection_uri, &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Bob");
    let games = body["games"].as_array().unwrap();
    assert_eq!(games.len(), 2);
    // Sorted by game name, each entry joined with the cached metadata.
    assert_eq!(games[0]["game"]["name"], "Azul");
    assert_eq!(games[1]["game"]["name"], "Catan");
    assert_eq!(games[1]["user_rating"], 8.0);

    // The friendship works both ways; alice has nothing imported.
    let (status, body) = app.get(&collection_uri, &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice");
    assert!(body["games"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_removing_a_friendship_revokes_it() {
    let app = TestApp::new().await;
    let alice = app.auth_for("u-alice", "alice@example.com", "Alice");
    let bob = app.auth_for("u-bob", "bob@example.com", "Bob");
    let carol = app.auth_for("u-carol", "carol@example.com", "Carol");
    provision(&app, &alice).await;
    provision(&app, &bob).await;
    provision(&app, &carol).await;

    // Declining: the recipient deletes the pending request.
    let (_, request) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    let friendship_id = request["id"].as_str().unwrap().to_string();

    let (status, _) = app.delete(&format!("/api/v1/friends/{}", friendship_id), &carol).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/v1/friends/{}", friendship_id), &bob).await;
    assert_eq!(status, StatusCode::OK);
    let (_, bobs) = app.get("/api/v1/friends", &bob).await;
    assert!(bobs["incoming"].as_array().unwrap().is_empty());

    // A declined request does not block asking again.
    let (status, request) = app.post("/api/v1/friends/requests", &alice, &json!({ "user_id": "u-bob" })).await;
    assert_eq!(status, StatusCode::OK);
    let friendship_id = request["id"].as_str().unwrap().to_string();
    app.post(&format!("/api/v1/friends/requests/{}/accept", friendship_id), &bob, &json!({})).await;

    // Unfriending: either party deletes the accepted row.
    let (status, _) = app.delete(&format!("/api/v1/friends/{}", friendship_id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    let (_, alices) = app.get("/api/v1/friends", &alice).await;
    assert!(alices["friends"].as_array().unwrap().is_empty());
    let (status, _) = app.get(&format!("/api/v1/friends/{}/collection", friendship_id), &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
