use gamenight_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::auth::Claims,
    domain::models::game::{CatalogGame, CollectionItem},
    domain::ports::{CatalogService, EmailService},
    domain::services::notifications::NotificationService,
    infra::repositories::{
        sqlite_event_repo::SqliteEventRepo,
        sqlite_friend_repo::SqliteFriendRepo,
        sqlite_game_repo::SqliteGameRepo,
        sqlite_participant_repo::SqliteParticipantRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use tera::Tera;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_CSRF: &str = "test-csrf-token";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every send and fails for addresses registered as broken.
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
    pub failing: Mutex<HashSet<String>>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self { sent: Mutex::new(Vec::new()), failing: Mutex::new(HashSet::new()) }
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        if self.failing.lock().unwrap().contains(recipient) {
            return Err(AppError::InternalWithMsg(format!("mock delivery failure for {}", recipient)));
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// In-memory catalog backed by whatever games and collections a test seeds.
pub struct MockCatalogService {
    pub games: Mutex<HashMap<i64, CatalogGame>>,
    pub collections: Mutex<HashMap<String, Vec<CollectionItem>>>,
}

impl MockCatalogService {
    pub fn new() -> Self {
        Self { games: Mutex::new(HashMap::new()), collections: Mutex::new(HashMap::new()) }
    }

    pub fn seed_game(&self, game: CatalogGame) {
        self.games.lock().unwrap().insert(game.bgg_id, game);
    }

    pub fn seed_collection(&self, username: &str, items: Vec<CollectionItem>) {
        self.collections.lock().unwrap().insert(username.to_string(), items);
    }
}

#[async_trait]
impl CatalogService for MockCatalogService {
    async fn search_games(&self, query: &str) -> Result<Vec<CatalogGame>, AppError> {
        let query = query.to_lowercase();
        Ok(self.games.lock().unwrap().values()
            .filter(|g| g.name.to_lowercase().contains(&query))
            .cloned()
            .collect())
    }

    async fn get_game_details(&self, ids: &[i64]) -> Result<Vec<CatalogGame>, AppError> {
        let games = self.games.lock().unwrap();
        Ok(ids.iter().filter_map(|id| games.get(id).cloned()).collect())
    }

    async fn get_user_collection(&self, username: &str) -> Result<Vec<CollectionItem>, AppError> {
        self.collections.lock().unwrap().get(username).cloned()
            .ok_or(AppError::NotFound("Catalog has no such resource".to_string()))
    }
}

pub fn catalog_game(bgg_id: i64, name: &str, min_players: i32, max_players: i32, rating: Option<f64>) -> CatalogGame {
    CatalogGame {
        bgg_id,
        name: name.to_string(),
        thumbnail: None,
        image: None,
        min_players,
        max_players,
        playing_time: 60,
        bgg_rating: rating,
        year_published: Some(2020),
        description: None,
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub email: Arc<MockEmailService>,
    pub catalog: Arc<MockCatalogService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut tera = Tera::default();
        tera.add_raw_template(
            "invitation.html",
            "<html>Invite to {{ event_title }} from {{ organizer_name }}: {{ invite_link | safe }}</html>",
        ).unwrap();
        tera.add_raw_template(
            "confirmation.html",
            "<html>Confirmed {{ event_title }} on {{ final_date }}</html>",
        ).unwrap();
        let templates = Arc::new(tera);

        let pub_key_pem = include_str!("keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            app_base_url: "http://localhost:3000".to_string(),
            catalog_api_url: "http://localhost".to_string(),
        };

        let email = Arc::new(MockEmailService::new());
        let catalog = Arc::new(MockCatalogService::new());
        let notifications = Arc::new(NotificationService::new(
            email.clone(),
            templates.clone(),
            config.app_base_url.clone(),
        ));

        let state = Arc::new(AppState {
            config: config.clone(),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            friend_repo: Arc::new(SqliteFriendRepo::new(pool.clone())),
            event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
            participant_repo: Arc::new(SqliteParticipantRepo::new(pool.clone())),
            game_repo: Arc::new(SqliteGameRepo::new(pool.clone())),
            catalog_service: catalog.clone(),
            email_service: email.clone(),
            notifications,
            templates,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            email,
            catalog,
        }
    }

    /// Mints an access token the way the external identity provider would.
    pub fn auth_for(&self, user_id: &str, email: &str, name: &str) -> AuthHeaders {
        let priv_key_pem = include_str!("keys/test_private.pem");
        let now = chrono::Utc::now().timestamp() as usize;

        let claims = Claims {
            iss: "test-issuer".to_string(),
            sub: user_id.to_string(),
            aud: "gamenight-app".to_string(),
            exp: now + 3600,
            iat: now,
            email: email.to_string(),
            name: name.to_string(),
            csrf_token: TEST_CSRF.to_string(),
        };

        let key = EncodingKey::from_ed_pem(priv_key_pem.as_bytes()).expect("invalid test key");
        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &key).expect("failed to sign test token");

        AuthHeaders { access_token, csrf_token: TEST_CSRF.to_string() }
    }

    pub async fn get(&self, uri: &str, auth: &AuthHeaders) -> (axum::http::StatusCode, Value) {
        let response = self.router.clone().oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .body(Body::empty())
                .unwrap(),
        ).await.unwrap();
        Self::split(response).await
    }

    pub async fn post(&self, uri: &str, auth: &AuthHeaders, payload: &Value) -> (axum::http::StatusCode, Value) {
        self.send_with_body("POST", uri, Some(auth), payload).await
    }

    pub async fn put(&self, uri: &str, auth: &AuthHeaders, payload: &Value) -> (axum::http::StatusCode, Value) {
        self.send_with_body("PUT", uri, Some(auth), payload).await
    }

    pub async fn delete(&self, uri: &str, auth: &AuthHeaders) -> (axum::http::StatusCode, Value) {
        self.send_with_body("DELETE", uri, Some(auth), &Value::Null).await
    }

    pub async fn get_anonymous(&self, uri: &str) -> (axum::http::StatusCode, Value) {
        let response = self.router.clone().oneshot(
            Request::builder().uri(uri).body(Body::empty()).unwrap(),
        ).await.unwrap();
        Self::split(response).await
    }

    pub async fn post_anonymous(&self, uri: &str, payload: &Value) -> (axum::http::StatusCode, Value) {
        self.send_with_body("POST", uri, None, payload).await
    }

    async fn send_with_body(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&AuthHeaders>,
        payload: &Value,
    ) -> (axum::http::StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let response = self.router.clone().oneshot(
            builder.body(Body::from(payload.to_string())).unwrap(),
        ).await.unwrap();
        Self::split(response).await
    }

    async fn split(response: axum::http::Response<Body>) -> (axum::http::StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.email.sent.lock().unwrap().clone()
    }

    pub fn break_address(&self, email: &str) {
        self.email.failing.lock().unwrap().insert(email.to_string());
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
