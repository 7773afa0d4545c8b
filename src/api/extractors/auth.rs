use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::User;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::Span;

/// The verified caller. Decodes the externally issued access token, enforces
/// the CSRF double-submit check on mutating methods, and lazily provisions a
/// local profile row the first time a user shows up.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        let access_token = cookies.get("access_token")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&["gamenight-app"]);
        validation.set_issuer(&[&app_state.config.auth_issuer]);

        let token_data = decode::<Claims>(&access_token, &decoding_key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        let method = parts.method.clone();
        if method != "GET" && method != "HEAD" && method != "OPTIONS" {
            let csrf_header_val = parts.headers.get("X-CSRF-Token")
                .ok_or(StatusCode::FORBIDDEN)?
                .to_str()
                .map_err(|_| StatusCode::FORBIDDEN)?;

            if csrf_header_val != token_data.claims.csrf_token {
                return Err(StatusCode::FORBIDDEN);
            }
        }

        // Resolution order matters: an invitation may have left a stub profile
        // keyed by this email before the user ever logged in. That stub stays
        // the canonical row, found via the verified email claim.
        let claims = token_data.claims;
        let user = match app_state.user_repo.find_by_id(&claims.sub).await {
            Ok(Some(user)) => user,
            Ok(None) => match app_state.user_repo.find_by_email(&claims.email).await {
                Ok(Some(stub)) => stub,
                Ok(None) => {
                    let fresh = User::new(claims.sub.clone(), claims.email.clone(), claims.name.clone());
                    app_state.user_repo.upsert(&fresh).await
                        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
                }
                Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
            },
            Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
        };

        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}
