use serde::{Deserialize, Serialize};

/// Access-token claims issued by the external identity provider. This service
/// only verifies them; it never mints tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,

    #[serde(rename = "https://gamenight.app/claims/email")]
    pub email: String,

    #[serde(rename = "https://gamenight.app/claims/name")]
    pub name: String,

    #[serde(rename = "https://gamenight.app/claims/csrf")]
    pub csrf_token: String,
}
