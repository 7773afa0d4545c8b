use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub bgg_username: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, email: String, name: String) -> Self {
        Self {
            id,
            email,
            name,
            bgg_username: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }
}
