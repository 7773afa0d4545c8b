use crate::domain::{models::user::User, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn upsert(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO profiles (id, email, name, bgg_username, avatar_url, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
                email = excluded.email, name = excluded.name,
                bgg_username = excluded.bgg_username, avatar_url = excluded.avatar_url
             RETURNING *"
        )
            .bind(&user.id).bind(&user.email).bind(&user.name)
            .bind(&user.bgg_username).bind(&user.avatar_url).bind(user.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE email = $1").bind(email).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, AppError> {
        let pattern = format!("%{}%", query);
        sqlx::query_as::<_, User>(
            "SELECT * FROM profiles WHERE name ILIKE $1 OR email ILIKE $1 ORDER BY name ASC LIMIT $2"
        )
            .bind(&pattern).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
