use crate::domain::models::friendship::Friendship;
use crate::domain::ports::FriendRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresFriendRepo {
    pool: PgPool,
}

impl PostgresFriendRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRepository for PostgresFriendRepo {
    async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError> {
        sqlx::query_as::<_, Friendship>(
            "INSERT INTO friendships (id, requester_id, addressee_id, status, requested_at, responded_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
            .bind(&friendship.id).bind(&friendship.requester_id).bind(&friendship.addressee_id)
            .bind(friendship.status).bind(friendship.requested_at).bind(friendship.responded_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>("SELECT * FROM friendships WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships
             WHERE (requester_id = $1 AND addressee_id = $2) OR (requester_id = $2 AND addressee_id = $1)"
        )
            .bind(a).bind(b)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships WHERE requester_id = $1 OR addressee_id = $1 ORDER BY requested_at ASC"
        )
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn accept(&self, id: &str, responded_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE friendships SET status = 'accepted', responded_at = $1 WHERE id = $2 AND status = 'pending'"
        )
            .bind(responded_at).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Friend request is no longer pending".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Friendship not found".to_string()));
        }
        Ok(())
    }
}
