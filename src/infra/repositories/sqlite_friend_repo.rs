use crate::domain::models::friendship::Friendship;
use crate::domain::ports::FriendRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteFriendRepo {
    pool: SqlitePool,
}

impl SqliteFriendRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRepository for SqliteFriendRepo {
    async fn create(&self, friendship: &Friendship) -> Result<Friendship, AppError> {
        sqlx::query_as::<_, Friendship>(
            "INSERT INTO friendships (id, requester_id, addressee_id, status, requested_at, responded_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&friendship.id).bind(&friendship.requester_id).bind(&friendship.addressee_id)
            .bind(friendship.status).bind(friendship.requested_at).bind(friendship.responded_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>("SELECT * FROM friendships WHERE id = ?")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_between(&self, a: &str, b: &str) -> Result<Option<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships
             WHERE (requester_id = ? AND addressee_id = ?) OR (requester_id = ? AND addressee_id = ?)"
        )
            .bind(a).bind(b).bind(b).bind(a)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Friendship>, AppError> {
        sqlx::query_as::<_, Friendship>(
            "SELECT * FROM friendships WHERE requester_id = ? OR addressee_id = ? ORDER BY requested_at ASC"
        )
            .bind(user_id).bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn accept(&self, id: &str, responded_at: DateTime<Utc>) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE friendships SET status = 'accepted', responded_at = ? WHERE id = ? AND status = 'pending'"
        )
            .bind(responded_at).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Friend request is no longer pending".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = ?")
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Friendship not found".to_string()));
        }
        Ok(())
    }
}
