use crate::domain::models::participant::{DateVote, EventParticipant, GameVote, ParticipantStatus};
use crate::domain::ports::ParticipantRepository;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresParticipantRepo {
    pool: PgPool,
}

impl PostgresParticipantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PostgresParticipantRepo {
    async fn create(&self, participant: &EventParticipant) -> Result<EventParticipant, AppError> {
        sqlx::query_as::<_, EventParticipant>(
            "INSERT INTO event_participants (id, event_id, user_id, status, invitation_token, invited_at, responded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&participant.id).bind(&participant.event_id).bind(&participant.user_id)
            .bind(participant.status).bind(&participant.invitation_token)
            .bind(participant.invited_at).bind(participant.responded_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<EventParticipant>, AppError> {
        sqlx::query_as::<_, EventParticipant>("SELECT * FROM event_participants WHERE invitation_token = $1")
            .bind(token).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_event_and_user(&self, event_id: &str, user_id: &str) -> Result<Option<EventParticipant>, AppError> {
        sqlx::query_as::<_, EventParticipant>("SELECT * FROM event_participants WHERE event_id = $1 AND user_id = $2")
            .bind(event_id).bind(user_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<EventParticipant>, AppError> {
        sqlx::query_as::<_, EventParticipant>("SELECT * FROM event_participants WHERE event_id = $1 ORDER BY invited_at ASC")
            .bind(event_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, id: &str, status: ParticipantStatus, responded_at: Option<DateTime<Utc>>) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE event_participants SET status = $1, responded_at = $2 WHERE id = $3")
            .bind(status).bind(responded_at).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Participant not found".to_string()));
        }
        Ok(())
    }

    async fn submit_response(
        &self,
        participant_id: &str,
        status: ParticipantStatus,
        responded_at: DateTime<Utc>,
        date_votes: &[DateVote],
        game_votes: &[GameVote],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query("UPDATE event_participants SET status = $1, responded_at = $2 WHERE id = $3")
            .bind(status).bind(responded_at).bind(participant_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Participant not found".to_string()));
        }

        // Replace-all semantics: a new response supersedes every previous vote.
        sqlx::query("DELETE FROM date_votes WHERE participant_id = $1")
            .bind(participant_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM game_votes WHERE participant_id = $1")
            .bind(participant_id).execute(&mut *tx).await.map_err(AppError::Database)?;

        for vote in date_votes {
            sqlx::query("INSERT INTO date_votes (id, participant_id, date_id, available) VALUES ($1, $2, $3, $4)")
                .bind(&vote.id).bind(&vote.participant_id).bind(&vote.date_id).bind(vote.available)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        for vote in game_votes {
            sqlx::query("INSERT INTO game_votes (id, participant_id, event_game_id, vote) VALUES ($1, $2, $3, $4)")
                .bind(&vote.id).bind(&vote.participant_id).bind(&vote.event_game_id).bind(vote.vote)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
