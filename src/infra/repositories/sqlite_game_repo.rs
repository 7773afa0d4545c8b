use crate::domain::models::game::{CollectionEntry, Game};
use crate::domain::ports::GameRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

pub struct SqliteGameRepo {
    pool: SqlitePool,
}

impl SqliteGameRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRepository for SqliteGameRepo {
    async fn upsert_games(&self, games: &[Game]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for game in games {
            sqlx::query(
                "INSERT INTO games (bgg_id, name, thumbnail, image, min_players, max_players, playing_time, bgg_rating, year_published, description, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT (bgg_id) DO UPDATE SET
                    name = excluded.name, thumbnail = excluded.thumbnail, image = excluded.image,
                    min_players = excluded.min_players, max_players = excluded.max_players,
                    playing_time = excluded.playing_time, bgg_rating = excluded.bgg_rating,
                    year_published = excluded.year_published, description = excluded.description,
                    updated_at = excluded.updated_at"
            )
                .bind(game.bgg_id).bind(&game.name).bind(&game.thumbnail).bind(&game.image)
                .bind(game.min_players).bind(game.max_players).bind(game.playing_time)
                .bind(game.bgg_rating).bind(game.year_published).bind(&game.description)
                .bind(game.updated_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Game>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM games WHERE bgg_id IN ({})", placeholders);
        let mut query = sqlx::query_as::<_, Game>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        query.fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn replace_collection(&self, user_id: &str, entries: &[CollectionEntry]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM game_collections WHERE user_id = ?")
            .bind(user_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        for entry in entries {
            sqlx::query(
                "INSERT INTO game_collections (id, user_id, game_id, user_rating, own, want_to_play, num_plays, last_synced)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
            )
                .bind(&entry.id).bind(&entry.user_id).bind(entry.game_id).bind(entry.user_rating)
                .bind(entry.own).bind(entry.want_to_play).bind(entry.num_plays).bind(entry.last_synced)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn collection_for_user(&self, user_id: &str) -> Result<Vec<CollectionEntry>, AppError> {
        sqlx::query_as::<_, CollectionEntry>(
            "SELECT * FROM game_collections WHERE user_id = ?"
        )
            .bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn attending_ratings(&self, event_id: &str) -> Result<Vec<(i64, f64)>, AppError> {
        let rows = sqlx::query(
            "SELECT gc.game_id, gc.user_rating FROM game_collections gc
             JOIN event_participants p ON p.user_id = gc.user_id
             WHERE p.event_id = ? AND p.status IN ('interested', 'confirmed')
               AND gc.user_rating IS NOT NULL"
        )
            .bind(event_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(rows.into_iter()
            .map(|row| (row.get::<i64, _>("game_id"), row.get::<f64, _>("user_rating")))
            .collect())
    }
}
