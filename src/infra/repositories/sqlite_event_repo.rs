use std::collections::HashMap;

use crate::domain::models::detail::{
    EventDetail, EventGameDetail, FinalGameDetail, ParticipantDetail, PublicUser,
};
use crate::domain::models::event::{Event, EventDate, EventFinalGame, EventGame, EventStatus};
use crate::domain::models::game::Game;
use crate::domain::models::participant::{DateVote, EventParticipant, GameVote};
use crate::domain::models::user::User;
use crate::domain::ports::EventRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_users(&self, ids: &[String]) -> Result<HashMap<String, User>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM profiles WHERE id IN ({})", placeholders);
        let mut query = sqlx::query_as::<_, User>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let users = query.fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }

    async fn load_games(&self, ids: &[i64]) -> Result<HashMap<i64, Game>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM games WHERE bgg_id IN ({})", placeholders);
        let mut query = sqlx::query_as::<_, Game>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let games = query.fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(games.into_iter().map(|g| (g.bgg_id, g)).collect())
    }
}

fn public_user(users: &HashMap<String, User>, id: &str) -> PublicUser {
    users.get(id).map(PublicUser::from).unwrap_or(PublicUser {
        id: id.to_string(),
        name: "Unknown".to_string(),
        avatar_url: None,
    })
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event, dates: &[EventDate], games: &[EventGame]) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let created = sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, organizer_id, title, description, location, response_deadline, status, final_date_id, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&event.id).bind(&event.organizer_id).bind(&event.title).bind(&event.description)
            .bind(&event.location).bind(event.response_deadline).bind(event.status)
            .bind(&event.final_date_id).bind(&event.notes).bind(event.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        for date in dates {
            sqlx::query("INSERT INTO event_dates (id, event_id, proposed_date, start_time, end_time) VALUES (?, ?, ?, ?, ?)")
                .bind(&date.id).bind(&date.event_id).bind(&date.proposed_date)
                .bind(&date.start_time).bind(&date.end_time)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        for game in games {
            sqlx::query("INSERT INTO event_games (id, event_id, game_id, proposed_by, owner_id, is_recommended) VALUES (?, ?, ?, ?, ?, ?)")
                .bind(&game.id).bind(&game.event_id).bind(game.game_id)
                .bind(&game.proposed_by).bind(&game.owner_id).bind(game.is_recommended)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_detail(&self, id: &str) -> Result<Option<EventDetail>, AppError> {
        let Some(event) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let dates = sqlx::query_as::<_, EventDate>(
            "SELECT * FROM event_dates WHERE event_id = ? ORDER BY proposed_date ASC, start_time ASC"
        ).bind(id).fetch_all(&self.pool).await.map_err(AppError::Database)?;

        let event_games = sqlx::query_as::<_, EventGame>(
            "SELECT * FROM event_games WHERE event_id = ?"
        ).bind(id).fetch_all(&self.pool).await.map_err(AppError::Database)?;

        let participants = sqlx::query_as::<_, EventParticipant>(
            "SELECT * FROM event_participants WHERE event_id = ? ORDER BY invited_at ASC"
        ).bind(id).fetch_all(&self.pool).await.map_err(AppError::Database)?;

        let date_votes = sqlx::query_as::<_, DateVote>(
            "SELECT dv.* FROM date_votes dv
             JOIN event_participants p ON p.id = dv.participant_id
             WHERE p.event_id = ?"
        ).bind(id).fetch_all(&self.pool).await.map_err(AppError::Database)?;

        let game_votes = sqlx::query_as::<_, GameVote>(
            "SELECT gv.* FROM game_votes gv
             JOIN event_participants p ON p.id = gv.participant_id
             WHERE p.event_id = ?"
        ).bind(id).fetch_all(&self.pool).await.map_err(AppError::Database)?;

        let final_games = sqlx::query_as::<_, EventFinalGame>(
            "SELECT * FROM event_final_games WHERE event_id = ?"
        ).bind(id).fetch_all(&self.pool).await.map_err(AppError::Database)?;

        let mut user_ids: Vec<String> = vec![event.organizer_id.clone()];
        user_ids.extend(participants.iter().map(|p| p.user_id.clone()));
        user_ids.extend(event_games.iter().map(|g| g.proposed_by.clone()));
        user_ids.extend(event_games.iter().filter_map(|g| g.owner_id.clone()));
        user_ids.extend(final_games.iter().map(|f| f.responsible_user_id.clone()));
        user_ids.sort();
        user_ids.dedup();
        let users = self.load_users(&user_ids).await?;

        let mut game_ids: Vec<i64> = event_games.iter().map(|g| g.game_id)
            .chain(final_games.iter().map(|f| f.game_id))
            .collect();
        game_ids.sort();
        game_ids.dedup();
        let games = self.load_games(&game_ids).await?;

        let game_details = event_games.into_iter().filter_map(|entry| {
            let game = games.get(&entry.game_id)?.clone();
            let proposed_by_name = public_user(&users, &entry.proposed_by).name;
            let owner_name = entry.owner_id.as_deref().map(|o| public_user(&users, o).name);
            Some(EventGameDetail { entry, game, proposed_by_name, owner_name })
        }).collect();

        let mut votes_by_participant: HashMap<String, (Vec<DateVote>, Vec<GameVote>)> = HashMap::new();
        for vote in date_votes {
            votes_by_participant.entry(vote.participant_id.clone()).or_default().0.push(vote);
        }
        for vote in game_votes {
            votes_by_participant.entry(vote.participant_id.clone()).or_default().1.push(vote);
        }

        let participant_details = participants.into_iter().map(|participant| {
            let user = public_user(&users, &participant.user_id);
            let (date_votes, game_votes) = votes_by_participant.remove(&participant.id).unwrap_or_default();
            ParticipantDetail { participant, user, date_votes, game_votes }
        }).collect();

        let final_game_details = final_games.into_iter().map(|entry| {
            let game_name = games.get(&entry.game_id).map(|g| g.name.clone()).unwrap_or_else(|| "Unknown".to_string());
            let responsible_name = public_user(&users, &entry.responsible_user_id).name;
            FinalGameDetail { entry, game_name, responsible_name }
        }).collect();

        let organizer = public_user(&users, &event.organizer_id);

        Ok(Some(EventDetail {
            event,
            organizer,
            dates,
            games: game_details,
            participants: participant_details,
            final_games: final_game_details,
        }))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT DISTINCT e.* FROM events e
             LEFT JOIN event_participants p ON p.event_id = e.id
             WHERE e.organizer_id = ? OR p.user_id = ?
             ORDER BY e.created_at DESC"
        )
            .bind(user_id).bind(user_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, id: &str, from: EventStatus, to: EventStatus) -> Result<(), AppError> {
        // A cancelled event has no final date; only confirmed and completed do.
        let sql = if to == EventStatus::Cancelled {
            "UPDATE events SET status = ?, final_date_id = NULL WHERE id = ? AND status = ?"
        } else {
            "UPDATE events SET status = ? WHERE id = ? AND status = ?"
        };
        let result = sqlx::query(sql)
            .bind(to).bind(id).bind(from)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!("Event is no longer {}", from.as_str())));
        }
        Ok(())
    }

    async fn confirm(&self, event_id: &str, final_date_id: &str, final_games: &[EventFinalGame]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE events SET status = 'confirmed', final_date_id = ? WHERE id = ? AND status = 'pending'"
        )
            .bind(final_date_id).bind(event_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Event is not awaiting confirmation".to_string()));
        }

        for game in final_games {
            sqlx::query("INSERT INTO event_final_games (id, event_id, game_id, responsible_user_id) VALUES (?, ?, ?, ?)")
                .bind(&game.id).bind(&game.event_id).bind(game.game_id).bind(&game.responsible_user_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        sqlx::query("UPDATE event_participants SET status = 'confirmed' WHERE event_id = ? AND status = 'interested'")
            .bind(event_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
