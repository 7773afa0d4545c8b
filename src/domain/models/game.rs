use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Locally cached catalog metadata for one board game, keyed by the external
/// catalog id. Refreshed whenever catalog data passes through (event creation,
/// collection sync).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Game {
    pub bgg_id: i64,
    pub name: String,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub min_players: i32,
    pub max_players: i32,
    pub playing_time: i32,
    pub bgg_rating: Option<f64>,
    pub year_published: Option<i32>,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<CatalogGame> for Game {
    fn from(g: CatalogGame) -> Self {
        Self {
            bgg_id: g.bgg_id,
            name: g.name,
            thumbnail: g.thumbnail,
            image: g.image,
            min_players: g.min_players,
            max_players: g.max_players,
            playing_time: g.playing_time,
            bgg_rating: g.bgg_rating,
            year_published: g.year_published,
            description: g.description,
            updated_at: Utc::now(),
        }
    }
}

/// One row of a user's imported catalog collection.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct CollectionEntry {
    pub id: String,
    pub user_id: String,
    pub game_id: i64,
    pub user_rating: Option<f64>,
    pub own: bool,
    pub want_to_play: bool,
    pub num_plays: i32,
    pub last_synced: DateTime<Utc>,
}

impl CollectionEntry {
    pub fn from_item(user_id: String, item: &CollectionItem) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            game_id: item.game.bgg_id,
            user_rating: item.user_rating,
            own: item.own,
            want_to_play: item.want_to_play,
            num_plays: item.num_plays,
            last_synced: Utc::now(),
        }
    }
}

/// Game metadata as returned by the external catalog collaborator.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGame {
    pub bgg_id: i64,
    pub name: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_min_players")]
    pub min_players: i32,
    #[serde(default = "default_max_players")]
    pub max_players: i32,
    #[serde(default)]
    pub playing_time: i32,
    #[serde(default)]
    pub bgg_rating: Option<f64>,
    #[serde(default)]
    pub year_published: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_min_players() -> i32 { 1 }
fn default_max_players() -> i32 { 99 }

/// One item of a user's collection as returned by the catalog collaborator.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    #[serde(flatten)]
    pub game: CatalogGame,
    #[serde(default)]
    pub user_rating: Option<f64>,
    #[serde(default)]
    pub own: bool,
    #[serde(default)]
    pub want_to_play: bool,
    #[serde(default)]
    pub num_plays: i32,
}
