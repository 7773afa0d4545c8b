use crate::domain::models::game::{CatalogGame, CollectionItem};
use crate::domain::ports::CatalogService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{error, info, warn};

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 500;
const COLLECTION_CACHE_TTL: Duration = Duration::from_secs(300);

/// Client for the external game catalog. Collection exports are queued
/// server-side, so the fetch loop treats 202 as "not ready yet" and polls
/// again with backoff. Fetched collections are cached per username for a
/// short window since imports tend to be retried by impatient users.
pub struct BggCatalogService {
    client: Client,
    base_url: String,
    collection_cache: Mutex<HashMap<String, (Instant, Vec<CollectionItem>)>>,
}

#[derive(Deserialize)]
struct ItemsEnvelope<T> {
    items: Vec<T>,
}

impl BggCatalogService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            collection_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn fetch_with_retry<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, AppError> {
        let mut retries = 0;
        let mut backoff = INITIAL_BACKOFF_MS;

        loop {
            let res = self.client.get(url).send().await;

            match res {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() && status != StatusCode::ACCEPTED {
                        let body: ItemsEnvelope<T> = response.json().await.map_err(|e| {
                            error!("Failed to parse catalog response JSON: {:?}", e);
                            AppError::Upstream("Catalog returned malformed data".to_string())
                        })?;
                        return Ok(body.items);
                    } else if status == StatusCode::ACCEPTED {
                        if retries >= MAX_RETRIES {
                            warn!("Catalog request still queued after {} polls: {}", retries, url);
                            return Err(AppError::Upstream("Catalog export still processing, try again later".to_string()));
                        }
                        info!("Catalog request queued, polling again in {}ms...", backoff);
                    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if retries >= MAX_RETRIES {
                            error!("Catalog request failed after {} retries. Status: {}", retries, status);
                            return Err(AppError::Upstream(format!("Catalog error: {}", status)));
                        }
                        warn!("Catalog transient error {}. Retrying in {}ms...", status, backoff);
                    } else if status == StatusCode::NOT_FOUND {
                        return Err(AppError::NotFound("Catalog has no such resource".to_string()));
                    } else {
                        let text = response.text().await.unwrap_or_default();
                        error!("Catalog terminal error {}: {}", status, text);
                        return Err(AppError::Upstream(format!("Catalog rejected request: {}", status)));
                    }
                }
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        error!("Catalog network error after {} retries: {:?}", retries, e);
                        return Err(AppError::Upstream(format!("Catalog unreachable: {}", e)));
                    }
                    warn!("Catalog network error. Retrying in {}ms... {:?}", backoff, e);
                }
            }

            sleep(Duration::from_millis(backoff)).await;
            retries += 1;
            backoff *= 2;
        }
    }
}

#[async_trait]
impl CatalogService for BggCatalogService {
    async fn search_games(&self, query: &str) -> Result<Vec<CatalogGame>, AppError> {
        let url = format!("{}/search?query={}", self.base_url, urlencoding::encode(query));
        self.fetch_with_retry(&url).await
    }

    async fn get_game_details(&self, ids: &[i64]) -> Result<Vec<CatalogGame>, AppError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let id_list = ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        let url = format!("{}/things?ids={}", self.base_url, id_list);
        self.fetch_with_retry(&url).await
    }

    async fn get_user_collection(&self, username: &str) -> Result<Vec<CollectionItem>, AppError> {
        {
            let cache = self.collection_cache.lock().await;
            if let Some((fetched_at, items)) = cache.get(username)
                && fetched_at.elapsed() < COLLECTION_CACHE_TTL {
                return Ok(items.clone());
            }
        }

        let url = format!("{}/collection/{}", self.base_url, urlencoding::encode(username));
        let items: Vec<CollectionItem> = self.fetch_with_retry(&url).await?;

        let mut cache = self.collection_cache.lock().await;
        cache.insert(username.to_string(), (Instant::now(), items.clone()));
        Ok(items)
    }
}
