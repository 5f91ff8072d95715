//! GitHub context cache: a thin key-value wrapper over Redis.
//!
//! Upstream fetchers store one `GitHubContextBundle` per profile or per
//! (repository, user) pair; generation reads it back when the request does
//! not carry the data inline.
//!
//! `AppState` holds an `Arc<dyn ContextCache>`.

use async_trait::async_trait;
use redis::Client as RedisClient;
use tracing::debug;

use crate::errors::AppError;
use crate::models::github::GitHubContextBundle;

#[async_trait]
pub trait ContextCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<GitHubContextBundle>, AppError>;

    async fn put(&self, key: &str, bundle: &GitHubContextBundle) -> Result<(), AppError>;
}

/// Cache key for a profile-wide bundle.
pub fn profile_key(username: &str) -> String {
    format!("github:profile:{}", username.trim().to_lowercase())
}

/// Cache key for a repository-scoped bundle. Accepts `owner/name` or a URL.
pub fn repository_key(repository_ref: &str, username: &str) -> String {
    format!(
        "github:repo:{}:{}",
        normalize_repository_ref(repository_ref),
        username.trim().to_lowercase()
    )
}

/// Reduces `https://github.com/Owner/Name(.git)` or `Owner/Name` to `owner/name`.
pub fn normalize_repository_ref(repository_ref: &str) -> String {
    let trimmed = repository_ref.trim().trim_end_matches('/');
    let without_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let without_host = without_host
        .strip_prefix("www.github.com/")
        .or_else(|| without_host.strip_prefix("github.com/"))
        .unwrap_or(without_host);
    without_host
        .trim_end_matches(".git")
        .to_lowercase()
}

pub struct RedisContextCache {
    client: RedisClient,
    ttl_secs: u64,
}

impl RedisContextCache {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

#[async_trait]
impl ContextCache for RedisContextCache {
    async fn get(&self, key: &str) -> Result<Option<GitHubContextBundle>, AppError> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET").arg(key).query_async(&mut con).await?;

        match raw {
            Some(json) => {
                debug!("Cache hit: {key}");
                let bundle = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Corrupt cache entry {key}: {e}"))
                })?;
                Ok(Some(bundle))
            }
            None => {
                debug!("Cache miss: {key}");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, bundle: &GitHubContextBundle) -> Result<(), AppError> {
        let json = serde_json::to_string(bundle).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to serialize bundle: {e}"))
        })?;
        let mut con = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(key)
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut con)
            .await?;
        debug!("Cached {key} for {}s", self.ttl_secs);
        Ok(())
    }
}

/// In-process cache used by handler and pipeline tests.
#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::ContextCache;
    use crate::errors::AppError;
    use crate::models::github::GitHubContextBundle;

    #[derive(Default)]
    pub struct MemoryCache {
        entries: Mutex<HashMap<String, GitHubContextBundle>>,
    }

    impl MemoryCache {
        pub fn contains(&self, key: &str) -> bool {
            self.entries.lock().contains_key(key)
        }
    }

    #[async_trait]
    impl ContextCache for MemoryCache {
        async fn get(&self, key: &str) -> Result<Option<GitHubContextBundle>, AppError> {
            Ok(self.entries.lock().get(key).cloned())
        }

        async fn put(&self, key: &str, bundle: &GitHubContextBundle) -> Result<(), AppError> {
            self.entries.lock().insert(key.to_string(), bundle.clone());
            Ok(())
        }
    }
}
