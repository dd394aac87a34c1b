//! # Storage Backends
//!
//! Implementations of the `Store` trait: a JSON file (default) and Redis
//! (behind the `redis` feature).

use crate::domain::traits::Store;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const JSON_STORE_FORMAT: u32 = 1;

/// Key-value pairs kept in a pretty-printed JSON object on disk.
pub struct JsonStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl JsonStore {
    /// Opens the store, starting empty if the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    async fn persist(&self, values: &HashMap<String, String>) -> Result<(), String> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(values).map_err(|e| e.to_string())?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn version(&self) -> Option<String> {
        Some(format!(
            "JSON store v{} ({})",
            JSON_STORE_FORMAT,
            self.path.display()
        ))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Option<&str>) -> Result<(), String> {
        let mut values = self.values.lock().await;
        match value {
            Some(value) => values.insert(key.to_string(), value.to_string()),
            None => values.remove(key),
        };
        self.persist(&values).await
    }
}

#[cfg(feature = "redis")]
pub use self::redis_store::RedisStore;

#[cfg(feature = "redis")]
mod redis_store {
    use super::*;
    use redis::AsyncCommands;
    use redis::aio::ConnectionManager;

    const KEY_PREFIX: &str = "maiden:";

    pub struct RedisStore {
        conn: ConnectionManager,
    }

    impl RedisStore {
        pub async fn connect(url: &str) -> Result<Self> {
            let client = redis::Client::open(url).context("Invalid redis url")?;
            let conn = ConnectionManager::new(client)
                .await
                .context("Failed to connect to redis")?;
            Ok(Self { conn })
        }
    }

    #[async_trait]
    impl Store for RedisStore {
        async fn version(&self) -> Option<String> {
            let mut conn = self.conn.clone();
            let info: String = redis::cmd("INFO")
                .arg("server")
                .query_async(&mut conn)
                .await
                .ok()?;
            info.lines()
                .find_map(|line| line.strip_prefix("redis_version:"))
                .map(|version| format!("Redis {}", version.trim()))
        }

        async fn get(&self, key: &str) -> Result<Option<String>, String> {
            let mut conn = self.conn.clone();
            conn.get(format!("{KEY_PREFIX}{key}"))
                .await
                .map_err(|e| e.to_string())
        }

        async fn put(&self, key: &str, value: Option<&str>) -> Result<(), String> {
            let mut conn = self.conn.clone();
            let key = format!("{KEY_PREFIX}{key}");
            let result: redis::RedisResult<()> = match value {
                Some(value) => conn.set(key, value).await,
                None => conn.del(key).await,
            };
            result.map_err(|e| e.to_string())
        }
    }
}
