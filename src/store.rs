use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use simple_log::warn;
use tokio::sync::Mutex;

/// Well-known store keys. Values must round-trip byte-exactly across restarts.
pub mod keys {
    /// JSON array of joined contest ids, e.g. `[3,5]`.
    pub const JOINED_CONTESTS: &str = "joinedContests";
    /// JSON object with the logged-in user record.
    pub const USER: &str = "user";
    /// `"true"` / `"false"` display preference.
    pub const DARK_MODE: &str = "darkMode";
}

/// Durable string key-value store, the client-side stand-in for browser
/// local storage. Writes must be visible to later `get` calls in the same
/// process and survive a restart.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str);
}

/// Store backed by a single JSON object file; the whole file is rewritten on
/// every `set`. Acceptable because the persisted values are tiny and writes
/// are rare (join, login, preference toggle).
pub struct FileStore {
    path: PathBuf,
    cache: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("store file {} is corrupt, starting empty: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self {
            path,
            cache: Mutex::new(cache),
        }
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.cache.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        let mut cache = self.cache.lock().await;
        cache.insert(key.to_string(), value.to_string());
        let body = serde_json::to_vec(&*cache).unwrap_or_default();
        if let Err(e) = tokio::fs::write(&self.path, body).await {
            warn!("cannot persist store file {}: {}", self.path.display(), e);
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemStore {
    map: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KvStore for MemStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.map.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.map.lock().await.insert(key.to_string(), value.to_string());
    }
}
