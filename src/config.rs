use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Client configuration, read from a JSON file next to the binary.
/// Every field has a default so a partial file is fine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Submission status poll cadence.
    pub poll_interval_ms: u64,
    /// Leaderboard refresh cadence, shared by every leaderboard view.
    pub leaderboard_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".into(),
            request_timeout_secs: 10,
            poll_interval_ms: 2000,
            leaderboard_interval_ms: 15000,
        }
    }
}

impl ClientConfig {
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("cannot parse config file {}", path.display()))
    }

    /// Like [`load`](Self::load) but a missing file falls back to defaults.
    pub async fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }
}
