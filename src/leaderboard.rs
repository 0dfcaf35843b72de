use std::sync::Arc;
use std::time::Duration;

use simple_log::warn;
use tokio::sync::RwLock;

use crate::api::ContestApi;
use crate::schedule::{self, TaskHandle};
use crate::types::LeaderboardEntry;

/// Keeps a contest leaderboard fresh while a view shows it. Each refresh
/// replaces the whole list; ranking order is whatever the server sent, the
/// client never re-sorts.
pub struct LeaderboardSynchronizer {
    api: Arc<dyn ContestApi>,
    refresh_interval: Duration,
    entries: Arc<RwLock<Vec<LeaderboardEntry>>>,
}

impl LeaderboardSynchronizer {
    pub fn new(api: Arc<dyn ContestApi>, refresh_interval: Duration) -> Self {
        Self {
            api,
            refresh_interval,
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fetches immediately, then refreshes on the configured interval until
    /// the returned handle is cancelled. The owning view must call
    /// [`deactivate`](Self::deactivate) when it stops being visible.
    pub fn activate(&self, contest_id: i64) -> TaskHandle {
        let api = self.api.clone();
        let entries = self.entries.clone();
        schedule::repeat(self.refresh_interval, move || {
            let api = api.clone();
            let entries = entries.clone();
            async move {
                match api.leaderboard(contest_id).await {
                    Ok(list) => *entries.write().await = list,
                    Err(e) => warn!("leaderboard refresh failed for contest {}: {}", contest_id, e),
                }
                true
            }
        })
    }

    pub fn deactivate(&self, handle: TaskHandle) {
        handle.cancel();
    }

    /// Snapshot of the latest fetched leaderboard, in server order.
    pub async fn entries(&self) -> Vec<LeaderboardEntry> {
        self.entries.read().await.clone()
    }
}
