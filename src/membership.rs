use std::collections::HashSet;
use std::sync::Arc;

use simple_log::warn;
use tokio::sync::RwLock;

use crate::api::{ApiResult, ContestApi};
use crate::store::{keys, KvStore};
use crate::types::{JoinRequest, JoinResponse};

/// Set of contests the current user has joined. Membership only ever grows;
/// there is no leave operation. The set is persisted as a JSON array of
/// contest ids and reloaded at startup.
pub struct ContestMembershipCache {
    api: Arc<dyn ContestApi>,
    store: Arc<dyn KvStore>,
    joined: RwLock<HashSet<i64>>,
}

impl ContestMembershipCache {
    pub fn new(api: Arc<dyn ContestApi>, store: Arc<dyn KvStore>) -> Self {
        Self {
            api,
            store,
            joined: RwLock::new(HashSet::new()),
        }
    }

    /// Loads the persisted set. A missing or corrupt value leaves the set
    /// empty; membership can be re-established through the backend.
    pub async fn load(&self) {
        let ids = match self.store.get(keys::JOINED_CONTESTS).await {
            Some(raw) => match serde_json::from_str::<Vec<i64>>(&raw) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("persisted joined-contests value is corrupt, ignoring: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        *self.joined.write().await = ids.into_iter().collect();
    }

    /// Joins a contest through the backend. The local and persisted sets are
    /// updated only after the backend confirms; on failure both are left
    /// untouched and the error goes back to the caller, no retry.
    pub async fn join(&self, username: &str, contest_id: i64) -> ApiResult<JoinResponse> {
        let request = JoinRequest {
            username: username.to_string(),
            contest_id,
        };
        let response = self.api.join_contest(&request).await?;
        self.remember(contest_id).await;
        Ok(response)
    }

    /// Membership check against the in-memory set only; no network call.
    pub async fn is_joined(&self, contest_id: i64) -> bool {
        self.joined.read().await.contains(&contest_id)
    }

    /// Asks the backend whether the user is already a participant (e.g. from
    /// another device) and folds a positive answer into the set.
    pub async fn sync_remote(&self, contest_id: i64, user_id: i64) -> ApiResult<bool> {
        let joined = self.api.is_participant(contest_id, user_id).await?;
        if joined {
            self.remember(contest_id).await;
        }
        Ok(joined)
    }

    async fn remember(&self, contest_id: i64) {
        let mut joined = self.joined.write().await;
        if !joined.insert(contest_id) {
            return; // already known, nothing to persist
        }
        let mut ids: Vec<i64> = joined.iter().copied().collect();
        ids.sort_unstable();
        // the lock stays held across the write: overlapping joins must not
        // commit their snapshots to the store out of order
        if let Ok(raw) = serde_json::to_string(&ids) {
            self.store.set(keys::JOINED_CONTESTS, &raw).await;
        }
    }
}
