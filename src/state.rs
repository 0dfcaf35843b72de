use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use simple_log::warn;
use tokio::sync::RwLock;

use crate::store::{keys, KvStore};
use crate::types::{Language, User};

/// Process-wide client session state. One instance is built at startup and
/// handed by `Arc` to whoever needs it; each piece is mutated only through
/// the narrow accessors here.
pub struct ClientState {
    store: Arc<dyn KvStore>,
    user: RwLock<Option<User>>,
    selected_language: RwLock<Language>,
    dark_mode: AtomicBool,
}

impl ClientState {
    /// Rebuilds session state from the durable store. A corrupt user record
    /// yields a logged-out state instead of an error.
    pub async fn load(store: Arc<dyn KvStore>) -> Self {
        let user = match store.get(keys::USER).await {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("persisted user record is corrupt, ignoring: {}", e);
                    None
                }
            },
            None => None,
        };
        let dark_mode = store.get(keys::DARK_MODE).await.as_deref() == Some("true");
        Self {
            store,
            user: RwLock::new(user),
            selected_language: RwLock::new(Language::default()),
            dark_mode: AtomicBool::new(dark_mode),
        }
    }

    pub async fn user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn set_user(&self, user: User) {
        if let Ok(raw) = serde_json::to_string(&user) {
            self.store.set(keys::USER, &raw).await;
        }
        *self.user.write().await = Some(user);
    }

    pub async fn selected_language(&self) -> Language {
        *self.selected_language.read().await
    }

    pub async fn set_selected_language(&self, language: Language) {
        *self.selected_language.write().await = language;
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode.load(Ordering::Relaxed)
    }

    pub async fn set_dark_mode(&self, on: bool) {
        self.dark_mode.store(on, Ordering::Relaxed);
        self.store
            .set(keys::DARK_MODE, if on { "true" } else { "false" })
            .await;
    }
}
