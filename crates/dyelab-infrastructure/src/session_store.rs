//! In-memory session store with idle expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dyelab_core::config::DEFAULT_SESSION_TTL_SECS;
use dyelab_core::error::Result;
use dyelab_core::session::{ConversationSession, SessionStore, SharedSession};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

struct StoreEntry {
    session: SharedSession,
    last_active: DateTime<Utc>,
}

/// Keeps sessions in a map keyed by session id.
///
/// Each session sits behind its own mutex, so turns on different keys never
/// wait for each other. The map lock is only held for lookups and inserts.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, StoreEntry>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_expired(&self, entry: &StoreEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.last_active)
            .to_std()
            .is_ok_and(|idle| idle > self.ttl)
    }

    /// Spawns a task purging expired sessions every `interval`.
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.purge_expired(Utc::now()).await {
                    tracing::warn!("[SessionStore] Purge failed: {}", e);
                }
            }
        })
    }
}

fn new_entry(key: &str) -> (SharedSession, StoreEntry) {
    let session = Arc::new(Mutex::new(ConversationSession::new(key)));
    let entry = StoreEntry {
        session: session.clone(),
        last_active: Utc::now(),
    };
    (session, entry)
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<SharedSession>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(key) {
            None => Ok(None),
            Some(entry) if self.is_expired(entry, now) => {
                sessions.remove(key);
                tracing::info!("[SessionStore] Session {} expired", key);
                Ok(None)
            }
            Some(entry) => {
                entry.last_active = now;
                Ok(Some(entry.session.clone()))
            }
        }
    }

    async fn create(&self, key: &str) -> Result<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let (session, entry) = new_entry(key);
        if sessions.insert(key.to_string(), entry).is_some() {
            tracing::debug!("[SessionStore] Replaced session {}", key);
        }
        tracing::info!("[SessionStore] Created session {}", key);
        Ok(session)
    }

    async fn get_or_create(&self, key: &str) -> Result<(SharedSession, bool)> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(key) {
            if !self.is_expired(entry, now) {
                entry.last_active = now;
                return Ok((entry.session.clone(), false));
            }
            tracing::info!("[SessionStore] Session {} expired", key);
        }

        let (session, entry) = new_entry(key);
        sessions.insert(key.to_string(), entry);
        tracing::info!("[SessionStore] Created session {}", key);
        Ok((session, true))
    }

    async fn remove(&self, key: &str) -> Result<Option<SharedSession>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(key).map(|entry| entry.session))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::info!("[SessionStore] Purged {} idle session(s)", purged);
        }
        Ok(purged)
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
