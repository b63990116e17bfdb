//! Session store trait.
//!
//! Defines the interface for keyed ownership of live conversation sessions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::model::ConversationSession;
use crate::error::Result;

/// A session behind its own async mutex, serialising turns on one key.
pub type SharedSession = Arc<Mutex<ConversationSession>>;

/// An abstract store owning live sessions by key.
///
/// Sessions under different keys are independent. Implementations decide how
/// idle sessions expire; the conversation state machine itself never times
/// out.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Looks up a session and marks it as active.
    ///
    /// Returns `Ok(None)` when no live session is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<SharedSession>>;

    /// Creates a fresh session under `key`, replacing any existing entry.
    async fn create(&self, key: &str) -> Result<SharedSession>;

    /// Returns the live session under `key`, creating it if needed.
    ///
    /// The boolean is true when a new session was created. Lookup and
    /// creation happen atomically, so two first messages racing on one key
    /// end up in the same session.
    async fn get_or_create(&self, key: &str) -> Result<(SharedSession, bool)>;

    /// Removes a session. Removing an unknown key is not an error.
    async fn remove(&self, key: &str) -> Result<Option<SharedSession>>;

    /// Drops every session idle longer than the store's TTL as of `now`.
    ///
    /// Returns the number of sessions removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Number of live sessions.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
