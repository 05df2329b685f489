//! Session storage for agent conversations
//!
//! Sessions are created lazily on first use and checked out under a
//! per-session lock for the whole exchange, so turns for one session never
//! interleave while different sessions proceed in parallel. An optional
//! sweeper evicts sessions idle past a TTL.

mod in_memory;

pub use in_memory::InMemoryStore;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;

use crate::agents::domain::ConversationSession;
use crate::agents::error::AgentResult;

/// Trait for conversation storage backends
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Lock a session for an exchange, creating it if absent
    async fn checkout(&self, session_id: &str) -> AgentResult<OwnedMutexGuard<ConversationSession>>;

    /// Snapshot of a session, waiting for any exchange in flight
    async fn load(&self, session_id: &str) -> AgentResult<Option<ConversationSession>>;

    /// Delete a conversation session
    async fn delete(&self, session_id: &str) -> AgentResult<()>;

    /// Number of live sessions
    async fn len(&self) -> usize;

    /// Remove sessions idle for at least `max_idle`; busy sessions are kept.
    /// Returns how many were removed.
    async fn evict_idle(&self, max_idle: Duration) -> usize;
}

/// Periodically evict idle sessions until the task is aborted
pub fn spawn_sweeper(
    store: Arc<dyn ConversationStore>,
    ttl: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = store.evict_idle(ttl).await;
            if evicted > 0 {
                tracing::info!(evicted, "Evicted idle sessions");
            }
        }
    })
}
