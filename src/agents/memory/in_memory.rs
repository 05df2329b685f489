//! In-memory conversation store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::ConversationStore;
use crate::agents::domain::ConversationSession;
use crate::agents::error::AgentResult;

type SessionCell = Arc<Mutex<ConversationSession>>;

/// In-memory conversation store, lost on restart
#[derive(Default)]
pub struct InMemoryStore {
    sessions: Arc<RwLock<HashMap<String, SessionCell>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    async fn cell(&self, session_id: &str) -> SessionCell {
        if let Some(cell) = self.sessions.read().await.get(session_id) {
            return cell.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, "Created session");
                Arc::new(Mutex::new(ConversationSession::new(session_id)))
            })
            .clone()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn checkout(&self, session_id: &str) -> AgentResult<OwnedMutexGuard<ConversationSession>> {
        let cell = self.cell(session_id).await;
        Ok(cell.lock_owned().await)
    }

    async fn load(&self, session_id: &str) -> AgentResult<Option<ConversationSession>> {
        let cell = self.sessions.read().await.get(session_id).cloned();
        match cell {
            Some(cell) => Ok(Some(cell.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &str) -> AgentResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn evict_idle(&self, max_idle: Duration) -> usize {
        let max_idle_ms = max_idle.as_millis() as u64;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        // Checked-out sessions hold an extra reference or the lock.
        sessions.retain(|_, cell| {
            if Arc::strong_count(cell) > 1 {
                return true;
            }
            match cell.try_lock() {
                Ok(session) => session.idle_millis() < max_idle_ms,
                Err(_) => true,
            }
        });

        before - sessions.len()
    }
}
