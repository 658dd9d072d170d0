//! In-memory session store for tests and one-shot runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SessionStore, StoredSession};
use crate::error::Result;

/// Session store that forgets everything when dropped.
#[derive(Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session, e.g. to simulate a returning user.
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.session.write().await.take();
        Ok(())
    }
}
