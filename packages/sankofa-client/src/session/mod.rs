//! Persisted session storage
//!
//! Holds the token pair and the last-known user between runs. The store is
//! opaque to the rest of the client: it only needs load/save/clear.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AuthTokens, User};

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub tokens: Option<AuthTokens>,
    #[serde(default)]
    pub user: Option<User>,
}

impl StoredSession {
    pub fn new(tokens: AuthTokens, user: User) -> Self {
        Self {
            tokens: Some(tokens),
            user: Some(user),
        }
    }

    /// A session is active once a token pair has been issued.
    pub fn is_active(&self) -> bool {
        self.tokens
            .as_ref()
            .is_some_and(|tokens| !tokens.access.is_empty())
    }
}

/// Key-value persistence for the session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session, if any.
    async fn load(&self) -> Result<Option<StoredSession>>;

    /// Replace the stored session.
    async fn save(&self, session: &StoredSession) -> Result<()>;

    /// Remove everything.
    async fn clear(&self) -> Result<()>;

    /// Store `user` as the last-known user, keeping any tokens.
    async fn save_user(&self, user: &User) -> Result<()> {
        let mut session = self.load().await?.unwrap_or_default();
        session.user = Some(user.clone());
        self.save(&session).await
    }

    /// Whether a token pair is stored.
    async fn has_active_session(&self) -> Result<bool> {
        Ok(self
            .load()
            .await?
            .is_some_and(|session| session.is_active()))
    }

    /// Last-known user without hitting the API.
    async fn stored_user(&self) -> Result<Option<User>> {
        Ok(self.load().await?.and_then(|session| session.user))
    }
}
