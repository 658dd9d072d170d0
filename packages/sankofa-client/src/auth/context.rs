//! Authentication context
//!
//! Holds the signed-in user for the whole client and publishes every change
//! through a watch channel. Each publish carries a fresh `Arc`, so observers
//! comparing by identity see a change after every refresh even when the
//! field values are the same.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::SankofaApi;
use crate::error::Result;
use crate::session::{SessionStore, StoredSession};
use crate::types::{OtpPurpose, User};

/// Current-user state shared by the flows and the shell.
pub struct AuthContext {
    api: Arc<dyn SankofaApi>,
    session: Arc<dyn SessionStore>,
    user: watch::Sender<Option<Arc<User>>>,
    loading: watch::Sender<bool>,
}

impl AuthContext {
    pub fn new(api: Arc<dyn SankofaApi>, session: Arc<dyn SessionStore>) -> Self {
        let (user, _) = watch::channel(None);
        let (loading, _) = watch::channel(true);
        Self {
            api,
            session,
            user,
            loading,
        }
    }

    /// Current user, if signed in.
    pub fn user(&self) -> Option<Arc<User>> {
        self.user.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.borrow().is_some()
    }

    /// True until the startup session check has finished.
    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Receive every user change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<User>>> {
        self.user.subscribe()
    }

    /// Receive loading flag changes.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Restore a persisted session at startup.
    ///
    /// Failures are logged and leave the user signed out; a session the server
    /// rejects with 401 is also dropped from the store. The loading flag is
    /// cleared however this returns, including when the future is dropped.
    pub async fn check_session(&self) {
        let _loading = LoadingGuard(&self.loading);

        match self.restore_user().await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "Session restored");
                self.publish(user);
            }
            Ok(None) => debug!("No stored session"),
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "Stored session rejected, clearing it");
                if let Err(e) = self.session.clear().await {
                    warn!(error = %e, "Failed to clear stored session");
                }
            }
            Err(e) => warn!(error = %e, "Session check failed"),
        }
    }

    async fn restore_user(&self) -> Result<Option<User>> {
        if !self.session.has_active_session().await? {
            return Ok(None);
        }
        let user = self.api.current_user(true).await?;
        self.session.save_user(&user).await?;
        Ok(Some(user))
    }

    /// Exchange a normalized phone and code for a session.
    ///
    /// On failure nothing is stored and the user stays signed out.
    pub async fn login(
        &self,
        phone_number: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<Arc<User>> {
        let verification = self.api.verify_otp(phone_number, code, purpose).await?;
        let session = StoredSession::new(verification.tokens(), verification.user.clone());
        self.session.save(&session).await?;

        info!(user_id = %verification.user.id, %purpose, "Signed in");
        Ok(self.publish(verification.user))
    }

    /// Drop the persisted session and the in-memory user.
    pub async fn logout(&self) {
        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.user.send_replace(None);
        info!("Signed out");
    }

    /// Re-fetch the user from the server and publish it as a new value.
    pub async fn refresh_user(&self) -> Result<Arc<User>> {
        debug!("Refreshing user");
        let user = self.api.current_user(true).await?;
        self.session.save_user(&user).await?;
        debug!(wallet_balance = %user.wallet_balance, "Refreshed user");
        Ok(self.publish(user))
    }

    /// Replace the user locally, then persist it. No server round trip.
    pub async fn update_user(&self, user: User) -> Result<()> {
        self.publish(user.clone());
        self.session.save_user(&user).await
    }

    fn publish(&self, user: User) -> Arc<User> {
        let user = Arc::new(user);
        self.user.send_replace(Some(Arc::clone(&user)));
        user
    }
}

/// Clears the loading flag on drop.
struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}
