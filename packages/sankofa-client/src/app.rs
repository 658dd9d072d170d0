//! Application context
//!
//! Built once at startup and handed to whatever drives the client. Owns the
//! API backend, the session store, the auth context and the services.

use std::sync::Arc;

use tracing::info;

use crate::api::{DemoApi, HttpApi, SankofaApi};
use crate::auth::{AuthContext, OtpFlow};
use crate::config::Config;
use crate::error::Result;
use crate::routes::Navigator;
use crate::services::{GroupService, NotificationService, TransactionService};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::types::OtpPurpose;

pub struct AppContext {
    api: Arc<dyn SankofaApi>,
    auth: Arc<AuthContext>,
    groups: GroupService,
    transactions: TransactionService,
    notifications: NotificationService,
}

impl AppContext {
    /// Wire everything from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let session: Arc<dyn SessionStore> = match &config.session_file {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };

        let api: Arc<dyn SankofaApi> = if config.demo_mode {
            info!("Demo mode: serving sample data");
            Arc::new(DemoApi::new())
        } else {
            Arc::new(HttpApi::new(&config.api_url, Arc::clone(&session))?)
        };

        Ok(Self::new(api, session))
    }

    /// Wire from an explicit backend and store.
    pub fn new(api: Arc<dyn SankofaApi>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            auth: Arc::new(AuthContext::new(Arc::clone(&api), session)),
            groups: GroupService::new(Arc::clone(&api)),
            transactions: TransactionService::new(Arc::clone(&api)),
            notifications: NotificationService::new(Arc::clone(&api)),
            api,
        }
    }

    /// Restore any persisted session. Call once before reading the user.
    pub async fn bootstrap(&self) {
        self.auth.check_session().await;
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn groups(&self) -> &GroupService {
        &self.groups
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.transactions
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn login_flow(&self, navigator: Arc<dyn Navigator>) -> OtpFlow {
        self.flow(OtpPurpose::Login, navigator)
    }

    /// Registration flow, optionally pre-filled from the login shortcut.
    pub fn signup_flow(&self, navigator: Arc<dyn Navigator>, phone: Option<&str>) -> OtpFlow {
        self.flow(OtpPurpose::Signup, navigator).with_prefill(phone)
    }

    fn flow(&self, purpose: OtpPurpose, navigator: Arc<dyn Navigator>) -> OtpFlow {
        OtpFlow::new(
            purpose,
            Arc::clone(&self.auth),
            Arc::clone(&self.api),
            navigator,
        )
    }

    /// Sign out and forget every cached list.
    pub async fn logout(&self) {
        self.auth.logout().await;
        self.groups.clear_cache().await;
        self.transactions.clear_cache().await;
        self.notifications.clear_cache().await;
    }
}
