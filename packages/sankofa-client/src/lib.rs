//! Sankofa client core
//!
//! Client side of the Sankofa cooperative savings ("susu") platform:
//! phone-number/OTP authentication, groups, transactions and notifications
//! against the Sankofa REST API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sankofa_client::{AppContext, Config};
//! use sankofa_client::testing::RecordingNavigator;
//!
//! let app = AppContext::from_config(&Config::from_env()?)?;
//! app.bootstrap().await;
//!
//! let mut flow = app.login_flow(Arc::new(RecordingNavigator::new()));
//! flow.set_phone("24 123 4567");
//! flow.submit_identity().await?;
//! flow.set_otp("123456");
//! let route = flow.verify().await?;
//! ```
//!
//! # Modules
//!
//! - [`phone`] - Ghana mobile number normalization and display
//! - [`api`] - The `SankofaApi` seam, HTTP and demo backends
//! - [`session`] - Persisted token pair and last-known user
//! - [`auth`] - Current-user context, OTP flow, resend countdown
//! - [`services`] - Cached group, transaction and notification services
//! - [`app`] - Application context wiring it all together
//! - [`testing`] - Mock API and navigator for tests

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod phone;
pub mod routes;
pub mod services;
pub mod session;
pub mod testing;
pub mod types;

pub use api::{DemoApi, HttpApi, SankofaApi};
pub use app::AppContext;
pub use auth::{AuthContext, FieldErrors, FlowError, FlowStage, OtpFlow};
pub use config::Config;
pub use error::{ApiError, ClientError, Result};
pub use routes::{Navigator, Route};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, StoredSession};
pub use types::{
    KycStatus, Notification, OtpPurpose, SusuGroup, Transaction, TransactionStatus,
    TransactionType, User,
};
