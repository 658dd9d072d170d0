//! Remote API seam.
//!
//! `HttpApi` talks to the Sankofa backend; `DemoApi` serves sample data in
//! memory for offline use. Everything above this layer only sees the trait.

pub mod client;
pub mod demo;

pub use client::HttpApi;
pub use demo::DemoApi;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ApiNotification, CreateGroupRequest, JoinGroupRequest, OtpPurpose, OtpVerification,
    Registration, SusuGroup, Transaction, User,
};

/// Operations the client needs from the Sankofa API.
#[async_trait]
pub trait SankofaApi: Send + Sync {
    // Auth

    /// Ask the server to text an OTP to `phone_number`.
    async fn request_otp(&self, phone_number: &str, purpose: OtpPurpose) -> Result<()>;

    /// Create a pending account; the server sends a signup OTP.
    async fn register(
        &self,
        phone_number: &str,
        full_name: &str,
        email: Option<&str>,
    ) -> Result<Registration>;

    /// Exchange phone + code for a token pair and the user.
    async fn verify_otp(
        &self,
        phone_number: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<OtpVerification>;

    /// Fetch the signed-in user. `force_refresh` bypasses caches.
    async fn current_user(&self, force_refresh: bool) -> Result<User>;

    // Groups

    async fn list_groups(&self) -> Result<Vec<SusuGroup>>;

    async fn get_group(&self, id: &str) -> Result<SusuGroup>;

    async fn create_group(&self, request: &CreateGroupRequest) -> Result<SusuGroup>;

    async fn join_group(&self, id: &str, request: &JoinGroupRequest) -> Result<SusuGroup>;

    // Transactions

    async fn list_transactions(&self) -> Result<Vec<Transaction>>;

    async fn get_transaction(&self, id: &str) -> Result<Transaction>;

    // Notifications

    async fn list_notifications(&self) -> Result<Vec<ApiNotification>>;

    async fn mark_notification_read(&self, id: &str) -> Result<()>;

    async fn mark_all_notifications_read(&self) -> Result<()>;
}
