//! Testing utilities including mock implementations.
//!
//! These let applications exercise the auth flows and services without a
//! running Sankofa server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::api::SankofaApi;
use crate::error::{ApiError, ClientError, Result};
use crate::routes::{Navigator, Route};
use crate::types::{
    ApiNotification, CreateGroupRequest, JoinGroupRequest, KycStatus, OtpPurpose,
    OtpVerification, Registration, SusuGroup, Transaction, TransactionStatus, TransactionType,
    User,
};

/// Fixed timestamp so fixtures compare equal across calls.
fn fixture_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_557_600, 0).unwrap_or_default()
}

/// A verified member with a small wallet balance.
pub fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        phone_number: "+233241234567".to_string(),
        full_name: "Ama Boateng".to_string(),
        email: None,
        kyc_status: KycStatus::Verified,
        wallet_balance: Decimal::new(12_050, 2),
        wallet_updated_at: Some(fixture_time()),
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}

/// A weekly group with two of five seats taken.
pub fn sample_group(id: &str, name: &str) -> SusuGroup {
    SusuGroup {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        member_ids: vec!["member-1".to_string(), "member-2".to_string()],
        member_names: vec!["Ama Boateng".to_string(), "Kojo Owusu".to_string()],
        invites: Vec::new(),
        owner_id: Some("member-1".to_string()),
        owner_name: Some("Ama Boateng".to_string()),
        owned_by_platform: false,
        target_member_count: 5,
        contribution_amount: Decimal::from(100),
        cycle_number: 1,
        total_cycles: 5,
        next_payout_date: None,
        payout_order: Some("Rotating (weekly)".to_string()),
        is_public: true,
        frequency: "weekly".to_string(),
        location: None,
        requires_approval: true,
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}

pub fn sample_transaction(
    id: &str,
    kind: TransactionType,
    description: &str,
    counterparty: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        kind,
        amount: Decimal::from(100),
        fee: None,
        status: TransactionStatus::Completed,
        channel: Some("mobile_money".to_string()),
        reference: None,
        description: Some(description.to_string()),
        counterparty: Some(counterparty.to_string()),
        created_at: fixture_time(),
        updated_at: fixture_time(),
    }
}

pub fn sample_notification(id: &str, read: bool) -> ApiNotification {
    ApiNotification {
        id: Some(id.to_string()),
        title: Some(format!("Notification {id}")),
        body: Some("Your contribution was received.".to_string()),
        category: Some("contribution".to_string()),
        action_url: None,
        read: Some(read),
        created_at: Some(fixture_time().to_rfc3339()),
    }
}

// =============================================================================
// MockApi
// =============================================================================

/// Which API operation a call or injected failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockEndpoint {
    RequestOtp,
    Register,
    VerifyOtp,
    CurrentUser,
    ListGroups,
    GetGroup,
    CreateGroup,
    JoinGroup,
    ListTransactions,
    GetTransaction,
    ListNotifications,
    MarkNotificationRead,
    MarkAllNotificationsRead,
}

/// Record of a call made to the mock API.
#[derive(Debug, Clone, PartialEq)]
pub enum MockApiCall {
    RequestOtp { phone_number: String, purpose: OtpPurpose },
    Register { phone_number: String, full_name: String, email: Option<String> },
    VerifyOtp { phone_number: String, code: String, purpose: OtpPurpose },
    CurrentUser { force_refresh: bool },
    ListGroups,
    GetGroup { id: String },
    CreateGroup { request: CreateGroupRequest },
    JoinGroup { id: String, request: JoinGroupRequest },
    ListTransactions,
    GetTransaction { id: String },
    ListNotifications,
    MarkNotificationRead { id: String },
    MarkAllNotificationsRead,
}

impl MockApiCall {
    pub fn endpoint(&self) -> MockEndpoint {
        match self {
            MockApiCall::RequestOtp { .. } => MockEndpoint::RequestOtp,
            MockApiCall::Register { .. } => MockEndpoint::Register,
            MockApiCall::VerifyOtp { .. } => MockEndpoint::VerifyOtp,
            MockApiCall::CurrentUser { .. } => MockEndpoint::CurrentUser,
            MockApiCall::ListGroups => MockEndpoint::ListGroups,
            MockApiCall::GetGroup { .. } => MockEndpoint::GetGroup,
            MockApiCall::CreateGroup { .. } => MockEndpoint::CreateGroup,
            MockApiCall::JoinGroup { .. } => MockEndpoint::JoinGroup,
            MockApiCall::ListTransactions => MockEndpoint::ListTransactions,
            MockApiCall::GetTransaction { .. } => MockEndpoint::GetTransaction,
            MockApiCall::ListNotifications => MockEndpoint::ListNotifications,
            MockApiCall::MarkNotificationRead { .. } => MockEndpoint::MarkNotificationRead,
            MockApiCall::MarkAllNotificationsRead => MockEndpoint::MarkAllNotificationsRead,
        }
    }
}

/// A mock API implementation for testing.
///
/// Serves configurable data, accepts one OTP code (default `123456`) and
/// fails any endpoint on demand. Failures stay in place until cleared.
pub struct MockApi {
    user: RwLock<User>,
    valid_code: String,
    registered_phone: Option<String>,
    registration_message: Option<String>,
    groups: RwLock<Vec<SusuGroup>>,
    transactions: RwLock<Vec<Transaction>>,
    notifications: RwLock<Vec<ApiNotification>>,
    failures: RwLock<HashMap<MockEndpoint, ClientError>>,
    calls: Arc<RwLock<Vec<MockApiCall>>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            user: RwLock::new(sample_user("user-1")),
            valid_code: "123456".to_string(),
            registered_phone: None,
            registration_message: None,
            groups: RwLock::new(Vec::new()),
            transactions: RwLock::new(Vec::new()),
            notifications: RwLock::new(Vec::new()),
            failures: RwLock::new(HashMap::new()),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_user(self, user: User) -> Self {
        *self.user.write().unwrap() = user;
        self
    }

    pub fn with_valid_code(mut self, code: impl Into<String>) -> Self {
        self.valid_code = code.into();
        self
    }

    /// Phone the registration endpoint reports back, instead of echoing input.
    pub fn with_registered_phone(mut self, phone: impl Into<String>) -> Self {
        self.registered_phone = Some(phone.into());
        self
    }

    pub fn with_registration_message(mut self, message: impl Into<String>) -> Self {
        self.registration_message = Some(message.into());
        self
    }

    pub fn with_groups(self, groups: Vec<SusuGroup>) -> Self {
        *self.groups.write().unwrap() = groups;
        self
    }

    pub fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
        *self.transactions.write().unwrap() = transactions;
        self
    }

    pub fn with_notifications(self, notifications: Vec<ApiNotification>) -> Self {
        *self.notifications.write().unwrap() = notifications;
        self
    }

    /// Make every call to `endpoint` fail with `error`.
    pub fn fail(&self, endpoint: MockEndpoint, error: impl Into<ClientError>) {
        self.failures
            .write()
            .unwrap()
            .insert(endpoint, error.into());
    }

    pub fn clear_failure(&self, endpoint: MockEndpoint) {
        self.failures.write().unwrap().remove(&endpoint);
    }

    /// Replace the user returned by verification and `current_user`.
    pub fn set_user(&self, user: User) {
        *self.user.write().unwrap() = user;
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockApiCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls made to `endpoint`.
    pub fn call_count(&self, endpoint: MockEndpoint) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    /// Record the call, then return the injected failure for it, if any.
    fn enter(&self, call: MockApiCall) -> Result<()> {
        let endpoint = call.endpoint();
        self.calls.write().unwrap().push(call);
        match self.failures.read().unwrap().get(&endpoint) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn not_found() -> ClientError {
    ApiError::new("Not found.").with_status(404).into()
}

#[async_trait]
impl SankofaApi for MockApi {
    async fn request_otp(&self, phone_number: &str, purpose: OtpPurpose) -> Result<()> {
        self.enter(MockApiCall::RequestOtp {
            phone_number: phone_number.to_string(),
            purpose,
        })
    }

    async fn register(
        &self,
        phone_number: &str,
        full_name: &str,
        email: Option<&str>,
    ) -> Result<Registration> {
        self.enter(MockApiCall::Register {
            phone_number: phone_number.to_string(),
            full_name: full_name.to_string(),
            email: email.map(str::to_string),
        })?;

        Ok(Registration {
            phone_number: self
                .registered_phone
                .clone()
                .unwrap_or_else(|| phone_number.to_string()),
            message: self.registration_message.clone(),
            user: Some(self.user.read().unwrap().clone()),
        })
    }

    async fn verify_otp(
        &self,
        phone_number: &str,
        code: &str,
        purpose: OtpPurpose,
    ) -> Result<OtpVerification> {
        self.enter(MockApiCall::VerifyOtp {
            phone_number: phone_number.to_string(),
            code: code.to_string(),
            purpose,
        })?;

        if code != self.valid_code {
            return Err(ApiError::new("Invalid or expired code.").with_status(400).into());
        }

        Ok(OtpVerification {
            access: "access-token".to_string(),
            refresh: "refresh-token".to_string(),
            user: self.user.read().unwrap().clone(),
        })
    }

    async fn current_user(&self, force_refresh: bool) -> Result<User> {
        self.enter(MockApiCall::CurrentUser { force_refresh })?;
        Ok(self.user.read().unwrap().clone())
    }

    async fn list_groups(&self) -> Result<Vec<SusuGroup>> {
        self.enter(MockApiCall::ListGroups)?;
        Ok(self.groups.read().unwrap().clone())
    }

    async fn get_group(&self, id: &str) -> Result<SusuGroup> {
        self.enter(MockApiCall::GetGroup { id: id.to_string() })?;
        let groups = self.groups.read().unwrap();
        groups.iter().find(|g| g.id == id).cloned().ok_or_else(not_found)
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> Result<SusuGroup> {
        self.enter(MockApiCall::CreateGroup {
            request: request.clone(),
        })?;

        let mut group = sample_group("created-1", &request.name);
        group.target_member_count = request.target_member_count;
        group.invites = request.invites.clone();
        self.groups.write().unwrap().insert(0, group.clone());
        Ok(group)
    }

    async fn join_group(&self, id: &str, request: &JoinGroupRequest) -> Result<SusuGroup> {
        self.enter(MockApiCall::JoinGroup {
            id: id.to_string(),
            request: request.clone(),
        })?;

        let user = self.user.read().unwrap().clone();
        let mut groups = self.groups.write().unwrap();
        let group = groups.iter_mut().find(|g| g.id == id).ok_or_else(not_found)?;
        if !group.member_ids.contains(&user.id) {
            group.member_ids.push(user.id);
            group.member_names.push(user.full_name);
        }
        Ok(group.clone())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.enter(MockApiCall::ListTransactions)?;
        Ok(self.transactions.read().unwrap().clone())
    }

    async fn get_transaction(&self, id: &str) -> Result<Transaction> {
        self.enter(MockApiCall::GetTransaction { id: id.to_string() })?;
        let transactions = self.transactions.read().unwrap();
        transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn list_notifications(&self) -> Result<Vec<ApiNotification>> {
        self.enter(MockApiCall::ListNotifications)?;
        Ok(self.notifications.read().unwrap().clone())
    }

    async fn mark_notification_read(&self, id: &str) -> Result<()> {
        self.enter(MockApiCall::MarkNotificationRead { id: id.to_string() })
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        self.enter(MockApiCall::MarkAllNotificationsRead)
    }
}

// =============================================================================
// RecordingNavigator
// =============================================================================

/// Navigator that remembers every transition.
#[derive(Default)]
pub struct RecordingNavigator {
    navigations: Mutex<Vec<(Route, bool)>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(route, replace)` pair, oldest first.
    pub fn navigations(&self) -> Vec<(Route, bool)> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(Route, bool)> {
        self.navigations.lock().unwrap().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route, replace: bool) {
        self.navigations.lock().unwrap().push((route, replace));
    }
}
