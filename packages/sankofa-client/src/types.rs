//! API request and response types.
//!
//! Field names follow the API's snake_case wire format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Users and sessions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

impl KycStatus {
    /// Members still pending or rejected must go through KYC before the app.
    pub fn requires_kyc(&self) -> bool {
        matches!(self, KycStatus::Pending | KycStatus::Rejected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            KycStatus::Pending => "Pending",
            KycStatus::Verified => "Verified Member",
            KycStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub phone_number: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub kyc_status: KycStatus,
    #[serde(default)]
    pub wallet_balance: Decimal,
    #[serde(default)]
    pub wallet_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token pair issued on successful OTP verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

/// What an OTP is being requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    Login,
    Signup,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Login => "login",
            OtpPurpose::Signup => "signup",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpRequest<'a> {
    pub phone_number: &'a str,
    pub purpose: OtpPurpose,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpVerifyRequest<'a> {
    pub phone_number: &'a str,
    pub code: &'a str,
    pub purpose: OtpPurpose,
}

/// Response of the OTP verification endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpVerification {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

impl OtpVerification {
    pub fn tokens(&self) -> AuthTokens {
        AuthTokens {
            access: self.access.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest<'a> {
    pub phone_number: &'a str,
    pub full_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

/// Response of the registration endpoint. The server texts the code to
/// `phone_number`, which may differ in format from what was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub phone_number: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

// =============================================================================
// Groups
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupInvite {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SusuGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub member_names: Vec<String>,
    #[serde(default)]
    pub invites: Vec<GroupInvite>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owned_by_platform: bool,
    pub target_member_count: u32,
    pub contribution_amount: Decimal,
    #[serde(default)]
    pub cycle_number: u32,
    #[serde(default)]
    pub total_cycles: u32,
    #[serde(default)]
    pub next_payout_date: Option<String>,
    #[serde(default)]
    pub payout_order: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub frequency: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub requires_approval: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SusuGroup {
    pub fn total_members(&self) -> usize {
        self.member_ids.len()
    }

    pub fn seats_remaining(&self) -> usize {
        (self.target_member_count as usize).saturating_sub(self.total_members())
    }

    /// Pool paid out each cycle when every seat contributes.
    pub fn total_pool(&self) -> Decimal {
        self.contribution_amount * Decimal::from(self.target_member_count)
    }
}

/// Input for creating a group.
#[derive(Debug, Clone, Default)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub contribution_amount: Decimal,
    pub frequency: String,
    pub start_date: String,
    pub invites: Vec<NewInvite>,
    pub requires_approval: Option<bool>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NewInvite {
    pub name: String,
    pub phone_number: String,
}

/// Wire payload for group creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub contribution_amount: String,
    pub frequency: String,
    pub start_date: String,
    pub target_member_count: u32,
    pub invites: Vec<GroupInvite>,
    pub requires_approval: bool,
    pub is_public: bool,
    pub payout_order: String,
}

impl From<&NewGroup> for CreateGroupRequest {
    fn from(group: &NewGroup) -> Self {
        let description = group
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Self {
            name: group.name.trim().to_string(),
            description,
            contribution_amount: format!("{:.2}", group.contribution_amount),
            frequency: group.frequency.clone(),
            start_date: group.start_date.clone(),
            target_member_count: group.invites.len() as u32 + 1,
            invites: group
                .invites
                .iter()
                .map(|invite| GroupInvite {
                    name: invite.name.trim().to_string(),
                    phone_number: invite.phone_number.trim().to_string(),
                    status: None,
                })
                .collect(),
            requires_approval: group.requires_approval.unwrap_or(true),
            is_public: group.is_public.unwrap_or(false),
            payout_order: format!("Rotating ({})", group.frequency),
        }
    }
}

/// Options when joining a public group.
#[derive(Debug, Clone)]
pub struct JoinOptions {
    pub introduction: Option<String>,
    pub auto_save: bool,
    pub reminders_enabled: bool,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            introduction: None,
            auto_save: false,
            reminders_enabled: true,
        }
    }
}

/// Wire payload for joining. Only non-default options are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinGroupRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders_enabled: Option<bool>,
}

impl JoinGroupRequest {
    pub fn is_empty(&self) -> bool {
        self.introduction.is_none() && self.auto_save.is_none() && self.reminders_enabled.is_none()
    }
}

impl From<&JoinOptions> for JoinGroupRequest {
    fn from(options: &JoinOptions) -> Self {
        Self {
            introduction: options
                .introduction
                .as_deref()
                .filter(|intro| !intro.is_empty())
                .map(str::to_string),
            auto_save: options.auto_save.then_some(true),
            reminders_enabled: (!options.reminders_enabled).then_some(false),
        }
    }
}

// =============================================================================
// Transactions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Contribution,
    Payout,
    Transfer,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Contribution => "Contribution",
            TransactionType::Payout => "Payout",
            TransactionType::Transfer => "Transfer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub fee: Option<Decimal>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub counterparty: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub read: bool,
    pub action_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Notification as the API sends it: any field may be missing and keys may
/// arrive in either case style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiNotification {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "actionUrl")]
    pub action_url: Option<String>,
    #[serde(default)]
    pub read: Option<bool>,
    /// Parsed per item; a malformed timestamp falls back to now.
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

impl From<ApiNotification> for Notification {
    fn from(api: ApiNotification) -> Self {
        Self {
            id: api.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: api.title.unwrap_or_else(|| "Notification".to_string()),
            body: api.body.unwrap_or_default(),
            category: api.category.filter(|c| !c.is_empty()),
            read: api.read.unwrap_or(false),
            action_url: api.action_url.filter(|u| !u.is_empty()),
            created_at: api
                .created_at
                .and_then(|at| DateTime::parse_from_rfc3339(at.trim()).ok())
                .map(|at| at.with_timezone(&Utc))
                .unwrap_or_else(Utc::now),
        }
    }
}
