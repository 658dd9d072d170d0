//! Offline demo backend.
//!
//! Serves a fixed set of groups, transactions and notifications from memory
//! and accepts a single well-known code. Selected at configuration time;
//! nothing above the `SankofaApi` seam knows it is not the real server.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::SankofaApi;
use crate::error::{ApiError, Result};
use crate::types::{
    ApiNotification, CreateGroupRequest, JoinGroupRequest, KycStatus, OtpPurpose,
    OtpVerification, Registration, SusuGroup, Transaction, TransactionStatus, TransactionType,
    User,
};

/// The only code the demo backend accepts.
pub const DEMO_OTP_CODE: &str = "123456";

const DEMO_USER_ID: &str = "demo-user";
const DEMO_PHONE: &str = "+233241234567";

struct DemoState {
    user: User,
    groups: Vec<SusuGroup>,
    transactions: Vec<Transaction>,
    notifications: Vec<ApiNotification>,
}

/// In-memory stand-in for the Sankofa API.
pub struct DemoApi {
    state: RwLock<DemoState>,
}

impl Default for DemoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoApi {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            state: RwLock::new(DemoState {
                user: demo_user(now),
                groups: sample_groups(now),
                transactions: sample_transactions(now),
                notifications: sample_notifications(now),
            }),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::new("Not found.").with_status(404)
}

#[async_trait]
impl SankofaApi for DemoApi {
    async fn request_otp(&self, phone_number: &str, purpose: OtpPurpose) -> Result<()> {
        info!(phone_number, %purpose, code = DEMO_OTP_CODE, "Demo OTP issued");
        Ok(())
    }

    async fn register(
        &self,
        phone_number: &str,
        full_name: &str,
        email: Option<&str>,
    ) -> Result<Registration> {
        let mut state = self.state.write().await;
        state.user.phone_number = phone_number.to_string();
        state.user.full_name = full_name.to_string();
        state.user.email = email.map(str::to_string);
        state.user.kyc_status = KycStatus::Pending;
        state.user.updated_at = Utc::now();

        info!(phone_number, code = DEMO_OTP_CODE, "Demo registration");
        Ok(Registration {
            phone_number: phone_number.to_string(),
            message: None,
            user: Some(state.user.clone()),
        })
    }

    async fn verify_otp(
        &self,
        phone_number: &str,
        code: &str,
        _purpose: OtpPurpose,
    ) -> Result<OtpVerification> {
        if code != DEMO_OTP_CODE {
            return Err(ApiError::new("Invalid or expired code.").with_status(400).into());
        }

        let mut state = self.state.write().await;
        state.user.phone_number = phone_number.to_string();
        Ok(OtpVerification {
            access: format!("demo-access-{}", Uuid::new_v4()),
            refresh: format!("demo-refresh-{}", Uuid::new_v4()),
            user: state.user.clone(),
        })
    }

    async fn current_user(&self, _force_refresh: bool) -> Result<User> {
        Ok(self.state.read().await.user.clone())
    }

    async fn list_groups(&self) -> Result<Vec<SusuGroup>> {
        Ok(self.state.read().await.groups.clone())
    }

    async fn get_group(&self, id: &str) -> Result<SusuGroup> {
        let state = self.state.read().await;
        let group = state.groups.iter().find(|g| g.id == id).cloned();
        group.ok_or_else(|| not_found().into())
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> Result<SusuGroup> {
        let contribution_amount = request
            .contribution_amount
            .parse::<Decimal>()
            .map_err(|e| ApiError::new(format!("Invalid contribution amount: {e}")).with_status(400))?;

        let mut state = self.state.write().await;
        let now = Utc::now();
        let group = SusuGroup {
            id: Uuid::new_v4().to_string(),
            name: request.name.clone(),
            description: request.description.clone(),
            member_ids: vec![state.user.id.clone()],
            member_names: vec![state.user.full_name.clone()],
            invites: request.invites.clone(),
            owner_id: Some(state.user.id.clone()),
            owner_name: Some(state.user.full_name.clone()),
            owned_by_platform: false,
            target_member_count: request.target_member_count,
            contribution_amount,
            cycle_number: 1,
            total_cycles: request.target_member_count,
            next_payout_date: Some(request.start_date.clone()),
            payout_order: Some(request.payout_order.clone()),
            is_public: request.is_public,
            frequency: request.frequency.clone(),
            location: None,
            requires_approval: request.requires_approval,
            created_at: now,
            updated_at: now,
        };
        state.groups.insert(0, group.clone());
        Ok(group)
    }

    async fn join_group(&self, id: &str, _request: &JoinGroupRequest) -> Result<SusuGroup> {
        let mut state = self.state.write().await;
        let (user_id, user_name) = (state.user.id.clone(), state.user.full_name.clone());
        let group = state
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(not_found)?;

        if !group.member_ids.contains(&user_id) {
            if group.seats_remaining() == 0 {
                return Err(ApiError::new("This group is full.").with_status(400).into());
            }
            group.member_ids.push(user_id);
            group.member_names.push(user_name);
            group.updated_at = Utc::now();
        }
        Ok(group.clone())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.state.read().await.transactions.clone())
    }

    async fn get_transaction(&self, id: &str) -> Result<Transaction> {
        let state = self.state.read().await;
        let tx = state.transactions.iter().find(|t| t.id == id).cloned();
        tx.ok_or_else(|| not_found().into())
    }

    async fn list_notifications(&self) -> Result<Vec<ApiNotification>> {
        Ok(self.state.read().await.notifications.clone())
    }

    async fn mark_notification_read(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id.as_deref() == Some(id))
            .ok_or_else(not_found)?;
        notification.read = Some(true);
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        let mut state = self.state.write().await;
        for notification in &mut state.notifications {
            notification.read = Some(true);
        }
        Ok(())
    }
}

// =============================================================================
// Sample data
// =============================================================================

fn demo_user(now: DateTime<Utc>) -> User {
    User {
        id: DEMO_USER_ID.to_string(),
        phone_number: DEMO_PHONE.to_string(),
        full_name: "Ama Boateng".to_string(),
        email: None,
        kyc_status: KycStatus::Verified,
        wallet_balance: Decimal::new(125_000, 2),
        wallet_updated_at: Some(now),
        created_at: now - Duration::days(90),
        updated_at: now,
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

fn sample_groups(now: DateTime<Utc>) -> Vec<SusuGroup> {
    let weekly_members = names(&[
        "Ama Boateng",
        "Kojo Owusu",
        "Akosua Mensah",
        "Yaw Asante",
        "Efua Darko",
        "Kwame Appiah",
    ]);
    let monthly_members = names(&["Kojo Owusu", "Abena Osei", "Kofi Adjei", "Esi Quaye"]);

    vec![
        SusuGroup {
            id: "sample-1".to_string(),
            name: "Weekly Savings Circle".to_string(),
            description: Some("A group for weekly savings with rotating payouts".to_string()),
            member_ids: (1..=weekly_members.len()).map(|n| format!("member-{n}")).collect(),
            member_names: weekly_members,
            invites: Vec::new(),
            owner_id: Some("member-1".to_string()),
            owner_name: Some("Ama Boateng".to_string()),
            owned_by_platform: false,
            target_member_count: 6,
            contribution_amount: Decimal::from(100),
            cycle_number: 3,
            total_cycles: 6,
            next_payout_date: Some((now + Duration::days(7)).to_rfc3339()),
            payout_order: Some("Rotating (weekly)".to_string()),
            is_public: true,
            frequency: "weekly".to_string(),
            location: Some("Accra".to_string()),
            requires_approval: true,
            created_at: now - Duration::days(21),
            updated_at: now,
        },
        SusuGroup {
            id: "sample-2".to_string(),
            name: "Monthly Investment Group".to_string(),
            description: Some("Monthly contributions for long-term savings goals".to_string()),
            member_ids: (7..7 + monthly_members.len()).map(|n| format!("member-{n}")).collect(),
            member_names: monthly_members,
            invites: Vec::new(),
            owner_id: None,
            owner_name: None,
            owned_by_platform: true,
            target_member_count: 5,
            contribution_amount: Decimal::from(500),
            cycle_number: 2,
            total_cycles: 5,
            next_payout_date: Some((now + Duration::days(30)).to_rfc3339()),
            payout_order: Some("Rotating (monthly)".to_string()),
            is_public: true,
            frequency: "monthly".to_string(),
            location: Some("Kumasi".to_string()),
            requires_approval: false,
            created_at: now - Duration::days(60),
            updated_at: now,
        },
    ]
}

fn sample_transaction(
    id: &str,
    kind: TransactionType,
    amount: i64,
    reference: &str,
    description: &str,
    counterparty: &str,
    at: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        kind,
        amount: Decimal::from(amount),
        fee: None,
        status: TransactionStatus::Completed,
        channel: Some("mobile_money".to_string()),
        reference: Some(reference.to_string()),
        description: Some(description.to_string()),
        counterparty: Some(counterparty.to_string()),
        created_at: at,
        updated_at: at,
    }
}

fn sample_transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    vec![
        sample_transaction(
            "sample-tx-1",
            TransactionType::Contribution,
            100,
            "MM-2024-001",
            "Weekly contribution to Weekly Savings Circle",
            "Weekly Savings Circle",
            now - Duration::days(2),
        ),
        sample_transaction(
            "sample-tx-2",
            TransactionType::Payout,
            600,
            "MM-2024-002",
            "Payout to Ama Boateng from Weekly Savings Circle",
            "Ama Boateng",
            now - Duration::days(5),
        ),
        sample_transaction(
            "sample-tx-3",
            TransactionType::Contribution,
            500,
            "MM-2024-003",
            "Monthly contribution to Monthly Investment Group",
            "Monthly Investment Group",
            now - Duration::days(10),
        ),
    ]
}

fn sample_notifications(now: DateTime<Utc>) -> Vec<ApiNotification> {
    vec![
        ApiNotification {
            id: Some("sample-notif-1".to_string()),
            title: Some("Contribution received".to_string()),
            body: Some("Your GH₵100.00 contribution to Weekly Savings Circle was received.".to_string()),
            category: Some("contribution".to_string()),
            action_url: Some("/app/groups/sample-1".to_string()),
            read: Some(false),
            created_at: Some((now - Duration::days(2)).to_rfc3339()),
        },
        ApiNotification {
            id: Some("sample-notif-2".to_string()),
            title: Some("Payout scheduled".to_string()),
            body: Some("The next Weekly Savings Circle payout is in 7 days.".to_string()),
            category: Some("payout".to_string()),
            action_url: None,
            read: Some(false),
            created_at: Some((now - Duration::hours(6)).to_rfc3339()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_only_the_demo_code_verifies() {
        let api = DemoApi::new();
        let err = api
            .verify_otp(DEMO_PHONE, "000000", OtpPurpose::Login)
            .await
            .unwrap_err();
        assert_eq!(err.as_api().and_then(|e| e.status), Some(400));

        let verified = api
            .verify_otp(DEMO_PHONE, DEMO_OTP_CODE, OtpPurpose::Login)
            .await
            .unwrap();
        assert_eq!(verified.user.id, DEMO_USER_ID);
        assert!(!verified.access.is_empty());
    }

    #[tokio::test]
    async fn test_registration_updates_the_demo_user() {
        let api = DemoApi::new();
        let registration = api
            .register("+233501234567", "Kofi Mensah", Some("kofi@example.com"))
            .await
            .unwrap();
        assert_eq!(registration.phone_number, "+233501234567");

        let user = api.current_user(true).await.unwrap();
        assert_eq!(user.full_name, "Kofi Mensah");
        assert_eq!(user.kyc_status, KycStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let api = DemoApi::new();
        assert_eq!(api.list_groups().await.unwrap().len(), 2);
        assert!(api.get_group("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_join_adds_the_user_once() {
        let api = DemoApi::new();
        let group = api
            .join_group("sample-2", &JoinGroupRequest::default())
            .await
            .unwrap();
        assert!(group.member_ids.contains(&DEMO_USER_ID.to_string()));
        assert_eq!(group.seats_remaining(), 0);

        let again = api
            .join_group("sample-2", &JoinGroupRequest::default())
            .await
            .unwrap();
        assert_eq!(again.total_members(), group.total_members());

        let err = api
            .join_group("sample-1", &JoinGroupRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This group is full.");
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let api = DemoApi::new();
        api.mark_all_notifications_read().await.unwrap();
        let notifications = api.list_notifications().await.unwrap();
        assert!(notifications.iter().all(|n| n.read == Some(true)));
    }
}
