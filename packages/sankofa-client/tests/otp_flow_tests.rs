//! Integration tests for the shared login/registration OTP flow.
//!
//! These drive `OtpFlow` against `MockApi` and check:
//! 1. Identity validation and challenge start
//! 2. Resend cooldown
//! 3. Code verification and navigation
//! 4. Error-to-message mapping for both purposes

use std::sync::Arc;
use std::time::Duration;

use sankofa_client::{
    testing::{sample_user, MockApi, MockApiCall, MockEndpoint, RecordingNavigator},
    ApiError, AuthContext, ClientError, FlowError, FlowStage, KycStatus, MemorySessionStore,
    OtpFlow, OtpPurpose, Route,
};

struct Harness {
    api: Arc<MockApi>,
    auth: Arc<AuthContext>,
    navigator: Arc<RecordingNavigator>,
    flow: OtpFlow,
}

fn harness(purpose: OtpPurpose, api: MockApi) -> Harness {
    let api = Arc::new(api);
    let auth = Arc::new(AuthContext::new(
        api.clone(),
        Arc::new(MemorySessionStore::new()),
    ));
    let navigator = Arc::new(RecordingNavigator::new());
    let flow = OtpFlow::new(purpose, auth.clone(), api.clone(), navigator.clone());
    Harness {
        api,
        auth,
        navigator,
        flow,
    }
}

/// Login flow already waiting for a code sent to +233241234567.
async fn awaiting_login_code(api: MockApi) -> Harness {
    let mut h = harness(OtpPurpose::Login, api);
    h.flow.set_phone("24 123 4567");
    h.flow.submit_identity().await.unwrap();
    h
}

// =============================================================================
// Identity stage
// =============================================================================

#[tokio::test]
async fn test_login_submit_starts_challenge() {
    let h = awaiting_login_code(MockApi::new()).await;

    assert_eq!(h.flow.stage(), FlowStage::AwaitingOtp);
    assert_eq!(h.flow.challenge_phone(), Some("+233241234567"));
    assert_eq!(h.flow.masked_phone().as_deref(), Some("+233 241234567"));
    assert_eq!(
        h.flow.status_message(),
        Some("We sent a code to +233 241234567")
    );
    assert_eq!(h.flow.seconds_remaining(), 60);
    assert!(!h.flow.can_resend());
    assert_eq!(
        h.api.calls(),
        vec![MockApiCall::RequestOtp {
            phone_number: "+233241234567".to_string(),
            purpose: OtpPurpose::Login,
        }]
    );
}

#[tokio::test]
async fn test_phone_input_is_regrouped() {
    let mut h = harness(OtpPurpose::Login, MockApi::new());
    h.flow.set_phone("0241234567");
    assert_eq!(h.flow.phone(), "02 412 3456");

    h.flow.set_phone("241234567");
    assert_eq!(h.flow.phone(), "24 123 4567");
}

#[tokio::test]
async fn test_invalid_phone_never_reaches_the_server() {
    let mut h = harness(OtpPurpose::Login, MockApi::new());
    h.flow.set_phone("14 123 4567");

    let err = h.flow.submit_identity().await.unwrap_err();

    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(
        h.flow.errors().phone.as_deref(),
        Some("Enter a valid 9-digit MoMo number")
    );
    assert_eq!(h.flow.stage(), FlowStage::CollectingIdentity);
    assert_eq!(h.flow.seconds_remaining(), 0);
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_account_offers_signup() {
    let api = MockApi::new();
    api.fail(
        MockEndpoint::RequestOtp,
        ApiError::from_response(
            404,
            r#"{"detail": "No account is registered with this phone number."}"#,
        ),
    );
    let mut h = harness(OtpPurpose::Login, api);
    h.flow.set_phone("24 123 4567");

    let err = h.flow.submit_identity().await.unwrap_err();

    assert_eq!(
        err,
        FlowError::Api("No account is registered with this phone number.".to_string())
    );
    assert!(h.flow.signup_prompt());
    assert_eq!(h.flow.stage(), FlowStage::CollectingIdentity);
    assert_eq!(h.flow.challenge_phone(), None);
    assert_eq!(h.flow.seconds_remaining(), 0);

    let route = h.flow.go_to_signup();
    assert_eq!(
        route,
        Route::Register {
            phone: Some("241234567".to_string())
        }
    );
    assert_eq!(h.navigator.last(), Some((route, false)));
}

#[tokio::test]
async fn test_login_transport_failure_uses_fixed_message() {
    let api = MockApi::new();
    api.fail(
        MockEndpoint::RequestOtp,
        ClientError::Network("connection refused".to_string()),
    );
    let mut h = harness(OtpPurpose::Login, api);
    h.flow.set_phone("24 123 4567");

    h.flow.submit_identity().await.unwrap_err();

    assert_eq!(
        h.flow.errors().general.as_deref(),
        Some("Failed to send OTP. Please try again.")
    );
    assert!(!h.flow.signup_prompt());
}

#[tokio::test]
async fn test_go_to_signup_without_phone_carries_nothing() {
    let h = harness(OtpPurpose::Login, MockApi::new());
    assert_eq!(h.flow.go_to_signup(), Route::Register { phone: None });
}

// =============================================================================
// Resend
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_resend_waits_for_the_countdown() {
    let mut h = awaiting_login_code(MockApi::new()).await;

    let err = h.flow.resend().await.unwrap_err();
    assert_eq!(err, FlowError::CooldownActive { remaining: 60 });
    assert_eq!(h.api.call_count(MockEndpoint::RequestOtp), 1);

    tokio::time::sleep(Duration::from_millis(60_500)).await;
    assert_eq!(h.flow.seconds_remaining(), 0);
    assert!(h.flow.can_resend());

    h.flow.resend().await.unwrap();

    assert_eq!(h.api.call_count(MockEndpoint::RequestOtp), 2);
    assert_eq!(
        h.flow.status_message(),
        Some("A new code was sent to +233 241234567")
    );
    assert_eq!(h.flow.seconds_remaining(), 60);
}

#[tokio::test(start_paused = true)]
async fn test_resend_failure_sets_otp_error() {
    let mut h = awaiting_login_code(MockApi::new()).await;
    tokio::time::sleep(Duration::from_secs(61)).await;

    h.api.fail(
        MockEndpoint::RequestOtp,
        ApiError::new("Too many requests.").with_status(429),
    );
    let err = h.flow.resend().await.unwrap_err();

    assert_eq!(err, FlowError::Api("Too many requests.".to_string()));
    assert_eq!(h.flow.errors().otp.as_deref(), Some("Too many requests."));
    assert_eq!(h.flow.masked_phone().as_deref(), Some("+233 241234567"));
    assert_eq!(h.flow.stage(), FlowStage::AwaitingOtp);
}

// =============================================================================
// Verification
// =============================================================================

#[tokio::test]
async fn test_short_code_is_rejected_locally() {
    let mut h = awaiting_login_code(MockApi::new()).await;
    h.flow.set_otp("123");

    let err = h.flow.verify().await.unwrap_err();

    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(
        h.flow.errors().otp.as_deref(),
        Some("Enter the 6-digit code we sent")
    );
    assert_eq!(h.flow.stage(), FlowStage::AwaitingOtp);
    assert_eq!(h.api.call_count(MockEndpoint::VerifyOtp), 0);
}

#[tokio::test]
async fn test_verified_member_goes_home() {
    let mut h = awaiting_login_code(MockApi::new()).await;
    h.flow.set_otp("123 456");

    let route = h.flow.verify().await.unwrap();

    assert_eq!(route, Route::Home);
    assert_eq!(h.navigator.navigations(), vec![(Route::Home, false)]);
    assert_eq!(h.flow.stage(), FlowStage::Authenticated);
    assert_eq!(h.flow.seconds_remaining(), 0);
    assert!(h.auth.is_authenticated());
    assert!(h.api.calls().contains(&MockApiCall::VerifyOtp {
        phone_number: "+233241234567".to_string(),
        code: "123456".to_string(),
        purpose: OtpPurpose::Login,
    }));
    assert!(h
        .api
        .calls()
        .contains(&MockApiCall::CurrentUser { force_refresh: true }));
}

#[tokio::test]
async fn test_pending_kyc_goes_to_kyc() {
    let mut user = sample_user("user-1");
    user.kyc_status = KycStatus::Pending;
    let mut h = awaiting_login_code(MockApi::new().with_user(user)).await;
    h.flow.set_otp("123456");

    assert_eq!(h.flow.verify().await.unwrap(), Route::Kyc);
}

#[tokio::test]
async fn test_refresh_failure_falls_back_to_verified_user() {
    let mut h = awaiting_login_code(MockApi::new()).await;
    h.api.fail(
        MockEndpoint::CurrentUser,
        ClientError::Network("offline".to_string()),
    );
    h.flow.set_otp("123456");

    let route = h.flow.verify().await.unwrap();

    assert_eq!(route, Route::Home);
    assert_eq!(h.auth.user().unwrap().id, "user-1");
    assert_eq!(h.flow.stage(), FlowStage::Authenticated);
}

#[tokio::test]
async fn test_wrong_code_keeps_the_input() {
    let mut h = awaiting_login_code(MockApi::new()).await;
    h.flow.set_otp("654321");

    let err = h.flow.verify().await.unwrap_err();

    assert_eq!(err, FlowError::Api("Invalid or expired code.".to_string()));
    assert_eq!(
        h.flow.errors().otp.as_deref(),
        Some("Invalid or expired code.")
    );
    assert_eq!(h.flow.otp(), "654321");
    assert_eq!(h.flow.stage(), FlowStage::AwaitingOtp);
    assert!(!h.auth.is_authenticated());
    assert!(h.navigator.navigations().is_empty());
}

#[tokio::test]
async fn test_verify_transport_failure_uses_fixed_message() {
    let mut h = awaiting_login_code(MockApi::new()).await;
    h.api.fail(
        MockEndpoint::VerifyOtp,
        ClientError::Network("timed out".to_string()),
    );
    h.flow.set_otp("123456");

    h.flow.verify().await.unwrap_err();

    assert_eq!(
        h.flow.errors().otp.as_deref(),
        Some("Failed to verify OTP. Please try again.")
    );
}

#[tokio::test]
async fn test_actions_outside_their_stage_are_refused() {
    let mut h = harness(OtpPurpose::Login, MockApi::new());

    assert_eq!(
        h.flow.verify().await.unwrap_err(),
        FlowError::WrongStage(FlowStage::CollectingIdentity)
    );
    assert_eq!(
        h.flow.resend().await.unwrap_err(),
        FlowError::WrongStage(FlowStage::CollectingIdentity)
    );
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_back_resets_the_challenge() {
    let mut h = awaiting_login_code(MockApi::new()).await;
    h.flow.set_otp("12");
    h.flow.verify().await.unwrap_err();

    h.flow.back();

    assert_eq!(h.flow.stage(), FlowStage::CollectingIdentity);
    assert_eq!(h.flow.otp(), "");
    assert_eq!(h.flow.challenge_phone(), None);
    assert_eq!(h.flow.status_message(), None);
    assert!(h.flow.errors().is_empty());
    assert_eq!(h.flow.seconds_remaining(), 0);
    assert_eq!(h.flow.phone(), "24 123 4567");
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_signup_validates_every_field() {
    let mut h = harness(OtpPurpose::Signup, MockApi::new());
    h.flow.set_full_name(" A ");
    h.flow.set_phone("24 123");
    h.flow.set_email("ama@example");

    let err = h.flow.submit_identity().await.unwrap_err();

    let FlowError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.full_name.as_deref(), Some("Enter your full name"));
    assert_eq!(
        errors.phone.as_deref(),
        Some("Enter a valid 9-digit MoMo number")
    );
    assert_eq!(errors.email.as_deref(), Some("Enter a valid email address"));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_signup_uses_the_phone_the_server_returns() {
    let api = MockApi::new()
        .with_registered_phone("+233201234567")
        .with_registration_message("Code sent. It expires in 5 minutes.");
    let mut h = harness(OtpPurpose::Signup, api);
    h.flow.set_full_name("  Kofi Mensah ");
    h.flow.set_phone("24 123 4567");
    h.flow.set_email("   ");

    h.flow.submit_identity().await.unwrap();

    assert_eq!(
        h.api.calls(),
        vec![MockApiCall::Register {
            phone_number: "+233241234567".to_string(),
            full_name: "Kofi Mensah".to_string(),
            email: None,
        }]
    );
    assert_eq!(h.flow.challenge_phone(), Some("+233201234567"));
    assert_eq!(
        h.flow.status_message(),
        Some("Code sent. It expires in 5 minutes.")
    );
    assert_eq!(h.flow.seconds_remaining(), 60);
}

#[tokio::test]
async fn test_signup_field_errors_from_server() {
    let api = MockApi::new();
    api.fail(
        MockEndpoint::Register,
        ApiError::from_response(
            400,
            r#"{"phone_number": ["A user with this phone number already exists."]}"#,
        ),
    );
    let mut h = harness(OtpPurpose::Signup, api);
    h.flow.set_full_name("Kofi Mensah");
    h.flow.set_phone("24 123 4567");

    let err = h.flow.submit_identity().await.unwrap_err();

    assert!(matches!(err, FlowError::Validation(_)));
    assert_eq!(
        h.flow.errors().phone.as_deref(),
        Some("A user with this phone number already exists.")
    );
    assert_eq!(h.flow.errors().general, None);
    assert_eq!(h.flow.stage(), FlowStage::CollectingIdentity);
    assert!(h.flow.login_prompt());

    assert_eq!(h.flow.go_to_login(), Route::Login);
    assert_eq!(h.navigator.last(), Some((Route::Login, false)));
}

#[tokio::test]
async fn test_signup_server_message_without_fields_is_general() {
    let api = MockApi::new();
    api.fail(
        MockEndpoint::Register,
        ApiError::from_response(503, r#"{"detail": "Registration is paused."}"#),
    );
    let mut h = harness(OtpPurpose::Signup, api);
    h.flow.set_full_name("Kofi Mensah");
    h.flow.set_phone("24 123 4567");

    h.flow.submit_identity().await.unwrap_err();

    assert_eq!(
        h.flow.errors().general.as_deref(),
        Some("Registration is paused.")
    );
    assert_eq!(h.flow.errors().phone, None);
    assert!(!h.flow.login_prompt());
}

#[tokio::test]
async fn test_signup_verification_replaces_history() {
    let mut user = sample_user("user-2");
    user.kyc_status = KycStatus::Pending;
    let mut h = harness(OtpPurpose::Signup, MockApi::new().with_user(user));
    h.flow.set_full_name("Kofi Mensah");
    h.flow.set_phone("24 123 4567");
    h.flow.set_email("kofi@example.com");
    h.flow.submit_identity().await.unwrap();
    h.flow.set_otp("123456");

    let route = h.flow.verify().await.unwrap();

    assert_eq!(route, Route::Kyc);
    assert_eq!(h.navigator.last(), Some((Route::Kyc, true)));
    assert!(h.api.calls().contains(&MockApiCall::VerifyOtp {
        phone_number: "+233241234567".to_string(),
        code: "123456".to_string(),
        purpose: OtpPurpose::Signup,
    }));
}

#[tokio::test]
async fn test_prefill_applies_once() {
    let h = harness(OtpPurpose::Signup, MockApi::new());
    let mut flow = h.flow.with_prefill(Some("241234567"));
    assert_eq!(flow.phone(), "24 123 4567");

    assert!(!flow.apply_prefill("501234567"));
    assert_eq!(flow.phone(), "24 123 4567");
}
