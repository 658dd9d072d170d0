//! OTP flow controller
//!
//! Login and registration share the same two-stage machine: collect the
//! identity (phone, plus name and optional email for signup), then collect
//! the six-digit code. The purpose tag decides which endpoint starts the
//! challenge and which messages are shown.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::context::AuthContext;
use super::countdown::{Countdown, RESEND_COOLDOWN_SECS};
use crate::api::SankofaApi;
use crate::error::ClientError;
use crate::phone::{
    digits_only, format_for_display, is_valid_ghana_mobile, local_digits, mask_for_display,
    normalize_ghana_phone,
};
use crate::routes::{Navigator, Route};
use crate::types::{OtpPurpose, User};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

const OTP_LENGTH: usize = 6;

const INVALID_PHONE: &str = "Enter a valid 9-digit MoMo number";
const INVALID_NAME: &str = "Enter your full name";
const INVALID_EMAIL: &str = "Enter a valid email address";
const INVALID_CODE: &str = "Enter the 6-digit code we sent";
const NO_ACCOUNT_MARKER: &str = "no account is registered";
const EXISTING_ACCOUNT_MARKER: &str = "already exists";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    CollectingIdentity,
    AwaitingOtp,
    Authenticated,
}

/// Messages shown next to each input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub otp: Option<String>,
    pub general: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.messages().next().is_none()
    }

    /// Every message, field order first, general last.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        [
            &self.full_name,
            &self.phone,
            &self.email,
            &self.otp,
            &self.general,
        ]
        .into_iter()
        .filter_map(|message| message.as_deref())
    }

    fn summary(&self) -> String {
        self.messages().collect::<Vec<_>>().join("; ")
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FlowError {
    /// Input rejected before any network call
    #[error("{}", .0.summary())]
    Validation(FieldErrors),

    /// Server or transport failure, already mapped to a display message
    #[error("{0}")]
    Api(String),

    #[error("Not available while {0:?}")]
    WrongStage(FlowStage),

    #[error("Wait {remaining}s before requesting a new code")]
    CooldownActive { remaining: u32 },
}

/// Per-purpose fallback messages for failures that carry no server text.
struct Fallbacks {
    submit: &'static str,
    resend: &'static str,
    verify: &'static str,
}

fn fallbacks(purpose: OtpPurpose) -> Fallbacks {
    match purpose {
        OtpPurpose::Login => Fallbacks {
            submit: "Failed to send OTP. Please try again.",
            resend: "Failed to resend the code. Please try again.",
            verify: "Failed to verify OTP. Please try again.",
        },
        OtpPurpose::Signup => Fallbacks {
            submit: "We could not complete registration. Please try again.",
            resend: "We could not resend the code. Please try again.",
            verify: "We could not verify the code. Please try again.",
        },
    }
}

/// Server message for display, or `fallback` when the failure is not an API
/// answer.
fn api_message(err: &ClientError, fallback: &str) -> String {
    match err.as_api() {
        Some(api) => api.message.clone(),
        None => fallback.to_string(),
    }
}

/// Drives one login or registration attempt.
pub struct OtpFlow {
    purpose: OtpPurpose,
    auth: Arc<AuthContext>,
    api: Arc<dyn SankofaApi>,
    navigator: Arc<dyn Navigator>,

    stage: FlowStage,
    phone: String,
    full_name: String,
    email: String,
    otp: String,

    /// Normalized phone the current code was sent to.
    challenge_phone: Option<String>,
    status_message: Option<String>,
    errors: FieldErrors,
    signup_prompt: bool,
    login_prompt: bool,
    loading: bool,
    prefill_applied: bool,
    countdown: Countdown,
}

impl OtpFlow {
    pub fn new(
        purpose: OtpPurpose,
        auth: Arc<AuthContext>,
        api: Arc<dyn SankofaApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            purpose,
            auth,
            api,
            navigator,
            stage: FlowStage::CollectingIdentity,
            phone: String::new(),
            full_name: String::new(),
            email: String::new(),
            otp: String::new(),
            challenge_phone: None,
            status_message: None,
            errors: FieldErrors::default(),
            signup_prompt: false,
            login_prompt: false,
            loading: false,
            prefill_applied: false,
            countdown: Countdown::new(),
        }
    }

    /// Pre-fill the phone input, e.g. from the login screen's signup shortcut.
    pub fn with_prefill(mut self, phone: Option<&str>) -> Self {
        if let Some(phone) = phone {
            self.apply_prefill(phone);
        }
        self
    }

    /// Applies only the first time it is called. Returns whether it applied.
    pub fn apply_prefill(&mut self, phone: &str) -> bool {
        if self.prefill_applied || phone.is_empty() {
            return false;
        }
        self.phone = format_for_display(phone);
        self.prefill_applied = true;
        true
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    /// Store the phone input, regrouped for editing as the user types.
    pub fn set_phone(&mut self, value: &str) {
        self.phone = format_for_display(value);
    }

    pub fn set_full_name(&mut self, value: &str) {
        self.full_name = value.to_string();
    }

    pub fn set_email(&mut self, value: &str) {
        self.email = value.to_string();
    }

    /// Keeps at most six digits.
    pub fn set_otp(&mut self, value: &str) {
        self.otp = digits_only(value).chars().take(OTP_LENGTH).collect();
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    pub fn purpose(&self) -> OtpPurpose {
        self.purpose
    }

    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn otp(&self) -> &str {
        &self.otp
    }

    pub fn challenge_phone(&self) -> Option<&str> {
        self.challenge_phone.as_deref()
    }

    /// Challenge phone in display form.
    pub fn masked_phone(&self) -> Option<String> {
        self.challenge_phone.as_deref().map(mask_for_display)
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// True when the login failed because no account exists for the phone.
    pub fn signup_prompt(&self) -> bool {
        self.signup_prompt
    }

    /// True when registration failed because the phone already has an account.
    pub fn login_prompt(&self) -> bool {
        self.login_prompt
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn can_resend(&self) -> bool {
        self.stage == FlowStage::AwaitingOtp && self.countdown.is_expired() && !self.loading
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Validate the identity and ask the server to send a code.
    pub async fn submit_identity(&mut self) -> Result<(), FlowError> {
        self.expect_stage(FlowStage::CollectingIdentity)?;

        let errors = self.validate_identity();
        if !errors.is_empty() {
            self.errors = errors.clone();
            self.signup_prompt = false;
            self.login_prompt = false;
            return Err(FlowError::Validation(errors));
        }

        let normalized = normalize_ghana_phone(&self.phone);
        self.errors = FieldErrors::default();
        self.signup_prompt = false;
        self.login_prompt = false;
        self.status_message = None;

        self.loading = true;
        let result = self.start_challenge(&normalized).await;
        self.loading = false;

        match result {
            Ok((phone, message)) => {
                info!(purpose = %self.purpose, "OTP challenge started");
                let masked = mask_for_display(&phone);
                self.stage = FlowStage::AwaitingOtp;
                self.challenge_phone = Some(phone);
                self.otp.clear();
                self.status_message =
                    Some(message.unwrap_or_else(|| format!("We sent a code to {masked}")));
                self.countdown.start(RESEND_COOLDOWN_SECS);
                Ok(())
            }
            Err(err) => {
                warn!(purpose = %self.purpose, error = %err, "OTP challenge failed");
                self.countdown.cancel();
                self.challenge_phone = None;
                Err(self.record_submit_failure(&err))
            }
        }
    }

    /// Returns the phone the code was sent to and an optional server message.
    async fn start_challenge(
        &self,
        normalized: &str,
    ) -> crate::error::Result<(String, Option<String>)> {
        match self.purpose {
            OtpPurpose::Login => {
                self.api.request_otp(normalized, OtpPurpose::Login).await?;
                Ok((normalized.to_string(), None))
            }
            OtpPurpose::Signup => {
                let email = self.email.trim();
                let email = (!email.is_empty()).then_some(email);
                let registration = self
                    .api
                    .register(normalized, self.full_name.trim(), email)
                    .await?;
                let message = registration.message.filter(|m| !m.trim().is_empty());
                Ok((registration.phone_number, message))
            }
        }
    }

    fn validate_identity(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        if !is_valid_ghana_mobile(&self.phone) {
            errors.phone = Some(INVALID_PHONE.to_string());
        }
        if self.purpose == OtpPurpose::Signup {
            if self.full_name.trim().chars().count() < 2 {
                errors.full_name = Some(INVALID_NAME.to_string());
            }
            let email = self.email.trim();
            if !email.is_empty() && !EMAIL_RE.is_match(email) {
                errors.email = Some(INVALID_EMAIL.to_string());
            }
        }
        errors
    }

    fn record_submit_failure(&mut self, err: &ClientError) -> FlowError {
        let fallback = fallbacks(self.purpose).submit;

        let Some(api) = err.as_api() else {
            self.errors.general = Some(fallback.to_string());
            return FlowError::Api(fallback.to_string());
        };

        match self.purpose {
            OtpPurpose::Login => {
                let message = api.detail_message().unwrap_or(&api.message).to_string();
                self.signup_prompt = message.to_lowercase().contains(NO_ACCOUNT_MARKER);
                self.errors.general = Some(message.clone());
                FlowError::Api(message)
            }
            OtpPurpose::Signup => {
                let errors = FieldErrors {
                    full_name: api.field_error("full_name").map(str::to_string),
                    phone: api.field_error("phone_number").map(str::to_string),
                    email: api.field_error("email").map(str::to_string),
                    otp: None,
                    general: None,
                };
                self.login_prompt = errors
                    .phone
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase().contains(EXISTING_ACCOUNT_MARKER));
                if errors.is_empty() {
                    self.errors.general = Some(api.message.clone());
                    FlowError::Api(api.message.clone())
                } else {
                    self.errors = errors.clone();
                    FlowError::Validation(errors)
                }
            }
        }
    }

    /// Request a fresh code for the phone the last one went to.
    pub async fn resend(&mut self) -> Result<(), FlowError> {
        self.expect_stage(FlowStage::AwaitingOtp)?;
        let remaining = self.countdown.remaining();
        if remaining > 0 {
            return Err(FlowError::CooldownActive { remaining });
        }
        let Some(phone) = self.challenge_phone.clone() else {
            return Err(FlowError::WrongStage(self.stage));
        };

        self.errors.otp = None;
        self.errors.general = None;

        self.loading = true;
        let result = self.api.request_otp(&phone, self.purpose).await;
        self.loading = false;

        match result {
            Ok(()) => {
                debug!(purpose = %self.purpose, "OTP resent");
                self.status_message =
                    Some(format!("A new code was sent to {}", mask_for_display(&phone)));
                self.countdown.start(RESEND_COOLDOWN_SECS);
                Ok(())
            }
            Err(err) => {
                warn!(purpose = %self.purpose, error = %err, "OTP resend failed");
                let message = api_message(&err, fallbacks(self.purpose).resend);
                self.errors.otp = Some(message.clone());
                Err(FlowError::Api(message))
            }
        }
    }

    /// Check the code, sign in and navigate. Returns the route taken.
    pub async fn verify(&mut self) -> Result<Route, FlowError> {
        self.expect_stage(FlowStage::AwaitingOtp)?;

        let code = digits_only(&self.otp);
        if code.len() != OTP_LENGTH {
            let errors = FieldErrors {
                otp: Some(INVALID_CODE.to_string()),
                ..self.errors.clone()
            };
            self.errors = errors.clone();
            return Err(FlowError::Validation(errors));
        }

        let phone = self
            .challenge_phone
            .clone()
            .unwrap_or_else(|| normalize_ghana_phone(&self.phone));

        self.errors.otp = None;
        self.errors.general = None;

        self.loading = true;
        let result = self.sign_in(&phone, &code).await;
        self.loading = false;

        match result {
            Ok(user) => {
                self.countdown.cancel();
                let route = if user.kyc_status.requires_kyc() {
                    Route::Kyc
                } else {
                    Route::Home
                };
                info!(purpose = %self.purpose, %route, "OTP verified");
                self.navigator
                    .navigate(route.clone(), self.purpose == OtpPurpose::Signup);
                self.stage = FlowStage::Authenticated;
                self.challenge_phone = None;
                Ok(route)
            }
            Err(err) => {
                warn!(purpose = %self.purpose, error = %err, "OTP verification failed");
                let message = api_message(&err, fallbacks(self.purpose).verify);
                self.errors.otp = Some(message.clone());
                Err(FlowError::Api(message))
            }
        }
    }

    async fn sign_in(&self, phone: &str, code: &str) -> crate::error::Result<Arc<User>> {
        let verified = self.auth.login(phone, code, self.purpose).await?;
        match self.auth.refresh_user().await {
            Ok(refreshed) => Ok(refreshed),
            Err(err) => {
                warn!(error = %err, "Refresh after sign-in failed, using verified user");
                Ok(verified)
            }
        }
    }

    /// Abandon the current code and return to the identity stage.
    pub fn back(&mut self) {
        self.countdown.cancel();
        self.stage = FlowStage::CollectingIdentity;
        self.otp.clear();
        self.challenge_phone = None;
        self.status_message = None;
        self.errors = FieldErrors::default();
        self.signup_prompt = false;
        self.login_prompt = false;
    }

    /// Leave login for registration, carrying the local digits entered so far.
    pub fn go_to_signup(&self) -> Route {
        let digits = local_digits(&self.phone);
        let route = Route::Register {
            phone: (!digits.is_empty()).then_some(digits),
        };
        self.navigator.navigate(route.clone(), false);
        route
    }

    /// Leave registration for sign-in.
    pub fn go_to_login(&self) -> Route {
        self.navigator.navigate(Route::Login, false);
        Route::Login
    }

    fn expect_stage(&self, stage: FlowStage) -> Result<(), FlowError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(FlowError::WrongStage(self.stage))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL_RE.is_match("ama@example.com"));
        assert!(!EMAIL_RE.is_match("ama@example"));
        assert!(!EMAIL_RE.is_match("ama @example.com"));
        assert!(!EMAIL_RE.is_match("@example.com"));
    }

    #[test]
    fn test_field_errors_summary() {
        let errors = FieldErrors {
            phone: Some(INVALID_PHONE.to_string()),
            general: Some("Try later".to_string()),
            ..Default::default()
        };
        assert!(!errors.is_empty());
        assert_eq!(
            FlowError::Validation(errors).to_string(),
            "Enter a valid 9-digit MoMo number; Try later"
        );
        assert!(FieldErrors::default().is_empty());
    }

    #[test]
    fn test_non_api_failures_use_fallback() {
        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(
            api_message(&err, fallbacks(OtpPurpose::Login).submit),
            "Failed to send OTP. Please try again."
        );
    }
}
