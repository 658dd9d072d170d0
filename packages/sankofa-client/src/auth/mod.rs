//! Authentication: current-user state, the shared OTP flow and its resend
//! cooldown.

pub mod context;
pub mod countdown;
pub mod flow;

pub use context::AuthContext;
pub use countdown::{Countdown, RESEND_COOLDOWN_SECS};
pub use flow::{FieldErrors, FlowError, FlowStage, OtpFlow};
