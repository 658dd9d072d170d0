//! Subcommand implementations.

pub mod auth;
pub mod groups;
pub mod notifications;
pub mod transactions;

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use sankofa_client::{AppContext, User};

/// Amount in Ghana cedis, two decimals.
pub fn cedis(amount: Decimal) -> String {
    format!("GH₵{:.2}", amount)
}

pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d %b %Y %H:%M").to_string()
}

/// The signed-in member, or an error telling the user how to sign in.
pub fn require_user(app: &AppContext) -> Result<Arc<User>> {
    match app.auth().user() {
        Some(user) => Ok(user),
        None => bail!("Not signed in. Run `sankofa login` first."),
    }
}
