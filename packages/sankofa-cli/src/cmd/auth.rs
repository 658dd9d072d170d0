//! Login, registration and session commands.

use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use sankofa_client::phone::{local_digits, mask_for_display};
use sankofa_client::{
    AppContext, Config, FlowError, FlowStage, Navigator, OtpFlow, OtpPurpose, Route,
};

use super::{cedis, local_time};
use crate::navigator::TerminalNavigator;

/// Values given on the command line; asked for interactively when missing.
#[derive(Debug, Default)]
pub struct Preset {
    pub phone: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

enum Outcome {
    SignedIn(Route),
    /// Login found no account; carry the local digits into registration.
    SwitchToSignup(Option<String>),
    /// Registration found an existing account for the phone.
    SwitchToLogin(Option<String>),
}

pub async fn login(app: &AppContext, config: &Config, phone: Option<String>) -> Result<()> {
    if app.auth().is_authenticated() {
        println!("{}", "Already signed in.".yellow());
        return whoami(app);
    }

    let mut flow = app.login_flow(Arc::new(TerminalNavigator::new()));
    let preset = Preset {
        phone,
        ..Default::default()
    };

    match drive(&mut flow, preset).await? {
        Outcome::SignedIn(route) => finish(app, config, &route),
        Outcome::SwitchToSignup(phone) => {
            register(
                app,
                config,
                Preset {
                    phone,
                    ..Default::default()
                },
            )
            .await
        }
        Outcome::SwitchToLogin(_) => bail!("Sign-in did not complete"),
    }
}

pub async fn register(app: &AppContext, config: &Config, preset: Preset) -> Result<()> {
    let mut flow = app.signup_flow(
        Arc::new(TerminalNavigator::new()),
        preset.phone.as_deref(),
    );

    match drive(&mut flow, preset).await? {
        Outcome::SignedIn(route) => finish(app, config, &route),
        Outcome::SwitchToSignup(_) => bail!("Registration did not complete"),
        // Boxed: login can lead back here through the signup shortcut.
        Outcome::SwitchToLogin(phone) => Box::pin(login(app, config, phone)).await,
    }
}

pub async fn logout(app: &AppContext) -> Result<()> {
    app.logout().await;
    println!("{}", "Signed out.".green());
    TerminalNavigator::new().navigate(Route::Landing, true);
    Ok(())
}

pub fn whoami(app: &AppContext) -> Result<()> {
    let Some(user) = app.auth().user() else {
        println!("{}", "Not signed in.".yellow());
        return Ok(());
    };

    println!("{}", style(&user.full_name).bold());
    println!("  Phone   {}", mask_for_display(&user.phone_number));
    if let Some(email) = &user.email {
        println!("  Email   {email}");
    }
    let kyc = user.kyc_status.label();
    let kyc = if user.kyc_status.requires_kyc() {
        kyc.yellow()
    } else {
        kyc.green()
    };
    println!("  KYC     {kyc}");
    match user.wallet_updated_at {
        Some(at) => println!(
            "  Wallet  {} (as of {})",
            cedis(user.wallet_balance),
            local_time(at)
        ),
        None => println!("  Wallet  {}", cedis(user.wallet_balance)),
    }
    Ok(())
}

fn finish(app: &AppContext, config: &Config, route: &Route) -> Result<()> {
    println!("{}", "Signed in.".bright_green().bold());
    if *route == Route::Kyc {
        println!(
            "{}",
            "Your identity check is not complete yet. Finish KYC to start saving.".yellow()
        );
    }
    if config.session_file.is_none() {
        println!(
            "{}",
            "Session kept in memory only. Set SANKOFA_SESSION_FILE or --session-file to stay signed in."
                .dimmed()
        );
    }
    whoami(app)
}

/// Run one flow to completion, prompting for whatever is missing.
async fn drive(flow: &mut OtpFlow, mut preset: Preset) -> Result<Outcome> {
    loop {
        match flow.stage() {
            FlowStage::CollectingIdentity => {
                prompt_identity(flow, &mut preset)?;
                match flow.submit_identity().await {
                    Ok(()) => {}
                    Err(FlowError::Validation(_)) => {
                        print_errors(flow);
                        if flow.login_prompt() && offer_login()? {
                            flow.go_to_login();
                            let digits = local_digits(flow.phone());
                            return Ok(Outcome::SwitchToLogin(
                                (!digits.is_empty()).then_some(digits),
                            ));
                        }
                    }
                    Err(err) => {
                        println!("{} {err}", "✗".red());
                        if flow.signup_prompt() && offer_signup()? {
                            if let Route::Register { phone } = flow.go_to_signup() {
                                return Ok(Outcome::SwitchToSignup(phone));
                            }
                        }
                        if !retry()? {
                            bail!("{err}");
                        }
                    }
                }
            }
            FlowStage::AwaitingOtp => {
                if let Some(status) = flow.status_message() {
                    println!("{} {status}", "✓".green());
                }
                let answer: String = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt("Verification code (r = resend, b = back)")
                    .interact_text()?;

                match answer.trim() {
                    "r" => match flow.resend().await {
                        Ok(()) => {}
                        Err(FlowError::CooldownActive { remaining }) => {
                            println!("{}", format!("Resend available in {remaining}s").yellow());
                        }
                        Err(_) => print_errors(flow),
                    },
                    "b" => flow.back(),
                    code => {
                        flow.set_otp(code);
                        if let Ok(route) = flow.verify().await {
                            return Ok(Outcome::SignedIn(route));
                        }
                        print_errors(flow);
                    }
                }
            }
            FlowStage::Authenticated => bail!("Flow already completed"),
        }
    }
}

fn prompt_identity(flow: &mut OtpFlow, preset: &mut Preset) -> Result<()> {
    let theme = ColorfulTheme::default();

    if flow.purpose() == OtpPurpose::Signup {
        let name = match preset.name.take() {
            Some(name) => name,
            None => Input::with_theme(&theme)
                .with_prompt("Full name")
                .with_initial_text(flow.full_name())
                .interact_text()?,
        };
        flow.set_full_name(&name);
    }

    match preset.phone.take() {
        Some(phone) => set_preset_phone(flow, &phone),
        None => {
            let phone: String = Input::with_theme(&theme)
                .with_prompt("Mobile number +233")
                .with_initial_text(flow.phone())
                .interact_text()?;
            flow.set_phone(&phone);
        }
    }

    if flow.purpose() == OtpPurpose::Signup {
        let email = match preset.email.take() {
            Some(email) => email,
            None => Input::with_theme(&theme)
                .with_prompt("Email (optional)")
                .with_initial_text(flow.email())
                .allow_empty(true)
                .interact_text()?,
        };
        flow.set_email(&email);
    }

    Ok(())
}

/// Flags may carry a full `0…` or `+233…` number; the input wants the local part.
fn set_preset_phone(flow: &mut OtpFlow, phone: &str) {
    flow.set_phone(&local_digits(phone));
}

fn print_errors(flow: &OtpFlow) {
    for message in flow.errors().messages() {
        println!("{} {message}", "✗".red());
    }
}

fn offer_signup() -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Create a Sankofa account instead?")
        .default(true)
        .interact()?)
}

fn offer_login() -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Sign in with this number instead?")
        .default(true)
        .interact()?)
}

fn retry() -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Try again?")
        .default(true)
        .interact()?)
}
