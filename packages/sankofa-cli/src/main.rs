//! `sankofa` - terminal shell for the Sankofa cooperative savings platform.

mod cmd;
mod navigator;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sankofa_client::{AppContext, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cmd::{groups::GroupsCommand, notifications::NotificationsCommand, transactions::TransactionsCommand};

#[derive(Debug, Parser)]
#[command(name = "sankofa", version, about = "Sankofa susu savings from the terminal")]
struct Cli {
    /// API base URL (overrides SANKOFA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session file (overrides SANKOFA_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Use the offline demo backend (code 123456)
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with your MoMo number and a one-time code
    Login {
        #[arg(long)]
        phone: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in member
    Whoami,
    #[command(subcommand)]
    Groups(GroupsCommand),
    #[command(subcommand)]
    Transactions(TransactionsCommand),
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = Config::from_env().context("Failed to load configuration")?;
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(path) = &self.session_file {
            config.session_file = Some(path.clone());
        }
        if self.demo {
            config.demo_mode = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,sankofa_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;
    tracing::debug!(api_url = %config.api_url, demo = config.demo_mode, "Configuration loaded");

    let app = AppContext::from_config(&config).context("Failed to initialize client")?;
    app.bootstrap().await;

    match cli.command {
        Command::Login { phone } => cmd::auth::login(&app, &config, phone).await,
        Command::Register { phone, name, email } => {
            cmd::auth::register(&app, &config, cmd::auth::Preset { phone, name, email }).await
        }
        Command::Logout => cmd::auth::logout(&app).await,
        Command::Whoami => cmd::auth::whoami(&app),
        Command::Groups(command) => cmd::groups::run(&app, command).await,
        Command::Transactions(command) => cmd::transactions::run(&app, command).await,
        Command::Notifications(command) => cmd::notifications::run(&app, command).await,
    }
}
