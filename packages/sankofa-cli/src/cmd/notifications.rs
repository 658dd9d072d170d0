//! Notification commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use sankofa_client::AppContext;

use super::{local_time, require_user};

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List notifications, newest first
    List {
        #[arg(long)]
        refresh: bool,
    },
    /// Mark one notification as read
    Read { id: String },
    /// Mark every notification as read
    ReadAll,
}

pub async fn run(app: &AppContext, command: NotificationsCommand) -> Result<()> {
    require_user(app)?;
    let service = app.notifications();

    match command {
        NotificationsCommand::List { refresh } => {
            let mut list = service.notifications(refresh).await;
            list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if list.is_empty() {
                println!("{}", "No notifications.".dimmed());
            }
            for n in &list {
                let marker = if n.read { " ".normal() } else { "●".bright_cyan() };
                println!(
                    "{marker} {}  {}  {}",
                    local_time(n.created_at).dimmed(),
                    n.title.bold(),
                    n.id.dimmed()
                );
                if !n.body.is_empty() {
                    println!("    {}", n.body);
                }
            }
            println!("{} unread", service.unread_count().await);
        }
        NotificationsCommand::Read { id } => {
            // Populate the cache so the local view reflects the change.
            service.notifications(false).await;
            service.mark_as_read(&id).await;
            println!("{} unread", service.unread_count().await);
        }
        NotificationsCommand::ReadAll => {
            service.notifications(false).await;
            service.mark_all_as_read().await;
            println!("{}", "All caught up.".green());
        }
    }
    Ok(())
}
