//! Group commands.

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use console::style;
use rust_decimal::Decimal;
use sankofa_client::types::{JoinOptions, NewGroup, NewInvite};
use sankofa_client::{AppContext, SusuGroup};

use super::{cedis, local_time, require_user};

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List your groups
    List {
        /// Fetch from the server instead of the cache
        #[arg(long)]
        refresh: bool,
    },
    /// Show one group
    Show { id: String },
    /// Start a new group
    Create {
        #[arg(long)]
        name: String,
        /// Contribution per cycle in cedis
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "weekly")]
        frequency: String,
        /// First contribution date (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        description: Option<String>,
        /// Invite a member as NAME:PHONE; repeatable
        #[arg(long = "invite", value_parser = parse_invite)]
        invites: Vec<NewInvite>,
        /// List the group publicly
        #[arg(long)]
        public: bool,
        /// Let members join without approval
        #[arg(long)]
        open: bool,
    },
    /// Join a public group
    Join {
        id: String,
        #[arg(long)]
        introduction: Option<String>,
        #[arg(long)]
        auto_save: bool,
        #[arg(long)]
        no_reminders: bool,
    },
}

fn parse_invite(value: &str) -> Result<NewInvite, String> {
    let (name, phone) = value
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:PHONE, got {value:?}"))?;
    if name.trim().is_empty() || phone.trim().is_empty() {
        return Err(format!("expected NAME:PHONE, got {value:?}"));
    }
    Ok(NewInvite {
        name: name.to_string(),
        phone_number: phone.to_string(),
    })
}

pub async fn run(app: &AppContext, command: GroupsCommand) -> Result<()> {
    require_user(app)?;
    let groups = app.groups();

    match command {
        GroupsCommand::List { refresh } => {
            let list = groups.groups(refresh).await.context("Failed to load groups")?;
            if list.is_empty() {
                println!("{}", "You are not in any groups yet.".dimmed());
            }
            for group in &list {
                print_summary(group);
            }
        }
        GroupsCommand::Show { id } => {
            let group = groups
                .group(&id)
                .await?
                .ok_or_else(|| anyhow!("Group {id} not found"))?;
            print_detail(&group);

            let recent = match app.transactions().transactions(false).await {
                Ok(_) => app.transactions().recent_for_group(&group, 5).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load group activity");
                    Vec::new()
                }
            };
            if !recent.is_empty() {
                println!("\n{}", style("Recent activity").bold());
                for tx in recent {
                    println!(
                        "  {}  {:<12} {}",
                        local_time(tx.created_at).dimmed(),
                        tx.kind.label(),
                        cedis(tx.amount)
                    );
                }
            }
        }
        GroupsCommand::Create {
            name,
            amount,
            frequency,
            start_date,
            description,
            invites,
            public,
            open,
        } => {
            let created = groups
                .create_group(&NewGroup {
                    name,
                    description,
                    contribution_amount: amount,
                    frequency,
                    start_date,
                    invites,
                    requires_approval: Some(!open),
                    is_public: Some(public),
                })
                .await
                .context("Failed to create group")?;
            println!("{} Created {}", "✓".green(), style(&created.name).bold());
            print_detail(&created);
        }
        GroupsCommand::Join {
            id,
            introduction,
            auto_save,
            no_reminders,
        } => {
            let options = JoinOptions {
                introduction,
                auto_save,
                reminders_enabled: !no_reminders,
            };
            let joined = groups
                .join_group(&id, &options)
                .await
                .context("Failed to join group")?;
            println!("{} Joined {}", "✓".green(), style(&joined.name).bold());
        }
    }
    Ok(())
}

fn print_summary(group: &SusuGroup) {
    println!(
        "{}  {}  {} {}  {}/{} members",
        style(&group.id).dim(),
        style(&group.name).bold(),
        cedis(group.contribution_amount),
        group.frequency,
        group.total_members(),
        group.target_member_count
    );
}

fn print_detail(group: &SusuGroup) {
    println!("{}", style(&group.name).bold().underlined());
    if let Some(description) = &group.description {
        println!("{description}");
    }
    println!(
        "  Contribution  {} {}",
        cedis(group.contribution_amount),
        group.frequency
    );
    println!("  Pool          {}", cedis(group.total_pool()));
    println!(
        "  Members       {}/{} ({} seats left)",
        group.total_members(),
        group.target_member_count,
        group.seats_remaining()
    );
    println!("  Cycle         {} of {}", group.cycle_number, group.total_cycles);
    if let Some(date) = &group.next_payout_date {
        println!("  Next payout   {date}");
    }
    if let Some(order) = &group.payout_order {
        println!("  Payout order  {order}");
    }
    let owner = match (&group.owner_name, group.owned_by_platform) {
        (_, true) => "Sankofa".to_string(),
        (Some(name), false) => name.clone(),
        (None, false) => "-".to_string(),
    };
    println!("  Organiser     {owner}");
    if !group.member_names.is_empty() {
        println!("  {}", group.member_names.join(", ").dimmed());
    }
}
