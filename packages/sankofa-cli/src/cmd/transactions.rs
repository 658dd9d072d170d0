//! Transaction commands.

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::{ColoredString, Colorize};
use sankofa_client::{AppContext, Transaction, TransactionStatus, TransactionType};

use super::{cedis, local_time, require_user};

#[derive(Debug, Subcommand)]
pub enum TransactionsCommand {
    /// List wallet and group transactions
    List {
        #[arg(long)]
        refresh: bool,
    },
    /// Show one transaction
    Show { id: String },
}

pub async fn run(app: &AppContext, command: TransactionsCommand) -> Result<()> {
    require_user(app)?;
    let transactions = app.transactions();

    match command {
        TransactionsCommand::List { refresh } => {
            let list = transactions
                .transactions(refresh)
                .await
                .context("Failed to load transactions")?;
            if list.is_empty() {
                println!("{}", "No transactions yet.".dimmed());
            }
            for tx in &list {
                println!(
                    "{}  {}  {:<12} {:>12}  {}",
                    local_time(tx.created_at).dimmed(),
                    tx.id.dimmed(),
                    tx.kind.label(),
                    signed_amount(tx),
                    status(tx.status)
                );
            }
        }
        TransactionsCommand::Show { id } => {
            let tx = transactions
                .transaction(&id)
                .await?
                .ok_or_else(|| anyhow!("Transaction {id} not found"))?;
            println!("{} {}", tx.kind.label().bold(), signed_amount(&tx));
            println!("  Status        {}", status(tx.status));
            if let Some(fee) = tx.fee {
                println!("  Fee           {}", cedis(fee));
            }
            for (label, value) in [
                ("Counterparty", &tx.counterparty),
                ("Channel", &tx.channel),
                ("Reference", &tx.reference),
                ("Description", &tx.description),
            ] {
                if let Some(value) = value {
                    println!("  {label:<13} {value}");
                }
            }
            println!("  Date          {}", local_time(tx.created_at));
        }
    }
    Ok(())
}

/// Money in is positive, money out negative.
fn signed_amount(tx: &Transaction) -> ColoredString {
    match tx.kind {
        TransactionType::Deposit | TransactionType::Payout => {
            format!("+{}", cedis(tx.amount)).green()
        }
        _ => format!("-{}", cedis(tx.amount)).normal(),
    }
}

fn status(status: TransactionStatus) -> ColoredString {
    match status {
        TransactionStatus::Completed => "completed".green(),
        TransactionStatus::Pending => "pending".yellow(),
        TransactionStatus::Failed => "failed".red(),
        TransactionStatus::Cancelled => "cancelled".dimmed(),
    }
}
