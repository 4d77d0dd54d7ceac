// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `souq customer` subcommands.

use clap::Subcommand;
use colored::Colorize;
use souq_core::SouqError;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// Create a customer account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        credential: String,
    },
    /// Check credentials and mark the customer online.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        credential: String,
    },
    /// List customers, oldest first.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Block a customer from logging in and sending messages.
    Block { id: String },
    /// Lift a block.
    Unblock { id: String },
    /// Delete a customer with their messages and session.
    Delete { id: String },
    /// Show recent login attempts, newest first.
    Attempts {
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub async fn run_customer(
    command: CustomerCommand,
    ctx: &AppContext,
    use_color: bool,
) -> Result<(), SouqError> {
    match command {
        CustomerCommand::Register { email, credential } => {
            let customer = ctx.accounts.register(&email, &credential).await?;
            println!("registered {} ({})", customer.email, customer.id);
        }
        CustomerCommand::Login { email, credential } => {
            let customer = ctx.accounts.login(&email, &credential).await?;
            if use_color {
                println!("{} {} ({})", "logged in".green(), customer.email, customer.id);
            } else {
                println!("logged in {} ({})", customer.email, customer.id);
            }
        }
        CustomerCommand::List { json } => {
            let customers = ctx.accounts.list_customers().await?;
            if json {
                // Credential hashes never leave the store.
                let rows: Vec<serde_json::Value> = customers
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "id": c.id,
                            "email": c.email,
                            "verified": c.verified,
                            "blocked": c.blocked,
                            "online": c.online,
                            "last_seen": c.last_seen,
                            "created_at": c.created_at,
                        })
                    })
                    .collect();
                return output::print_json(&rows);
            }
            if customers.is_empty() {
                println!("no customers");
            }
            for customer in &customers {
                output::print_customer(customer, use_color);
            }
        }
        CustomerCommand::Block { id } => {
            ctx.accounts.set_blocked(&id, true).await?;
            println!("blocked {id}");
        }
        CustomerCommand::Unblock { id } => {
            ctx.accounts.set_blocked(&id, false).await?;
            println!("unblocked {id}");
        }
        CustomerCommand::Delete { id } => {
            ctx.accounts.delete_customer(&id).await?;
            println!("deleted {id}");
        }
        CustomerCommand::Attempts { limit } => {
            let attempts = ctx.accounts.list_login_attempts(limit).await?;
            if attempts.is_empty() {
                println!("no login attempts");
            }
            for attempt in &attempts {
                output::print_attempt(attempt, use_color);
            }
        }
    }
    Ok(())
}
