// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Souq - storefront customer-support chat.
//!
//! This is the binary entry point. Every subcommand loads the layered
//! configuration, opens the configured backend, and runs one operation.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod context;
mod customer;
mod doctor;
mod output;
mod settings;
mod shutdown;
mod watch;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use souq_config::model::SouqConfig;
use souq_core::SouqError;

use crate::context::AppContext;

/// Souq - storefront customer-support chat.
#[derive(Parser, Debug)]
#[command(name = "souq", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Register, log in, and administer customers.
    Customer {
        #[command(subcommand)]
        action: customer::CustomerCommand,
    },
    /// Send messages and manage support sessions.
    Chat {
        #[command(subcommand)]
        action: chat::ChatCommand,
    },
    /// Poll for new messages until interrupted.
    Watch(watch::WatchArgs),
    /// Show storefront settings.
    Settings {
        #[command(subcommand)]
        action: settings::SettingsCommand,
    },
    /// Check configuration and backend health.
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => souq_config::load_and_validate_path(path),
        None => souq_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            souq_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    init_tracing(&config.app.log_level);

    let use_color = !cli.plain && std::io::stdout().is_terminal();
    if let Err(e) = run(cli.command, config, use_color).await {
        output::print_error(&e, use_color);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: SouqConfig, use_color: bool) -> Result<(), SouqError> {
    match command {
        Commands::Doctor => doctor::run_doctor(&config, use_color).await,
        Commands::Settings { action } => settings::run_settings(action, &config, use_color),
        Commands::Customer { action } => {
            let ctx = AppContext::open(config).await?;
            let result = customer::run_customer(action, &ctx, use_color).await;
            ctx.close().await?;
            result
        }
        Commands::Chat { action } => {
            let ctx = AppContext::open(config).await?;
            let result = chat::run_chat(action, &ctx, use_color).await;
            ctx.close().await?;
            result
        }
        Commands::Watch(args) => {
            let ctx = AppContext::open(config).await?;
            let result = watch::run_watch(args, &ctx, use_color).await;
            ctx.close().await?;
            result
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides `app.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("souq={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_chat_command() {
        let cli = Cli::try_parse_from([
            "souq", "--plain", "chat", "send", "--customer", "c1", "--text", "مرحبا",
        ])
        .unwrap();
        assert!(cli.plain);
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = souq_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.app.store_name, "souq");
        assert_eq!(config.chat.poll_interval_secs, 5);
    }
}
