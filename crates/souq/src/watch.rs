// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `souq watch`: follow a conversation or the inbox until interrupted.

use std::time::Duration;

use clap::Args;
use souq_core::SouqError;
use souq_support::{ChatPoller, ChatSnapshot, PollScope};

use crate::context::AppContext;
use crate::output;
use crate::shutdown;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Follow one customer's conversation instead of the inbox.
    #[arg(long)]
    customer: Option<String>,
    /// Poll interval in seconds; defaults to `chat.poll_interval_secs`.
    #[arg(long)]
    interval: Option<u64>,
}

fn render(snapshot: &ChatSnapshot, scope: &PollScope, ctx: &AppContext, use_color: bool) {
    let language = ctx.settings.current().language;
    let refreshed = snapshot
        .refreshed_at
        .map(output::format_time)
        .unwrap_or_else(|| "-".to_string());
    println!();
    match scope {
        PollScope::Customer(id) => {
            println!("  {id}  refreshed {refreshed}");
            for message in &snapshot.messages {
                output::print_message(message, use_color);
            }
        }
        PollScope::Inbox => {
            println!(
                "  inbox  refreshed {refreshed}  unread {}",
                snapshot.unread()
            );
        }
    }
    for session in &snapshot.sessions {
        output::print_session(session, language, use_color);
    }
}

pub async fn run_watch(args: WatchArgs, ctx: &AppContext, use_color: bool) -> Result<(), SouqError> {
    let scope = match args.customer {
        Some(id) => PollScope::Customer(id),
        None => PollScope::Inbox,
    };
    let secs = args.interval.unwrap_or(ctx.config.chat.poll_interval_secs);
    if secs == 0 {
        return Err(SouqError::Validation("poll interval must be at least 1 second".into()));
    }

    let cancel = shutdown::install_signal_handler();
    let poller = ChatPoller::new(
        ctx.support.clone(),
        scope.clone(),
        Duration::from_secs(secs),
        ctx.bus.clone(),
    );
    let (mut snapshots, handle) = poller.spawn(cancel.clone());

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&snapshot, &scope, ctx, use_color);
            }
            _ = cancel.cancelled() => break,
        }
    }

    cancel.cancel();
    handle
        .await
        .map_err(|e| SouqError::Internal(format!("poller task failed: {e}")))?;
    Ok(())
}
