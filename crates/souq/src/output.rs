// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering shared by the subcommands.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use souq_core::{Customer, Direction, Language, LoginAttempt, Message, Session, SessionStatus, SouqError};

pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn status_label(status: SessionStatus, language: Language, use_color: bool) -> String {
    let label = status.label(language);
    if !use_color {
        return label.to_string();
    }
    match status {
        SessionStatus::Waiting => label.yellow().to_string(),
        SessionStatus::Active => label.green().to_string(),
        SessionStatus::Closed => label.dimmed().to_string(),
    }
}

pub fn print_message(message: &Message, use_color: bool) {
    let who = match message.direction {
        Direction::Customer => "customer",
        Direction::Support => "support",
    };
    let who = if use_color {
        match message.direction {
            Direction::Customer => who.cyan().to_string(),
            Direction::Support => who.magenta().to_string(),
        }
    } else {
        who.to_string()
    };
    let read = if message.direction == Direction::Customer && !message.read {
        " (unread)"
    } else {
        ""
    };
    println!(
        "  [{}] {who}{read} {}  id={}",
        format_time(message.created_at),
        message.body,
        message.id
    );
    for attachment in &message.attachments {
        let name = attachment.name.as_deref().unwrap_or("-");
        let url = if attachment.url.starts_with("data:") {
            "(inline)"
        } else {
            attachment.url.as_str()
        };
        println!("      {} {name} {url}", attachment.kind);
    }
    if let Some(reply) = &message.reply {
        let label = if use_color {
            "reply".magenta().to_string()
        } else {
            "reply".to_string()
        };
        println!("      ↳ {label} [{}] {}", format_time(reply.replied_at), reply.body);
    }
}

pub fn print_session(session: &Session, language: Language, use_color: bool) {
    println!(
        "  {:<38} {:<14} unread={:<4} last={}",
        session.customer_id,
        status_label(session.status, language, use_color),
        session.unread_count,
        format_time(session.last_activity)
    );
}

pub fn print_customer(customer: &Customer, use_color: bool) {
    let mut flags = Vec::new();
    if customer.blocked {
        flags.push(if use_color {
            "blocked".red().to_string()
        } else {
            "blocked".to_string()
        });
    }
    if customer.online {
        flags.push(if use_color {
            "online".green().to_string()
        } else {
            "online".to_string()
        });
    }
    let last_seen = customer
        .last_seen
        .map(format_time)
        .unwrap_or_else(|| "never".to_string());
    println!(
        "  {:<38} {:<32} last_seen={last_seen} {}",
        customer.id,
        customer.email,
        flags.join(" ")
    );
}

pub fn print_attempt(attempt: &LoginAttempt, use_color: bool) {
    let outcome = match (attempt.success, use_color) {
        (true, true) => "ok".green().to_string(),
        (false, true) => "failed".red().to_string(),
        (true, false) => "ok".to_string(),
        (false, false) => "failed".to_string(),
    };
    println!(
        "  [{}] {:<32} {outcome} credential={}",
        format_time(attempt.created_at),
        attempt.email,
        attempt.credential
    );
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), SouqError> {
    let json = serde_json::to_string_pretty(value).map_err(SouqError::serialization)?;
    println!("{json}");
    Ok(())
}

pub fn print_error(error: &SouqError, use_color: bool) {
    if use_color {
        eprintln!("{} {error}", "error:".red().bold());
    } else {
        eprintln!("error: {error}");
    }
}
