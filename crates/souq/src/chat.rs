// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `souq chat` subcommands.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use souq_core::{Attachment, SessionStatus, SouqError};
use souq_support::Delivery;

use crate::context::AppContext;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum ChatCommand {
    /// Send a message as the customer.
    Send {
        #[arg(long)]
        customer: String,
        /// Message text; may be empty when attachments are given.
        #[arg(long, default_value = "")]
        text: String,
        /// File to upload and attach. Repeatable.
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },
    /// Send a support message into the customer's conversation.
    Reply {
        #[arg(long)]
        customer: String,
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },
    /// Answer a customer message inline.
    ReplyInline {
        #[arg(long)]
        message: String,
        #[arg(long)]
        text: String,
    },
    /// Print a customer's conversation, oldest first.
    History {
        #[arg(long)]
        customer: String,
        #[arg(long)]
        json: bool,
    },
    /// List sessions by most recent activity.
    Sessions {
        /// Only show sessions with this status (waiting, active, closed).
        #[arg(long)]
        status: Option<SessionStatus>,
        #[arg(long)]
        json: bool,
    },
    /// Mark a customer's messages read.
    Read {
        #[arg(long)]
        customer: String,
    },
    /// Close a session.
    Close {
        #[arg(long)]
        customer: String,
    },
    /// Reopen a closed session.
    Reopen {
        #[arg(long)]
        customer: String,
    },
    /// Recompute a session's unread counter from its messages.
    Repair {
        #[arg(long)]
        customer: String,
    },
    /// Upload a file and print the attachment URL.
    Upload {
        #[arg(long)]
        customer: String,
        #[arg(long)]
        file: PathBuf,
    },
}

/// MIME type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

async fn upload_file(ctx: &AppContext, customer_id: &str, path: &Path) -> Result<Attachment, SouqError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        SouqError::Validation(format!("cannot read {}: {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    ctx.support
        .upload_attachment(customer_id, &file_name, content_type_for(path), bytes)
        .await
}

async fn upload_all(
    ctx: &AppContext,
    customer_id: &str,
    paths: &[PathBuf],
) -> Result<Vec<Attachment>, SouqError> {
    let mut attachments = Vec::with_capacity(paths.len());
    for path in paths {
        attachments.push(upload_file(ctx, customer_id, path).await?);
    }
    Ok(attachments)
}

fn print_delivery(delivery: &Delivery, ctx: &AppContext, use_color: bool) {
    output::print_message(&delivery.message, use_color);
    output::print_session(&delivery.session, ctx.config.app.language, use_color);
}

pub async fn run_chat(command: ChatCommand, ctx: &AppContext, use_color: bool) -> Result<(), SouqError> {
    let language = ctx.config.app.language;
    match command {
        ChatCommand::Send {
            customer,
            text,
            attachments,
        } => {
            let attachments = upload_all(ctx, &customer, &attachments).await?;
            let delivery = ctx
                .support
                .send_customer_message(&customer, &text, attachments)
                .await?;
            print_delivery(&delivery, ctx, use_color);
        }
        ChatCommand::Reply {
            customer,
            text,
            attachments,
        } => {
            let attachments = upload_all(ctx, &customer, &attachments).await?;
            let delivery = ctx
                .support
                .send_support_message(&customer, &text, attachments)
                .await?;
            print_delivery(&delivery, ctx, use_color);
        }
        ChatCommand::ReplyInline { message, text } => {
            let delivery = ctx.support.reply_inline(&message, &text).await?;
            print_delivery(&delivery, ctx, use_color);
        }
        ChatCommand::History { customer, json } => {
            let messages = ctx.support.conversation(&customer).await?;
            if json {
                return output::print_json(&messages);
            }
            if messages.is_empty() {
                println!("no messages");
            }
            for message in &messages {
                output::print_message(message, use_color);
            }
        }
        ChatCommand::Sessions { status, json } => {
            let sessions = ctx.support.list_sessions(status).await?;
            if json {
                return output::print_json(&sessions);
            }
            if sessions.is_empty() {
                println!("no sessions");
            }
            for session in &sessions {
                output::print_session(session, language, use_color);
            }
            println!("  total unread: {}", ctx.support.total_unread().await?);
        }
        ChatCommand::Read { customer } => {
            let session = ctx.support.mark_read(&customer).await?;
            output::print_session(&session, language, use_color);
        }
        ChatCommand::Close { customer } => {
            let session = ctx.support.close(&customer).await?;
            output::print_session(&session, language, use_color);
        }
        ChatCommand::Reopen { customer } => {
            let session = ctx.support.reopen(&customer).await?;
            output::print_session(&session, language, use_color);
        }
        ChatCommand::Repair { customer } => {
            let session = ctx.support.repair(&customer).await?;
            output::print_session(&session, language, use_color);
        }
        ChatCommand::Upload { customer, file } => {
            let attachment = upload_file(ctx, &customer, &file).await?;
            println!("{} {}", attachment.kind, attachment.url);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("invoice.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }
}
