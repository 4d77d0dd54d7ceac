// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-caption for attachment-only messages.
//!
//! The storefront shows these Arabic captions in the conversation list, so
//! the wording is fixed regardless of the display language.

use souq_core::{Attachment, AttachmentKind, SouqError};

const PREFIX: &str = "تم إرسال";

fn noun(kind: AttachmentKind, count: usize) -> String {
    match (kind, count) {
        (AttachmentKind::Image, 1) => "صورة".to_string(),
        (AttachmentKind::Image, n) => format!("{n} صور"),
        (AttachmentKind::Video, 1) => "فيديو".to_string(),
        (AttachmentKind::Video, n) => format!("{n} فيديوهات"),
        (AttachmentKind::File, 1) => "ملف".to_string(),
        (AttachmentKind::File, n) => format!("{n} ملفات"),
    }
}

/// Caption describing `attachments`, or `None` when there are none.
pub fn caption_for(attachments: &[Attachment]) -> Option<String> {
    let parts: Vec<String> = [AttachmentKind::Image, AttachmentKind::Video, AttachmentKind::File]
        .into_iter()
        .filter_map(|kind| {
            let count = attachments.iter().filter(|a| a.kind == kind).count();
            (count > 0).then(|| noun(kind, count))
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("{PREFIX} {}", parts.join(" و")))
}

/// Final message body: the trimmed text, or the caption when the text is blank.
///
/// Blank text without attachments is rejected.
pub fn resolve_body(text: &str, attachments: &[Attachment]) -> Result<String, SouqError> {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return Ok(trimmed.to_string());
    }
    caption_for(attachments)
        .ok_or_else(|| SouqError::Validation("message needs text or at least one attachment".into()))
}
