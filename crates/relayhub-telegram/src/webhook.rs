// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram webhook payload normalization.
//!
//! Pure parsing, no I/O: a raw update body in, a normalized inbound event
//! out. Telegram delivers many update kinds (callback queries, chat member
//! changes, polls); everything that is not a `message` or `edited_message`
//! must be acknowledged and dropped, not treated as an error.

use relayhub_core::types::{NormalizedInbound, Participants, WebhookEvent};
use relayhub_core::HubError;
use serde::Deserialize;

/// Header Telegram sends when a webhook was registered with a secret token.
pub const WEBHOOK_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// The subset of Telegram's `Update` object the hub cares about.
#[derive(Debug, Deserialize)]
struct TgUpdate {
    message: Option<TgMessage>,
    edited_message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: Option<i64>,
    chat: Option<TgChat>,
    from: Option<TgUser>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    id: Option<i64>,
    username: Option<String>,
}

/// Normalize a raw Telegram webhook body.
///
/// Returns `Ignored` for recognized non-message updates. A body that is not
/// JSON, or a message update missing its chat id or message id, is a
/// validation error (the provider contract was violated).
pub fn normalize(raw_body: &[u8]) -> Result<WebhookEvent, HubError> {
    let update: TgUpdate = serde_json::from_slice(raw_body)
        .map_err(|e| HubError::Validation(format!("unparseable telegram update: {e}")))?;

    // `edited_message` redeliveries thread exactly like the original send.
    let Some(message) = update.message.or(update.edited_message) else {
        return Ok(WebhookEvent::Ignored);
    };

    let external_thread_id = message
        .chat
        .as_ref()
        .and_then(|chat| chat.id)
        .map(|id| id.to_string())
        .ok_or_else(|| HubError::Validation("telegram update missing chat.id".to_string()))?;

    let provider_message_id = message
        .message_id
        .map(|id| id.to_string())
        .ok_or_else(|| HubError::Validation("telegram update missing message_id".to_string()))?;

    let sender = match message.from {
        Some(user) => Participants {
            external_user_id: user.id.map(|id| id.to_string()),
            external_username: user.username,
        },
        None => Participants::default(),
    };

    Ok(WebhookEvent::Message(NormalizedInbound {
        external_thread_id,
        provider_message_id,
        sender,
        text: message.text.unwrap_or_default(),
    }))
}
