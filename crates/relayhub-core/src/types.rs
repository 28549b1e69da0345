// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Relayhub workspace.
//!
//! Timestamps are RFC 3339 UTC strings with millisecond precision, so the
//! lexicographic order of stored values matches chronological order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Current timestamp in the canonical storage format.
pub fn now_ts() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// External messaging providers Relayhub can ingest from.
///
/// `Messenger` is part of the data model but has no registered adapter yet;
/// dispatching a reply on a messenger channel yields `UnsupportedProvider`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Telegram,
    Messenger,
}

/// Direction of a ledger message relative to the hub.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// The authenticated caller of a tenant-scoped operation.
///
/// Produced by the gateway's auth layer from an opaque bearer token; identity
/// and role provisioning live outside this system. Every tenant-scoped query
/// takes its tenant id from here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub tenant_id: String,
    pub roles: Vec<String>,
}

/// Opaque provider-specific secret bundle attached to a channel.
///
/// Only the matching provider adapter interprets the contents (for Telegram:
/// `bot_token`, optional `webhook_secret`). Debug output is redacted so the
/// bundle can never leak through logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialBundle(serde_json::Value);

impl CredentialBundle {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// An empty bundle (`{}`).
    pub fn empty() -> Self {
        Self(serde_json::json!({}))
    }

    /// Look up a non-empty string entry in the bundle.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialBundle([redacted])")
    }
}

/// A configured connection to one external messaging provider for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub tenant_id: String,
    pub provider: ProviderType,
    pub display_name: String,
    /// Provider-side identifier of the integration (e.g. the bot username).
    /// Meaningful only within `(tenant_id, provider)`.
    pub external_id: String,
    pub credentials: CredentialBundle,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Denormalized channel fields embedded in conversation summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub id: String,
    pub provider: ProviderType,
    pub display_name: String,
}

/// Best-effort sender identity for one external chat thread.
///
/// Sparse: fields absent from a provider payload stay `None`, and the
/// resolver's merge only overwrites fields the incoming hint actually
/// carries (last write wins per field).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_username: Option<String>,
}

impl Participants {
    pub fn is_empty(&self) -> bool {
        self.external_user_id.is_none() && self.external_username.is_none()
    }
}

/// The thread-level grouping of messages for one external chat thread.
///
/// Unique per `(tenant_id, channel_id, external_thread_id)`; created lazily
/// on first contact and never deleted by the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub tenant_id: String,
    pub channel_id: String,
    pub external_thread_id: String,
    pub participants: Participants,
    pub last_message_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A conversation enriched for list views: channel snapshot plus the text of
/// the most recent message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    pub channel: ChannelSnapshot,
    pub last_message_preview: Option<String>,
}

/// One append-only ledger entry, owned by exactly one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub tenant_id: String,
    pub channel_id: String,
    pub conversation_id: String,
    pub direction: Direction,
    pub provider: ProviderType,
    /// The provider's message identifier. `None` for mocked sends.
    pub provider_message_id: Option<String>,
    pub text: String,
    /// The provider payload (webhook body or send response) verbatim, kept
    /// for audit and debugging. `None` for mocked sends.
    pub raw: Option<serde_json::Value>,
    pub created_at: String,
}

/// A normalized inbound-message event produced by a provider's webhook
/// normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInbound {
    pub external_thread_id: String,
    pub provider_message_id: String,
    pub sender: Participants,
    /// Message text; the empty string when the payload carries none.
    pub text: String,
}

/// Outcome of normalizing one raw webhook body.
///
/// `Ignored` covers recognized non-message update kinds, which must be
/// acknowledged to the provider and dropped. Malformed payloads are errors,
/// not a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Message(NormalizedInbound),
    Ignored,
}

/// Proof of a confirmed (or mocked) provider send.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    /// The provider-assigned message id; `None` for mocked sends.
    pub provider_message_id: Option<String>,
    /// The provider's response body verbatim.
    pub raw: serde_json::Value,
}
