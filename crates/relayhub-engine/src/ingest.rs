// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound ingestion pipeline: webhook body → normalized event → resolved
//! conversation → ledger append.
//!
//! The tenant for every write comes from the resolved channel, never from
//! the payload. Redeliveries dedup against the ledger's
//! `(tenant, channel, provider message id)` constraint instead of producing
//! duplicate rows.

use std::sync::Arc;

use relayhub_core::types::{Direction, Message, ProviderType, WebhookEvent};
use relayhub_core::{id, types::now_ts, HubError};
use relayhub_storage::queries::{channels, messages};
use relayhub_storage::Database;
use tracing::{info, warn};

use crate::registry::AdapterRegistry;
use crate::resolver::ConversationResolver;

/// Credential key enabling webhook authenticity checks for a channel.
pub const WEBHOOK_SECRET_KEY: &str = "webhook_secret";

/// Outcome of ingesting one webhook delivery.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// The message is durably in the ledger.
    Accepted {
        message: Message,
        /// `true` when this delivery was a redelivery of an already-ingested
        /// event and no new row was written.
        deduplicated: bool,
    },
    /// A recognized non-message update; acknowledged and dropped.
    Ignored,
}

/// The webhook ingestion pipeline.
pub struct IngestPipeline {
    db: Arc<Database>,
    adapters: Arc<AdapterRegistry>,
    resolver: ConversationResolver,
}

impl IngestPipeline {
    pub fn new(db: Arc<Database>, adapters: Arc<AdapterRegistry>) -> Self {
        let resolver = ConversationResolver::new(db.clone());
        Self {
            db,
            adapters,
            resolver,
        }
    }

    /// Ingest one raw webhook delivery addressed to `channel_id`.
    ///
    /// `secret_header` is the provider's authenticity header, when present
    /// on the request. Channels with a configured `webhook_secret` reject
    /// deliveries that do not match it; channels without one accept
    /// unauthenticated deliveries.
    pub async fn ingest(
        &self,
        provider: ProviderType,
        channel_id: &str,
        raw_body: &[u8],
        secret_header: Option<&str>,
    ) -> Result<IngestOutcome, HubError> {
        // Path data: shape-check before any lookup.
        if !id::is_well_formed(channel_id) {
            return Err(HubError::Validation(
                "channel id must be a 24-hex identifier".to_string(),
            ));
        }

        let channel = channels::get_channel(&self.db, channel_id)
            .await?
            .filter(|c| c.is_active && c.provider == provider)
            .ok_or(HubError::NotFound {
                resource: "channel",
            })?;

        if let Some(expected) = channel.credentials.get_str(WEBHOOK_SECRET_KEY) {
            let presented = secret_header.unwrap_or("");
            if !constant_time_eq(presented, expected) {
                warn!(channel = %channel.id, "webhook secret mismatch, delivery rejected");
                return Err(HubError::Unauthorized(
                    "webhook secret mismatch".to_string(),
                ));
            }
        }

        let adapter = self.adapters.get(provider)?;
        let inbound = match adapter.normalize(raw_body)? {
            WebhookEvent::Ignored => {
                info!(channel = %channel.id, provider = %provider, "non-message update ignored");
                return Ok(IngestOutcome::Ignored);
            }
            WebhookEvent::Message(inbound) => inbound,
        };

        // The channel, not the payload, establishes the tenant.
        let conversation = self
            .resolver
            .resolve(
                &channel.tenant_id,
                &channel.id,
                &inbound.external_thread_id,
                &inbound.sender,
            )
            .await?;

        let message = Message {
            id: id::generate(),
            tenant_id: channel.tenant_id.clone(),
            channel_id: channel.id.clone(),
            conversation_id: conversation.id.clone(),
            direction: Direction::Inbound,
            provider,
            provider_message_id: Some(inbound.provider_message_id.clone()),
            text: inbound.text.clone(),
            // normalize() already proved the body is JSON.
            raw: serde_json::from_slice(raw_body).ok(),
            created_at: now_ts(),
        };

        let outcome = messages::append_message(&self.db, &message).await?;
        let deduplicated = outcome.is_deduplicated();
        let stored = outcome.message().clone();

        info!(
            tenant = %stored.tenant_id,
            channel = %stored.channel_id,
            conversation = %stored.conversation_id,
            provider_message_id = %inbound.provider_message_id,
            deduplicated,
            "inbound message ingested"
        );

        Ok(IngestOutcome::Accepted {
            message: stored,
            deduplicated,
        })
    }
}

/// Constant-time string comparison to prevent timing side channels on the
/// webhook secret. Length is not treated as secret.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
