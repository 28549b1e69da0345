// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound dispatch orchestration: validate → send via adapter → append to
//! ledger → touch conversation.
//!
//! The ledger records only what actually left the system: any adapter fault
//! aborts the operation before a message row exists. After a confirmed send
//! the append is ordered first and the conversation touch is best-effort; a
//! missed touch only degrades list-ordering freshness.

use std::sync::Arc;
use std::time::Duration;

use relayhub_core::types::{Direction, Message, ProviderType};
use relayhub_core::{id, types::now_ts, HubError, ProviderFaultKind};
use relayhub_storage::queries::{channels, conversations, messages};
use relayhub_storage::Database;
use tracing::{info, warn};

use crate::registry::AdapterRegistry;

/// Orchestrates one operator-initiated reply as a single logical operation.
pub struct DispatchOrchestrator {
    db: Arc<Database>,
    adapters: Arc<AdapterRegistry>,
    send_timeout: Duration,
}

impl DispatchOrchestrator {
    pub fn new(db: Arc<Database>, adapters: Arc<AdapterRegistry>, send_timeout: Duration) -> Self {
        Self {
            db,
            adapters,
            send_timeout,
        }
    }

    /// Send `text` into the conversation's external thread on behalf of the
    /// tenant, returning the persisted outbound message.
    ///
    /// Unknown and cross-tenant conversation ids are indistinguishable: both
    /// are `NotFound`. The adapter call is bounded by the configured send
    /// timeout; expiry surfaces as a provider-unreachable fault so request
    /// resources are never held indefinitely.
    pub async fn dispatch_reply(
        &self,
        tenant_id: &str,
        conversation_id: &str,
        text: &str,
    ) -> Result<Message, HubError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HubError::Validation("text must not be empty".to_string()));
        }
        if !id::is_well_formed(conversation_id) {
            return Err(HubError::Validation(
                "conversation id must be a 24-hex identifier".to_string(),
            ));
        }

        let conversation =
            conversations::get_conversation_for_tenant(&self.db, conversation_id, tenant_id)
                .await?
                .ok_or(HubError::NotFound {
                    resource: "conversation",
                })?;

        let channel =
            channels::get_channel_for_tenant(&self.db, &conversation.channel_id, tenant_id)
                .await?
                .ok_or(HubError::NotFound {
                    resource: "channel",
                })?;

        let adapter = self.adapters.get(channel.provider)?;

        let receipt = match tokio::time::timeout(
            self.send_timeout,
            adapter.send(&channel, &conversation, text),
        )
        .await
        {
            Ok(result) => result?,
            Err(_elapsed) => {
                warn!(
                    tenant = %tenant_id,
                    conversation = %conversation.id,
                    provider = %channel.provider,
                    timeout_secs = self.send_timeout.as_secs(),
                    "provider send timed out"
                );
                return Err(HubError::Provider {
                    provider: channel.provider,
                    kind: ProviderFaultKind::Unreachable,
                });
            }
        };

        // Send confirmed. Append first; the touch below is best-effort.
        let now = now_ts();
        let message = Message {
            id: id::generate(),
            tenant_id: tenant_id.to_string(),
            channel_id: channel.id.clone(),
            conversation_id: conversation.id.clone(),
            direction: Direction::Outbound,
            provider: channel.provider,
            provider_message_id: receipt.provider_message_id.clone(),
            text: text.to_string(),
            raw: Some(receipt.raw),
            created_at: now.clone(),
        };
        let stored = messages::append_message(&self.db, &message)
            .await?
            .message()
            .clone();

        if let Err(e) = conversations::touch_conversation(&self.db, &conversation.id, &now).await {
            // The message is durably sent and appended; a missed touch only
            // leaves the conversation list slightly stale.
            warn!(
                conversation = %conversation.id,
                error = %e,
                "conversation touch failed after append"
            );
        }

        info!(
            tenant = %tenant_id,
            conversation = %conversation.id,
            provider = %channel.provider,
            provider_message_id = stored.provider_message_id.as_deref().unwrap_or("<mocked>"),
            "reply dispatched"
        );
        Ok(stored)
    }

    /// Provider types this orchestrator can dispatch to.
    pub fn providers(&self) -> Vec<ProviderType> {
        self.adapters.providers()
    }
}
