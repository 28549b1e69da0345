// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter for deterministic testing.
//!
//! `MockProvider` implements [`ProviderAdapter`] with scripted send outcomes
//! and captured outbound calls for assertion in tests. It speaks Telegram's
//! webhook dialect on the inbound side, so it can stand in for the real
//! adapter across a full ingest-then-reply flow.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use relayhub_core::types::{
    Channel, Conversation, DeliveryReceipt, ProviderType, WebhookEvent,
};
use relayhub_core::{HubError, ProviderAdapter, ProviderFaultKind};
use tokio::sync::Mutex;

/// One captured outbound send.
#[derive(Debug, Clone)]
pub struct SentReply {
    pub channel_id: String,
    pub external_thread_id: String,
    pub text: String,
}

/// A mock provider adapter for testing.
///
/// Send outcomes are scripted with [`MockProvider::script_receipt`] /
/// [`MockProvider::script_fault`] and consumed in order; with nothing
/// scripted, sends succeed with a deterministic receipt.
pub struct MockProvider {
    provider: ProviderType,
    outcomes: Mutex<VecDeque<Result<DeliveryReceipt, ProviderFaultKind>>>,
    sent: Arc<Mutex<Vec<SentReply>>>,
}

impl MockProvider {
    /// A mock standing in for the Telegram adapter.
    pub fn new() -> Self {
        Self::for_provider(ProviderType::Telegram)
    }

    pub fn for_provider(provider: ProviderType) -> Self {
        Self {
            provider,
            outcomes: Mutex::new(VecDeque::new()),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a successful delivery receipt.
    pub async fn script_receipt(&self, provider_message_id: Option<&str>) {
        let raw = match provider_message_id {
            Some(id) => serde_json::json!({"ok": true, "result": {"message_id": id}}),
            None => serde_json::json!({"mocked": true}),
        };
        self.outcomes.lock().await.push_back(Ok(DeliveryReceipt {
            provider_message_id: provider_message_id.map(str::to_string),
            raw,
        }));
    }

    /// Queue a send fault.
    pub async fn script_fault(&self, kind: ProviderFaultKind) {
        self.outcomes.lock().await.push_back(Err(kind));
    }

    /// All sends captured so far.
    pub async fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider
    }

    fn normalize(&self, raw_body: &[u8]) -> Result<WebhookEvent, HubError> {
        relayhub_telegram::webhook::normalize(raw_body)
    }

    async fn send(
        &self,
        channel: &Channel,
        conversation: &Conversation,
        text: &str,
    ) -> Result<DeliveryReceipt, HubError> {
        self.sent.lock().await.push(SentReply {
            channel_id: channel.id.clone(),
            external_thread_id: conversation.external_thread_id.clone(),
            text: text.to_string(),
        });

        match self.outcomes.lock().await.pop_front() {
            Some(Ok(receipt)) => Ok(receipt),
            Some(Err(kind)) => Err(HubError::Provider {
                provider: self.provider,
                kind,
            }),
            None => Ok(DeliveryReceipt {
                provider_message_id: None,
                raw: serde_json::json!({"mocked": true}),
            }),
        }
    }
}
