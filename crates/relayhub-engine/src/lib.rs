// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation threading and message routing engine.
//!
//! This crate coordinates the pieces the other crates provide: the adapter
//! registry (provider polymorphism), the conversation resolver (thread-key
//! identity), the inbound ingestion pipeline (webhook → ledger) and the
//! outbound dispatch orchestrator (operator reply → provider → ledger).

pub mod dispatch;
pub mod ingest;
pub mod registry;
pub mod resolver;

pub use dispatch::DispatchOrchestrator;
pub use ingest::{IngestOutcome, IngestPipeline};
pub use registry::AdapterRegistry;
pub use resolver::ConversationResolver;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared test support: a provider adapter with scripted send outcomes.

    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use relayhub_core::types::{
        Channel, Conversation, DeliveryReceipt, ProviderType, WebhookEvent,
    };
    use relayhub_core::{HubError, ProviderAdapter, ProviderFaultKind};
    use tokio::sync::Mutex;

    /// A captured send call: (channel id, external thread id, text).
    pub type SentCall = (String, String, String);

    pub struct ScriptedAdapter {
        provider: ProviderType,
        outcomes: Mutex<VecDeque<Result<DeliveryReceipt, (ProviderType, ProviderFaultKind)>>>,
        pub sent: Arc<Mutex<Vec<SentCall>>>,
    }

    impl ScriptedAdapter {
        pub fn new(provider: ProviderType) -> Self {
            Self {
                provider,
                outcomes: Mutex::new(VecDeque::new()),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub async fn script_receipt(&self, receipt: DeliveryReceipt) {
            self.outcomes.lock().await.push_back(Ok(receipt));
        }

        pub async fn script_fault(&self, kind: ProviderFaultKind) {
            self.outcomes.lock().await.push_back(Err((self.provider, kind)));
        }
    }

    #[async_trait]
    impl ProviderAdapter for ScriptedAdapter {
        fn provider_type(&self) -> ProviderType {
            self.provider
        }

        fn normalize(&self, raw_body: &[u8]) -> Result<WebhookEvent, HubError> {
            // Tests that exercise ingestion register the real Telegram
            // adapter; this one only scripts the outbound side.
            let _ = raw_body;
            Ok(WebhookEvent::Ignored)
        }

        async fn send(
            &self,
            channel: &Channel,
            conversation: &Conversation,
            text: &str,
        ) -> Result<DeliveryReceipt, HubError> {
            self.sent.lock().await.push((
                channel.id.clone(),
                conversation.external_thread_id.clone(),
                text.to_string(),
            ));
            match self.outcomes.lock().await.pop_front() {
                Some(Ok(receipt)) => Ok(receipt),
                Some(Err((provider, kind))) => Err(HubError::Provider { provider, kind }),
                None => Ok(DeliveryReceipt {
                    provider_message_id: Some("9000".to_string()),
                    raw: serde_json::json!({"ok": true, "result": {"message_id": 9000}}),
                }),
            }
        }
    }
}
