// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for external messaging platform integrations.

use async_trait::async_trait;

use crate::error::HubError;
use crate::types::{Channel, Conversation, DeliveryReceipt, ProviderType, WebhookEvent};

/// Capability interface for one external messaging provider.
///
/// One implementation exists per [`ProviderType`]; the engine selects an
/// adapter from a registry keyed on the channel's provider type instead of
/// branching on type strings. An adapter owns both directions of the
/// provider boundary: parsing raw webhook bodies into normalized events and
/// delivering outbound text.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The provider this adapter speaks for.
    fn provider_type(&self) -> ProviderType;

    /// Parse a raw webhook body into a normalized event.
    ///
    /// Pure with respect to the adapter: no I/O, no side effects. Recognized
    /// non-message update kinds yield [`WebhookEvent::Ignored`]; malformed
    /// bodies are `Validation` errors.
    fn normalize(&self, raw_body: &[u8]) -> Result<WebhookEvent, HubError>;

    /// Deliver `text` to the conversation's external thread.
    ///
    /// Credentials come from the channel's bundle. Faults are never retried
    /// here; retry policy belongs to the caller. A confirmed send returns
    /// the provider's message id and raw response verbatim.
    async fn send(
        &self,
        channel: &Channel,
        conversation: &Conversation,
        text: &str,
    ) -> Result<DeliveryReceipt, HubError>;
}

impl std::fmt::Debug for dyn ProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("provider_type", &self.provider_type())
            .finish()
    }
}
