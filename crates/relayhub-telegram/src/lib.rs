// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram provider adapter for the Relayhub messaging hub.
//!
//! Implements [`ProviderAdapter`] over the Telegram Bot API: webhook payload
//! normalization on the inbound side, `sendMessage` delivery on the outbound
//! side. Credentials are per-channel; a bot token carrying the test prefix
//! short-circuits to a deterministic mock receipt so integration tests never
//! touch the live API.

pub mod webhook;

use std::time::Duration;

use async_trait::async_trait;
use relayhub_config::model::TelegramApiConfig;
use relayhub_core::types::{Channel, Conversation, DeliveryReceipt, ProviderType, WebhookEvent};
use relayhub_core::{HubError, ProviderAdapter, ProviderFaultKind};
use tracing::{debug, warn};

pub use webhook::WEBHOOK_SECRET_HEADER;

/// Credential key holding the Bot API token.
pub const BOT_TOKEN_KEY: &str = "bot_token";

/// Bot tokens with this prefix never reach the network; `send` returns a
/// mock receipt (`provider_message_id = None`, `raw = {"mocked": true}`).
pub const MOCK_TOKEN_PREFIX: &str = "test:";

/// Telegram adapter implementing [`ProviderAdapter`].
///
/// Holds one pooled HTTP client with a bounded per-request timeout; bot
/// tokens come from each channel's credential bundle at send time.
pub struct TelegramAdapter {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramAdapter {
    /// Create an adapter from the Telegram API configuration.
    pub fn new(config: &TelegramApiConfig) -> Result<Self, HubError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| HubError::Config(format!("failed to build telegram HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn fault(&self, kind: ProviderFaultKind) -> HubError {
        HubError::Provider {
            provider: ProviderType::Telegram,
            kind,
        }
    }
}

#[async_trait]
impl ProviderAdapter for TelegramAdapter {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Telegram
    }

    fn normalize(&self, raw_body: &[u8]) -> Result<WebhookEvent, HubError> {
        webhook::normalize(raw_body)
    }

    async fn send(
        &self,
        channel: &Channel,
        conversation: &Conversation,
        text: &str,
    ) -> Result<DeliveryReceipt, HubError> {
        let token = channel
            .credentials
            .get_str(BOT_TOKEN_KEY)
            .ok_or_else(|| self.fault(ProviderFaultKind::MissingCredential))?;

        if token.starts_with(MOCK_TOKEN_PREFIX) {
            debug!(channel = %channel.id, "mock credential, short-circuiting send");
            return Ok(DeliveryReceipt {
                provider_message_id: None,
                raw: serde_json::json!({"mocked": true}),
            });
        }

        // Telegram accepts chat_id as integer or string; send numeric thread
        // ids as integers to match what the webhook delivered.
        let chat_id: serde_json::Value = conversation
            .external_thread_id
            .parse::<i64>()
            .map(Into::into)
            .unwrap_or_else(|_| conversation.external_thread_id.clone().into());

        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({"chat_id": chat_id, "text": text}))
            .send()
            .await
            .map_err(|e| {
                warn!(channel = %channel.id, error = %e, "telegram send transport failure");
                self.fault(ProviderFaultKind::Unreachable)
            })?;

        let status = response.status().as_u16();
        let body: serde_json::Value = response.json().await.map_err(|e| {
            warn!(channel = %channel.id, error = %e, "telegram response body unreadable");
            self.fault(ProviderFaultKind::Unreachable)
        })?;

        let ok = body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
        if !(200..300).contains(&status) || !ok {
            warn!(
                channel = %channel.id,
                status,
                description = body.get("description").and_then(|v| v.as_str()).unwrap_or(""),
                "telegram rejected send"
            );
            return Err(self.fault(ProviderFaultKind::Rejected { status }));
        }

        let provider_message_id = body
            .get("result")
            .and_then(|r| r.get("message_id"))
            .and_then(|id| id.as_i64())
            .map(|id| id.to_string());
        if provider_message_id.is_none() {
            warn!(channel = %channel.id, status, "telegram success response missing result.message_id");
            return Err(self.fault(ProviderFaultKind::Rejected { status }));
        }

        Ok(DeliveryReceipt {
            provider_message_id,
            raw: body,
        })
    }
}
