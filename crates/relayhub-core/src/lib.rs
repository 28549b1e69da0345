// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Relayhub messaging hub.
//!
//! This crate provides the domain types, error taxonomy, entity-id scheme,
//! and the provider-adapter trait shared across the Relayhub workspace.
//! It performs no I/O of its own.

pub mod adapter;
pub mod error;
pub mod id;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use adapter::ProviderAdapter;
pub use error::{HubError, ProviderFaultKind};
pub use types::{
    Channel, ChannelSnapshot, Conversation, ConversationSummary, CredentialBundle,
    DeliveryReceipt, Direction, Message, NormalizedInbound, Participants, Principal,
    ProviderType, WebhookEvent,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = HubError::Config("bad".into());
        let _validation = HubError::Validation("empty text".into());
        let _unauthorized = HubError::Unauthorized("webhook secret mismatch".into());
        let _not_found = HubError::NotFound {
            resource: "conversation",
        };
        let _unsupported = HubError::UnsupportedProvider {
            provider: ProviderType::Messenger,
        };
        let _provider = HubError::Provider {
            provider: ProviderType::Telegram,
            kind: ProviderFaultKind::Unreachable,
        };
        let _storage = HubError::Storage {
            source: Box::new(std::io::Error::other("disk gone")),
        };
        let _timeout = HubError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = HubError::Internal("unexpected".into());
    }

    #[test]
    fn provider_type_round_trips_through_strings() {
        use std::str::FromStr;

        for provider in [ProviderType::Telegram, ProviderType::Messenger] {
            let s = provider.to_string();
            let parsed = ProviderType::from_str(&s).expect("should parse back");
            assert_eq!(provider, parsed);
        }
        assert!(ProviderType::from_str("carrier-pigeon").is_err());
    }

    #[test]
    fn provider_type_serializes_lowercase() {
        let json = serde_json::to_string(&ProviderType::Telegram).unwrap();
        assert_eq!(json, "\"telegram\"");
        let parsed: ProviderType = serde_json::from_str("\"messenger\"").unwrap();
        assert_eq!(parsed, ProviderType::Messenger);
    }
}
