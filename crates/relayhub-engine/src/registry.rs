// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of provider adapters, keyed by provider type.
//!
//! The orchestrators look adapters up here instead of matching on provider
//! strings; a provider type with no registered adapter is an
//! `UnsupportedProvider` fault at the point of use.

use std::collections::HashMap;
use std::sync::Arc;

use relayhub_core::types::ProviderType;
use relayhub_core::{HubError, ProviderAdapter};

/// Registry of all configured provider adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<ProviderType, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter under its own provider type. Last registration
    /// for a type wins.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider_type(), adapter);
    }

    /// Look up the adapter for a provider type.
    pub fn get(&self, provider: ProviderType) -> Result<Arc<dyn ProviderAdapter>, HubError> {
        self.adapters
            .get(&provider)
            .cloned()
            .ok_or(HubError::UnsupportedProvider { provider })
    }

    /// Provider types with a registered adapter.
    pub fn providers(&self) -> Vec<ProviderType> {
        self.adapters.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAdapter;

    #[test]
    fn lookup_of_unregistered_provider_is_unsupported() {
        let registry = AdapterRegistry::new();
        let err = registry.get(ProviderType::Messenger).unwrap_err();
        assert!(matches!(
            err,
            HubError::UnsupportedProvider {
                provider: ProviderType::Messenger
            }
        ));
    }

    #[test]
    fn registered_adapter_is_returned() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(ScriptedAdapter::new(ProviderType::Telegram)));

        let adapter = registry.get(ProviderType::Telegram).unwrap();
        assert_eq!(adapter.provider_type(), ProviderType::Telegram);
        assert_eq!(registry.providers(), vec![ProviderType::Telegram]);
    }
}
