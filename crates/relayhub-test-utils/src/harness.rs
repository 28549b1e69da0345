// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete hub stack (temp SQLite database,
//! adapter registry, ingestion pipeline, dispatch orchestrator, gateway
//! router) without binding a socket. Tests drive the router with
//! `tower::ServiceExt::oneshot` or call the engine services directly.

use std::sync::Arc;
use std::time::Duration;

use relayhub_config::model::{AuthSection, OperatorConfig, TelegramApiConfig};
use relayhub_core::types::{now_ts, Channel, CredentialBundle, ProviderType};
use relayhub_core::{id, HubError, ProviderAdapter};
use relayhub_engine::{AdapterRegistry, DispatchOrchestrator, IngestOutcome, IngestPipeline};
use relayhub_gateway::{build_router, AuthConfig, GatewayState, HealthState};
use relayhub_storage::queries::channels::insert_channel;
use relayhub_storage::Database;

use crate::mock_provider::MockProvider;

/// Well-known tenant and operator fixtures.
pub const TENANT_A: &str = "0123456789abcdef01234567";
pub const TENANT_B: &str = "fedcba9876543210fedcba98";
pub const TOKEN_A: &str = "operator-token-a";
pub const TOKEN_B: &str = "operator-token-b";

/// Builder for creating test environments with configurable adapters.
pub struct TestHarnessBuilder {
    mock_provider: Option<Arc<MockProvider>>,
    send_timeout: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            mock_provider: None,
            send_timeout: Duration::from_secs(5),
        }
    }

    /// Register `mock` in place of the real Telegram adapter, enabling
    /// scripted send outcomes.
    pub fn with_mock_provider(mut self, mock: Arc<MockProvider>) -> Self {
        self.mock_provider = Some(mock);
        self
    }

    /// Override the dispatch send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Build the harness: temp database, adapters, engine, router.
    pub async fn build(self) -> Result<TestHarness, HubError> {
        let temp_dir = tempfile::TempDir::new().map_err(HubError::storage)?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await?);

        let mut registry = AdapterRegistry::new();
        match &self.mock_provider {
            Some(mock) => registry.register(mock.clone() as Arc<dyn ProviderAdapter>),
            None => registry.register(Arc::new(relayhub_telegram::TelegramAdapter::new(
                &TelegramApiConfig::default(),
            )?)),
        }
        let registry = Arc::new(registry);

        let ingest = Arc::new(IngestPipeline::new(db.clone(), registry.clone()));
        let dispatch = Arc::new(DispatchOrchestrator::new(
            db.clone(),
            registry.clone(),
            self.send_timeout,
        ));

        let auth = AuthConfig::from_config(&AuthSection {
            operators: vec![
                OperatorConfig {
                    token: TOKEN_A.to_string(),
                    tenant_id: TENANT_A.to_string(),
                    roles: vec!["operator".to_string()],
                },
                OperatorConfig {
                    token: TOKEN_B.to_string(),
                    tenant_id: TENANT_B.to_string(),
                    roles: vec!["operator".to_string()],
                },
            ],
        });

        let state = GatewayState {
            db: db.clone(),
            ingest: ingest.clone(),
            dispatch: dispatch.clone(),
            auth,
            health: HealthState::default(),
        };

        Ok(TestHarness {
            router: build_router(state),
            db,
            ingest,
            dispatch,
            mock_provider: self.mock_provider,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over a temp database.
pub struct TestHarness {
    /// The assembled gateway router (no socket bound).
    pub router: axum::Router,
    /// Direct database handle for seeding and assertions.
    pub db: Arc<Database>,
    /// The ingestion pipeline, for driving webhooks below the HTTP layer.
    pub ingest: Arc<IngestPipeline>,
    /// The dispatch orchestrator, for driving replies below the HTTP layer.
    pub dispatch: Arc<DispatchOrchestrator>,
    /// The scripted provider, when the harness was built with one.
    pub mock_provider: Option<Arc<MockProvider>>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Seed a telegram channel for `tenant_id` with the given credentials
    /// and return it.
    pub async fn seed_channel(
        &self,
        tenant_id: &str,
        credentials: serde_json::Value,
    ) -> Result<Channel, HubError> {
        let now = now_ts();
        let channel = Channel {
            id: id::generate(),
            tenant_id: tenant_id.to_string(),
            provider: ProviderType::Telegram,
            display_name: "Support Bot".to_string(),
            external_id: "support_bot".to_string(),
            credentials: CredentialBundle::new(credentials),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };
        insert_channel(&self.db, &channel).await?;
        Ok(channel)
    }

    /// Drive one Telegram message update through the ingestion pipeline.
    pub async fn ingest_update(
        &self,
        channel_id: &str,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<IngestOutcome, HubError> {
        let body = serde_json::to_vec(&serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": message_id,
                "chat": {"id": chat_id, "type": "private"},
                "from": {"id": 42, "username": "ada"},
                "text": text
            }
        }))
        .unwrap();
        self.ingest
            .ingest(ProviderType::Telegram, channel_id, &body, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayhub_storage::queries::conversations::list_conversation_summaries;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let summaries = list_conversation_summaries(&harness.db, TENANT_A, 20)
            .await
            .unwrap();
        assert!(summaries.is_empty());
    }

    #[tokio::test]
    async fn seeded_channel_accepts_ingestion() {
        let harness = TestHarness::builder().build().await.unwrap();
        let channel = harness
            .seed_channel(TENANT_A, serde_json::json!({"bot_token": "test:abc"}))
            .await
            .unwrap();

        let outcome = harness
            .ingest_update(&channel.id, 123, 456, "hello")
            .await
            .unwrap();
        assert!(matches!(outcome, IngestOutcome::Accepted { .. }));

        let summaries = list_conversation_summaries(&harness.db, TENANT_A, 20)
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].last_message_preview.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        let channel = h1
            .seed_channel(TENANT_A, serde_json::json!({"bot_token": "test:abc"}))
            .await
            .unwrap();
        h1.ingest_update(&channel.id, 1, 1, "only in h1").await.unwrap();

        let s1 = list_conversation_summaries(&h1.db, TENANT_A, 20).await.unwrap();
        let s2 = list_conversation_summaries(&h2.db, TENANT_A, 20).await.unwrap();
        assert_eq!(s1.len(), 1);
        assert!(s2.is_empty());
    }
}
