// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relayhub serve` command implementation.
//!
//! Opens storage, registers the compiled-in provider adapters, wires the
//! engine services, and starts the gateway. The database handle and the
//! adapter registry are acquired once here and shared across all in-flight
//! requests.

use std::sync::Arc;
use std::time::Duration;

use relayhub_config::HubConfig;
use relayhub_core::HubError;
use relayhub_engine::{AdapterRegistry, DispatchOrchestrator, IngestPipeline};
use relayhub_gateway::{start_server, AuthConfig, GatewayState, HealthState};
use relayhub_storage::Database;
use relayhub_telegram::TelegramAdapter;
use tracing::{info, warn};

/// Runs the `relayhub serve` command until the process is stopped.
pub async fn run_serve(config: HubConfig) -> Result<(), HubError> {
    init_tracing(&config.hub.log_level);

    info!(name = %config.hub.name, "starting relayhub serve");

    if config.auth.operators.is_empty() {
        warn!("no operators configured -- tenant routes will reject all requests");
    }

    // Storage: one handle per process, shared by every request.
    let db = Arc::new(Database::open_with_config(&config.storage).await?);

    // Provider adapters. Telegram is the only compiled-in provider today;
    // messenger channels exist in the data model but dispatch as unsupported.
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(TelegramAdapter::new(&config.telegram)?));
    let registry = Arc::new(registry);
    info!(providers = ?registry.providers(), "adapter registry initialized");

    let ingest = Arc::new(IngestPipeline::new(db.clone(), registry.clone()));
    let dispatch = Arc::new(DispatchOrchestrator::new(
        db.clone(),
        registry,
        Duration::from_secs(config.dispatch.send_timeout_secs),
    ));

    let state = GatewayState {
        db,
        ingest,
        dispatch,
        auth: AuthConfig::from_config(&config.auth),
        health: HealthState::default(),
    };

    start_server(&config.server.host, config.server.port, state).await
}

/// Initialize the tracing subscriber with an env-filter seeded from config.
///
/// `RUST_LOG` still wins when set, so operators can raise verbosity per
/// target without touching the config file.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
