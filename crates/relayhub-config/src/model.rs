// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Relayhub messaging hub.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Relayhub configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
/// A hub with no configured operators serves webhooks only (tenant routes
/// fail closed).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Hub identity and logging settings.
    #[serde(default)]
    pub hub: HubSection,

    /// HTTP server bind settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram Bot API settings.
    #[serde(default)]
    pub telegram: TelegramApiConfig,

    /// Outbound dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Operator authentication settings.
    #[serde(default)]
    pub auth: AuthSection,
}

/// Hub identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubSection {
    /// Display name of this hub instance.
    #[serde(default = "default_hub_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            name: default_hub_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_hub_name() -> String {
    "relayhub".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("relayhub").join("relayhub.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("relayhub.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Telegram Bot API configuration.
///
/// Per-channel bot tokens live in channel credential bundles, not here; this
/// section only shapes how the adapter talks to the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramApiConfig {
    /// Base URL of the Bot API. Overridable for tests.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// Per-request timeout for Bot API calls, in seconds.
    #[serde(default = "default_telegram_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TelegramApiConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            request_timeout_secs: default_telegram_timeout_secs(),
        }
    }
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_timeout_secs() -> u64 {
    15
}

/// Outbound dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Upper bound on one provider send, in seconds. A send that has not
    /// completed by then surfaces as a provider-unreachable fault.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_send_timeout_secs() -> u64 {
    30
}

/// Operator authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    /// Static operator bearer tokens. Empty means tenant routes reject all
    /// requests (fail-closed); webhook ingestion is unaffected.
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
}

/// One operator principal, keyed by its bearer token.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorConfig {
    /// The opaque bearer token presented by this operator.
    pub token: String,

    /// Tenant the operator belongs to (24-hex entity id).
    pub tenant_id: String,

    /// Role set attached to the resulting principal.
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
}

impl std::fmt::Debug for OperatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorConfig")
            .field("token", &"[redacted]")
            .field("tenant_id", &self.tenant_id)
            .field("roles", &self.roles)
            .finish()
    }
}

fn default_roles() -> Vec<String> {
    vec!["operator".to_string()]
}
