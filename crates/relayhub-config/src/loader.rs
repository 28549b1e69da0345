// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./relayhub.toml` > `~/.config/relayhub/relayhub.toml`
//! > `/etc/relayhub/relayhub.toml` with environment variable overrides via the
//! `RELAYHUB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HubConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/relayhub/relayhub.toml` (system-wide)
/// 3. `~/.config/relayhub/relayhub.toml` (user XDG config)
/// 4. `./relayhub.toml` (local directory)
/// 5. `RELAYHUB_*` environment variables
pub fn load_config() -> Result<HubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HubConfig::default()))
        .merge(Toml::file("/etc/relayhub/relayhub.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("relayhub/relayhub.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("relayhub.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<HubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HubConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HubConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RELAYHUB_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("RELAYHUB_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: RELAYHUB_TELEGRAM_API_BASE -> "telegram_api_base"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("hub_", "hub.", 1)
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("dispatch_", "dispatch.", 1);
        mapped.into()
    })
}
