// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel registry CRUD operations.
//!
//! The unscoped [`get_channel`] exists for the webhook ingestion path only,
//! where the tenant is derived FROM the channel. Everything operator-facing
//! goes through the tenant-scoped variants.

use std::str::FromStr;

use relayhub_core::types::{Channel, CredentialBundle, ProviderType};
use relayhub_core::HubError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

const CHANNEL_COLUMNS: &str =
    "id, tenant_id, provider, display_name, external_id, credentials, is_active, created_at, updated_at";

fn channel_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Channel> {
    let provider_raw: String = row.get(2)?;
    let provider = ProviderType::from_str(&provider_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let credentials_raw: String = row.get(5)?;
    let credentials: serde_json::Value = serde_json::from_str(&credentials_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Channel {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        provider,
        display_name: row.get(3)?,
        external_id: row.get(4)?,
        credentials: CredentialBundle::new(credentials),
        is_active: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Insert a new channel.
pub async fn insert_channel(db: &Database, channel: &Channel) -> Result<(), HubError> {
    let channel = channel.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO channels (id, tenant_id, provider, display_name, external_id, credentials, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    channel.id,
                    channel.tenant_id,
                    channel.provider.to_string(),
                    channel.display_name,
                    channel.external_id,
                    serde_json::to_string(&channel.credentials)
                        .unwrap_or_else(|_| "{}".to_string()),
                    channel.is_active,
                    channel.created_at,
                    channel.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a channel by id, ignoring tenant scope.
///
/// Webhook ingestion only: the channel row is what establishes the tenant.
pub async fn get_channel(db: &Database, id: &str) -> Result<Option<Channel>, HubError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHANNEL_COLUMNS} FROM channels WHERE id = ?1"
            ))?;
            Ok(stmt.query_row(params![id], channel_from_row).optional()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a channel by id within a tenant's scope.
pub async fn get_channel_for_tenant(
    db: &Database,
    id: &str,
    tenant_id: &str,
) -> Result<Option<Channel>, HubError> {
    let id = id.to_string();
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHANNEL_COLUMNS} FROM channels WHERE id = ?1 AND tenant_id = ?2"
            ))?;
            Ok(stmt
                .query_row(params![id, tenant_id], channel_from_row)
                .optional()?)
        })
        .await
        .map_err(map_tr_err)
}

/// List a tenant's channels, newest first.
pub async fn list_channels_for_tenant(
    db: &Database,
    tenant_id: &str,
) -> Result<Vec<Channel>, HubError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CHANNEL_COLUMNS} FROM channels WHERE tenant_id = ?1 ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map(params![tenant_id], channel_from_row)?;
            let mut channels = Vec::new();
            for row in rows {
                channels.push(row?);
            }
            Ok(channels)
        })
        .await
        .map_err(map_tr_err)
}
