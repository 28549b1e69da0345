// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message ledger operations.
//!
//! The ledger is append-only: no update or delete exists here. Appends run
//! inside a transaction that first verifies the target conversation belongs
//! to the message's tenant, so cross-tenant pairing is rejected before any
//! row is written. Inbound appends dedup against the partial UNIQUE index on
//! `(tenant_id, channel_id, provider_message_id)`.

use std::str::FromStr;

use relayhub_core::types::{Direction, Message, ProviderType};
use relayhub_core::HubError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

const MESSAGE_COLUMNS: &str =
    "id, tenant_id, channel_id, conversation_id, direction, provider, provider_message_id, text, raw, created_at";

/// Result of an append.
#[derive(Debug, Clone)]
pub enum AppendOutcome {
    /// A new row was written.
    Inserted(Message),
    /// A redelivery hit the dedup index; the original row is returned.
    Deduplicated(Message),
}

impl AppendOutcome {
    pub fn message(&self) -> &Message {
        match self {
            Self::Inserted(m) | Self::Deduplicated(m) => m,
        }
    }

    pub fn is_deduplicated(&self) -> bool {
        matches!(self, Self::Deduplicated(_))
    }
}

/// Crate-private closure result; domain rejections map to errors outside the
/// storage thread.
enum AppendResult {
    Inserted(Message),
    Deduplicated(Message),
    ConversationMissing,
    TenantMismatch,
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let direction_raw: String = row.get(4)?;
    let direction = Direction::from_str(&direction_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let provider_raw: String = row.get(5)?;
    let provider = ProviderType::from_str(&provider_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let raw_text: Option<String> = row.get(8)?;
    let raw = match raw_text {
        Some(s) => Some(serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(Message {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        channel_id: row.get(2)?,
        conversation_id: row.get(3)?,
        direction,
        provider,
        provider_message_id: row.get(6)?,
        text: row.get(7)?,
        raw,
        created_at: row.get(9)?,
    })
}

/// Append a message to the ledger.
///
/// Returns [`AppendOutcome::Deduplicated`] with the stored row when an
/// inbound redelivery hits the dedup index. Rejects appends whose
/// conversation is missing or belongs to another tenant; both surface as
/// `NotFound` so a cross-tenant probe learns nothing.
pub async fn append_message(db: &Database, msg: &Message) -> Result<AppendOutcome, HubError> {
    let msg = msg.clone();
    let result = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let conversation_tenant: Option<String> = tx
                .query_row(
                    "SELECT tenant_id FROM conversations WHERE id = ?1",
                    params![msg.conversation_id],
                    |row| row.get(0),
                )
                .optional()?;
            match conversation_tenant {
                None => return Ok(AppendResult::ConversationMissing),
                Some(tenant) if tenant != msg.tenant_id => {
                    return Ok(AppendResult::TenantMismatch);
                }
                Some(_) => {}
            }

            let raw_json = msg
                .raw
                .as_ref()
                .map(|v| serde_json::to_string(v).unwrap_or_else(|_| "null".to_string()));

            let inserted = tx.execute(
                "INSERT INTO messages \
                     (id, tenant_id, channel_id, conversation_id, direction, provider, provider_message_id, text, raw, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
                 ON CONFLICT DO NOTHING",
                params![
                    msg.id,
                    msg.tenant_id,
                    msg.channel_id,
                    msg.conversation_id,
                    msg.direction.to_string(),
                    msg.provider.to_string(),
                    msg.provider_message_id,
                    msg.text,
                    raw_json,
                    msg.created_at,
                ],
            )?;

            let result = if inserted == 1 {
                let stored = tx.query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                    params![msg.id],
                    message_from_row,
                )?;
                AppendResult::Inserted(stored)
            } else {
                // The only reachable conflict for a fresh id is the inbound
                // dedup index; hand back the original delivery's row.
                let original = tx.query_row(
                    &format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages \
                         WHERE tenant_id = ?1 AND channel_id = ?2 \
                           AND provider_message_id = ?3 AND direction = 'inbound'"
                    ),
                    params![msg.tenant_id, msg.channel_id, msg.provider_message_id],
                    message_from_row,
                )?;
                AppendResult::Deduplicated(original)
            };

            tx.commit()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)?;

    match result {
        AppendResult::Inserted(m) => Ok(AppendOutcome::Inserted(m)),
        AppendResult::Deduplicated(m) => Ok(AppendOutcome::Deduplicated(m)),
        AppendResult::ConversationMissing | AppendResult::TenantMismatch => {
            Err(HubError::NotFound {
                resource: "conversation",
            })
        }
    }
}

/// List a conversation's messages oldest-first, tenant-scoped.
pub async fn list_messages_for_conversation(
    db: &Database,
    tenant_id: &str,
    conversation_id: &str,
    limit: i64,
) -> Result<Vec<Message>, HubError> {
    let tenant_id = tenant_id.to_string();
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages \
                 WHERE conversation_id = ?1 AND tenant_id = ?2 \
                 ORDER BY created_at ASC, seq ASC \
                 LIMIT ?3"
            ))?;
            let rows = stmt.query_map(params![conversation_id, tenant_id, limit], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Count every ledger row for one conversation, unscoped. Test support for
/// "the ledger is unchanged" assertions.
pub async fn count_messages_for_conversation(
    db: &Database,
    conversation_id: &str,
) -> Result<i64, HubError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )?)
        })
        .await
        .map_err(map_tr_err)
}
