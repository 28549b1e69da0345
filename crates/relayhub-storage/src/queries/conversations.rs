// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD and the thread-key upsert.
//!
//! The upsert targets the `(tenant_id, channel_id, external_thread_id)`
//! UNIQUE constraint, so create-or-find stays correct under concurrent
//! deliveries of the same thread without any application-level lock.

use std::str::FromStr;

use relayhub_core::types::{
    ChannelSnapshot, Conversation, ConversationSummary, Participants, ProviderType,
};
use relayhub_core::{id, HubError};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

const CONVERSATION_COLUMNS: &str =
    "id, tenant_id, channel_id, external_thread_id, participants, last_message_at, created_at, updated_at";

fn conversation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    let participants_raw: String = row.get(4)?;
    let participants: Participants = serde_json::from_str(&participants_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Conversation {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        channel_id: row.get(2)?,
        external_thread_id: row.get(3)?,
        participants,
        last_message_at: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Create-or-find the conversation for one thread key, returning the row as
/// stored.
///
/// On first contact the row is created with `participants = hint` and all
/// timestamps set to `now`. On conflict the stored row's `last_message_at`
/// and `updated_at` move to `now` and the hint merges into the stored
/// participants via `json_patch`. The hint only serializes fields it
/// actually carries, so present fields win last-write-wins and absent fields
/// survive.
pub async fn upsert_conversation(
    db: &Database,
    tenant_id: &str,
    channel_id: &str,
    external_thread_id: &str,
    hint: &Participants,
    now: &str,
) -> Result<Conversation, HubError> {
    let new_id = id::generate();
    let tenant_id = tenant_id.to_string();
    let channel_id = channel_id.to_string();
    let external_thread_id = external_thread_id.to_string();
    let hint_json = serde_json::to_string(hint).unwrap_or_else(|_| "{}".to_string());
    let now = now.to_string();

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "INSERT INTO conversations \
                     (id, tenant_id, channel_id, external_thread_id, participants, last_message_at, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?6) \
                 ON CONFLICT (tenant_id, channel_id, external_thread_id) DO UPDATE SET \
                     participants = json_patch(conversations.participants, excluded.participants), \
                     last_message_at = excluded.last_message_at, \
                     updated_at = excluded.updated_at \
                 RETURNING {CONVERSATION_COLUMNS}"
            ))?;
            Ok(stmt.query_row(
                params![new_id, tenant_id, channel_id, external_thread_id, hint_json, now],
                conversation_from_row,
            )?)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by id within a tenant's scope.
pub async fn get_conversation_for_tenant(
    db: &Database,
    conversation_id: &str,
    tenant_id: &str,
) -> Result<Option<Conversation>, HubError> {
    let conversation_id = conversation_id.to_string();
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1 AND tenant_id = ?2"
            ))?;
            Ok(stmt
                .query_row(params![conversation_id, tenant_id], conversation_from_row)
                .optional()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Refresh a conversation's `last_message_at`/`updated_at` after an append.
pub async fn touch_conversation(
    db: &Database,
    conversation_id: &str,
    now: &str,
) -> Result<(), HubError> {
    let conversation_id = conversation_id.to_string();
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET last_message_at = ?1, updated_at = ?1 WHERE id = ?2",
                params![now, conversation_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List a tenant's conversations for the inbox view, most recent first.
///
/// Each summary embeds the denormalized channel snapshot and the text of the
/// newest message (the "latest per conversation" grouping).
pub async fn list_conversation_summaries(
    db: &Database,
    tenant_id: &str,
    limit: i64,
) -> Result<Vec<ConversationSummary>, HubError> {
    let tenant_id = tenant_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.tenant_id, c.channel_id, c.external_thread_id, c.participants, \
                        c.last_message_at, c.created_at, c.updated_at, \
                        ch.provider, ch.display_name, \
                        (SELECT m.text FROM messages m \
                          WHERE m.conversation_id = c.id \
                          ORDER BY m.seq DESC LIMIT 1) AS preview \
                 FROM conversations c \
                 JOIN channels ch ON ch.id = c.channel_id AND ch.tenant_id = c.tenant_id \
                 WHERE c.tenant_id = ?1 \
                 ORDER BY c.last_message_at DESC, c.id DESC \
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![tenant_id, limit], |row| {
                let conversation = conversation_from_row(row)?;
                let provider_raw: String = row.get(8)?;
                let provider = ProviderType::from_str(&provider_raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        8,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                let channel = ChannelSnapshot {
                    id: conversation.channel_id.clone(),
                    provider,
                    display_name: row.get(9)?,
                };
                let last_message_preview: Option<String> = row.get(10)?;
                Ok(ConversationSummary {
                    conversation,
                    channel,
                    last_message_preview,
                })
            })?;
            let mut summaries = Vec::new();
            for row in rows {
                summaries.push(row?);
            }
            Ok(summaries)
        })
        .await
        .map_err(map_tr_err)
}
