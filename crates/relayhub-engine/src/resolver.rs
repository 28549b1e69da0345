// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation resolution: thread key in, exactly one conversation out.

use std::sync::Arc;

use relayhub_core::types::{Conversation, Participants};
use relayhub_core::{types::now_ts, HubError};
use relayhub_storage::queries::conversations;
use relayhub_storage::Database;
use tracing::debug;

/// Deterministically resolves a `(tenant, channel, external thread)` key to
/// exactly one conversation, creating it on first contact.
///
/// Correctness under concurrent resolution of the same key comes from the
/// storage-level UNIQUE constraint the underlying upsert targets; there is
/// no application lock and no find-then-insert window.
#[derive(Clone)]
pub struct ConversationResolver {
    db: Arc<Database>,
}

impl ConversationResolver {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Resolve the conversation for one thread key.
    ///
    /// Existing conversations get `last_message_at`/`updated_at` refreshed
    /// and non-empty hint fields merged (last write wins per field); new
    /// conversations start with `participants = hint`.
    pub async fn resolve(
        &self,
        tenant_id: &str,
        channel_id: &str,
        external_thread_id: &str,
        hint: &Participants,
    ) -> Result<Conversation, HubError> {
        let conversation = conversations::upsert_conversation(
            &self.db,
            tenant_id,
            channel_id,
            external_thread_id,
            hint,
            &now_ts(),
        )
        .await?;

        debug!(
            tenant = %tenant_id,
            channel = %channel_id,
            thread = %external_thread_id,
            conversation = %conversation.id,
            "conversation resolved"
        );
        Ok(conversation)
    }
}
