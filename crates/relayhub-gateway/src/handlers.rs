// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook and tenant REST surfaces.
//!
//! Wire format is camelCase JSON; the tenant id for every read/write comes
//! from the request's resolved [`Principal`], never from the body or path.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use relayhub_core::types::{
    Channel, ChannelSnapshot, Conversation, ConversationSummary, CredentialBundle, Direction,
    Message, Participants, Principal, ProviderType,
};
use relayhub_core::{id, types::now_ts, HubError};
use relayhub_engine::IngestOutcome;
use relayhub_storage::queries::{channels, conversations, messages};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Clamp a caller-supplied page size into `[1, 100]`.
pub(crate) fn clamp_limit(raw: Option<i64>, default: i64) -> i64 {
    raw.unwrap_or(default).clamp(1, 100)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Acknowledgement body for webhook deliveries.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
}

/// Paged list envelope. Cursor paging is not implemented; `nextCursor` is
/// always null so clients can already code against the envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub channel_id: String,
    pub direction: Direction,
    pub provider: ProviderType,
    pub provider_message_id: Option<String>,
    pub text: String,
    pub created_at: String,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            channel_id: m.channel_id,
            direction: m.direction,
            provider: m.provider,
            provider_message_id: m.provider_message_id,
            text: m.text,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnapshotDto {
    pub id: String,
    #[serde(rename = "type")]
    pub provider: ProviderType,
    pub display_name: String,
}

impl From<ChannelSnapshot> for ChannelSnapshotDto {
    fn from(c: ChannelSnapshot) -> Self {
        Self {
            id: c.id,
            provider: c.provider,
            display_name: c.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantsDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_username: Option<String>,
}

impl From<Participants> for ParticipantsDto {
    fn from(p: Participants) -> Self {
        Self {
            external_user_id: p.external_user_id,
            external_username: p.external_username,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryDto {
    pub id: String,
    pub channel: ChannelSnapshotDto,
    pub external_thread_id: String,
    pub participants: ParticipantsDto,
    pub last_message_at: String,
    pub last_message_preview: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ConversationSummary> for ConversationSummaryDto {
    fn from(s: ConversationSummary) -> Self {
        let Conversation {
            id,
            external_thread_id,
            participants,
            last_message_at,
            created_at,
            updated_at,
            ..
        } = s.conversation;
        Self {
            id,
            channel: s.channel.into(),
            external_thread_id,
            participants: participants.into(),
            last_message_at,
            last_message_preview: s.last_message_preview,
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDto {
    pub id: String,
    pub provider: ProviderType,
    pub display_name: String,
    pub external_id: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Channel> for ChannelDto {
    // Credentials deliberately never serialize back to clients.
    fn from(c: Channel) -> Self {
        Self {
            id: c.id,
            provider: c.provider,
            display_name: c.display_name,
            external_id: c.external_id,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelRequest {
    pub provider: ProviderType,
    pub display_name: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub credentials: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /webhooks/{provider}/{channelId}
///
/// Accepts the provider's native webhook body. Non-message updates are
/// acknowledged with `ignored: true`; redeliveries are acknowledged without
/// writing a second row.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    Path((provider, channel_id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let provider = ProviderType::from_str(&provider)
        .map_err(|_| HubError::Validation(format!("unknown provider `{provider}`")))?;

    let secret_header = match provider {
        ProviderType::Telegram => headers
            .get(relayhub_telegram::WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok()),
        ProviderType::Messenger => None,
    };

    let outcome = state
        .ingest
        .ingest(provider, &channel_id, &body, secret_header)
        .await?;

    let ack = match outcome {
        IngestOutcome::Accepted { .. } => WebhookAck {
            ok: true,
            ignored: None,
        },
        IngestOutcome::Ignored => WebhookAck {
            ok: true,
            ignored: Some(true),
        },
    };
    Ok(Json(ack))
}

/// GET /tenant/conversations?limit=N
pub async fn list_conversations(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<ConversationSummaryDto>>, ApiError> {
    let limit = clamp_limit(params.limit, 20);
    let summaries =
        conversations::list_conversation_summaries(&state.db, &principal.tenant_id, limit).await?;

    Ok(Json(ListResponse {
        items: summaries.into_iter().map(Into::into).collect(),
        next_cursor: None,
    }))
}

/// GET /tenant/conversations/{conversationId}/messages?limit=N
pub async fn list_messages(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Path(conversation_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<MessageDto>>, ApiError> {
    if !id::is_well_formed(&conversation_id) {
        return Err(
            HubError::Validation("conversation id must be a 24-hex identifier".to_string()).into(),
        );
    }

    // Resolve first so cross-tenant and unknown ids both read as 404.
    conversations::get_conversation_for_tenant(&state.db, &conversation_id, &principal.tenant_id)
        .await?
        .ok_or(HubError::NotFound {
            resource: "conversation",
        })?;

    let limit = clamp_limit(params.limit, 50);
    let items = messages::list_messages_for_conversation(
        &state.db,
        &principal.tenant_id,
        &conversation_id,
        limit,
    )
    .await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(Into::into).collect(),
        next_cursor: None,
    }))
}

/// POST /tenant/conversations/{conversationId}/messages
pub async fn post_reply(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Path(conversation_id): Path<String>,
    Json(body): Json<ReplyRequest>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let message = state
        .dispatch
        .dispatch_reply(&principal.tenant_id, &conversation_id, &body.text)
        .await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

/// GET /tenant/channels
pub async fn list_channels(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ListResponse<ChannelDto>>, ApiError> {
    let items = channels::list_channels_for_tenant(&state.db, &principal.tenant_id).await?;
    Ok(Json(ListResponse {
        items: items.into_iter().map(Into::into).collect(),
        next_cursor: None,
    }))
}

/// POST /tenant/channels
pub async fn create_channel(
    State(state): State<GatewayState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<ChannelDto>), ApiError> {
    if body.display_name.trim().is_empty() {
        return Err(HubError::Validation("displayName must not be empty".to_string()).into());
    }

    let now = now_ts();
    let channel = Channel {
        id: id::generate(),
        tenant_id: principal.tenant_id.clone(),
        provider: body.provider,
        display_name: body.display_name.trim().to_string(),
        external_id: body.external_id.trim().to_string(),
        credentials: body
            .credentials
            .map(CredentialBundle::new)
            .unwrap_or_else(CredentialBundle::empty),
        is_active: true,
        created_at: now.clone(),
        updated_at: now,
    };
    channels::insert_channel(&state.db, &channel).await?;

    tracing::info!(
        tenant = %principal.tenant_id,
        channel = %channel.id,
        provider = %channel.provider,
        "channel created"
    );
    Ok((StatusCode::CREATED, Json(channel.into())))
}

/// GET /health
///
/// Unauthenticated liveness endpoint.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
