// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. Webhook routes skip
//! operator auth (providers cannot present operator tokens); everything
//! under `/tenant` goes through the principal-resolving middleware.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use relayhub_core::HubError;
use relayhub_engine::{DispatchOrchestrator, IngestPipeline};
use relayhub_storage::Database;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// State for unauthenticated health endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: std::time::Instant::now(),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The process-wide database handle.
    pub db: Arc<Database>,
    /// Inbound ingestion pipeline.
    pub ingest: Arc<IngestPipeline>,
    /// Outbound dispatch orchestrator.
    pub dispatch: Arc<DispatchOrchestrator>,
    /// Operator token table.
    pub auth: AuthConfig,
    /// Health state for unauthenticated endpoints.
    pub health: HealthState,
}

/// Assemble the full router over the given state.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    // Unauthenticated: liveness + provider webhooks.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/webhooks/{provider}/{channel_id}",
            post(handlers::post_webhook),
        )
        .with_state(state.clone());

    // Tenant surface, principal-scoped.
    let tenant_routes = Router::new()
        .route("/tenant/conversations", get(handlers::list_conversations))
        .route(
            "/tenant/conversations/{conversation_id}/messages",
            get(handlers::list_messages).post(handlers::post_reply),
        )
        .route(
            "/tenant/channels",
            get(handlers::list_channels).post(handlers::create_channel),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(tenant_routes)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn start_server(host: &str, port: u16, state: GatewayState) -> Result<(), HubError> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HubError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| HubError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use relayhub_config::model::{AuthSection, OperatorConfig, TelegramApiConfig};
    use relayhub_core::types::{now_ts, Channel, CredentialBundle, ProviderType};
    use relayhub_core::id;
    use relayhub_engine::AdapterRegistry;
    use relayhub_storage::queries::channels::insert_channel;
    use relayhub_telegram::TelegramAdapter;
    use std::time::Duration;
    use tower::ServiceExt;

    const TENANT_A: &str = "0123456789abcdef01234567";
    const TENANT_B: &str = "fedcba9876543210fedcba98";
    const TOKEN_A: &str = "operator-token-a";
    const TOKEN_B: &str = "operator-token-b";

    struct TestApp {
        router: Router,
        channel_id: String,
        _dir: tempfile::TempDir,
    }

    async fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(
            Database::open(dir.path().join("test.db").to_str().unwrap())
                .await
                .unwrap(),
        );

        let now = now_ts();
        let channel = Channel {
            id: id::generate(),
            tenant_id: TENANT_A.to_string(),
            provider: ProviderType::Telegram,
            display_name: "Support Bot".to_string(),
            external_id: "support_bot".to_string(),
            credentials: CredentialBundle::new(serde_json::json!({"bot_token": "test:abc"})),
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        };
        insert_channel(&db, &channel).await.unwrap();

        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(
            TelegramAdapter::new(&TelegramApiConfig::default()).unwrap(),
        ));
        let registry = Arc::new(registry);

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
            ingest: Arc::new(IngestPipeline::new(db.clone(), registry.clone())),
            dispatch: Arc::new(DispatchOrchestrator::new(
                db,
                registry,
                Duration::from_secs(5),
            )),
            auth,
            health: HealthState::default(),
        };

        TestApp {
            router: build_router(state),
            channel_id: channel.id,
            _dir: dir,
        }
    }

    fn telegram_update(chat_id: i64, message_id: i64, text: &str) -> String {
        serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": message_id,
                "chat": {"id": chat_id, "type": "private"},
                "from": {"id": 42, "username": "ada"},
                "text": text
            }
        })
        .to_string()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, body)
    }

    fn webhook_request(channel_id: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/webhooks/telegram/{channel_id}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn authed(request: axum::http::request::Builder, token: &str) -> axum::http::request::Builder {
        request.header("authorization", format!("Bearer {token}"))
    }

    #[tokio::test]
    async fn health_needs_no_auth() {
        let app = test_app().await;
        let (status, body) = send(
            &app.router,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn tenant_routes_fail_closed_without_valid_token() {
        let app = test_app().await;

        let (status, _) = send(
            &app.router,
            Request::builder()
                .uri("/tenant/conversations")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app.router,
            authed(Request::builder().uri("/tenant/conversations"), "wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_roundtrip_reaches_the_tenant_inbox() {
        let app = test_app().await;

        let (status, body) = send(
            &app.router,
            webhook_request(&app.channel_id, &telegram_update(123, 456, "hi")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"ok": true}));

        // Operator A sees the conversation with its preview.
        let (status, body) = send(
            &app.router,
            authed(Request::builder().uri("/tenant/conversations"), TOKEN_A)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        let summary = &body["items"][0];
        assert_eq!(summary["externalThreadId"], "123");
        assert_eq!(summary["lastMessagePreview"], "hi");
        assert_eq!(summary["channel"]["type"], "telegram");
        assert_eq!(summary["channel"]["displayName"], "Support Bot");
        assert_eq!(body["nextCursor"], serde_json::Value::Null);

        // And the message itself, oldest-first.
        let conversation_id = summary["id"].as_str().unwrap().to_string();
        let (status, body) = send(
            &app.router,
            authed(
                Request::builder()
                    .uri(format!("/tenant/conversations/{conversation_id}/messages")),
                TOKEN_A,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["direction"], "inbound");
        assert_eq!(items[0]["providerMessageId"], "456");
        assert_eq!(items[0]["text"], "hi");

        // Operator B sees nothing of it.
        let (status, body) = send(
            &app.router,
            authed(Request::builder().uri("/tenant/conversations"), TOKEN_B)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["items"].as_array().unwrap().is_empty());

        let (status, _) = send(
            &app.router,
            authed(
                Request::builder()
                    .uri(format!("/tenant/conversations/{conversation_id}/messages")),
                TOKEN_B,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;
        assert_eq!(
            status,
            StatusCode::NOT_FOUND,
            "cross-tenant access must look like a missing record"
        );
    }

    #[tokio::test]
    async fn webhook_error_statuses() {
        let app = test_app().await;

        // Non-message update: acknowledged and flagged ignored.
        let (status, body) = send(
            &app.router,
            webhook_request(&app.channel_id, r#"{"update_id": 5, "my_chat_member": {}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"ok": true, "ignored": true}));

        // Unknown channel id of valid shape.
        let (status, _) = send(
            &app.router,
            webhook_request(&id::generate(), &telegram_update(1, 1, "x")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Malformed channel id.
        let (status, _) = send(
            &app.router,
            webhook_request("zzz", &telegram_update(1, 1, "x")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Unknown provider segment.
        let (status, _) = send(
            &app.router,
            Request::builder()
                .method("POST")
                .uri(format!("/webhooks/smoke-signal/{}", app.channel_id))
                .header("content-type", "application/json")
                .body(Body::from(telegram_update(1, 1, "x")))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Malformed body.
        let (status, _) = send(&app.router, webhook_request(&app.channel_id, "not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reply_flow_with_mock_credentials() {
        let app = test_app().await;

        send(
            &app.router,
            webhook_request(&app.channel_id, &telegram_update(123, 456, "hi")),
        )
        .await;

        let (_, body) = send(
            &app.router,
            authed(Request::builder().uri("/tenant/conversations"), TOKEN_A)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let conversation_id = body["items"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app.router,
            authed(
                Request::builder()
                    .method("POST")
                    .uri(format!("/tenant/conversations/{conversation_id}/messages"))
                    .header("content-type", "application/json"),
                TOKEN_A,
            )
            .body(Body::from(r#"{"text": "we are on it"}"#))
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["direction"], "outbound");
        assert_eq!(body["providerMessageId"], serde_json::Value::Null);
        assert_eq!(body["text"], "we are on it");

        // Empty text is a validation error.
        let (status, _) = send(
            &app.router,
            authed(
                Request::builder()
                    .method("POST")
                    .uri(format!("/tenant/conversations/{conversation_id}/messages"))
                    .header("content-type", "application/json"),
                TOKEN_A,
            )
            .body(Body::from(r#"{"text": "   "}"#))
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Cross-tenant reply attempt reads as missing.
        let (status, _) = send(
            &app.router,
            authed(
                Request::builder()
                    .method("POST")
                    .uri(format!("/tenant/conversations/{conversation_id}/messages"))
                    .header("content-type", "application/json"),
                TOKEN_B,
            )
            .body(Body::from(r#"{"text": "hello"}"#))
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn limit_clamping_applies_to_lists() {
        let app = test_app().await;

        // Two distinct threads -> two conversations.
        for (chat, mid) in [(1, 1), (2, 2)] {
            send(
                &app.router,
                webhook_request(&app.channel_id, &telegram_update(chat, mid, "x")),
            )
            .await;
        }

        // limit=0 clamps to 1.
        let (status, body) = send(
            &app.router,
            authed(
                Request::builder().uri("/tenant/conversations?limit=0"),
                TOKEN_A,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        // limit=500 clamps to 100 and still succeeds.
        let (status, body) = send(
            &app.router,
            authed(
                Request::builder().uri("/tenant/conversations?limit=500"),
                TOKEN_A,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn channel_management_is_tenant_scoped_and_redacts_credentials() {
        let app = test_app().await;

        let (status, body) = send(
            &app.router,
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/tenant/channels")
                    .header("content-type", "application/json"),
                TOKEN_B,
            )
            .body(Body::from(
                r#"{
                    "provider": "telegram",
                    "displayName": "Sales Bot",
                    "externalId": "sales_bot",
                    "credentials": {"bot_token": "test:sales"}
                }"#,
            ))
            .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["displayName"], "Sales Bot");
        assert!(
            body.get("credentials").is_none(),
            "credentials must never serialize back"
        );

        // Operator B lists only its own channel.
        let (_, body) = send(
            &app.router,
            authed(Request::builder().uri("/tenant/channels"), TOKEN_B)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["displayName"], "Sales Bot");

        // Operator A still sees only the seeded channel.
        let (_, body) = send(
            &app.router,
            authed(Request::builder().uri("/tenant/channels"), TOKEN_A)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["displayName"], "Support Bot");
    }
}
