// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the tenant surface.
//!
//! Maps static operator bearer tokens (from configuration) onto
//! [`Principal`]s. Identity management itself is an external concern; the
//! hub only ever sees an opaque token and the tenant/roles it stands for.
//! When no operators are configured, all tenant requests are rejected
//! (fail-closed). Webhook routes never pass through this middleware.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use relayhub_core::types::Principal;

/// Authentication configuration for the tenant routes.
#[derive(Clone, Default)]
pub struct AuthConfig {
    operators: Vec<(String, Principal)>,
}

impl AuthConfig {
    /// Build the token → principal table from configuration.
    pub fn from_config(auth: &relayhub_config::model::AuthSection) -> Self {
        let operators = auth
            .operators
            .iter()
            .map(|op| {
                (
                    op.token.clone(),
                    Principal {
                        tenant_id: op.tenant_id.clone(),
                        roles: op.roles.clone(),
                    },
                )
            })
            .collect();
        Self { operators }
    }

    /// Resolve a presented bearer token to its principal.
    pub fn resolve(&self, token: &str) -> Option<&Principal> {
        self.operators
            .iter()
            .find(|(expected, _)| expected == token)
            .map(|(_, principal)| principal)
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("operators", &self.operators.len())
            .finish()
    }
}

/// Middleware that resolves the bearer token and injects the [`Principal`]
/// into request extensions for handlers to consume.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.is_empty() {
        tracing::error!("no operators configured -- rejecting tenant request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token.and_then(|t| auth.resolve(t)) {
        Some(principal) => {
            request.extensions_mut().insert(principal.clone());
            Ok(next.run(request).await)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relayhub_config::model::{AuthSection, OperatorConfig};

    fn auth_with(token: &str, tenant_id: &str) -> AuthConfig {
        AuthConfig::from_config(&AuthSection {
            operators: vec![OperatorConfig {
                token: token.to_string(),
                tenant_id: tenant_id.to_string(),
                roles: vec!["operator".to_string()],
            }],
        })
    }

    #[test]
    fn resolve_maps_token_to_principal() {
        let auth = auth_with("tok-a", "0123456789abcdef01234567");
        let principal = auth.resolve("tok-a").expect("known token resolves");
        assert_eq!(principal.tenant_id, "0123456789abcdef01234567");
        assert_eq!(principal.roles, vec!["operator"]);
        assert!(auth.resolve("tok-b").is_none());
    }

    #[test]
    fn empty_config_resolves_nothing() {
        let auth = AuthConfig::default();
        assert!(auth.is_empty());
        assert!(auth.resolve("anything").is_none());
    }

    #[test]
    fn debug_does_not_leak_tokens() {
        let auth = auth_with("very-secret", "0123456789abcdef01234567");
        let debug = format!("{auth:?}");
        assert!(!debug.contains("very-secret"));
    }
}
