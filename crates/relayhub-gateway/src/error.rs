// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`HubError`] to HTTP responses.
//!
//! Client faults carry their message; server faults answer with a generic
//! body and log the detail (provider, status) so configuration failures are
//! distinguishable from transient ones without leaking internals to callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relayhub_core::HubError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wrapper giving `HubError` an HTTP shape.
pub struct ApiError(pub HubError);

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            HubError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            HubError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
            HubError::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("{resource} not found"))
            }
            HubError::UnsupportedProvider { provider } => (
                StatusCode::BAD_REQUEST,
                format!("provider `{provider}` is not supported"),
            ),
            HubError::Provider { provider, kind } => {
                tracing::error!(provider = %provider, fault = %kind, "provider fault");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
            HubError::Storage { source } => {
                tracing::error!(error = %source, "storage fault");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
            other => {
                tracing::error!(error = %other, "unexpected fault");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        (status, Json(ErrorBody { error: body })).into_response()
    }
}
