// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Relayhub messaging hub.

use thiserror::Error;

use crate::types::ProviderType;

/// The primary error type used across all Relayhub crates.
///
/// The gateway maps variants onto HTTP statuses: `Validation` and
/// `UnsupportedProvider` are client errors, `NotFound` is a 404 (including
/// cross-tenant access, which must be indistinguishable from a missing
/// record), and `Provider`/`Storage`/`Internal` surface as 500s.
#[derive(Debug, Error)]
pub enum HubError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed or semantically invalid caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller failed an authenticity check (bad webhook secret).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The requested record does not exist within the caller's tenant scope.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// No adapter is registered for the channel's provider type.
    #[error("no adapter registered for provider `{provider}`")]
    UnsupportedProvider { provider: ProviderType },

    /// A provider adapter failed to deliver a send.
    #[error("provider {provider} fault: {kind}")]
    Provider {
        provider: ProviderType,
        kind: ProviderFaultKind,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Why a provider send failed.
///
/// `MissingCredential` is a configuration fault; `Rejected` carries the
/// provider's HTTP status so operators can tell a revoked token (401/403)
/// from a provider outage (5xx); `Unreachable` covers transport failures
/// and bounded-timeout expiry. None of these are retried by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFaultKind {
    MissingCredential,
    Rejected { status: u16 },
    Unreachable,
}

impl std::fmt::Display for ProviderFaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing credential"),
            Self::Rejected { status } => write!(f, "rejected with status {status}"),
            Self::Unreachable => write!(f, "unreachable"),
        }
    }
}

impl HubError {
    /// Shorthand for wrapping an arbitrary error as a storage fault.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }
}
