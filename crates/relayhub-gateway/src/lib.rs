// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Relayhub messaging hub.
//!
//! Exposes the provider webhook endpoint and the tenant REST surface over
//! axum, resolves bearer tokens to principals, and maps [`HubError`] onto
//! HTTP statuses.
//!
//! [`HubError`]: relayhub_core::HubError

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{build_router, start_server, GatewayState, HealthState};
