// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Relayhub integration tests.
//!
//! Provides a mock provider adapter and a full-stack test harness for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Provider adapter with scripted send outcomes
//! - [`TestHarness`] - Temp-database hub stack with an assembled router

pub mod harness;
pub mod mock_provider;

pub use harness::{TestHarness, TENANT_A, TENANT_B, TOKEN_A, TOKEN_B};
pub use mock_provider::MockProvider;
