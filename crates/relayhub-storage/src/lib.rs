// SPDX-FileCopyrightText: 2026 Relayhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Relayhub messaging hub.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed CRUD operations for
//! channels, conversations, and the append-only message ledger. The
//! conversation thread-key uniqueness that the resolver depends on lives here
//! as a SQL constraint, not application logic.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod writer;

pub use database::Database;
pub use queries::messages::AppendOutcome;
