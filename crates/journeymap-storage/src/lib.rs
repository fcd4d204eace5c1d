// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed persistent state for the Journeymap tracking SDK.
//!
//! Persists the handful of values the SDK keeps across runs -- session
//! identifier, identified customer, and consent flag -- in a small key-value
//! table. All writes are serialized through tokio-rusqlite's single
//! background thread; migrations are embedded via refinery.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteStateStore;
