// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Journeymap integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! external services.
//!
//! # Components
//!
//! - [`MockSink`] - Delivery sink with scripted failures and captured batches
//! - [`MemoryStateStore`] - In-memory state store

pub mod memory_store;
pub mod mock_sink;

pub use memory_store::MemoryStateStore;
pub use mock_sink::MockSink;
