// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Journeymap tracking SDK.
//!
//! This crate provides the foundational event and session types, the error
//! type, the shared event queue, and the adapter traits (`StateStore`,
//! `DeliverySink`) implemented by the storage and transport crates.

pub mod error;
pub mod queue;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::JourneymapError;
pub use queue::EventQueue;
pub use traits::{DeliverySink, StateStore};
pub use types::{ConsentState, SessionId, TrackingEvent};
