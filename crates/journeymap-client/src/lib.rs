// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process tracking client for the Journeymap SDK.
//!
//! The client buffers interaction events in memory and delivers them in
//! batches:
//! - **Consent gate**: collection is permitted only while consent is active;
//!   Do-Not-Track or a stored refusal disables it silently.
//! - **Session manager**: a persisted `timestamp-suffix` identifier
//!   correlates events across runs until reset.
//! - **Flush loop**: a periodic timer drains the queue; reaching the batch
//!   threshold flushes immediately; failed batches return to the front of
//!   the queue and ride the next tick.
//!
//! # Usage
//!
//! ```no_run
//! use journeymap_client::TrackerBuilder;
//! use journeymap_config::load_and_validate;
//! use serde_json::Map;
//!
//! # async fn run() -> Result<(), journeymap_core::JourneymapError> {
//! let config = load_and_validate().expect("config errors");
//! let tracker = TrackerBuilder::new(config).build().await?;
//!
//! tracker.page_view("/pricing").await?;
//! tracker.track("cta_clicked", Map::new()).await?;
//!
//! tracker.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod consent;
pub mod session;
pub mod tracker;

pub use consent::ConsentGate;
pub use session::SessionManager;
pub use tracker::{Tracker, TrackerBuilder};
