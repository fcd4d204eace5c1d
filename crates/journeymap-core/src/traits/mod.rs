// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by pluggable SDK backends.

pub mod sink;
pub mod state;

pub use sink::DeliverySink;
pub use state::StateStore;
