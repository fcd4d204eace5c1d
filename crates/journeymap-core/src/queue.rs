// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory FIFO buffer of pending tracking events.
//!
//! The queue is drained as a detached snapshot for delivery. A failed
//! non-forced delivery returns the snapshot to the front, so the retry
//! preserves the original order ahead of anything tracked in the meantime.
//! The queue itself is unbounded; the only pressure valve is the max-age
//! discard applied before each flush.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use crate::types::TrackingEvent;

/// FIFO buffer of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<TrackingEvent>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event at the back.
    pub fn push(&mut self, event: TrackingEvent) {
        self.events.push_back(event);
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Detaches the entire queue contents, leaving the live queue empty.
    ///
    /// New events appended while the snapshot is in flight do not affect it.
    pub fn take_snapshot(&mut self) -> Vec<TrackingEvent> {
        self.events.drain(..).collect()
    }

    /// Returns a failed snapshot to the front of the queue.
    ///
    /// Snapshot order is preserved, and the snapshot lands ahead of events
    /// tracked while the delivery attempt was in flight.
    pub fn requeue_front(&mut self, snapshot: Vec<TrackingEvent>) {
        for event in snapshot.into_iter().rev() {
            self.events.push_front(event);
        }
    }

    /// Discards events older than `max_age` relative to `now`.
    ///
    /// Returns the number of events discarded.
    pub fn discard_older_than(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let before = self.events.len();
        self.events.retain(|event| now - event.timestamp <= max_age);
        before - self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionId;
    use serde_json::Map;

    fn event(name: &str) -> TrackingEvent {
        TrackingEvent::new(name, Map::new(), SessionId("s-1".into()))
    }

    #[test]
    fn push_preserves_fifo_order() {
        let mut queue = EventQueue::new();
        queue.push(event("a"));
        queue.push(event("b"));
        queue.push(event("c"));

        let snapshot = queue.take_snapshot();
        let names: Vec<&str> = snapshot.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn requeue_front_places_snapshot_before_newer_events() {
        let mut queue = EventQueue::new();
        queue.push(event("a"));
        queue.push(event("b"));

        let snapshot = queue.take_snapshot();

        // An event tracked while the snapshot was in flight.
        queue.push(event("c"));

        queue.requeue_front(snapshot);
        let drained = queue.take_snapshot();
        let names: Vec<&str> = drained.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn discard_older_than_drops_only_stale_events() {
        let mut queue = EventQueue::new();
        let mut stale = event("stale");
        stale.timestamp = Utc::now() - Duration::seconds(3600);
        queue.push(stale);
        queue.push(event("fresh"));

        let discarded = queue.discard_older_than(Duration::seconds(600), Utc::now());
        assert_eq!(discarded, 1);
        assert_eq!(queue.len(), 1);

        let remaining = queue.take_snapshot();
        assert_eq!(remaining[0].event_type, "fresh");
    }

    #[test]
    fn discard_on_empty_queue_is_noop() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.discard_older_than(Duration::seconds(1), Utc::now()), 0);
    }
}
