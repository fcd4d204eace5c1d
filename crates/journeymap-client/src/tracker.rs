// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tracking client: event collection, batching, and timed delivery.
//!
//! [`Tracker`] owns an in-memory FIFO queue and a background flush loop.
//! `track` appends consent-gated, enriched events; the loop flushes on a
//! periodic timer, and reaching the batch-size threshold wakes it early.
//! A failed flush returns its snapshot to the front of the queue for the
//! next tick; the final flush on shutdown never re-queues.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use journeymap_config::JourneymapConfig;
use journeymap_core::{
    ConsentState, DeliverySink, EventQueue, JourneymapError, SessionId, StateStore, TrackingEvent,
};
use journeymap_storage::SqliteStateStore;
use journeymap_transport::CollectorClient;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, Notify};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::consent::ConsentGate;
use crate::session::SessionManager;

/// State-store key holding the identified customer.
pub(crate) const CUSTOMER_KEY: &str = "journey-customer";

/// Builder for [`Tracker`].
///
/// The state store and delivery sink default to the SQLite store and the
/// HTTP collector client; tests and embedders can substitute their own.
pub struct TrackerBuilder {
    config: JourneymapConfig,
    store: Option<Arc<dyn StateStore>>,
    sink: Option<Arc<dyn DeliverySink>>,
    do_not_track: bool,
}

impl TrackerBuilder {
    pub fn new(config: JourneymapConfig) -> Self {
        Self {
            config,
            store: None,
            sink: None,
            do_not_track: false,
        }
    }

    /// Substitutes the persistent state backend.
    pub fn state_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Substitutes the delivery transport.
    pub fn delivery_sink(mut self, sink: Arc<dyn DeliverySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Supplies the host's Do-Not-Track signal.
    ///
    /// There is no ambient source for this in a host process; the embedder
    /// reads it (user preference, platform setting) and passes it in once.
    pub fn do_not_track(mut self, do_not_track: bool) -> Self {
        self.do_not_track = do_not_track;
        self
    }

    /// Constructs the tracker and starts its background flush loop.
    ///
    /// Fails when no delivery sink was substituted and `api.key` is unset:
    /// the collector client cannot be built without credentials.
    pub async fn build(self) -> Result<Tracker, JourneymapError> {
        let store: Arc<dyn StateStore> = match self.store {
            Some(store) => store,
            None => Arc::new(SqliteStateStore::open(&self.config.storage.state_path).await?),
        };

        let sink: Arc<dyn DeliverySink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(
                CollectorClient::new(
                    &self.config.api.url,
                    self.config.api.key.as_deref().unwrap_or_default(),
                )?
                .with_tracking_id(self.config.api.tracking_id.clone()),
            ),
        };

        let gate =
            ConsentGate::initialize(store.clone(), &self.config.consent, self.do_not_track)
                .await?;
        let session = SessionManager::new(store.clone());
        let customer_id = store.get(CUSTOMER_KEY).await?;

        let inner = Arc::new(TrackerInner {
            batch_size: self.config.batch.batch_size,
            flush_interval: Duration::from_secs(self.config.batch.flush_interval_secs),
            max_event_age: chrono::Duration::seconds(
                self.config.batch.max_event_age_secs as i64,
            ),
            queue: Mutex::new(EventQueue::new()),
            gate: Mutex::new(gate),
            session: Mutex::new(session),
            customer_id: Mutex::new(customer_id),
            journey_id: Mutex::new(None),
            current_url: Mutex::new(None),
            sink,
            store,
            flush_signal: Notify::new(),
        });

        let cancel = CancellationToken::new();
        let worker = tokio::spawn(flush_loop(inner.clone(), cancel.clone()));

        info!(
            batch_size = self.config.batch.batch_size,
            flush_interval_secs = self.config.batch.flush_interval_secs,
            "tracker initialized"
        );

        Ok(Tracker {
            inner,
            cancel,
            worker,
        })
    }
}

struct TrackerInner {
    batch_size: usize,
    flush_interval: Duration,
    max_event_age: chrono::Duration,
    queue: Mutex<EventQueue>,
    gate: Mutex<ConsentGate>,
    session: Mutex<SessionManager>,
    customer_id: Mutex<Option<String>>,
    journey_id: Mutex<Option<String>>,
    current_url: Mutex<Option<String>>,
    sink: Arc<dyn DeliverySink>,
    store: Arc<dyn StateStore>,
    flush_signal: Notify,
}

impl TrackerInner {
    /// Drains the queue as a detached snapshot and attempts one delivery.
    ///
    /// New events append to the live queue while the POST is in flight. On
    /// failure a non-forced flush re-queues the snapshot at the front; a
    /// forced flush drops it, since there is no later tick to retry on.
    async fn flush(&self, force: bool) -> Result<(), JourneymapError> {
        let snapshot = {
            let mut queue = self.queue.lock().await;
            let discarded = queue.discard_older_than(self.max_event_age, Utc::now());
            if discarded > 0 {
                warn!(discarded, "discarded events past max retry age");
            }
            if queue.is_empty() {
                return Ok(());
            }
            queue.take_snapshot()
        };

        let count = snapshot.len();
        match self.sink.deliver(&snapshot).await {
            Ok(()) => {
                debug!(count, force, "flush delivered");
                Ok(())
            }
            Err(e) if force => {
                warn!(error = %e, count, "final flush failed, events dropped");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, count, "flush failed, events re-queued");
                self.queue.lock().await.requeue_front(snapshot);
                Err(e)
            }
        }
    }
}

/// Background loop: flush on the periodic timer or when the batch-size
/// threshold wakes it early, until cancelled.
async fn flush_loop(inner: Arc<TrackerInner>, cancel: CancellationToken) {
    let period = inner.flush_interval;
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Failures are logged and re-queued inside flush; the next
                // tick retries.
                let _ = inner.flush(false).await;
            }
            _ = inner.flush_signal.notified() => {
                let _ = inner.flush(false).await;
            }
            _ = cancel.cancelled() => {
                debug!("flush loop stopped");
                break;
            }
        }
    }
}

/// Handle to a running tracking client.
///
/// Constructed via [`TrackerBuilder`]; owned by the host's composition root
/// and shared by reference. [`shutdown`](Tracker::shutdown) stops the flush
/// loop and performs a final forced flush.
pub struct Tracker {
    inner: Arc<TrackerInner>,
    cancel: CancellationToken,
    worker: tokio::task::JoinHandle<()>,
}

impl Tracker {
    /// Records an event with the given name and properties.
    ///
    /// The event is enriched with the session id, current URL, identified
    /// customer, and journey scope, then queued. While consent is withheld
    /// or Do-Not-Track is active, no event is created. Reaching the
    /// batch-size threshold wakes the flush loop immediately.
    pub async fn track(
        &self,
        event_type: &str,
        properties: Map<String, Value>,
    ) -> Result<(), JourneymapError> {
        {
            let gate = self.inner.gate.lock().await;
            if !gate.allows() {
                debug!(event_type, state = %gate.state(), "collection disabled, event dropped");
                return Ok(());
            }
        }

        let session_id = self.inner.session.lock().await.session_id().await?;
        let mut event = TrackingEvent::new(event_type, properties, session_id);
        event.url = self.inner.current_url.lock().await.clone();
        event.customer_id = self.inner.customer_id.lock().await.clone();
        event.journey_id = self.inner.journey_id.lock().await.clone();

        let (queued, at_threshold) = {
            let mut queue = self.inner.queue.lock().await;
            queue.push(event);
            (queue.len(), queue.len() >= self.inner.batch_size)
        };
        debug!(event_type, queued, "event tracked");

        if at_threshold {
            self.inner.flush_signal.notify_one();
        }
        Ok(())
    }

    /// Records a navigation and updates the URL stamped on later events.
    ///
    /// Hosts call this from their router's navigation hook.
    pub async fn page_view(&self, url: &str) -> Result<(), JourneymapError> {
        *self.inner.current_url.lock().await = Some(url.to_string());
        let mut properties = Map::new();
        properties.insert("url".to_string(), Value::String(url.to_string()));
        self.track("page_view", properties).await
    }

    /// Associates a customer with this install and persists the identifier.
    pub async fn identify(&self, customer_id: &str) -> Result<(), JourneymapError> {
        self.inner.store.put(CUSTOMER_KEY, customer_id).await?;
        *self.inner.customer_id.lock().await = Some(customer_id.to_string());
        debug!(customer_id, "customer identified");
        Ok(())
    }

    /// Scopes subsequent events to a journey, or clears the scope with `None`.
    pub async fn set_journey(&self, journey_id: Option<&str>) {
        *self.inner.journey_id.lock().await = journey_id.map(str::to_string);
    }

    /// Grants consent and enables collection from this point forward.
    pub async fn grant_consent(&self) -> Result<(), JourneymapError> {
        self.inner.gate.lock().await.grant().await
    }

    /// Revokes consent, disables collection, and drops any pending events.
    pub async fn revoke_consent(&self) -> Result<(), JourneymapError> {
        self.inner.gate.lock().await.revoke().await?;
        let dropped = self.inner.queue.lock().await.take_snapshot().len();
        if dropped > 0 {
            debug!(dropped, "pending events dropped on consent revocation");
        }
        Ok(())
    }

    /// Current consent gate state.
    pub async fn consent_state(&self) -> ConsentState {
        self.inner.gate.lock().await.state()
    }

    /// Current session id, generating and persisting one if needed.
    pub async fn session_id(&self) -> Result<SessionId, JourneymapError> {
        self.inner.session.lock().await.session_id().await
    }

    /// Discards the session, forcing a fresh id on next access.
    pub async fn reset_session(&self) -> Result<(), JourneymapError> {
        self.inner.session.lock().await.reset().await
    }

    /// Number of events currently queued.
    pub async fn pending_events(&self) -> usize {
        self.inner.queue.lock().await.len()
    }

    /// Flushes the queue now, re-queuing on failure.
    pub async fn flush(&self) -> Result<(), JourneymapError> {
        self.inner.flush(false).await
    }

    /// Stops the flush loop and performs a final forced flush.
    ///
    /// The final flush never re-queues: whatever it cannot deliver is
    /// dropped with a warning, and the queue is empty afterwards.
    pub async fn shutdown(self) -> Result<(), JourneymapError> {
        self.cancel.cancel();
        if let Err(e) = self.worker.await {
            warn!(error = %e, "flush loop task failed");
        }
        self.inner.flush(true).await
    }
}
