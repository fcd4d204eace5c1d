// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session identity: a client-generated identifier persisted across runs.

use std::sync::Arc;

use chrono::Utc;
use journeymap_core::{JourneymapError, SessionId, StateStore};
use rand::Rng;
use tracing::{debug, info};

/// State-store key holding the current session identifier.
pub(crate) const SESSION_KEY: &str = "journey-session";
/// State-store key holding the session start timestamp.
pub(crate) const SESSION_STARTED_KEY: &str = "journey-session-started";

/// Generates, caches, and persists the session identifier.
pub struct SessionManager {
    cached: Option<SessionId>,
    store: Arc<dyn StateStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            cached: None,
            store,
        }
    }

    /// Returns the current session id.
    ///
    /// Resolution order: in-memory cache, then the persisted value, then a
    /// freshly generated identifier which is persisted together with the
    /// session start time.
    pub async fn session_id(&mut self) -> Result<SessionId, JourneymapError> {
        if let Some(id) = &self.cached {
            return Ok(id.clone());
        }

        if let Some(persisted) = self.store.get(SESSION_KEY).await? {
            let id = SessionId(persisted);
            debug!(session_id = %id, "resumed persisted session");
            self.cached = Some(id.clone());
            return Ok(id);
        }

        let id = generate_session_id();
        self.store.put(SESSION_KEY, &id.0).await?;
        self.store
            .put(SESSION_STARTED_KEY, &Utc::now().to_rfc3339())
            .await?;
        info!(session_id = %id, "started new session");
        self.cached = Some(id.clone());
        Ok(id)
    }

    /// Discards the cached id and persisted session state.
    ///
    /// The next `session_id` call generates a fresh identifier.
    pub async fn reset(&mut self) -> Result<(), JourneymapError> {
        self.cached = None;
        self.store.remove(SESSION_KEY).await?;
        self.store.remove(SESSION_STARTED_KEY).await?;
        debug!("session reset");
        Ok(())
    }
}

/// Millisecond timestamp plus an 8-character random suffix.
///
/// Collisions within one install are accepted as negligible given the random
/// component.
fn generate_session_id() -> SessionId {
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    SessionId(format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        suffix.to_lowercase()
    ))
}
