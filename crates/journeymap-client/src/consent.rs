// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consent gate controlling whether events may be collected.
//!
//! The gate is evaluated before an event is created, never after: while
//! collection is disabled nothing enters the queue, and granting consent
//! later starts tracking from that point forward with no retroactive capture.

use std::sync::Arc;

use journeymap_config::model::ConsentConfig;
use journeymap_core::{ConsentState, JourneymapError, StateStore};
use tracing::{debug, info};

/// State-store key holding the persisted consent decision.
pub(crate) const CONSENT_KEY: &str = "journey-consent";

/// Privacy checkpoint in front of the event collector.
pub struct ConsentGate {
    state: ConsentState,
    store: Arc<dyn StateStore>,
}

impl ConsentGate {
    /// Builds the gate from the host-supplied Do-Not-Track signal and any
    /// persisted consent decision.
    ///
    /// Resolution order: DNT (when honored) disables collection; otherwise a
    /// stored `true` activates and any other stored value disables. With no
    /// stored decision, `require_consent` keeps the gate uninitialized until
    /// an explicit grant; the default opt-out model activates immediately.
    pub async fn initialize(
        store: Arc<dyn StateStore>,
        config: &ConsentConfig,
        do_not_track: bool,
    ) -> Result<Self, JourneymapError> {
        let state = if config.respect_do_not_track && do_not_track {
            ConsentState::Disabled
        } else {
            match store.get(CONSENT_KEY).await?.as_deref() {
                Some("true") => ConsentState::Active,
                Some(_) => ConsentState::Disabled,
                None if config.require_consent => ConsentState::Uninitialized,
                None => ConsentState::Active,
            }
        };

        debug!(state = %state, do_not_track, "consent gate initialized");
        Ok(Self { state, store })
    }

    /// Current gate state.
    pub fn state(&self) -> ConsentState {
        self.state
    }

    /// Whether event collection is currently permitted.
    pub fn allows(&self) -> bool {
        self.state == ConsentState::Active
    }

    /// Grants consent, persists the decision, and enables collection.
    ///
    /// An explicit grant always wins, including over a Do-Not-Track signal
    /// seen at initialization.
    pub async fn grant(&mut self) -> Result<(), JourneymapError> {
        self.store.put(CONSENT_KEY, "true").await?;
        self.state = ConsentState::Active;
        info!("consent granted, tracking enabled");
        Ok(())
    }

    /// Revokes consent, persists the refusal, and disables collection.
    pub async fn revoke(&mut self) -> Result<(), JourneymapError> {
        self.store.put(CONSENT_KEY, "false").await?;
        self.state = ConsentState::Disabled;
        info!("consent revoked, tracking disabled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeymap_test_utils::MemoryStateStore;

    fn opt_out_config() -> ConsentConfig {
        ConsentConfig::default()
    }

    fn opt_in_config() -> ConsentConfig {
        ConsentConfig {
            respect_do_not_track: true,
            require_consent: true,
        }
    }

    #[tokio::test]
    async fn no_signal_defaults_to_active() {
        let store = Arc::new(MemoryStateStore::new());
        let gate = ConsentGate::initialize(store, &opt_out_config(), false)
            .await
            .unwrap();
        assert_eq!(gate.state(), ConsentState::Active);
        assert!(gate.allows());
    }

    #[tokio::test]
    async fn do_not_track_disables() {
        let store = Arc::new(MemoryStateStore::new());
        let gate = ConsentGate::initialize(store, &opt_out_config(), true)
            .await
            .unwrap();
        assert_eq!(gate.state(), ConsentState::Disabled);
        assert!(!gate.allows());
    }

    #[tokio::test]
    async fn do_not_track_ignored_when_not_respected() {
        let store = Arc::new(MemoryStateStore::new());
        let config = ConsentConfig {
            respect_do_not_track: false,
            require_consent: false,
        };
        let gate = ConsentGate::initialize(store, &config, true).await.unwrap();
        assert!(gate.allows());
    }

    #[tokio::test]
    async fn stored_refusal_disables() {
        let store = Arc::new(MemoryStateStore::new());
        store.seed(CONSENT_KEY, "false").await;
        let gate = ConsentGate::initialize(store, &opt_out_config(), false)
            .await
            .unwrap();
        assert_eq!(gate.state(), ConsentState::Disabled);
    }

    #[tokio::test]
    async fn stored_grant_activates_in_opt_in_mode() {
        let store = Arc::new(MemoryStateStore::new());
        store.seed(CONSENT_KEY, "true").await;
        let gate = ConsentGate::initialize(store, &opt_in_config(), false)
            .await
            .unwrap();
        assert!(gate.allows());
    }

    #[tokio::test]
    async fn opt_in_mode_starts_uninitialized() {
        let store = Arc::new(MemoryStateStore::new());
        let gate = ConsentGate::initialize(store, &opt_in_config(), false)
            .await
            .unwrap();
        assert_eq!(gate.state(), ConsentState::Uninitialized);
        assert!(!gate.allows());
    }

    #[tokio::test]
    async fn grant_persists_and_activates() {
        let store = Arc::new(MemoryStateStore::new());
        let mut gate = ConsentGate::initialize(store.clone(), &opt_in_config(), false)
            .await
            .unwrap();

        gate.grant().await.unwrap();
        assert!(gate.allows());
        assert_eq!(store.get(CONSENT_KEY).await.unwrap().as_deref(), Some("true"));

        // A fresh gate sees the persisted grant.
        let gate = ConsentGate::initialize(store, &opt_in_config(), false)
            .await
            .unwrap();
        assert!(gate.allows());
    }

    #[tokio::test]
    async fn grant_overrides_do_not_track() {
        let store = Arc::new(MemoryStateStore::new());
        let mut gate = ConsentGate::initialize(store, &opt_out_config(), true)
            .await
            .unwrap();
        assert!(!gate.allows());

        gate.grant().await.unwrap();
        assert!(gate.allows());
    }

    #[tokio::test]
    async fn revoke_persists_and_disables() {
        let store = Arc::new(MemoryStateStore::new());
        let mut gate = ConsentGate::initialize(store.clone(), &opt_out_config(), false)
            .await
            .unwrap();
        assert!(gate.allows());

        gate.revoke().await.unwrap();
        assert!(!gate.allows());
        assert_eq!(
            store.get(CONSENT_KEY).await.unwrap().as_deref(),
            Some("false")
        );
    }
}
