// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading, validation, and diagnostics.

use journeymap_config::{load_and_validate_str, ConfigError};

#[test]
fn empty_config_is_valid_with_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.api.url, "https://events.journeymap.app");
    assert_eq!(config.batch.batch_size, 50);
    assert_eq!(config.batch.flush_interval_secs, 5);
    assert_eq!(config.batch.max_event_age_secs, 600);
    assert_eq!(config.delivery.max_retries, 3);
    assert_eq!(config.delivery.initial_backoff_ms, 500);
    assert!(config.api.key.is_none());
}

#[test]
fn full_config_round_trips() {
    let config = load_and_validate_str(
        r#"
[api]
url = "https://collect.example.com"
key = "jm_live_abc123"
tracking_id = "site-77"

[batch]
batch_size = 25
flush_interval_secs = 10
max_event_age_secs = 120

[consent]
respect_do_not_track = false
require_consent = true

[delivery]
max_retries = 5
initial_backoff_ms = 250
request_timeout_secs = 3

[storage]
state_path = "/tmp/journeymap-test/state.db"
"#,
    )
    .expect("config should validate");

    assert_eq!(config.api.tracking_id.as_deref(), Some("site-77"));
    assert_eq!(config.batch.batch_size, 25);
    assert!(!config.consent.respect_do_not_track);
    assert!(config.consent.require_consent);
    assert_eq!(config.delivery.max_retries, 5);
    assert_eq!(config.delivery.request_timeout_secs, 3);
    assert_eq!(config.storage.state_path, "/tmp/journeymap-test/state.db");
}

#[test]
fn unknown_key_yields_suggestion() {
    let errors = load_and_validate_str(
        r#"
[batch]
batch_sze = 10
"#,
    )
    .expect_err("unknown key should be rejected");

    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("should produce an UnknownKey diagnostic");

    assert_eq!(unknown.0, "batch_sze");
    assert_eq!(unknown.1.as_deref(), Some("batch_size"));
}

#[test]
fn invalid_type_is_reported() {
    let errors = load_and_validate_str(
        r#"
[batch]
batch_size = "many"
"#,
    )
    .expect_err("string batch_size should be rejected");

    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { .. })));
}

#[test]
fn validation_errors_are_collected_not_fail_fast() {
    let errors = load_and_validate_str(
        r#"
[api]
url = ""

[batch]
batch_size = 0
flush_interval_secs = 0
"#,
    )
    .expect_err("multiple invalid values should be rejected");

    // All three problems reported in one pass.
    assert!(errors.len() >= 3, "expected >= 3 errors, got {errors:?}");
}
