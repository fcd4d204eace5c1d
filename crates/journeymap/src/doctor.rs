// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `journeymap doctor` command implementation.
//!
//! Runs diagnostic checks against the Journeymap environment to identify
//! configuration issues, state-store problems, and collector connectivity.

use std::time::{Duration, Instant};

use journeymap_config::JourneymapConfig;
use journeymap_core::{JourneymapError, StateStore};
use journeymap_storage::SqliteStateStore;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

/// Run the `journeymap doctor` command.
///
/// Exits non-zero via the returned error when any check fails.
pub async fn run_doctor(config: &JourneymapConfig) -> Result<(), JourneymapError> {
    let results = vec![
        check_config(config),
        check_state_store(&config.storage.state_path).await,
        check_collector(config).await,
    ];

    println!();
    println!("  journeymap doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let marker = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => {
                warn_count += 1;
                "[WARN]"
            }
            CheckStatus::Fail => {
                fail_count += 1;
                "[FAIL]"
            }
        };
        println!(
            "    {marker} {:<14} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    println!();
    println!(
        "  {} checks, {} warnings, {} failures",
        results.len(),
        warn_count,
        fail_count
    );
    println!();

    if fail_count > 0 {
        return Err(JourneymapError::Internal(format!(
            "{fail_count} doctor check(s) failed"
        )));
    }
    Ok(())
}

/// Summarizes the loaded configuration; validation already ran at startup.
fn check_config(config: &JourneymapConfig) -> CheckResult {
    let start = Instant::now();
    let (status, message) = if config.api.key.is_some() {
        (
            CheckStatus::Pass,
            format!("collector {} (api key set)", config.api.url),
        )
    } else {
        (
            CheckStatus::Warn,
            format!("collector {} (api.key not set)", config.api.url),
        )
    };
    CheckResult {
        name: "config".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

/// Opens the state store and performs a write/read round trip.
async fn check_state_store(state_path: &str) -> CheckResult {
    let start = Instant::now();
    let result = async {
        let store = SqliteStateStore::open(state_path).await?;
        store.put("doctor-probe", "ok").await?;
        let value = store.get("doctor-probe").await?;
        store.remove("doctor-probe").await?;
        store.close().await?;
        Ok::<_, JourneymapError>(value)
    }
    .await;

    let (status, message) = match result {
        Ok(Some(v)) if v == "ok" => (CheckStatus::Pass, format!("writable at {state_path}")),
        Ok(_) => (
            CheckStatus::Fail,
            "round trip returned unexpected value".to_string(),
        ),
        Err(e) => (CheckStatus::Fail, format!("{e}")),
    };

    CheckResult {
        name: "state store".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

/// Probes the collector base URL for reachability.
///
/// Any HTTP response counts as reachable; only connection-level failures
/// fail the check.
async fn check_collector(config: &JourneymapConfig) -> CheckResult {
    let start = Instant::now();

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            return CheckResult {
                name: "collector".to_string(),
                status: CheckStatus::Fail,
                message: format!("failed to build HTTP client: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    let (status, message) = match client.get(&config.api.url).send().await {
        Ok(response) => (
            CheckStatus::Pass,
            format!("reachable ({})", response.status()),
        ),
        Err(e) => (CheckStatus::Fail, format!("unreachable: {e}")),
    };

    CheckResult {
        name: "collector".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_check_warns_without_api_key() {
        let config = JourneymapConfig::default();
        let result = check_config(&config);
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn config_check_passes_with_api_key() {
        let mut config = JourneymapConfig::default();
        config.api.key = Some("jm_key".to_string());
        let result = check_config(&config);
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn state_store_check_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doctor.db");
        let result = check_state_store(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }

    #[tokio::test]
    async fn collector_check_fails_when_unreachable() {
        let mut config = JourneymapConfig::default();
        // Port 1 on loopback refuses the connection immediately.
        config.api.url = "http://127.0.0.1:1".to_string();
        let result = check_collector(&config).await;
        assert_eq!(result.status, CheckStatus::Fail);
    }
}
