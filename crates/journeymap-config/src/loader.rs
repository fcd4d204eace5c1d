// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./journeymap.toml` > `~/.config/journeymap/journeymap.toml`
//! > `/etc/journeymap/journeymap.toml` with environment variable overrides via
//! the `JOURNEYMAP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::JourneymapConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/journeymap/journeymap.toml` (system-wide)
/// 3. `~/.config/journeymap/journeymap.toml` (user XDG config)
/// 4. `./journeymap.toml` (local directory)
/// 5. `JOURNEYMAP_*` environment variables
pub fn load_config() -> Result<JourneymapConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<JourneymapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(JourneymapConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<JourneymapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(JourneymapConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(JourneymapConfig::default()))
        .merge(Toml::file("/etc/journeymap/journeymap.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("journeymap/journeymap.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("journeymap.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `JOURNEYMAP_BATCH_BATCH_SIZE` must map to
/// `batch.batch_size`, not `batch.batch.size`.
fn env_provider() -> Env {
    Env::prefixed("JOURNEYMAP_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: JOURNEYMAP_API_KEY -> "api_key" -> "api.key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("api_", "api.", 1)
            .replacen("batch_", "batch.", 1)
            .replacen("consent_", "consent.", 1)
            .replacen("delivery_", "delivery.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
