// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line companion for the Journeymap tracking SDK.
//!
//! Exercises the full pipeline from the shell: diagnostics, one-shot event
//! delivery, and consent management against the same persistent state the
//! embedded SDK uses.

mod doctor;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use journeymap_client::{ConsentGate, TrackerBuilder};
use journeymap_config::JourneymapConfig;
use journeymap_core::JourneymapError;
use journeymap_storage::SqliteStateStore;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

/// Journeymap - event tracking from the command line.
#[derive(Parser, Debug)]
#[command(name = "journeymap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run diagnostic checks against config, state storage, and the collector.
    Doctor,
    /// Send a single event through the full tracking pipeline.
    Send {
        /// Event name, e.g. `deploy_finished`.
        event: String,
        /// Event properties as a JSON object.
        #[arg(long)]
        props: Option<String>,
        /// Page or route to record with the event.
        #[arg(long)]
        url: Option<String>,
    },
    /// Inspect or change the stored consent decision.
    Consent {
        #[command(subcommand)]
        action: ConsentAction,
    },
}

/// Consent subcommands.
#[derive(Subcommand, Debug)]
enum ConsentAction {
    /// Grant consent and enable tracking.
    Grant,
    /// Revoke consent and disable tracking.
    Revoke,
    /// Show the current consent state.
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match journeymap_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            journeymap_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Doctor => doctor::run_doctor(&config).await,
        Commands::Send { event, props, url } => {
            run_send(config, &event, props.as_deref(), url.as_deref()).await
        }
        Commands::Consent { action } => run_consent(&config, action).await,
    };

    if let Err(e) = result {
        eprintln!("journeymap: {e}");
        std::process::exit(1);
    }
}

/// Sends one event and flushes before shutting down, so delivery failures
/// surface as a non-zero exit instead of being silently dropped.
async fn run_send(
    config: JourneymapConfig,
    event: &str,
    props: Option<&str>,
    url: Option<&str>,
) -> Result<(), JourneymapError> {
    let properties = parse_props(props)?;

    let tracker = TrackerBuilder::new(config).build().await?;
    if let Some(url) = url {
        tracker.page_view(url).await?;
    }
    tracker.track(event, properties).await?;
    tracker.flush().await?;
    tracker.shutdown().await?;

    println!("event `{event}` delivered");
    Ok(())
}

/// Parses the `--props` JSON object, defaulting to empty properties.
fn parse_props(props: Option<&str>) -> Result<Map<String, Value>, JourneymapError> {
    match props {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| JourneymapError::Config(format!("--props must be a JSON object: {e}"))),
        None => Ok(Map::new()),
    }
}

/// Consent management operates on the state store directly; no API key or
/// collector connectivity is needed to change a local privacy decision.
async fn run_consent(
    config: &JourneymapConfig,
    action: ConsentAction,
) -> Result<(), JourneymapError> {
    let store = Arc::new(SqliteStateStore::open(&config.storage.state_path).await?);
    let mut gate = ConsentGate::initialize(store.clone(), &config.consent, false).await?;

    match action {
        ConsentAction::Grant => {
            gate.grant().await?;
            println!("consent granted");
        }
        ConsentAction::Revoke => {
            gate.revoke().await?;
            println!("consent revoked");
        }
        ConsentAction::Status => {
            println!("{}", gate.state());
        }
    }

    store.close().await?;
    Ok(())
}
