//! # blade-check
//!
//! Connects to the node named by a client config, runs the startup sequence
//! and reports what the node offers.
//!
//! ```text
//! blade-check [CONFIG]      # default: $BLADE_CONFIG, then ./blade.json
//! ```

use anyhow::{Context, Result};
use blade_client::{BladeClient, ClientConfig};
use blade_telemetry::{init_logging, TelemetryConfig};
use tracing::{info, warn};

const DEFAULT_CONFIG_PATH: &str = "blade.json";

fn config_path() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BLADE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&TelemetryConfig::from_env())?;

    let path = config_path();
    let config =
        ClientConfig::from_file(&path).with_context(|| format!("loading config from {path}"))?;

    let client = BladeClient::connect(config)
        .await
        .context("connecting to Blade node")?;
    let registered = client.init().await.context("initializing app")?;
    info!(contracts = registered.len(), "Startup sequence complete");

    match client.accounts().await {
        Ok(accounts) => {
            for account in &accounts {
                info!(account = %account, "Node account");
            }
        }
        Err(e) => warn!(error = %e, "Could not list accounts"),
    }

    match client.ipfs_id().await {
        Ok(id) => info!(id = %id, "Storage node identity"),
        Err(e) => warn!(error = %e, "Could not read storage node identity"),
    }

    Ok(())
}
