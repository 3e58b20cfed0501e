//! # Blade Telemetry
//!
//! Logging bootstrap for applications built on the Blade client crates.
//! The library crates only emit `tracing` events; a binary calls
//! [`init_logging`] once at startup to decide where those events go.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blade_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BLADE_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `BLADE_JSON_LOGS` | `false` (`true` in containers) | JSON formatted output |
//! | `BLADE_CONSOLE_OUTPUT` | `true` | Write events to stdout at all |
//! | `BLADE_SERVICE_NAME` | `blade-client` | Service name attached at startup |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}
