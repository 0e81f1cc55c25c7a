//! # Hub Telemetry
//!
//! Structured logging for Bandwidth Hub processes, built on `tracing` and
//! `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hub_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HUB_SERVICE_NAME` | `bandwidth-hub` | Service name in log lines |
//! | `HUB_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `HUB_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |
//! | `HUB_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `HUB_NETWORK` | `devnet` | Network name |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install structured logging for the process.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(&config)?;
    Ok(TelemetryGuard {
        service: config.full_service_name(),
    })
}

/// Guard that marks the telemetry lifetime. Logs on drop.
#[derive(Debug)]
pub struct TelemetryGuard {
    service: String,
}

impl TelemetryGuard {
    /// Service name the guard was created for.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service, "Shutting down telemetry...");
    }
}

/// Convenience macro for creating a span with subsystem context.
///
/// ```rust,ignore
/// use hub_telemetry::subsystem_span;
///
/// let _span = subsystem_span!("deliver", subsystem = "vpn", height = 12u64).entered();
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
