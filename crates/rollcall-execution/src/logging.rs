//! Global tracing subscriber setup.

use rollcall_core::config::AttendanceSettings;
use rollcall_core::error::{Result, RollcallError};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::event_layer::{AttendanceEvent, AttendanceEventLayer};

/// Builds the level filter. `RUST_LOG` wins over `default_directive`.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| RollcallError::config(format!("invalid log filter '{}': {}", default_directive, e))),
    }
}

/// Installs a fmt subscriber at `default_directive` (e.g. the configured
/// `log_level`).
///
/// # Errors
///
/// Fails if the directive is invalid or a global subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter(default_directive)?)
        .try_init()
        .map_err(|e| RollcallError::internal(format!("tracing already initialized: {}", e)))
}

/// Installs a fmt subscriber at the configured `log_level`.
pub fn init_tracing_from(settings: &AttendanceSettings) -> Result<()> {
    init_tracing(&settings.log_level)
}

/// Like [`init_tracing`], additionally streaming engine events to the
/// returned receiver.
pub fn init_tracing_with_events(
    default_directive: &str,
) -> Result<mpsc::UnboundedReceiver<AttendanceEvent>> {
    let (layer, receiver) = AttendanceEventLayer::channel();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(layer)
        .with(env_filter(default_directive)?)
        .try_init()
        .map_err(|e| RollcallError::internal(format!("tracing already initialized: {}", e)))?;

    Ok(receiver)
}
