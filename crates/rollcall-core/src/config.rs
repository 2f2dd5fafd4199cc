use serde::{Deserialize, Serialize};

use crate::error::{Result, RollcallError};

pub const DEFAULT_RADIUS_METERS: f64 = 150.0;
pub const DEFAULT_SESSION_NAME: &str = "Attendance";
pub const UNKNOWN_PARTICIPANT_NAME: &str = "Unknown participant";
pub const DEFAULT_MAX_CONCURRENT_INVITES: usize = 16;

fn default_radius_meters() -> f64 {
    DEFAULT_RADIUS_METERS
}

fn default_session_name() -> String {
    DEFAULT_SESSION_NAME.to_string()
}

fn default_unknown_participant_name() -> String {
    UNKNOWN_PARTICIPANT_NAME.to_string()
}

fn default_max_concurrent_invites() -> usize {
    DEFAULT_MAX_CONCURRENT_INVITES
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Tunables for the attendance engine.
///
/// Every field has a default so a partial `[attendance]` table is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AttendanceSettings {
    /// Geofence radius applied when `start` is not given one.
    #[serde(default = "default_radius_meters")]
    pub default_radius_meters: f64,
    /// Session label applied when `start` is not given one.
    #[serde(default = "default_session_name")]
    pub default_session_name: String,
    /// Display name used in reports when the directory lookup fails.
    #[serde(default = "default_unknown_participant_name")]
    pub unknown_participant_name: String,
    /// Upper bound on in-flight candidate evaluations during fan-out.
    #[serde(default = "default_max_concurrent_invites")]
    pub max_concurrent_invites: usize,
    /// Optional deadline for a single location or notify call.
    #[serde(default)]
    pub collaborator_timeout_ms: Option<u64>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            default_radius_meters: default_radius_meters(),
            default_session_name: default_session_name(),
            unknown_participant_name: default_unknown_participant_name(),
            max_concurrent_invites: default_max_concurrent_invites(),
            collaborator_timeout_ms: None,
            log_level: default_log_level(),
        }
    }
}

impl AttendanceSettings {
    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        validate_radius(self.default_radius_meters)
            .map_err(|e| RollcallError::config(format!("default_radius_meters: {}", e)))?;

        if self.max_concurrent_invites == 0 {
            return Err(RollcallError::config(
                "max_concurrent_invites must be at least 1",
            ));
        }

        if self.collaborator_timeout_ms == Some(0) {
            return Err(RollcallError::config(
                "collaborator_timeout_ms must be positive when set",
            ));
        }

        Ok(())
    }

    pub fn collaborator_timeout(&self) -> Option<std::time::Duration> {
        self.collaborator_timeout_ms
            .map(std::time::Duration::from_millis)
    }
}

/// Rejects radii that are not strictly positive finite numbers.
pub fn validate_radius(radius_meters: f64) -> Result<()> {
    if radius_meters.is_finite() && radius_meters > 0.0 {
        Ok(())
    } else {
        Err(RollcallError::invalid_input(format!(
            "radius must be a positive number of meters, got {}",
            radius_meters
        )))
    }
}
