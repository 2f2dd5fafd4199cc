//! Configuration service implementation.
//!
//! Loads [`AttendanceSettings`] from the `[attendance]` table of a TOML file
//! (by default `~/.config/rollcall/config.toml`).

use crate::paths::RollcallPaths;
use rollcall_core::config::AttendanceSettings;
use rollcall_core::error::{Result, RollcallError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// On-disk layout of the config file.
#[derive(Deserialize, Debug, Default)]
struct ConfigRoot {
    #[serde(default)]
    attendance: AttendanceSettings,
}

/// Configuration service that loads and caches attendance settings.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached settings; `None` until first successful load.
    settings: Arc<RwLock<Option<AttendanceSettings>>>,
}

impl ConfigService {
    /// Creates a service reading from an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            settings: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading from the platform default location.
    pub fn from_default_location() -> Result<Self> {
        let path = RollcallPaths::config_file().map_err(|e| RollcallError::config(e.to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the settings, loading and validating the file on first access.
    ///
    /// A missing or empty file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// contains invalid values.
    pub fn settings(&self) -> Result<AttendanceSettings> {
        {
            let cached = self
                .settings
                .read()
                .map_err(|e| RollcallError::internal(format!("config cache poisoned: {}", e)))?;
            if let Some(settings) = cached.as_ref() {
                return Ok(settings.clone());
            }
        }

        let loaded = Self::load(&self.path)?;

        let mut cached = self
            .settings
            .write()
            .map_err(|e| RollcallError::internal(format!("config cache poisoned: {}", e)))?;
        *cached = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cached) = self.settings.write() {
            *cached = None;
        }
    }

    fn load(path: &Path) -> Result<AttendanceSettings> {
        if !path.exists() {
            tracing::debug!(
                target: "rollcall::config",
                path = %path.display(),
                "config file missing, using defaults"
            );
            return Ok(AttendanceSettings::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(AttendanceSettings::default());
        }

        let root: ConfigRoot = toml::from_str(&content)?;
        root.attendance.validate()?;

        tracing::info!(
            target: "rollcall::config",
            path = %path.display(),
            radius_m = root.attendance.default_radius_meters,
            "loaded attendance settings"
        );

        Ok(root.attendance)
    }
}
