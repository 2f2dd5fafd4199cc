//! Infrastructure adapters for the Rollcall attendance engine.
//!
//! Provides the TOML-backed settings loader and deterministic in-memory
//! implementations of the collaborator traits, used in tests and demos and
//! as a reference for real adapters.

pub mod config_service;
pub mod in_memory_directory;
pub mod in_memory_location;
pub mod paths;
pub mod recording_notifier;

pub use crate::config_service::ConfigService;
pub use crate::in_memory_directory::InMemoryDirectory;
pub use crate::in_memory_location::InMemoryLocationProvider;
pub use crate::paths::RollcallPaths;
pub use crate::recording_notifier::{RecordingNotifier, SentMessage};
