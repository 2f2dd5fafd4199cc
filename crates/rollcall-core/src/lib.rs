//! Domain layer of the Rollcall attendance engine.
//!
//! Holds the session model and registry, the attendance ledger, geofence
//! math, report building, and the traits for external collaborators.

pub mod collaborator;
pub mod config;
pub mod error;
pub mod geo;
pub mod proximity;
pub mod report;
pub mod session;

// Re-export common types
pub use error::{Result, RollcallError};
pub use geo::Coordinate;
