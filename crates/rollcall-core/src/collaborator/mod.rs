//! Capabilities the attendance engine consumes from its surroundings.
//!
//! The chat transport, the user directory, and the position source are all
//! owned by the host application. The engine only sees these traits.
//!
//! # Module Structure
//!
//! - `location`: Position source (`LocationProvider`)
//! - `directory`: Display-name resolution (`DirectoryLookup`)
//! - `notifier`: Outbound messages (`Notifier`, `Invitation`)

mod directory;
mod location;
mod notifier;

pub use directory::DirectoryLookup;
pub use location::LocationProvider;
pub use notifier::{Invitation, Notifier};
