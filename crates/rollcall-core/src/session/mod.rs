//! Session domain module.
//!
//! This module contains the session model, the per-session attendance
//! ledger, and the concurrency-safe session registry.
//!
//! # Module Structure
//!
//! - `model`: Core session types (`Session`, `SessionId`, `AttendanceRecord`)
//! - `ledger`: At-most-once check-in bookkeeping (`AttendanceLedger`)
//! - `store`: Registry of live sessions (`SessionStore`, `SessionHandle`)
//!
//! # Usage
//!
//! ```ignore
//! use rollcall_core::session::{Session, SessionId, SessionStore};
//! use rollcall_core::session::{AttendanceLedger, CheckInResult};
//! ```

mod ledger;
mod model;
mod store;

// Re-export public API
pub use ledger::{AttendanceLedger, CheckInResult};
pub use model::{AttendanceRecord, ChannelId, ParticipantId, Session, SessionId, SessionStatus};
pub use store::{SessionHandle, SessionStore};
