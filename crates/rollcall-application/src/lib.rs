//! Application layer of the Rollcall attendance engine.
//!
//! Exposes [`SessionLifecycle`], the entry point the surrounding command or
//! event layer calls for `start`, `check_in`, `view_attendance`, and `end`.

pub mod lifecycle;
pub mod outcome;

pub use lifecycle::SessionLifecycle;
pub use outcome::{CheckInOutcome, FanOutSummary, ReportOutcome, StartRequest, StartedSession};
