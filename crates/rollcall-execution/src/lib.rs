//! Runtime wiring for the Rollcall attendance engine: tracing setup and the
//! attendance event stream.

pub mod event_layer;
pub mod logging;

pub use event_layer::{AttendanceEvent, AttendanceEventLayer};
pub use logging::{init_tracing, init_tracing_from, init_tracing_with_events};
