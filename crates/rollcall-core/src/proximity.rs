//! Geofence evaluation against a session's anchor.

use crate::geo::{Coordinate, distance};
use crate::session::Session;

/// Outcome of measuring a coordinate against a session geofence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityCheck {
    pub distance_meters: f64,
    pub within_range: bool,
}

/// Measures `coordinate` against the session anchor.
///
/// The boundary is inclusive: a point exactly `radius_meters` away is in range.
pub fn evaluate(session: &Session, coordinate: Coordinate) -> ProximityCheck {
    let distance_meters = distance(session.anchor, coordinate);
    ProximityCheck {
        distance_meters,
        within_range: distance_meters <= session.radius_meters,
    }
}

pub fn within_range(session: &Session, coordinate: Coordinate) -> bool {
    evaluate(session, coordinate).within_range
}
