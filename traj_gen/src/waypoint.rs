//! Waypoint model
//!
//! A waypoint is a user-authored control point on a path. The fitted curve
//! passes exactly through each waypoint's position, with the curve tangent
//! matching `heading_out_rad` on the outgoing segment and `heading_in_rad` on
//! the incoming segment. Distinct in/out headings express a sharp directional
//! change at the waypoint.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A user-authored control point on a path.
///
/// Waypoints are constructed once from input data and are immutable
/// thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position of the waypoint in the path frame.
    pub position_m: Point2<f64>,

    /// Tangent heading of the curve arriving at this waypoint.
    pub heading_in_rad: f64,

    /// Tangent heading of the curve leaving this waypoint.
    pub heading_out_rad: f64,

    /// If set, the velocity the trajectory must have at this waypoint,
    /// overriding the profiled velocity.
    pub velocity_override_ms: Option<f64>,

    /// If true a path group is split at this waypoint, with zero velocity at
    /// the boundary unless an override is present.
    pub stop_point: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    /// Create a new waypoint with a continuous heading and no overrides.
    pub fn new(position_m: Point2<f64>, heading_rad: f64) -> Self {
        Self {
            position_m,
            heading_in_rad: heading_rad,
            heading_out_rad: heading_rad,
            velocity_override_ms: None,
            stop_point: false,
        }
    }

    /// Create a new waypoint with distinct incoming and outgoing headings.
    pub fn with_headings(
        position_m: Point2<f64>,
        heading_in_rad: f64,
        heading_out_rad: f64,
    ) -> Self {
        Self {
            position_m,
            heading_in_rad,
            heading_out_rad,
            velocity_override_ms: None,
            stop_point: false,
        }
    }

    /// Return a copy of this waypoint with the given velocity override.
    pub fn with_velocity_override(mut self, velocity_ms: f64) -> Self {
        self.velocity_override_ms = Some(velocity_ms);
        self
    }

    /// Return a copy of this waypoint marked as a stop point.
    pub fn as_stop_point(mut self) -> Self {
        self.stop_point = true;
        self
    }
}
