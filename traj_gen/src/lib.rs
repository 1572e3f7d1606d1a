//! # Trajectory generation library
//!
//! This library converts a sequence of user-authored waypoints, plus motion
//! constraints, into a time-parameterised trajectory which a control loop can
//! sample at any instant to obtain a feasible reference command.
//!
//! Generation is a pure pipeline of five stages:
//!
//! 1. Curve fitting - a piecewise cubic Hermite spline is fitted through
//!    the waypoints, honouring each waypoint's heading tangent.
//! 2. Curvature sampling - the spline is walked at a fixed parametric
//!    step, producing discrete path points with position, heading,
//!    curvature and cumulative arc length.
//! 3. Velocity profiling - each path point is assigned a feasible
//!    velocity using curvature limiting and a two-pass (forward/backward)
//!    acceleration-bounded smoothing algorithm.
//! 4. Time parameterisation - elapsed time is integrated over arc length
//!    to produce the final sequence of trajectory states.
//! 5. Event marker mapping - named markers attached to positions along
//!    the waypoint sequence are resolved onto the trajectory's time axis.
//!
//! Each stage consumes only the previous stage's output. Generation either
//! fully succeeds with a trajectory satisfying all feasibility invariants, or
//! fails with a [`GenError`] describing the authoring mistake, never with a
//! silently truncated or infeasible result.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod config;
pub mod constraints;
pub mod generate;
pub mod marker;
pub mod profile;
pub mod sample;
pub mod spline;
pub mod trajectory;
pub mod waypoint;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use config::GenConfig;
pub use constraints::PathConstraints;
pub use generate::{generate_group, generate_trajectory, PathSpec};
pub use marker::{EventMarker, TimedEventMarker};
pub use sample::{PathPoint, SampledPath};
pub use trajectory::{Trajectory, TrajectoryState};
pub use waypoint::Waypoint;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during trajectory generation.
///
/// Generation is atomic, if any of these is raised no partial trajectory is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// At least two waypoints are needed to fit a curve.
    #[error("At least two waypoints are required to generate a trajectory, got {0}")]
    TooFewWaypoints(usize),

    /// Two consecutive waypoints coincide, producing a zero-length segment.
    #[error(
        "Waypoint {index} and its successor are closer than the minimum \
        separation of {min_separation_m} m"
    )]
    CoincidentWaypoints {
        index: usize,
        min_separation_m: f64,
    },

    /// A velocity override is negative or non-finite.
    #[error(
        "Velocity override of {override_ms} m/s at waypoint {waypoint} must be \
        non-negative and finite"
    )]
    InvalidOverride {
        waypoint: usize,
        override_ms: f64,
    },

    /// A velocity override exceeds the path's maximum velocity constraint.
    #[error(
        "Velocity override of {override_ms} m/s at waypoint {waypoint} exceeds \
        the maximum velocity of {max_velocity_ms} m/s"
    )]
    OverrideAboveMaxVelocity {
        waypoint: usize,
        override_ms: f64,
        max_velocity_ms: f64,
    },

    /// A velocity override exceeds the curvature-safe velocity at its
    /// waypoint.
    #[error(
        "Velocity override of {override_ms} m/s at waypoint {waypoint} exceeds \
        the curvature-safe velocity of {limit_ms} m/s"
    )]
    OverrideAboveCurvatureLimit {
        waypoint: usize,
        override_ms: f64,
        limit_ms: f64,
    },

    /// A velocity override cannot be met by accelerating from (or
    /// decelerating to) its neighbouring samples within the acceleration
    /// limit.
    #[error(
        "Velocity override of {override_ms} m/s at waypoint {waypoint} cannot \
        be met within the acceleration limit"
    )]
    OverrideUnreachable {
        waypoint: usize,
        override_ms: f64,
    },

    /// The sampling resolution is outside the valid range.
    #[error("Sampling resolution must be in (0, 1], got {0}")]
    InvalidResolution(f64),

    /// The maximum velocity constraint is not positive.
    #[error("Maximum velocity must be positive, got {0} m/s")]
    InvalidMaxVelocity(f64),

    /// The maximum acceleration constraint is not positive.
    #[error("Maximum acceleration must be positive, got {0} m/s^2")]
    InvalidMaxAcceleration(f64),

    /// A path group was requested with an empty constraints list.
    #[error("At least one set of path constraints must be provided")]
    NoConstraints,

    /// An event marker is positioned outside the waypoint sequence.
    #[error(
        "Event marker \"{name}\" is positioned at {position}, outside the \
        waypoint sequence"
    )]
    MarkerOutOfRange {
        name: String,
        position: f64,
    },
}
