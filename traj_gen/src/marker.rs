//! # Event marker mapper
//!
//! Event markers are named trigger points authored against the waypoint
//! sequence, either at a waypoint or a fraction of the way between two
//! neighbouring waypoints. Once a trajectory has been generated each marker
//! is resolved to an elapsed-time value by mapping its waypoint position to
//! an arc length and interpolating time between the bracketing states.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::sample::SampledPath;
use crate::trajectory::TrajectoryState;
use crate::GenError;
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A named trigger point attached to a position along the waypoint sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {
    /// Name of the event to fire. Duplicate names are permitted, callers may
    /// intentionally fire the same event more than once.
    pub name: String,

    /// Fractional waypoint position of the trigger, e.g. `1.5` fires halfway
    /// between waypoints 1 and 2.
    pub waypoint_position: f64,
}

/// An event marker resolved onto the time axis of a finished trajectory.
///
/// Read-only after resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEventMarker {
    /// Name of the event to fire.
    pub name: String,

    /// Elapsed trajectory time at which the event fires.
    pub time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EventMarker {
    pub fn new<S: Into<String>>(name: S, waypoint_position: f64) -> Self {
        Self {
            name: name.into(),
            waypoint_position,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve each marker's waypoint position to an elapsed time on the
/// finished trajectory.
///
/// The returned markers are sorted by resolved time.
pub fn resolve_markers(
    markers: &[EventMarker],
    sampled: &SampledPath,
    states: &[TrajectoryState],
) -> Result<Vec<TimedEventMarker>, GenError> {
    let num_waypoints = sampled.waypoint_indices.len();

    let mut resolved = Vec::with_capacity(markers.len());

    for marker in markers {
        let position = marker.waypoint_position;

        if !(position >= 0.0 && position <= (num_waypoints - 1) as f64) {
            return Err(GenError::MarkerOutOfRange {
                name: marker.name.clone(),
                position,
            });
        }

        resolved.push(TimedEventMarker {
            name: marker.name.clone(),
            time_s: time_at_position(position, sampled, states),
        });
    }

    resolved.sort_by(|a, b| {
        a.time_s
            .partial_cmp(&b.time_s)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(resolved)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a fractional waypoint position to an elapsed time.
fn time_at_position(
    position: f64,
    sampled: &SampledPath,
    states: &[TrajectoryState],
) -> f64 {
    // Interpolate the target arc length between the bracketing waypoint
    // samples
    let index = (position.floor() as usize).min(sampled.waypoint_indices.len() - 2);
    let frac = position - index as f64;

    let arc_start_m = sampled.points[sampled.waypoint_indices[index]].arc_length_m;
    let arc_end_m = sampled.points[sampled.waypoint_indices[index + 1]].arc_length_m;
    let arc_m = lin_map((0.0, 1.0), (arc_start_m, arc_end_m), frac);

    // Locate the bracketing states by arc length and interpolate time
    let next_index = states.partition_point(|s| s.arc_length_m <= arc_m);

    if next_index == 0 {
        return states[0].time_s;
    }
    if next_index >= states.len() {
        return states[states.len() - 1].time_s;
    }

    let prev = &states[next_index - 1];
    let next = &states[next_index];

    let ds = next.arc_length_m - prev.arc_length_m;
    if ds > 0.0 {
        lin_map(
            (prev.arc_length_m, next.arc_length_m),
            (prev.time_s, next.time_s),
            arc_m,
        )
    } else {
        prev.time_s
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::GenConfig;
    use crate::constraints::PathConstraints;
    use crate::profile::compute_velocities;
    use crate::sample::sample_spline;
    use crate::spline::Spline;
    use crate::trajectory::time_parameterize;
    use crate::waypoint::Waypoint;
    use nalgebra::Point2;

    fn straight_10m() -> (SampledPath, Vec<TrajectoryState>) {
        let waypoints = vec![
            Waypoint::new(Point2::new(0.0, 0.0), 0.0),
            Waypoint::new(Point2::new(10.0, 0.0), 0.0),
        ];

        let spline = Spline::fit(&waypoints).unwrap();
        let sampled = sample_spline(&spline, &GenConfig::default());
        let vel =
            compute_velocities(&sampled, &[], &PathConstraints::new(2.0, 2.0)).unwrap();
        let states = time_parameterize(&sampled, &vel);

        (sampled, states)
    }

    #[test]
    fn test_halfway_marker_at_half_duration() {
        let (sampled, states) = straight_10m();
        let markers = vec![EventMarker::new("intake_down", 0.5)];

        let resolved = resolve_markers(&markers, &sampled, &states).unwrap();

        // The velocity profile on a straight path is symmetric, so the
        // midpoint marker must fall at half the total duration
        let duration_s = states.last().unwrap().time_s;
        assert_eq!(resolved.len(), 1);
        assert!((resolved[0].time_s - duration_s / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_endpoint_markers() {
        let (sampled, states) = straight_10m();
        let markers = vec![
            EventMarker::new("end", 1.0),
            EventMarker::new("start", 0.0),
        ];

        let resolved = resolve_markers(&markers, &sampled, &states).unwrap();

        // Sorted by resolved time, duplicates of position permitted
        assert_eq!(resolved[0].name, "start");
        assert_eq!(resolved[0].time_s, 0.0);
        assert_eq!(resolved[1].name, "end");
        assert!((resolved[1].time_s - states.last().unwrap().time_s).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_names_permitted() {
        let (sampled, states) = straight_10m();
        let markers = vec![
            EventMarker::new("shoot", 0.25),
            EventMarker::new("shoot", 0.75),
        ];

        let resolved = resolve_markers(&markers, &sampled, &states).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "shoot");
        assert_eq!(resolved[1].name, "shoot");
        assert!(resolved[0].time_s < resolved[1].time_s);
    }

    #[test]
    fn test_marker_out_of_range() {
        let (sampled, states) = straight_10m();
        let markers = vec![EventMarker::new("late", 1.5)];

        match resolve_markers(&markers, &sampled, &states) {
            Err(GenError::MarkerOutOfRange { name, .. }) => assert_eq!(name, "late"),
            other => panic!("Expected MarkerOutOfRange, got {:?}", other),
        }
    }
}
