//! # Time parameterizer and trajectory type
//!
//! Converts the velocity-annotated sample sequence into trajectory states by
//! integrating elapsed time over arc length, and owns the finished
//! [`Trajectory`] which callers sample by elapsed time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// Internal
use crate::marker::TimedEventMarker;
use crate::sample::SampledPath;
use util::maths::{get_ang_dist_2pi, lin_map};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Average velocities below this are treated as stationary.
///
/// A pair of adjacent samples with numerically zero velocity advances no
/// elapsed time, keeping time non-decreasing rather than dividing by zero.
const MIN_AVG_VELOCITY_MS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One state of a finished trajectory.
///
/// A control loop tracks the trajectory by sampling states at its own loop
/// rate and feeding them to the drive controllers as reference commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// Position of the state in the path frame.
    pub position_m: Point2<f64>,

    /// Heading of the state.
    pub heading_rad: f64,

    /// Reference velocity at the state.
    pub velocity_ms: f64,

    /// Reference acceleration over the interval starting at the state.
    pub acceleration_mss: f64,

    /// Curvature of the path at the state.
    pub curvature_radm: f64,

    /// Elapsed time from the start of the trajectory.
    pub time_s: f64,

    /// Arc length from the start of the trajectory.
    pub arc_length_m: f64,
}

/// A finished, time-parameterised trajectory.
///
/// Immutable once produced. Queried by sampling at an arbitrary elapsed
/// time, which interpolates between the two bracketing states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    states: Vec<TrajectoryState>,
    markers: Vec<TimedEventMarker>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Integrate elapsed time over the velocity profile, producing the state
/// sequence of the final trajectory.
///
/// Time advances by `ds / ((v_i + v_{i+1}) / 2)` for each adjacent pair,
/// trapezoidal integration of the velocity profile, which is exact for the
/// constant-acceleration intervals the profiler produces. Acceleration is
/// derived from the velocity difference over each interval.
pub fn time_parameterize(sampled: &SampledPath, velocities: &[f64]) -> Vec<TrajectoryState> {
    let points = &sampled.points;
    let n = points.len();

    let mut states: Vec<TrajectoryState> = Vec::with_capacity(n);
    let mut time_s = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            let ds = point.arc_length_m - points[i - 1].arc_length_m;
            let avg_vel = 0.5 * (velocities[i] + velocities[i - 1]);

            if avg_vel > MIN_AVG_VELOCITY_MS {
                time_s += ds / avg_vel;
            }
            // Both velocities zero: a stationary pair, no time advance
        }

        states.push(TrajectoryState {
            position_m: point.position_m,
            heading_rad: point.heading_rad,
            velocity_ms: velocities[i],
            acceleration_mss: 0.0,
            curvature_radm: point.curvature_radm,
            time_s,
            arc_length_m: point.arc_length_m,
        });
    }

    // Derive interval accelerations from the velocity differences. The last
    // state keeps zero acceleration, there is no interval after it.
    for i in 0..n.saturating_sub(1) {
        let dt = states[i + 1].time_s - states[i].time_s;
        if dt > 0.0 {
            states[i].acceleration_mss = (states[i + 1].velocity_ms - states[i].velocity_ms) / dt;
        }
    }

    states
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Build a trajectory from its state sequence and resolved markers.
    ///
    /// The state sequence always holds at least two states, the curve fitter
    /// rejects anything shorter upstream.
    pub(crate) fn new(states: Vec<TrajectoryState>, markers: Vec<TimedEventMarker>) -> Self {
        Self { states, markers }
    }

    /// Get the trajectory's states in time order.
    pub fn states(&self) -> &[TrajectoryState] {
        &self.states
    }

    /// Get the trajectory's event markers, sorted by resolved time.
    pub fn markers(&self) -> &[TimedEventMarker] {
        &self.markers
    }

    /// Get the first state of the trajectory.
    pub fn start_state(&self) -> &TrajectoryState {
        &self.states[0]
    }

    /// Get the final state of the trajectory.
    pub fn end_state(&self) -> &TrajectoryState {
        &self.states[self.states.len() - 1]
    }

    /// Total duration of the trajectory.
    pub fn duration_s(&self) -> f64 {
        self.end_state().time_s
    }

    /// Total arc length of the trajectory.
    pub fn length_m(&self) -> f64 {
        self.end_state().arc_length_m
    }

    /// Sample the trajectory at an arbitrary elapsed time.
    ///
    /// Times before the start return the first state, times after the end
    /// return the final state. In between, the two bracketing states are
    /// linearly interpolated (heading along the shortest angular distance,
    /// acceleration held from the earlier state of the interval).
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        if time_s <= 0.0 {
            return *self.start_state();
        }
        if time_s >= self.duration_s() {
            return *self.end_state();
        }

        // First state strictly after the query time. The guards above keep
        // this within [1, n - 1], and the interval has non-zero duration.
        let next_index = self.states.partition_point(|s| s.time_s <= time_s);
        let prev = &self.states[next_index - 1];
        let next = &self.states[next_index];

        let time_range = (prev.time_s, next.time_s);
        let frac = (time_s - prev.time_s) / (next.time_s - prev.time_s);

        TrajectoryState {
            position_m: prev.position_m + (next.position_m - prev.position_m) * frac,
            heading_rad: prev.heading_rad
                + get_ang_dist_2pi(prev.heading_rad, next.heading_rad) * frac,
            velocity_ms: lin_map(
                time_range,
                (prev.velocity_ms, next.velocity_ms),
                time_s,
            ),
            acceleration_mss: prev.acceleration_mss,
            curvature_radm: lin_map(
                time_range,
                (prev.curvature_radm, next.curvature_radm),
                time_s,
            ),
            time_s,
            arc_length_m: lin_map(
                time_range,
                (prev.arc_length_m, next.arc_length_m),
                time_s,
            ),
        }
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
    use crate::sample::{sample_spline, PathPoint};
    use crate::spline::Spline;
    use crate::waypoint::Waypoint;

    /// Run the pipeline up to time parameterisation for a straight 10 m path
    /// with v_max 2 m/s and a_max 2 m/s^2.
    fn straight_10m_states() -> Vec<TrajectoryState> {
        let waypoints = vec![
            Waypoint::new(Point2::new(0.0, 0.0), 0.0),
            Waypoint::new(Point2::new(10.0, 0.0), 0.0),
        ];

        let spline = Spline::fit(&waypoints).unwrap();
        let sampled = sample_spline(&spline, &GenConfig::default());
        let vel =
            compute_velocities(&sampled, &[], &PathConstraints::new(2.0, 2.0)).unwrap();

        time_parameterize(&sampled, &vel)
    }

    #[test]
    fn test_closed_form_trapezoid_duration() {
        let states = straight_10m_states();

        // Accelerate 0 -> 2 m/s over 1 m (1 s), cruise 8 m at 2 m/s (4 s),
        // decelerate over 1 m (1 s): 6 s total
        let last = states.last().unwrap();
        assert!((last.time_s - 6.0).abs() < 1e-6);
        assert!((last.arc_length_m - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_time_starts_at_zero_and_never_decreases() {
        let states = straight_10m_states();

        assert_eq!(states[0].time_s, 0.0);
        for pair in states.windows(2) {
            assert!(pair[1].time_s >= pair[0].time_s);
        }
    }

    #[test]
    fn test_accelerations_bounded() {
        let states = straight_10m_states();

        for state in &states {
            assert!(state.acceleration_mss.abs() <= 2.0 + 1e-6);
        }
    }

    #[test]
    fn test_sampling_interpolates() {
        let states = straight_10m_states();
        let trajectory = Trajectory::new(states, vec![]);

        // Mid-acceleration the reference velocity is a * t
        let state = trajectory.sample(0.5);
        assert!((state.velocity_ms - 1.0).abs() < 1e-3);

        // Cruise
        let state = trajectory.sample(3.0);
        assert!((state.velocity_ms - 2.0).abs() < 1e-6);

        // Out-of-range queries clamp to the endpoint states
        assert_eq!(trajectory.sample(-1.0).time_s, 0.0);
        let end = trajectory.sample(100.0);
        assert!((end.arc_length_m - 10.0).abs() < 1e-6);
        assert_eq!(end.velocity_ms, 0.0);
    }

    #[test]
    fn test_stationary_pair_advances_no_time() {
        let sampled = SampledPath {
            points: vec![
                PathPoint {
                    position_m: Point2::new(0.0, 0.0),
                    heading_rad: 0.0,
                    curvature_radm: 0.0,
                    arc_length_m: 0.0,
                },
                PathPoint {
                    position_m: Point2::new(1.0, 0.0),
                    heading_rad: 0.0,
                    curvature_radm: 0.0,
                    arc_length_m: 1.0,
                },
            ],
            waypoint_indices: vec![0, 1],
        };

        let states = time_parameterize(&sampled, &[0.0, 0.0]);

        assert_eq!(states[0].time_s, 0.0);
        assert_eq!(states[1].time_s, 0.0);
        assert_eq!(states[0].acceleration_mss, 0.0);
    }
}
