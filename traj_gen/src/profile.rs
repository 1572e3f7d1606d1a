//! # Velocity profiler
//!
//! Assigns a feasible velocity to every sampled path point. Feasible means:
//!
//! - never above the path's maximum velocity constraint,
//! - never above the curvature-safe velocity `sqrt(a_max / |curvature|)`
//!   where the path curves,
//! - achievable between adjacent samples within the path's maximum
//!   acceleration over the intervening arc length,
//! - exactly equal to any explicit velocity override at its waypoint.
//!
//! The profile is computed with the standard two-pass smoothing: a forward
//! pass accelerating from the start velocity, then a backward pass reducing
//! any velocity that could not be decelerated away in time. The result is
//! simultaneously accel-feasible in both directions, curvature-safe, and
//! constraint-bounded.
//!
//! Overrides are honoured exactly or rejected as infeasible, they are never
//! silently clamped.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::constraints::PathConstraints;
use crate::sample::SampledPath;
use crate::GenError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Numerical tolerance applied to feasibility comparisons.
const FEASIBILITY_TOL: f64 = 1e-9;

/// Curvatures below this are treated as straight, leaving velocity unbounded
/// by curvature.
const MIN_CURVATURE_RADM: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A velocity override pinned to one sample of the path.
#[derive(Debug, Clone, Copy)]
pub struct VelocityPin {
    /// Index of the sample the override applies to.
    pub sample_index: usize,

    /// Index of the originating waypoint, used for error reporting.
    pub waypoint: usize,

    /// The velocity the profile must have at the sample.
    pub velocity_ms: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the feasible velocity at every sample of the path.
///
/// The start velocity is the pin at sample 0 if present, otherwise 0. The
/// end velocity is the pin at the last sample if present, otherwise 0.
pub fn compute_velocities(
    sampled: &SampledPath,
    pins: &[VelocityPin],
    constraints: &PathConstraints,
) -> Result<Vec<f64>, GenError> {
    let points = &sampled.points;
    let n = points.len();

    let max_vel = constraints.max_velocity_ms;
    let max_acc = constraints.max_acceleration_mss;

    // Validate every pin against the velocity constraint and the
    // curvature-safe velocity at its sample before profiling
    let mut pinned: Vec<Option<VelocityPin>> = vec![None; n];
    for pin in pins {
        if !(pin.velocity_ms.is_finite() && pin.velocity_ms >= 0.0) {
            return Err(GenError::InvalidOverride {
                waypoint: pin.waypoint,
                override_ms: pin.velocity_ms,
            });
        }

        if pin.velocity_ms > max_vel + FEASIBILITY_TOL {
            return Err(GenError::OverrideAboveMaxVelocity {
                waypoint: pin.waypoint,
                override_ms: pin.velocity_ms,
                max_velocity_ms: max_vel,
            });
        }

        let limit_ms = curvature_limit(points[pin.sample_index].curvature_radm, max_acc);
        if pin.velocity_ms > limit_ms + FEASIBILITY_TOL {
            return Err(GenError::OverrideAboveCurvatureLimit {
                waypoint: pin.waypoint,
                override_ms: pin.velocity_ms,
                limit_ms,
            });
        }

        pinned[pin.sample_index] = Some(*pin);
    }

    let mut vel = vec![0.0; n];

    // ---- FORWARD PASS ----
    //
    // Accelerate from the start velocity, capping each sample to the
    // constraint, the curvature limit, and the velocity reachable from the
    // previous sample under +max_acc over the intervening distance.
    vel[0] = match pinned[0] {
        Some(pin) => pin.velocity_ms,
        None => 0.0,
    };

    for i in 1..n {
        let ds = points[i].arc_length_m - points[i - 1].arc_length_m;
        let reachable = (vel[i - 1].powi(2) + 2.0 * max_acc * ds).sqrt();

        vel[i] = match pinned[i] {
            Some(pin) => {
                if pin.velocity_ms > reachable + FEASIBILITY_TOL {
                    return Err(GenError::OverrideUnreachable {
                        waypoint: pin.waypoint,
                        override_ms: pin.velocity_ms,
                    });
                }
                pin.velocity_ms
            }
            None => reachable
                .min(curvature_limit(points[i].curvature_radm, max_acc))
                .min(max_vel),
        };
    }

    // ---- BACKWARD PASS ----
    //
    // Decelerate towards the end velocity, reducing any forward-pass
    // velocity that cannot be shed before the next sample. A pinned sample
    // is never reduced, needing to reduce one is an infeasible override.
    if pinned[n - 1].is_none() {
        vel[n - 1] = 0.0;
    }

    for i in (0..n - 1).rev() {
        let ds = points[i + 1].arc_length_m - points[i].arc_length_m;
        let allowed = (vel[i + 1].powi(2) + 2.0 * max_acc * ds).sqrt();

        match pinned[i] {
            Some(pin) => {
                if vel[i] > allowed + FEASIBILITY_TOL {
                    return Err(GenError::OverrideUnreachable {
                        waypoint: pin.waypoint,
                        override_ms: pin.velocity_ms,
                    });
                }
            }
            None => {
                if vel[i] > allowed {
                    vel[i] = allowed;
                }
            }
        }
    }

    Ok(vel)
}

/// The curvature-safe velocity at the given curvature, or infinity where the
/// path is straight.
pub fn curvature_limit(curvature_radm: f64, max_acceleration_mss: f64) -> f64 {
    let curv = curvature_radm.abs();
    if curv > MIN_CURVATURE_RADM {
        (max_acceleration_mss / curv).sqrt()
    } else {
        f64::INFINITY
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::GenConfig;
    use crate::spline::Spline;
    use crate::waypoint::Waypoint;
    use nalgebra::Point2;
    use std::f64::consts::FRAC_PI_2;

    fn sample(waypoints: &[Waypoint], resolution: f64) -> SampledPath {
        let spline = Spline::fit(waypoints).unwrap();
        crate::sample::sample_spline(&spline, &GenConfig { resolution })
    }

    fn straight_10m() -> SampledPath {
        sample(
            &[
                Waypoint::new(Point2::new(0.0, 0.0), 0.0),
                Waypoint::new(Point2::new(10.0, 0.0), 0.0),
            ],
            0.004,
        )
    }

    #[test]
    fn test_trapezoidal_profile_on_straight() {
        let sampled = straight_10m();
        let constraints = PathConstraints::new(2.0, 2.0);

        let vel = compute_velocities(&sampled, &[], &constraints).unwrap();

        // Endpoints at rest, cruise capped at the max velocity
        assert_eq!(vel[0], 0.0);
        assert_eq!(*vel.last().unwrap(), 0.0);
        let peak = vel.iter().cloned().fold(f64::MIN, f64::max);
        assert!((peak - 2.0).abs() < 1e-9);

        // Each sample matches the closed-form trapezoid
        // min(v_max, sqrt(2 a s), sqrt(2 a (L - s)))
        for (point, v) in sampled.points.iter().zip(&vel) {
            let s = point.arc_length_m;
            let expected = (2.0 * 2.0 * s)
                .sqrt()
                .min((2.0 * 2.0 * (10.0 - s)).sqrt())
                .min(2.0);
            assert!((v - expected).abs() < 1e-6, "at s = {}", s);
        }
    }

    #[test]
    fn test_acceleration_feasible_between_samples() {
        let sampled = straight_10m();
        let constraints = PathConstraints::new(2.0, 2.0);

        let vel = compute_velocities(&sampled, &[], &constraints).unwrap();

        for i in 1..vel.len() {
            let ds = sampled.points[i].arc_length_m - sampled.points[i - 1].arc_length_m;
            let dv2 = (vel[i].powi(2) - vel[i - 1].powi(2)).abs();
            assert!(dv2 <= 2.0 * constraints.max_acceleration_mss * ds + 1e-6);
        }
    }

    #[test]
    fn test_curvature_caps_velocity_in_turn() {
        let sampled = sample(
            &[
                Waypoint::new(Point2::new(0.0, 0.0), 0.0),
                Waypoint::new(Point2::new(1.0, 1.0), FRAC_PI_2),
            ],
            0.004,
        );

        // High max velocity with low acceleration, the tight turn must cap
        // the profile well below the constraint
        let constraints = PathConstraints::new(10.0, 1.0);
        let vel = compute_velocities(&sampled, &[], &constraints).unwrap();

        let peak = vel.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak < 10.0 - 1.0);

        for (point, v) in sampled.points.iter().zip(&vel) {
            let limit = curvature_limit(
                point.curvature_radm,
                constraints.max_acceleration_mss,
            );
            assert!(*v <= limit + 1e-6);
        }
    }

    #[test]
    fn test_override_pinned_exactly() {
        let sampled = sample(
            &[
                Waypoint::new(Point2::new(0.0, 0.0), 0.0),
                Waypoint::new(Point2::new(10.0, 0.0), 0.0),
                Waypoint::new(Point2::new(20.0, 0.0), 0.0),
            ],
            0.004,
        );

        let pin = VelocityPin {
            sample_index: sampled.waypoint_indices[1],
            waypoint: 1,
            velocity_ms: 0.5,
        };

        let constraints = PathConstraints::new(2.0, 2.0);
        let vel = compute_velocities(&sampled, &[pin], &constraints).unwrap();

        assert_eq!(vel[pin.sample_index], 0.5);
    }

    #[test]
    fn test_override_above_max_velocity_rejected() {
        let sampled = straight_10m();
        let pin = VelocityPin {
            sample_index: sampled.waypoint_indices[1],
            waypoint: 1,
            velocity_ms: 5.0,
        };

        let constraints = PathConstraints::new(2.0, 2.0);
        match compute_velocities(&sampled, &[pin], &constraints) {
            Err(GenError::OverrideAboveMaxVelocity { waypoint: 1, .. }) => (),
            other => panic!("Expected OverrideAboveMaxVelocity, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_override_rejected() {
        // A 2 m/s override at the end of a 1 m path with 0.5 m/s^2 available
        // cannot be reached from rest
        let sampled = sample(
            &[
                Waypoint::new(Point2::new(0.0, 0.0), 0.0),
                Waypoint::new(Point2::new(1.0, 0.0), 0.0),
            ],
            0.004,
        );

        let pin = VelocityPin {
            sample_index: sampled.waypoint_indices[1],
            waypoint: 1,
            velocity_ms: 2.0,
        };

        let constraints = PathConstraints::new(5.0, 0.5);
        match compute_velocities(&sampled, &[pin], &constraints) {
            Err(GenError::OverrideUnreachable { waypoint: 1, .. }) => (),
            other => panic!("Expected OverrideUnreachable, got {:?}", other),
        }
    }
}
