//! # Curve fitter
//!
//! Fits a continuous, twice-differentiable parametric curve through an
//! ordered sequence of waypoints. Each segment is a cubic Hermite spline
//! between two neighbouring waypoints, with the tangent direction at the
//! joint taken from the earlier waypoint's outgoing heading and the later
//! waypoint's incoming heading. Tangent magnitudes are set to the chord
//! length between the two waypoints, which keeps turns from over- or
//! under-shooting as waypoint spacing varies.
//!
//! Segments are stored as a flat sequence of polynomial coefficient sets,
//! adjacency is implicit in the order of the sequence.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

// Internal
use crate::waypoint::Waypoint;
use crate::GenError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum separation between consecutive waypoints.
///
/// Pairs closer than this produce a zero-length segment and are rejected as
/// degenerate input.
pub const MIN_WAYPOINT_SEPARATION_M: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One cubic segment of a fitted spline.
///
/// Coefficients are stored per axis in ascending powers of the segment-local
/// parameter `t` in `[0, 1]`, so that `x(t) = x[0] + x[1]*t + x[2]*t^2 +
/// x[3]*t^3`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CubicSegment {
    x: [f64; 4],
    y: [f64; 4],
}

/// A piecewise cubic curve through a sequence of waypoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spline {
    segments: Vec<CubicSegment>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CubicSegment {
    /// Build the Hermite segment interpolating `p0` with tangent `m0` at
    /// `t = 0` to `p1` with tangent `m1` at `t = 1`.
    fn hermite(
        p0: Point2<f64>,
        m0: Vector2<f64>,
        p1: Point2<f64>,
        m1: Vector2<f64>,
    ) -> Self {
        Self {
            x: hermite_coeffs(p0.x, m0.x, p1.x, m1.x),
            y: hermite_coeffs(p0.y, m0.y, p1.y, m1.y),
        }
    }

    /// Evaluate the segment position at the given parameter value.
    pub fn position(&self, t: f64) -> Point2<f64> {
        Point2::new(horner(&self.x, t), horner(&self.y, t))
    }

    /// Evaluate the segment first derivative (with respect to `t`) at the
    /// given parameter value.
    pub fn first_derivative(&self, t: f64) -> Vector2<f64> {
        Vector2::new(
            self.x[1] + t * (2.0 * self.x[2] + t * 3.0 * self.x[3]),
            self.y[1] + t * (2.0 * self.y[2] + t * 3.0 * self.y[3]),
        )
    }

    /// Evaluate the segment second derivative (with respect to `t`) at the
    /// given parameter value.
    pub fn second_derivative(&self, t: f64) -> Vector2<f64> {
        Vector2::new(
            2.0 * self.x[2] + 6.0 * t * self.x[3],
            2.0 * self.y[2] + 6.0 * t * self.y[3],
        )
    }
}

impl Spline {
    /// Fit a piecewise cubic Hermite spline through the given waypoints.
    ///
    /// Segment `i` runs from waypoint `i` to waypoint `i + 1`, leaving along
    /// waypoint `i`'s outgoing heading and arriving along waypoint `i + 1`'s
    /// incoming heading.
    pub fn fit(waypoints: &[Waypoint]) -> Result<Self, GenError> {
        if waypoints.len() < 2 {
            return Err(GenError::TooFewWaypoints(waypoints.len()));
        }

        let mut segments = Vec::with_capacity(waypoints.len() - 1);

        for (i, pair) in waypoints.windows(2).enumerate() {
            let (start, end) = (&pair[0], &pair[1]);

            let chord_m = (end.position_m - start.position_m).norm();

            if chord_m < MIN_WAYPOINT_SEPARATION_M {
                return Err(GenError::CoincidentWaypoints {
                    index: i,
                    min_separation_m: MIN_WAYPOINT_SEPARATION_M,
                });
            }

            // Tangent magnitudes are scaled to the chord length so that the
            // curve's parametric speed stays close to the segment length.
            let m0 = chord_m
                * Vector2::new(start.heading_out_rad.cos(), start.heading_out_rad.sin());
            let m1 = chord_m
                * Vector2::new(end.heading_in_rad.cos(), end.heading_in_rad.sin());

            segments.push(CubicSegment::hermite(
                start.position_m,
                m0,
                end.position_m,
                m1,
            ));
        }

        Ok(Self { segments })
    }

    /// Get the number of segments in the spline.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Get the spline's segments in path order.
    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert one axis of a Hermite segment into ascending-power polynomial
/// coefficients.
fn hermite_coeffs(p0: f64, m0: f64, p1: f64, m1: f64) -> [f64; 4] {
    [
        p0,
        m0,
        -3.0 * p0 - 2.0 * m0 + 3.0 * p1 - m1,
        2.0 * p0 + m0 - 2.0 * p1 + m1,
    ]
}

/// Evaluate a polynomial in ascending-power coefficient order using Horner's
/// rule.
fn horner(coeffs: &[f64; 4], t: f64) -> f64 {
    coeffs[0] + t * (coeffs[1] + t * (coeffs[2] + t * coeffs[3]))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_fit_interpolates_waypoints() {
        let waypoints = vec![
            Waypoint::new(Point2::new(0.0, 0.0), 0.0),
            Waypoint::new(Point2::new(2.0, 2.0), FRAC_PI_2),
            Waypoint::new(Point2::new(2.0, 5.0), FRAC_PI_2),
        ];

        let spline = Spline::fit(&waypoints).unwrap();
        assert_eq!(spline.num_segments(), 2);

        // Endpoints of each segment must be the waypoint positions
        for (i, seg) in spline.segments().iter().enumerate() {
            let start = seg.position(0.0);
            let end = seg.position(1.0);
            assert!((start - waypoints[i].position_m).norm() < 1e-9);
            assert!((end - waypoints[i + 1].position_m).norm() < 1e-9);
        }

        // Tangent directions at each waypoint must match the headings
        for (i, seg) in spline.segments().iter().enumerate() {
            let d0 = seg.first_derivative(0.0);
            let d1 = seg.first_derivative(1.0);
            assert!(
                (d0.y.atan2(d0.x) - waypoints[i].heading_out_rad).abs() < 1e-9
            );
            assert!(
                (d1.y.atan2(d1.x) - waypoints[i + 1].heading_in_rad).abs() < 1e-9
            );
        }
    }

    #[test]
    fn test_straight_segment_is_linear() {
        let waypoints = vec![
            Waypoint::new(Point2::new(0.0, 0.0), 0.0),
            Waypoint::new(Point2::new(10.0, 0.0), 0.0),
        ];

        let spline = Spline::fit(&waypoints).unwrap();
        let seg = &spline.segments()[0];

        // With matching headings along the chord the Hermite reduces to a
        // straight line traversed at constant parametric speed
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let p = seg.position(t);
            assert!((p.x - 10.0 * t).abs() < 1e-9);
            assert!(p.y.abs() < 1e-9);
        }
    }

    #[test]
    fn test_too_few_waypoints() {
        let waypoints = vec![Waypoint::new(Point2::new(0.0, 0.0), 0.0)];

        match Spline::fit(&waypoints) {
            Err(GenError::TooFewWaypoints(1)) => (),
            other => panic!("Expected TooFewWaypoints, got {:?}", other),
        }
    }

    #[test]
    fn test_coincident_waypoints() {
        let waypoints = vec![
            Waypoint::new(Point2::new(0.0, 0.0), 0.0),
            Waypoint::new(Point2::new(1.0, 0.0), 0.0),
            Waypoint::new(Point2::new(1.0, 0.0), 0.0),
        ];

        match Spline::fit(&waypoints) {
            Err(GenError::CoincidentWaypoints { index: 1, .. }) => (),
            other => panic!("Expected CoincidentWaypoints, got {:?}", other),
        }
    }
}
