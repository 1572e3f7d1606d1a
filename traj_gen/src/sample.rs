//! # Curvature sampler
//!
//! Walks a fitted spline at a fixed parametric step, producing discrete path
//! points carrying position, heading, curvature, and cumulative arc length.
//!
//! Arc length is accumulated by summing chord lengths between successive
//! samples. This is an approximation of the true arc length, acceptable at
//! the configured resolution, finer resolution trades CPU for accuracy.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// Internal
use crate::config::GenConfig;
use crate::spline::{CubicSegment, Spline};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parametric speeds below this are treated as numerically zero.
///
/// At such samples the curvature formula is singular, so the previous
/// sample's heading and curvature are reused instead.
const MIN_PARAMETRIC_SPEED: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One discrete sample of the fitted curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathPoint {
    /// Position of the sample in the path frame.
    pub position_m: Point2<f64>,

    /// Tangent heading of the curve at the sample.
    pub heading_rad: f64,

    /// Signed curvature of the curve at the sample, positive turning left.
    pub curvature_radm: f64,

    /// Cumulative arc length from the start of the path to the sample.
    pub arc_length_m: f64,
}

/// The full sampled form of a fitted curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledPath {
    /// Samples in path order.
    pub points: Vec<PathPoint>,

    /// For each waypoint of the original sequence, the index of the sample
    /// that falls exactly on it.
    pub waypoint_indices: Vec<usize>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample the spline at the configured parametric resolution.
///
/// The configuration must have been validated, see [`GenConfig::validate`].
///
/// Every segment contributes its exact `t = 1` endpoint. Interior joints are
/// emitted once, with heading and curvature taken from the incoming segment,
/// so a heading discontinuity at a waypoint appears between the joint sample
/// and the one after it.
pub fn sample_spline(spline: &Spline, config: &GenConfig) -> SampledPath {
    let step = config.resolution;
    let steps_per_segment = (1.0 / step).ceil() as usize;

    let mut points: Vec<PathPoint> =
        Vec::with_capacity(spline.num_segments() * steps_per_segment + 1);
    let mut waypoint_indices = Vec::with_capacity(spline.num_segments() + 1);

    for (seg_index, seg) in spline.segments().iter().enumerate() {
        if seg_index == 0 {
            push_sample(&mut points, seg, 0.0);
            waypoint_indices.push(0);
        }

        for i in 1..steps_per_segment {
            let t = i as f64 * step;
            if t >= 1.0 {
                break;
            }
            push_sample(&mut points, seg, t);
        }

        // The endpoint is always sampled exactly, it is the next waypoint
        push_sample(&mut points, seg, 1.0);
        waypoint_indices.push(points.len() - 1);
    }

    SampledPath {
        points,
        waypoint_indices,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute one sample of the segment at parameter `t` and append it.
fn push_sample(points: &mut Vec<PathPoint>, seg: &CubicSegment, t: f64) {
    let position_m = seg.position(t);
    let vel = seg.first_derivative(t);
    let acc = seg.second_derivative(t);
    let speed = vel.norm();

    // Where the parametric speed is numerically zero the tangent direction
    // and the curvature formula are both singular, reuse the previous
    // sample's values instead of producing a spike.
    let (heading_rad, curvature_radm) = if speed > MIN_PARAMETRIC_SPEED {
        (
            vel.y.atan2(vel.x),
            (vel.x * acc.y - vel.y * acc.x) / speed.powi(3),
        )
    } else {
        points
            .last()
            .map(|p| (p.heading_rad, p.curvature_radm))
            .unwrap_or((0.0, 0.0))
    };

    let arc_length_m = match points.last() {
        Some(prev) => prev.arc_length_m + (position_m - prev.position_m).norm(),
        None => 0.0,
    };

    points.push(PathPoint {
        position_m,
        heading_rad,
        curvature_radm,
        arc_length_m,
    });
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
