//! # Generation entry points
//!
//! Ties the pipeline stages together: curve fitting, curvature sampling,
//! velocity profiling, time parameterisation, and event marker resolution.
//! Single paths are generated with [`generate_trajectory`], path groups with
//! [`generate_group`].
//!
//! The pipeline is purely functional, each stage consumes only the previous
//! stage's output, so the sub-paths of a group carry no data dependency on
//! one another and are generated on independent worker threads over disjoint
//! cloned inputs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::{Deserialize, Serialize};
use std::thread;

// Internal
use crate::config::GenConfig;
use crate::constraints::PathConstraints;
use crate::marker::{resolve_markers, EventMarker};
use crate::profile::{compute_velocities, VelocityPin};
use crate::sample::sample_spline;
use crate::spline::Spline;
use crate::trajectory::{time_parameterize, Trajectory};
use crate::waypoint::Waypoint;
use crate::GenError;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The input bundle for one sub-path of a group: its waypoints and the event
/// markers authored against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSpec {
    pub waypoints: Vec<Waypoint>,
    pub markers: Vec<EventMarker>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a trajectory through the given waypoints.
///
/// The start velocity is the first waypoint's override or 0, the end
/// velocity is the last waypoint's override or 0. With `reversed` set the
/// waypoint sequence and all headings are reversed before fitting, and the
/// start/end velocity roles swap accordingly.
///
/// Generation either succeeds with a trajectory satisfying every feasibility
/// invariant or fails with the first [`GenError`] encountered, no partial
/// trajectory is ever returned.
pub fn generate_trajectory(
    waypoints: &[Waypoint],
    markers: &[EventMarker],
    constraints: &PathConstraints,
    reversed: bool,
    config: &GenConfig,
) -> Result<Trajectory, GenError> {
    config.validate()?;
    constraints.validate()?;

    let (waypoints, markers) = if reversed {
        (
            reverse_waypoints(waypoints),
            reverse_markers(markers, waypoints.len()),
        )
    } else {
        (waypoints.to_vec(), markers.to_vec())
    };

    // Fit and sample the curve
    let spline = Spline::fit(&waypoints)?;
    let sampled = sample_spline(&spline, config);

    debug!(
        "Sampled {} path points over {} spline segments",
        sampled.points.len(),
        spline.num_segments()
    );

    // Pin each waypoint's velocity override to its sample
    let pins: Vec<VelocityPin> = waypoints
        .iter()
        .enumerate()
        .filter_map(|(i, wp)| {
            wp.velocity_override_ms.map(|velocity_ms| VelocityPin {
                sample_index: sampled.waypoint_indices[i],
                waypoint: i,
                velocity_ms,
            })
        })
        .collect();

    // Profile, parameterise, and resolve markers
    let velocities = compute_velocities(&sampled, &pins, constraints)?;
    let states = time_parameterize(&sampled, &velocities);
    let markers = resolve_markers(&markers, &sampled, &states)?;

    let trajectory = Trajectory::new(states, markers);

    debug!(
        "Trajectory generated: {} states, {:.3} s, {:.3} m",
        trajectory.states().len(),
        trajectory.duration_s(),
        trajectory.length_m()
    );

    Ok(trajectory)
}

/// Generate a trajectory for each sub-path of a group.
///
/// Each sub-path is generated independently with its own constraints. If
/// fewer constraint sets than sub-paths are supplied the last set is reused
/// for the remainder, supplying none is an error. Constraint sets pair with
/// sub-paths in authored order, with `reversed` set the sub-path order (and
/// each sub-path) is then reversed.
///
/// The shared boundary waypoint between two sub-paths is the end of the
/// earlier and the start of the later trajectory. Its velocity is 0 at both,
/// being a stop point, unless it carries an explicit override.
pub fn generate_group(
    specs: &[PathSpec],
    constraints: &[PathConstraints],
    reversed: bool,
    config: &GenConfig,
) -> Result<Vec<Trajectory>, GenError> {
    if constraints.is_empty() {
        return Err(GenError::NoConstraints);
    }

    // Pair each sub-path with its constraint set. The unwrap is safe as the
    // list was checked non-empty above.
    let mut jobs: Vec<(PathSpec, PathConstraints)> = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let cons = *constraints.get(i).unwrap_or(constraints.last().unwrap());
            (spec.clone(), cons)
        })
        .collect();

    if reversed {
        jobs.reverse();
    }

    debug!("Generating group of {} sub-paths", jobs.len());

    // A single sub-path needs no worker
    if jobs.len() == 1 {
        let (spec, cons) = &jobs[0];
        return Ok(vec![generate_trajectory(
            &spec.waypoints,
            &spec.markers,
            cons,
            reversed,
            config,
        )?]);
    }

    // One worker thread per sub-path, inputs are disjoint copies so no
    // synchronisation is needed
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|(spec, cons)| {
            let config = config.clone();
            thread::spawn(move || {
                generate_trajectory(&spec.waypoints, &spec.markers, &cons, reversed, &config)
            })
        })
        .collect();

    // Collect in sub-path order, surfacing the first error
    let mut trajectories = Vec::with_capacity(handles.len());
    for handle in handles {
        let trajectory = handle
            .join()
            .expect("Sub-path generation thread panicked")?;
        trajectories.push(trajectory);
    }

    Ok(trajectories)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Reverse a waypoint sequence for reversed traversal.
///
/// The order flips, each heading rotates by pi, and the in/out heading roles
/// swap.
fn reverse_waypoints(waypoints: &[Waypoint]) -> Vec<Waypoint> {
    waypoints
        .iter()
        .rev()
        .map(|wp| Waypoint {
            position_m: wp.position_m,
            heading_in_rad: flip_heading(wp.heading_out_rad),
            heading_out_rad: flip_heading(wp.heading_in_rad),
            velocity_override_ms: wp.velocity_override_ms,
            stop_point: wp.stop_point,
        })
        .collect()
}

/// Mirror marker positions onto the reversed waypoint sequence.
fn reverse_markers(markers: &[EventMarker], num_waypoints: usize) -> Vec<EventMarker> {
    markers
        .iter()
        .map(|marker| EventMarker {
            name: marker.name.clone(),
            waypoint_position: (num_waypoints - 1) as f64 - marker.waypoint_position,
        })
        .collect()
}

fn flip_heading(heading_rad: f64) -> f64 {
    wrap_pi(heading_rad + std::f64::consts::PI)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
