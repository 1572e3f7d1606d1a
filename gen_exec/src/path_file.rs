//! # Path definition file loading
//!
//! A path file is the JSON form of an authored path: the waypoint sequence,
//! the event markers attached to it, optional authored constraint sets, and
//! the reversal flag. This module deserialises the file into the core
//! generation types and splits the waypoint sequence into independent
//! sub-paths at its stop-point waypoints.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;

// Internal
use traj_gen::{EventMarker, PathConstraints, PathSpec, Waypoint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The on-disk form of an authored path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFile {
    /// The authored waypoint sequence.
    pub waypoints: Vec<WaypointRecord>,

    /// Event markers attached to the waypoint sequence.
    #[serde(default)]
    pub markers: Vec<MarkerRecord>,

    /// Authored constraint sets, one per sub-path. May be empty, in which
    /// case the caller supplies defaults.
    #[serde(default)]
    pub constraints: Vec<ConstraintsRecord>,

    /// If true the path is traversed in reverse.
    #[serde(default)]
    pub reversed: bool,
}

/// One waypoint record of a path file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub position_m: [f64; 2],
    pub heading_in_rad: f64,
    pub heading_out_rad: f64,

    #[serde(default)]
    pub velocity_override_ms: Option<f64>,

    #[serde(default)]
    pub stop_point: bool,
}

/// One event marker record of a path file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub name: String,
    pub waypoint_position: f64,
}

/// One authored constraint set of a path file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConstraintsRecord {
    pub max_velocity_ms: f64,
    pub max_acceleration_mss: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a path file.
#[derive(Debug, Error)]
pub enum PathFileError {
    #[error("Cannot load the path file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the path file: {0}")]
    DeserialiseError(serde_json::Error),

    #[error("The path file does not carry authored constraints")]
    NoAuthoredConstraints,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a path file from storage.
pub fn load_path_file<P: AsRef<Path>>(path: P) -> Result<PathFile, PathFileError> {
    let file_str = match read_to_string(path) {
        Ok(s) => s,
        Err(e) => return Err(PathFileError::FileLoadError(e)),
    };

    match serde_json::from_str(file_str.as_str()) {
        Ok(f) => Ok(f),
        Err(e) => Err(PathFileError::DeserialiseError(e)),
    }
}

/// Get the authored constraint sets from a path file.
///
/// Fails if the file carries none, so that the caller can fall back to
/// defaults explicitly rather than silently.
pub fn constraints_from_file(file: &PathFile) -> Result<Vec<PathConstraints>, PathFileError> {
    if file.constraints.is_empty() {
        return Err(PathFileError::NoAuthoredConstraints);
    }

    Ok(file
        .constraints
        .iter()
        .map(|c| PathConstraints::new(c.max_velocity_ms, c.max_acceleration_mss))
        .collect())
}

/// Split the file's waypoint sequence into independent sub-paths at its
/// interior stop-point waypoints.
///
/// Each boundary waypoint is shared, it ends the earlier sub-path and starts
/// the later one. Markers are assigned to the sub-path containing their
/// position (the earlier one when exactly on a boundary) and rebased to that
/// sub-path's waypoint numbering.
pub fn split_at_stop_points(file: &PathFile) -> Vec<PathSpec> {
    let waypoints: Vec<Waypoint> = file.waypoints.iter().map(to_waypoint).collect();
    let markers: Vec<EventMarker> = file
        .markers
        .iter()
        .map(|m| EventMarker::new(m.name.clone(), m.waypoint_position))
        .collect();

    // Nothing to split, let the core reject short sequences
    if waypoints.len() < 2 {
        return vec![PathSpec { waypoints, markers }];
    }

    // Boundary indices: the sequence ends plus every interior stop point
    let mut boundaries = vec![0];
    for (i, wp) in waypoints.iter().enumerate() {
        if wp.stop_point && i != 0 && i != waypoints.len() - 1 {
            boundaries.push(i);
        }
    }
    boundaries.push(waypoints.len() - 1);

    // Assign each marker to the sub-path containing its position, the
    // earlier one when exactly on a boundary. Out-of-range markers are
    // passed through unclamped so that generation rejects them rather than
    // losing them silently.
    let num_specs = boundaries.len() - 1;
    let mut spec_markers: Vec<Vec<EventMarker>> = vec![Vec::new(); num_specs];

    for marker in &markers {
        let mut window = num_specs - 1;
        for (i, bounds) in boundaries.windows(2).enumerate() {
            if marker.waypoint_position <= bounds[1] as f64 {
                window = i;
                break;
            }
        }

        spec_markers[window].push(EventMarker::new(
            marker.name.clone(),
            marker.waypoint_position - boundaries[window] as f64,
        ));
    }

    boundaries
        .windows(2)
        .zip(spec_markers)
        .map(|(bounds, markers)| PathSpec {
            waypoints: waypoints[bounds[0]..=bounds[1]].to_vec(),
            markers,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn to_waypoint(record: &WaypointRecord) -> Waypoint {
    Waypoint {
        position_m: Point2::new(record.position_m[0], record.position_m[1]),
        heading_in_rad: record.heading_in_rad,
        heading_out_rad: record.heading_out_rad,
        velocity_override_ms: record.velocity_override_ms,
        stop_point: record.stop_point,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
