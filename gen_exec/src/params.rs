//! Generation executable parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the generation executable
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// The parametric sampling resolution, in units of segment fraction.
    pub resolution: f64,

    /// Default maximum velocity, used when the path file carries no
    /// authored constraints.
    pub max_velocity_ms: f64,

    /// Default maximum acceleration, used when the path file carries no
    /// authored constraints.
    pub max_acceleration_mss: f64,
}
