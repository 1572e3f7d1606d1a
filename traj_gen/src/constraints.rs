//! Path motion constraints

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::GenError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion constraints applied to one path.
///
/// One instance applies to one path. A path group associates one constraints
/// instance with each sub-path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathConstraints {
    /// Maximum velocity along the path.
    pub max_velocity_ms: f64,

    /// Maximum acceleration (and deceleration) along the path.
    pub max_acceleration_mss: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathConstraints {
    pub fn new(max_velocity_ms: f64, max_acceleration_mss: f64) -> Self {
        Self {
            max_velocity_ms,
            max_acceleration_mss,
        }
    }

    /// Check that both constraint values are positive and finite.
    pub fn validate(&self) -> Result<(), GenError> {
        if !(self.max_velocity_ms.is_finite() && self.max_velocity_ms > 0.0) {
            return Err(GenError::InvalidMaxVelocity(self.max_velocity_ms));
        }
        if !(self.max_acceleration_mss.is_finite() && self.max_acceleration_mss > 0.0) {
            return Err(GenError::InvalidMaxAcceleration(self.max_acceleration_mss));
        }

        Ok(())
    }
}
