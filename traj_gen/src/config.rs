//! Generation configuration

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::GenError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default parametric sampling step.
///
/// At this resolution each spline segment contributes 250 samples, which
/// keeps the chord-length arc approximation well below a millimetre of error
/// for paths on the metre scale.
pub const DEFAULT_RESOLUTION: f64 = 0.004;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Configuration values threaded through a generation call.
///
/// The configuration is read during generation only, changing it between
/// generations is safe and takes effect on the next call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    /// The parametric step at which the fitted curve is sampled, in units of
    /// segment fraction. Smaller values trade CPU time for trajectory
    /// fidelity.
    pub resolution: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl GenConfig {
    /// Check that the resolution lies in the valid range (0, 1].
    pub fn validate(&self) -> Result<(), GenError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0 && self.resolution <= 1.0) {
            return Err(GenError::InvalidResolution(self.resolution));
        }

        Ok(())
    }
}
