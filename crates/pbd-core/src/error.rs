use std::collections::TryReserveError;

use thiserror::Error;

/// Errors raised while building a scene.
///
/// All of these are fatal at construction time. Once a [`crate::Solver`]
/// exists, no runtime pass returns an error: numerical anomalies (NaNs,
/// particles escaping the grid) are absorbed by the next stabilization and
/// plane-projection round instead.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Appending a particle group or rigid body would exceed a fixed
    /// capacity. Capacities are declared once in the scene description and
    /// never grow.
    #[error("capacity exceeded: need {needed} more slots, {available} remain")]
    CapacityExceeded { needed: usize, available: usize },

    /// A rigid body's reference positions are not centered on the origin.
    /// Shape matching requires a zero-centroid rest shape.
    #[error("rigid body reference shape is off-center (centroid magnitude {magnitude})")]
    OffCenterReference { magnitude: f32 },

    /// Reserving particle or rigid-body storage failed.
    #[error("buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}
