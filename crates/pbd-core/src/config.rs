use glam::Vec3;

/// Shock-propagation mass scaling constant k.
///
/// During constraint projection a particle's effective inverse mass is
/// `1 / (exp(-k * height) * mass)`, so particles lower in a stack resist
/// displacement more than the particles resting on them. One particle
/// radius of height difference is enough to shift the correction split
/// noticeably toward the upper particle.
pub const MASS_SCALING: f32 = 15.0;

/// Default commit gate for solid particles: a predicted position is
/// committed only when it moved at least this far during the substep.
pub const PARTICLE_SLEEPING_EPSILON: f32 = 1.0e-4;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Acceleration applied to every particle, per unit mass.
    pub gravity: Vec3,
    /// Substeps per `update` call.
    pub substeps: u32,
    /// Constraint projection iterations per grid rebuild.
    pub constraint_iterations: u32,
    /// Grid rebuilds per substep (outer loop).
    pub grid_iterations: u32,
    /// Plane stabilization iterations before projection.
    pub stabilization_iterations: u32,
    /// SPH support radius as a multiple of the particle radius
    /// (h = factor * r). Read at construction; the grid cell size is fixed
    /// to the resulting h for the lifetime of the solver.
    pub smoothing_radius_factor: f32,
    /// Enable the grid-based particle-particle collision projection.
    /// Intra-rigid-body and fluid-fluid pairs are always excluded.
    pub collisions_enabled: bool,
    /// Enable the Akinci cohesion/surface-tension pass.
    pub cohesion_enabled: bool,
    /// Cohesion and curvature force strength (gamma).
    pub cohesion_strength: f32,
    /// Vorticity confinement strength (epsilon).
    pub vorticity_strength: f32,
    /// XSPH velocity smoothing coefficient.
    pub xsph_viscosity: f32,
    /// Minimum per-substep displacement below which a solid particle's
    /// position is left uncommitted (sleeping).
    pub sleep_threshold: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            substeps: 2,
            constraint_iterations: 2,
            grid_iterations: 1,
            stabilization_iterations: 2,
            smoothing_radius_factor: 2.3,
            collisions_enabled: true,
            cohesion_enabled: true,
            cohesion_strength: 0.6,
            vorticity_strength: 1.0e-3,
            xsph_viscosity: 2.0e-4,
            sleep_threshold: PARTICLE_SLEEPING_EPSILON,
        }
    }
}
