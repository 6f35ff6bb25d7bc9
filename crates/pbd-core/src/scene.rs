use glam::Vec3;

use crate::constraints::plane::Plane;

/// One rigid body to spawn: world positions plus the matching reference
/// shape, which must be centered on its center of mass.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct RigidBodyDesc {
    pub positions: Vec<Vec3>,
    pub rest_positions: Vec<Vec3>,
    pub mass_per_particle: f32,
}

/// A group of granular or fluid particles.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct ParticleGroupDesc {
    pub positions: Vec<Vec3>,
    pub mass_per_particle: f32,
}

/// Everything the solver consumes at construction. Capacities are final;
/// appending past them is a construction error, and no matter is added or
/// removed after construction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct SceneDescription {
    pub max_particles: usize,
    pub max_rigid_bodies: usize,
    pub particle_radius: f32,
    /// World box tiled by the uniform grid. Particles may leave it
    /// transiently (cells clamp); planes are expected to bring them back.
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub planes: Vec<Plane>,
    pub rigid_bodies: Vec<RigidBodyDesc>,
    pub granular_groups: Vec<ParticleGroupDesc>,
    pub fluid_groups: Vec<ParticleGroupDesc>,
    /// Fluid rest density rho_0.
    pub rest_density: f32,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            max_particles: 65_536,
            max_rigid_bodies: 64,
            particle_radius: 0.05,
            bounds_min: Vec3::new(-4.0, -1.0, -4.0),
            bounds_max: Vec3::new(4.0, 7.0, 4.0),
            planes: Vec::new(),
            rigid_bodies: Vec::new(),
            granular_groups: Vec::new(),
            fluid_groups: Vec::new(),
            rest_density: 6378.0,
        }
    }
}
