use std::ops::Range;

use glam::{Quat, Vec3};

use crate::error::SceneError;

/// Phase tag carried by fluid particles. Solid particles carry a
/// non-negative group id instead: one id shared by every particle of a
/// rigid body, a unique id per granular particle.
pub const FLUID_PHASE: i32 = -1;

/// Centroid magnitudes at or above this fail rigid-body insertion.
const REFERENCE_CENTROID_TOLERANCE: f32 = 1.0e-5;

/// A rigid body is a half-open range into the particle arrays plus its
/// reference shape. No per-particle back-pointers are stored; shape
/// matching iterates the range.
pub struct RigidBody {
    pub range: Range<usize>,
    /// Reference positions relative to the rest center of mass
    /// (zero centroid, validated at insertion).
    pub rest_positions: Vec<Vec3>,
    pub rotation: Quat,
    pub center_of_mass: Vec3,
}

/// SoA particle storage with fixed capacity.
///
/// Every array is allocated once at construction and never reallocates;
/// the `add_*` operations bump `count` and are the only growth path.
/// Slots at and beyond `count` are scratch and must not be read.
pub struct ParticleSet {
    pub count: usize,
    capacity: usize,
    body_capacity: usize,
    /// Next unassigned solid phase id, monotonically increasing from 1.
    next_phase: i32,
    /// Committed world positions.
    pub position: Vec<Vec3>,
    /// Scratch positions under constraint projection.
    pub predicted: Vec<Vec3>,
    /// Double buffer for gathered position passes.
    pub temp: Vec<Vec3>,
    /// Committed velocities.
    pub velocity: Vec<Vec3>,
    /// Double buffer for velocity post-processing passes.
    pub temp_velocity: Vec<Vec3>,
    pub mass: Vec<f32>,
    pub inv_mass: Vec<f32>,
    /// Shock-propagation scaled reciprocal mass, rebuilt each substep.
    pub inv_scaled_mass: Vec<f32>,
    /// Fluid = -1, solid = non-negative group id.
    pub phase: Vec<i32>,
    /// Vorticity at the particle (fluid only).
    pub vorticity: Vec<Vec3>,
    /// PBF Lagrange multiplier; zero for solids.
    pub lambda: Vec<f32>,
    /// SPH density estimate (fluid only).
    pub density: Vec<f32>,
    /// Surface normal for the cohesion pass (fluid only).
    pub normal: Vec<Vec3>,
    pub bodies: Vec<RigidBody>,
}

fn alloc<T: Clone + Default>(capacity: usize) -> Result<Vec<T>, SceneError> {
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)?;
    v.resize(capacity, T::default());
    Ok(v)
}

impl ParticleSet {
    pub fn new(capacity: usize, body_capacity: usize) -> Result<Self, SceneError> {
        let mut bodies = Vec::new();
        bodies.try_reserve_exact(body_capacity)?;
        Ok(Self {
            count: 0,
            capacity,
            body_capacity,
            next_phase: 1,
            position: alloc(capacity)?,
            predicted: alloc(capacity)?,
            temp: alloc(capacity)?,
            velocity: alloc(capacity)?,
            temp_velocity: alloc(capacity)?,
            mass: alloc(capacity)?,
            inv_mass: alloc(capacity)?,
            inv_scaled_mass: alloc(capacity)?,
            phase: alloc(capacity)?,
            vorticity: alloc(capacity)?,
            lambda: alloc(capacity)?,
            density: alloc(capacity)?,
            normal: alloc(capacity)?,
            bodies,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn body_capacity(&self) -> usize {
        self.body_capacity
    }

    /// Append a rigid body. `positions` are world-space spawn positions and
    /// `rest_positions` the reference shape relative to its center of mass.
    /// Every particle of the body shares one fresh phase id.
    pub fn add_rigid_body(
        &mut self,
        positions: &[Vec3],
        rest_positions: &[Vec3],
        mass_per_particle: f32,
    ) -> Result<usize, SceneError> {
        assert_eq!(
            positions.len(),
            rest_positions.len(),
            "rigid body spawn and reference shapes must have equal particle counts"
        );
        assert!(mass_per_particle > 0.0, "particle mass must be positive");
        if self.bodies.len() + 1 > self.body_capacity {
            return Err(SceneError::CapacityExceeded {
                needed: 1,
                available: self.body_capacity - self.bodies.len(),
            });
        }

        let centroid =
            rest_positions.iter().sum::<Vec3>() / rest_positions.len().max(1) as f32;
        if centroid.length() >= REFERENCE_CENTROID_TOLERANCE {
            return Err(SceneError::OffCenterReference {
                magnitude: centroid.length(),
            });
        }

        let phase = self.fresh_phase();
        let range = self.append(positions, mass_per_particle, |_| phase)?;

        let center_of_mass =
            positions.iter().sum::<Vec3>() / positions.len().max(1) as f32;
        self.bodies.push(RigidBody {
            range: range.clone(),
            rest_positions: rest_positions.to_vec(),
            rotation: Quat::IDENTITY,
            center_of_mass,
        });
        Ok(self.bodies.len() - 1)
    }

    /// Append granular particles. Each receives its own fresh phase id, so
    /// every granular particle collides with every other particle.
    pub fn add_granulars(
        &mut self,
        positions: &[Vec3],
        mass_per_particle: f32,
    ) -> Result<Range<usize>, SceneError> {
        assert!(mass_per_particle > 0.0, "particle mass must be positive");
        let base = self.next_phase;
        let range = self.append(positions, mass_per_particle, |k| base + k as i32)?;
        self.next_phase = base + positions.len() as i32;
        Ok(range)
    }

    /// Append fluid particles (phase -1).
    pub fn add_fluids(
        &mut self,
        positions: &[Vec3],
        mass_per_particle: f32,
    ) -> Result<Range<usize>, SceneError> {
        assert!(mass_per_particle > 0.0, "particle mass must be positive");
        self.append(positions, mass_per_particle, |_| FLUID_PHASE)
    }

    fn fresh_phase(&mut self) -> i32 {
        let phase = self.next_phase;
        self.next_phase += 1;
        phase
    }

    fn append(
        &mut self,
        positions: &[Vec3],
        mass_per_particle: f32,
        phase_of: impl Fn(usize) -> i32,
    ) -> Result<Range<usize>, SceneError> {
        let needed = positions.len();
        if self.count + needed > self.capacity {
            return Err(SceneError::CapacityExceeded {
                needed,
                available: self.capacity - self.count,
            });
        }

        let lo = self.count;
        for (k, &pos) in positions.iter().enumerate() {
            let i = lo + k;
            self.position[i] = pos;
            self.predicted[i] = pos;
            self.velocity[i] = Vec3::ZERO;
            self.mass[i] = mass_per_particle;
            self.inv_mass[i] = 1.0 / mass_per_particle;
            self.inv_scaled_mass[i] = 1.0 / mass_per_particle;
            self.phase[i] = phase_of(k);
        }
        self.count += needed;
        Ok(lo..self.count)
    }
}
