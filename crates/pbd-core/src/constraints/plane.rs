use glam::Vec3;

use crate::particle::ParticleSet;

/// A collision half-space: particles are kept on the positive-normal side,
/// offset by their radius.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub origin: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// Build a plane, normalizing the normal.
    pub fn new(origin: Vec3, normal: Vec3) -> Self {
        Self {
            origin,
            normal: normal.normalize(),
        }
    }

    /// Ground plane at y = 0.
    pub fn ground() -> Self {
        Self {
            origin: Vec3::ZERO,
            normal: Vec3::Y,
        }
    }
}

/// Pre-projection stabilization: remove pre-existing interpenetration by
/// shifting the committed and predicted positions together. Because both
/// move by the same amount, the later velocity reconstruction sees no
/// delta from this pass.
///
/// This is the one place committed positions change outside the commit
/// step.
pub fn stabilize(particles: &mut ParticleSet, planes: &[Plane], radius: f32, iterations: u32) {
    for _ in 0..iterations {
        for plane in planes {
            for i in 0..particles.count {
                let depth = (plane.origin - particles.position[i]).dot(plane.normal) + radius;
                if depth > 0.0 {
                    let shift = plane.normal * depth;
                    particles.position[i] += shift;
                    particles.predicted[i] += shift;
                }
            }
        }
    }
}

/// Plane collision projection on predicted positions.
///
/// The committed position also receives a damped nudge along the normal;
/// when velocity is later rebuilt from the predicted/committed delta this
/// bleeds off part of the rebound, acting like friction against the plane.
pub fn project(particles: &mut ParticleSet, planes: &[Plane], radius: f32) {
    for plane in planes {
        for i in 0..particles.count {
            let depth = (plane.origin - particles.predicted[i]).dot(plane.normal) + radius;
            if depth > 0.0 {
                particles.predicted[i] += plane.normal * depth;
                let rebound = 2.0
                    * (particles.predicted[i] - particles.position[i]).dot(plane.normal)
                    + depth;
                particles.position[i] += plane.normal * (rebound / 10.0);
            }
        }
    }
}
