use glam::Vec3;

use crate::fluids::spiky_gradient;
use crate::grid::UniformGrid;
use crate::particle::FLUID_PHASE;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compute the vorticity (curl of the velocity field) at each fluid
/// particle:
///
/// ```text
/// omega_i = sum_j (v_j - v_i) x grad_spiky(r_ij)
/// ```
pub fn compute_vorticity(
    grid: &UniformGrid,
    predicted: &[Vec3],
    velocity: &[Vec3],
    phase: &[i32],
    vorticity: &mut [Vec3],
    count: usize,
    h: f32,
) {
    let curl = |i: usize| {
        if phase[i] != FLUID_PHASE {
            return Vec3::ZERO;
        }

        let pos_i = predicted[i];
        let vel_i = velocity[i];
        let mut omega = Vec3::ZERO;

        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            if j == i || phase[j] != FLUID_PHASE {
                return;
            }
            let r = pos_i - predicted[j];
            let r_len = r.length();
            if r_len < h && r_len > 1e-6 {
                omega += (velocity[j] - vel_i).cross(spiky_gradient(r, r_len, h));
            }
        });

        omega
    };

    #[cfg(feature = "parallel")]
    vorticity[..count]
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = curl(i));

    #[cfg(not(feature = "parallel"))]
    for (i, out) in vorticity[..count].iter_mut().enumerate() {
        *out = curl(i);
    }
}

/// Apply the vorticity confinement force, re-injecting rotational energy
/// the discrete solver dissipates.
///
/// The corrective force is `f = strength * (eta_hat x omega_i)` where eta
/// is the SPH gradient of |omega| over the neighborhood. Reads only the
/// vorticity field of neighbors, so the velocity write is disjoint per
/// particle.
pub fn apply_vorticity_confinement(
    grid: &UniformGrid,
    predicted: &[Vec3],
    vorticity: &[Vec3],
    phase: &[i32],
    velocity: &mut [Vec3],
    count: usize,
    strength: f32,
    h: f32,
    dt: f32,
) {
    let force = |i: usize| {
        if phase[i] != FLUID_PHASE {
            return Vec3::ZERO;
        }

        let omega_i = vorticity[i];
        if omega_i.length() < 1e-6 {
            return Vec3::ZERO;
        }

        let pos_i = predicted[i];
        let mut eta = Vec3::ZERO;
        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            if j == i || phase[j] != FLUID_PHASE {
                return;
            }
            let r = pos_i - predicted[j];
            let r_len = r.length();
            if r_len < h && r_len > 1e-6 {
                eta += vorticity[j].length() * spiky_gradient(r, r_len, h);
            }
        });

        let eta_len = eta.length();
        if eta_len < 1e-6 {
            return Vec3::ZERO;
        }
        (eta / eta_len).cross(omega_i) * strength
    };

    #[cfg(feature = "parallel")]
    velocity[..count]
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, vel)| *vel += force(i) * dt);

    #[cfg(not(feature = "parallel"))]
    for (i, vel) in velocity[..count].iter_mut().enumerate() {
        *vel += force(i) * dt;
    }
}
