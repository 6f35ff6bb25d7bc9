use glam::Vec3;

use crate::fluids::{cohesion_kernel, poly6_gradient};
use crate::grid::UniformGrid;
use crate::particle::FLUID_PHASE;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compute fluid surface normals for the cohesion pass:
///
/// ```text
/// n_i = h * sum_j (m_j / rho_j) * grad_poly6(r_ij)
/// ```
///
/// Interior particles see near-symmetric neighborhoods and get normals
/// close to zero; the curvature force below only acts near the surface.
pub fn compute_normals(
    grid: &UniformGrid,
    predicted: &[Vec3],
    phase: &[i32],
    mass: &[f32],
    density: &[f32],
    normal: &mut [Vec3],
    count: usize,
    h: f32,
) {
    let surface_normal = |i: usize| {
        if phase[i] != FLUID_PHASE {
            return Vec3::ZERO;
        }

        let pos_i = predicted[i];
        let mut n = Vec3::ZERO;
        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            if j == i || phase[j] != FLUID_PHASE {
                return;
            }
            let r = pos_i - predicted[j];
            let r_len = r.length();
            if r_len < h {
                n += (mass[j] / density[j].max(1e-6)) * poly6_gradient(r, r_len, h);
            }
        });
        n * h
    };

    #[cfg(feature = "parallel")]
    normal[..count]
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = surface_normal(i));

    #[cfg(not(feature = "parallel"))]
    for (i, out) in normal[..count].iter_mut().enumerate() {
        *out = surface_normal(i);
    }
}

/// Akinci cohesion and curvature forces, integrated into velocity.
///
/// Per fluid pair the force is
///
/// ```text
/// f_ij = K_ij * (-gamma * m_i * m_j * C(|r_ij|) * r_hat
///                - gamma * m_i * (n_i - n_j))
/// K_ij = 2 * rho_0 / (rho_i + rho_j)
/// ```
///
/// Integrated over the whole-frame dt rather than the substep dt: the
/// force is weak and smoothly varying, and the source treats it as a
/// per-frame term.
///
/// Reference: Akinci, Akinci & Teschner, "Versatile Surface Tension and
/// Adhesion for SPH Fluids", SIGGRAPH Asia 2013
///
/// Writes into `temp_velocity`; the caller swaps the buffers.
#[allow(clippy::too_many_arguments)]
pub fn apply_cohesion(
    grid: &UniformGrid,
    predicted: &[Vec3],
    phase: &[i32],
    mass: &[f32],
    density: &[f32],
    normal: &[Vec3],
    velocity: &[Vec3],
    temp_velocity: &mut [Vec3],
    count: usize,
    rest_density: f32,
    strength: f32,
    frame_dt: f32,
    h: f32,
) {
    let smoothed = |i: usize| {
        let vel_i = velocity[i];
        if phase[i] != FLUID_PHASE {
            return vel_i;
        }

        let pos_i = predicted[i];
        let rho_i = density[i].max(1e-6);
        let m_i = mass[i];
        let n_i = normal[i];
        let mut force = Vec3::ZERO;

        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            if j == i || phase[j] != FLUID_PHASE {
                return;
            }
            let r = pos_i - predicted[j];
            let r_len = r.length();
            if r_len >= h || r_len <= 1e-6 {
                return;
            }

            let k_ij = 2.0 * rest_density / (rho_i + density[j].max(1e-6));
            let cohesion = -strength * m_i * mass[j] * cohesion_kernel(r_len, h) * (r / r_len);
            let curvature = -strength * m_i * (n_i - normal[j]);
            force += k_ij * (cohesion + curvature);
        });

        vel_i + force * (frame_dt / m_i)
    };

    #[cfg(feature = "parallel")]
    temp_velocity[..count]
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = smoothed(i));

    #[cfg(not(feature = "parallel"))]
    for (i, out) in temp_velocity[..count].iter_mut().enumerate() {
        *out = smoothed(i);
    }
}
