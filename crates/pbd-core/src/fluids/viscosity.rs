use glam::Vec3;

use crate::fluids::poly6_kernel;
use crate::grid::UniformGrid;
use crate::particle::FLUID_PHASE;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// XSPH viscosity: blend each fluid particle's velocity toward the
/// weighted average of its fluid neighbors' velocities.
///
/// ```text
/// v_i += c * sum_j (m_j / rho_j) * (v_j - v_i) * poly6(|r_ij|, h)
/// ```
///
/// Runs after velocities are rebuilt from the position delta. Writes into
/// `temp_velocity`; the caller swaps the buffers.
pub fn apply_xsph_viscosity(
    grid: &UniformGrid,
    predicted: &[Vec3],
    phase: &[i32],
    mass: &[f32],
    density: &[f32],
    velocity: &[Vec3],
    temp_velocity: &mut [Vec3],
    count: usize,
    viscosity: f32,
    h: f32,
) {
    let smoothed = |i: usize| {
        let vel_i = velocity[i];
        if phase[i] != FLUID_PHASE {
            return vel_i;
        }

        let pos_i = predicted[i];
        let mut correction = Vec3::ZERO;

        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            if j == i || phase[j] != FLUID_PHASE {
                return;
            }
            let r_len = (pos_i - predicted[j]).length();
            if r_len < h {
                let w = poly6_kernel(r_len, h);
                correction += (mass[j] / density[j].max(1e-6)) * (velocity[j] - vel_i) * w;
            }
        });

        vel_i + correction * viscosity
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
