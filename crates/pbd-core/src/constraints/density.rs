use glam::Vec3;

use crate::fluids::{poly6_kernel, spiky_gradient};
use crate::grid::UniformGrid;
use crate::particle::FLUID_PHASE;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Relaxation parameter (epsilon) for the lambda denominator.
/// Prevents division by zero and controls constraint stiffness.
const RELAXATION_EPSILON: f32 = 300.0;

/// Tensile instability correction coefficient (k in the paper).
const TENSILE_K: f32 = 1.0e-4;

/// Tensile instability correction exponent (n in the paper).
const TENSILE_N: i32 = 4;

/// Fraction of the smoothing radius used as the tensile reference
/// distance delta_q.
const TENSILE_DQ_FACTOR: f32 = 0.3;

/// Compute SPH densities and PBF Lagrange multipliers for fluid particles.
///
/// Reference: "Position Based Fluids", Macklin & Muller, SIGGRAPH 2013
///
/// The density sum runs over every neighbor including the particle itself;
/// solid neighbors contribute their mass (one-way solid-to-fluid
/// coupling). Solids get `lambda = 0` so the correction pass can read
/// neighbor lambdas unconditionally.
pub fn compute_lambdas(
    grid: &UniformGrid,
    predicted: &[Vec3],
    phase: &[i32],
    mass: &[f32],
    density: &mut [f32],
    lambda: &mut [f32],
    count: usize,
    rest_density: f32,
    h: f32,
) {
    let inv_rho0 = 1.0 / rest_density;

    let solved = |i: usize| -> (f32, f32) {
        if phase[i] != FLUID_PHASE {
            return (0.0, 0.0);
        }

        let pos_i = predicted[i];
        let mut rho = 0.0_f32;
        let mut grad_sum_sq = 0.0_f32;
        let mut grad_self = Vec3::ZERO;

        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            let r = pos_i - predicted[j];
            let r_len = r.length();
            if r_len >= h {
                return;
            }
            rho += mass[j] * poly6_kernel(r_len, h);
            if j != i {
                let grad_j = spiky_gradient(r, r_len, h) * inv_rho0;
                grad_sum_sq += grad_j.length_squared();
                grad_self += grad_j;
            }
        });

        grad_sum_sq += grad_self.length_squared();

        // Constraint value: C_i = rho_i / rho_0 - 1
        let c_i = rho * inv_rho0 - 1.0;
        (rho, -c_i / (grad_sum_sq + RELAXATION_EPSILON))
    };

    #[cfg(feature = "parallel")]
    density[..count]
        .par_iter_mut()
        .zip(lambda[..count].par_iter_mut())
        .enumerate()
        .for_each(|(i, (rho, lam))| {
            (*rho, *lam) = solved(i);
        });

    #[cfg(not(feature = "parallel"))]
    for (i, (rho, lam)) in density[..count]
        .iter_mut()
        .zip(lambda[..count].iter_mut())
        .enumerate()
    {
        (*rho, *lam) = solved(i);
    }
}

/// Apply the PBF position correction with the anti-clustering tensile
/// term.
///
/// ```text
/// dp_i = (1/rho_0) * sum_j (lambda_i + lambda_j + s_corr) * grad_spiky(r_ij)
/// s_corr = -k * (poly6(r_ij) / poly6(dq))^n
/// ```
///
/// Solid neighbors participate with `lambda_j = 0`; solid particles
/// themselves are passed through unchanged. Writes into `temp`; the caller
/// swaps the buffers.
pub fn project_density(
    grid: &UniformGrid,
    predicted: &[Vec3],
    phase: &[i32],
    lambda: &[f32],
    temp: &mut [Vec3],
    count: usize,
    rest_density: f32,
    h: f32,
) {
    let inv_rho0 = 1.0 / rest_density;
    let poly6_dq = poly6_kernel(h * TENSILE_DQ_FACTOR, h);

    let corrected = |i: usize| {
        let pos_i = predicted[i];
        if phase[i] != FLUID_PHASE {
            return pos_i;
        }

        let lambda_i = lambda[i];
        let mut delta = Vec3::ZERO;

        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            if j == i {
                return;
            }
            let r = pos_i - predicted[j];
            let r_len = r.length();
            if r_len >= h {
                return;
            }
            let s_corr = -TENSILE_K * (poly6_kernel(r_len, h) / poly6_dq).powi(TENSILE_N);
            delta += (lambda_i + lambda[j] + s_corr) * spiky_gradient(r, r_len, h) * inv_rho0;
        });

        pos_i + delta
    };

    #[cfg(feature = "parallel")]
    temp[..count]
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = corrected(i));

    #[cfg(not(feature = "parallel"))]
    for (i, out) in temp[..count].iter_mut().enumerate() {
        *out = corrected(i);
    }
}
