use glam::Vec3;

use crate::grid::UniformGrid;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Gathered particle-particle collision projection.
///
/// Each particle computes its own correction from overlapping neighbors
/// of a different phase: same-phase pairs are skipped, which excludes
/// intra-rigid-body pairs (handled by shape matching) and fluid-fluid
/// pairs (handled by the density constraint). The correction is weighted
/// by the shock-propagation scaled inverse masses, so particles deep in a
/// stack barely move while the particles above them yield.
///
/// Writes the corrected positions into `temp`; the caller swaps the
/// buffers, keeping reads and writes disjoint.
pub fn project_contacts(
    grid: &UniformGrid,
    predicted: &[Vec3],
    phase: &[i32],
    inv_scaled_mass: &[f32],
    temp: &mut [Vec3],
    count: usize,
    radius: f32,
) {
    let diameter = 2.0 * radius;

    let corrected = |i: usize| {
        let pos_i = predicted[i];
        let w_i = inv_scaled_mass[i];
        let mut delta = Vec3::ZERO;

        grid.for_each_neighbor(pos_i, |j| {
            let j = j as usize;
            if j == i || phase[j] == phase[i] {
                return;
            }
            let diff = pos_i - predicted[j];
            let dist = diff.length();
            if dist >= diameter || dist <= 1e-8 {
                return;
            }
            let w_sum = w_i + inv_scaled_mass[j];
            if w_sum <= 1e-10 {
                return;
            }
            delta += (diff / dist) * ((w_i / w_sum) * (diameter - dist));
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
