pub mod cohesion;
pub mod viscosity;
pub mod vorticity;

use glam::Vec3;
use std::f32::consts::PI;

/// Poly6 smoothing kernel for SPH density estimation.
///
/// Returns `W(r, h) = 315 / (64 * PI * h^9) * (h^2 - r^2)^3` when `r < h`,
/// and `0.0` when `r >= h`.
#[inline]
pub fn poly6_kernel(r: f32, h: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    let h2 = h * h;
    let r2 = r * r;
    let diff = h2 - r2;
    let h9 = h2 * h2 * h2 * h2 * h; // h^9
    let coeff = 315.0 / (64.0 * PI * h9);
    coeff * diff * diff * diff
}

/// Gradient of the poly6 kernel, used for fluid surface normals.
///
/// Returns `-945 / (32 * PI * h^9) * (h^2 - r_len^2)^2 * r` when
/// `r_len < h`, and `Vec3::ZERO` otherwise.
#[inline]
pub fn poly6_gradient(r: Vec3, r_len: f32, h: f32) -> Vec3 {
    if r_len >= h {
        return Vec3::ZERO;
    }
    let h2 = h * h;
    let h9 = h2 * h2 * h2 * h2 * h;
    let diff = h2 - r_len * r_len;
    let coeff = -945.0 / (32.0 * PI * h9);
    r * (coeff * diff * diff)
}

/// Spiky kernel gradient for SPH pressure correction.
///
/// Returns `(r / r_len) * (-45 / (PI * h^6)) * (h - r_len)^2` when
/// `r_len < h` and `r_len > 1e-6`, and `Vec3::ZERO` otherwise.
#[inline]
pub fn spiky_gradient(r: Vec3, r_len: f32, h: f32) -> Vec3 {
    if r_len >= h || r_len <= 1e-6 {
        return Vec3::ZERO;
    }
    let h6 = h * h * h * h * h * h;
    let coeff = -45.0 / (PI * h6);
    let diff = h - r_len;
    (r / r_len) * coeff * diff * diff
}

/// Akinci cohesion spline with compact support h.
///
/// ```text
/// C(r) = 32 / (PI * h^9) * (h - r)^3 * r^3                 h/2 < r <= h
///        32 / (PI * h^9) * (2 * (h - r)^3 * r^3 - h^6/64)  0 < r <= h/2
///        0                                                  otherwise
/// ```
///
/// Reference: Akinci, Akinci & Teschner, "Versatile Surface Tension and
/// Adhesion for SPH Fluids", SIGGRAPH Asia 2013
#[inline]
pub fn cohesion_kernel(r: f32, h: f32) -> f32 {
    if r <= 0.0 || r >= h {
        return 0.0;
    }
    let h3 = h * h * h;
    let h9 = h3 * h3 * h3;
    let coeff = 32.0 / (PI * h9);
    let hr = h - r;
    let spline = hr * hr * hr * r * r * r;
    if 2.0 * r > h {
        coeff * spline
    } else {
        let h6 = h3 * h3;
        coeff * (2.0 * spline - h6 / 64.0)
    }
}
