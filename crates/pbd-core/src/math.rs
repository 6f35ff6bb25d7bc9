use glam::{Mat3, Quat, Vec3};

/// Outer product of two `Vec3`: returns a `Mat3` where M = a * b^T.
#[inline]
pub fn mat3_outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Extract the rotational part of a deformation matrix by warm-started
/// iterative polar decomposition.
///
/// Each step rotates `q` toward the rotation whose columns best align with
/// the columns of `a`. Warm-starting from the previous substep's rotation
/// lets a single step per solver iteration track rigid motion.
///
/// Reference: Mueller et al., "A Robust Method to Extract the Rotational
/// Part of Deformations", MIG 2016
pub fn extract_rotation(a: Mat3, mut q: Quat, iterations: u32) -> Quat {
    for _ in 0..iterations {
        let r = Mat3::from_quat(q);
        let denom = (r.x_axis.dot(a.x_axis) + r.y_axis.dot(a.y_axis) + r.z_axis.dot(a.z_axis))
            .abs()
            + 1.0e-9;
        let omega = (r.x_axis.cross(a.x_axis)
            + r.y_axis.cross(a.y_axis)
            + r.z_axis.cross(a.z_axis))
            / denom;
        let angle = omega.length();
        if angle < 1.0e-9 {
            break;
        }
        q = (Quat::from_axis_angle(omega / angle, angle) * q).normalize();
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_product_rank_one() {
        let m = mat3_outer(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(m.x_axis, Vec3::new(4.0, 8.0, 12.0));
        assert_eq!(m.y_axis, Vec3::new(5.0, 10.0, 15.0));
        assert_eq!(m.z_axis, Vec3::new(6.0, 12.0, 18.0));
    }

    #[test]
    fn test_extract_rotation_identity_fixed_point() {
        let q = extract_rotation(Mat3::IDENTITY, Quat::IDENTITY, 1);
        assert!(
            q.angle_between(Quat::IDENTITY) < 1.0e-5,
            "identity input should keep the identity rotation"
        );
    }

    #[test]
    fn test_extract_rotation_recovers_pure_rotation() {
        let target = Quat::from_axis_angle(Vec3::Y, 0.7);
        let a = Mat3::from_quat(target);
        // Cold start needs a few steps; warm-started callers use one.
        let q = extract_rotation(a, Quat::IDENTITY, 20);
        assert!(
            q.angle_between(target) < 1.0e-3,
            "extracted rotation deviates by {}",
            q.angle_between(target)
        );
    }
}
