use glam::{Mat3, Vec3};

use crate::math::{extract_rotation, mat3_outer};
use crate::particle::RigidBody;

/// Shape matching with full stiffness: every particle of a body snaps to
/// its rotated reference position each call.
///
/// For each body:
/// 1. Current centroid of the predicted positions
/// 2. Cross-covariance A = sum (predicted - c) * rest^T
/// 3. One step of warm-started polar decomposition from the stored
///    quaternion
/// 4. predicted = c + R * rest
///
/// A single step per call is enough because the stored rotation carries
/// over between iterations and substeps.
///
/// Reference: "Meshless Deformations Based on Shape Matching",
/// Mueller et al., SIGGRAPH 2005
pub fn project_shape_matching(bodies: &mut [RigidBody], predicted: &mut [Vec3]) {
    for body in bodies {
        let n = body.range.len();
        if n == 0 {
            continue;
        }

        let mut com = Vec3::ZERO;
        for i in body.range.clone() {
            com += predicted[i];
        }
        com /= n as f32;

        let mut a = Mat3::ZERO;
        for (k, i) in body.range.clone().enumerate() {
            a += mat3_outer(predicted[i] - com, body.rest_positions[k]);
        }

        let rotation = extract_rotation(a, body.rotation, 1);
        let r = Mat3::from_quat(rotation);
        for (k, i) in body.range.clone().enumerate() {
            predicted[i] = com + r * body.rest_positions[k];
        }

        body.rotation = rotation;
        body.center_of_mass = com;
    }
}
