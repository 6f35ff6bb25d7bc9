use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Renderer-facing particle position: xyz plus a zero pad, 16 bytes,
/// matching a tightly packed vec4 layout.
#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
pub struct PackedPosition {
    pub position: [f32; 3],
    pub w: f32,
}

/// Refresh the packed view from committed positions. Called once at the
/// end of each `update`, outside any solver pass, so a mapped reader sees
/// a consistent frame.
pub(crate) fn write_packed(dst: &mut [PackedPosition], positions: &[Vec3], count: usize) {
    for (out, pos) in dst[..count].iter_mut().zip(&positions[..count]) {
        *out = PackedPosition {
            position: pos.to_array(),
            w: 0.0,
        };
    }
}
