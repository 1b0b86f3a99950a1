//! Per-draw uniform data

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

/// Frame uniform for GPU.
///
/// Matches `FrameUniforms` in `aa_common.wgsl`: mat4 at 0, viewport at 64,
/// AA radius at 72, 80 bytes total.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Column-major model-view-projection
    pub mvp: [[f32; 4]; 4],
    /// Width, height in pixels
    pub viewport_size: [f32; 2],
    /// x: feather radius across the line, y: extension along it
    pub aa_radius: [f32; 2],
}

impl FrameUniforms {
    pub fn new(mvp: Mat4, viewport_size: Vec2, aa_radius: Vec2) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            viewport_size: viewport_size.to_array(),
            aa_radius: aa_radius.to_array(),
        }
    }

    pub fn mvp(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.mvp)
    }

    pub fn viewport_size(&self) -> Vec2 {
        Vec2::from_array(self.viewport_size)
    }

    pub fn aa_radius(&self) -> Vec2 {
        Vec2::from_array(self.aa_radius)
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Vec2::ONE, Vec2::splat(2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_matches_wgsl() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 80);
    }

    #[test]
    fn test_mvp_is_column_major() {
        let mvp = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let frame = FrameUniforms::new(mvp, Vec2::new(100.0, 50.0), Vec2::ONE);

        // Translation lives in the fourth column
        assert_eq!(frame.mvp[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(frame.mvp(), mvp);
        assert_eq!(frame.viewport_size(), Vec2::new(100.0, 50.0));
    }
}
