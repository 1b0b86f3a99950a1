//! Line endpoint record shared by every rendering strategy

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::error::{LineError, Result};

/// GPU-compatible line endpoint.
/// Aligned for WGSL struct compatibility (`LineVertex` in the shaders).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// xyz: model-space position, w: half width
    pub pos_width: [f32; 4],
    /// RGBA color
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: Vec3, half_width: f32, color: Vec4) -> Self {
        Self {
            pos_width: position.extend(half_width).to_array(),
            color: color.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.pos_width[0], self.pos_width[1], self.pos_width[2])
    }

    pub fn half_width(&self) -> f32 {
        self.pos_width[3]
    }

    pub fn color(&self) -> Vec4 {
        Vec4::from_array(self.color)
    }
}

/// Iterate a flat vertex stream as independent segments `[2i, 2i + 1]`.
///
/// Segments do not share vertices; there are no joins between them.
pub fn segments(vertices: &[Vertex]) -> Result<impl Iterator<Item = (&Vertex, &Vertex)> + '_> {
    if vertices.len() % 2 != 0 {
        return Err(LineError::UnpairedVertex {
            len: vertices.len(),
        });
    }

    Ok(vertices.chunks_exact(2).map(|pair| (&pair[0], &pair[1])))
}
