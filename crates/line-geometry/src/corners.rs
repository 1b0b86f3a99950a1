//! Corner tables that turn a vertex or instance index into a quad corner.
//!
//! The vertex-pulling shaders, the instancing template and the geometry
//! stage all select corners through these tables; the WGSL copies in
//! `aa_common.wgsl` must stay in the same order.

/// Expanded vertices emitted per segment (two triangles, no index buffer).
pub const VERTICES_PER_SEGMENT: u32 = 6;

/// One corner of a segment's quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadCorner {
    /// 0 selects the first endpoint, 1 the second
    pub endpoint: u32,
    /// -1 or +1: which side of the centerline
    pub side: f32,
}

impl QuadCorner {
    pub const fn new(endpoint: u32, side: f32) -> Self {
        Self { endpoint, side }
    }
}

/// The four distinct corners, in winding order around the quad.
pub const QUAD_CORNERS: [QuadCorner; 4] = [
    QuadCorner::new(0, -1.0),
    QuadCorner::new(0, 1.0),
    QuadCorner::new(1, 1.0),
    QuadCorner::new(1, -1.0),
];

/// Indices into `QUAD_CORNERS` forming two triangles.
pub const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Lookup table used by the vertex-pulling shaders: `vertex_index % 6` selects an entry.
pub const PULL_CORNERS: [QuadCorner; 6] = [
    QUAD_CORNERS[QUAD_TRIANGLES[0]],
    QUAD_CORNERS[QUAD_TRIANGLES[1]],
    QUAD_CORNERS[QUAD_TRIANGLES[2]],
    QUAD_CORNERS[QUAD_TRIANGLES[3]],
    QUAD_CORNERS[QUAD_TRIANGLES[4]],
    QUAD_CORNERS[QUAD_TRIANGLES[5]],
];

/// Template quad for the instancing strategy, `(x, y) ∈ {0,1}×{-1,1}`.
pub const TEMPLATE_QUAD: [[f32; 2]; 4] = [[0.0, -1.0], [0.0, 1.0], [1.0, 1.0], [1.0, -1.0]];

pub const TEMPLATE_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Resolve a non-indexed draw's vertex index into `(segment, corner)`.
pub fn pull_corner(vertex_index: u32) -> (u32, QuadCorner) {
    let segment = vertex_index / VERTICES_PER_SEGMENT;
    let corner = PULL_CORNERS[(vertex_index % VERTICES_PER_SEGMENT) as usize];
    (segment, corner)
}

/// Resolve a template-quad position into a corner, as the instancing shader does.
pub fn template_corner(quad_pos: [f32; 2]) -> QuadCorner {
    QuadCorner::new(quad_pos[0] as u32, quad_pos[1])
}
