//! Screen-space antialiased quad expansion.
//!
//! Host twin of `aa_corner` / `aa_coverage` in `aa_common.wgsl`. Widths are
//! applied after the perspective divide so a line keeps its pixel thickness
//! at any depth; the quad is fattened by the AA radius and the fragment
//! stage feathers it with a smoothstep centered on the nominal edge.
//!
//! Distances (`u`, `v`, width, length) are in the shaders' viewport units:
//! NDC scaled by the viewport size, i.e. two units per pixel. `u` leaves
//! the vertex stage un-normalised; the fragment stage divides by width.

use glam::{Vec2, Vec4, Vec4Swizzles};

use crate::corners::{pull_corner, template_corner, QuadCorner, QUAD_CORNERS, QUAD_TRIANGLES};
use crate::frame::FrameUniforms;
use crate::vertex::Vertex;

/// One expanded corner as the rasterizer receives it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AaCorner {
    pub clip_position: Vec4,
    pub color: Vec4,
    /// Signed distance across the line, `±line_width` at the quad edge
    pub u: f32,
    /// Signed distance along the line from the midpoint
    pub v: f32,
    pub line_width: f32,
    /// Half the extended segment length
    pub line_length: f32,
}

impl AaCorner {
    /// Position after the perspective divide.
    pub fn ndc(&self) -> Vec2 {
        self.clip_position.xy() / self.clip_position.w
    }
}

/// Screen-space quantities shared by all four corners of one segment.
#[derive(Clone, Copy, Debug)]
pub struct AaSegment {
    clip_a: Vec4,
    clip_b: Vec4,
    ndc_a: Vec2,
    line_vector: Vec2,
    normal_a: Vec2,
    normal_b: Vec2,
    extension: Vec2,
    line_width_a: f32,
    line_width_b: f32,
    line_length: f32,
    color_a: Vec4,
    color_b: Vec4,
}

impl AaSegment {
    /// Project a segment and derive its quad. `None` when both endpoints land
    /// on the same NDC point, which leaves no direction to offset along.
    pub fn new(a: &Vertex, b: &Vertex, frame: &FrameUniforms) -> Option<Self> {
        let mvp = frame.mvp();
        let viewport = frame.viewport_size();
        let aa_radius = frame.aa_radius();
        let aspect_ratio = viewport.y / viewport.x;

        let clip_a = mvp * a.position().extend(1.0);
        let clip_b = mvp * b.position().extend(1.0);

        let ndc_a = clip_a.xy() / clip_a.w;
        let ndc_b = clip_b.xy() / clip_b.w;

        let line_vector = ndc_b - ndc_a;
        let viewport_line_vector = line_vector * viewport;
        let dir = Vec2::new(line_vector.x, line_vector.y * aspect_ratio).try_normalize()?;

        let extension_length = aa_radius.y;
        let line_length = viewport_line_vector.length() + 2.0 * extension_length;
        // Sub-pixel lines are floored to one pixel and faded through alpha instead
        let line_width_a = a.half_width().max(1.0) + aa_radius.x;
        let line_width_b = b.half_width().max(1.0) + aa_radius.x;

        let normal = Vec2::new(-dir.y, dir.x);
        let normal_a = Vec2::new(line_width_a / viewport.x, line_width_a / viewport.y) * normal;
        let normal_b = Vec2::new(line_width_b / viewport.x, line_width_b / viewport.y) * normal;
        let extension = Vec2::new(extension_length / viewport.x, extension_length / viewport.y) * dir;

        Some(Self {
            clip_a,
            clip_b,
            ndc_a,
            line_vector,
            normal_a,
            normal_b,
            extension,
            line_width_a,
            line_width_b,
            line_length,
            color_a: faded_color(a),
            color_b: faded_color(b),
        })
    }

    pub fn corner(&self, corner: QuadCorner) -> AaCorner {
        let (line_width, normal, zw, color, along) = if corner.endpoint == 0 {
            (
                self.line_width_a,
                self.normal_a,
                self.clip_a.zw(),
                self.color_a,
                -self.extension,
            )
        } else {
            (
                self.line_width_b,
                self.normal_b,
                self.clip_b.zw(),
                self.color_b,
                self.line_vector + self.extension,
            )
        };

        let half_length = 0.5 * self.line_length;
        let endpoint_sign = if corner.endpoint == 0 { -1.0 } else { 1.0 };
        let ndc = self.ndc_a + along + corner.side * normal;

        AaCorner {
            clip_position: (ndc * zw.y).extend(zw.x).extend(zw.y),
            color,
            u: corner.side * line_width,
            v: endpoint_sign * half_length,
            line_width,
            line_length: half_length,
        }
    }

    /// The four distinct corners in `QUAD_CORNERS` order.
    pub fn corners(&self) -> [AaCorner; 4] {
        QUAD_CORNERS.map(|corner| self.corner(corner))
    }

    /// Six vertices as two triangles, the order the geometry stage writes them.
    pub fn emit(&self) -> [AaCorner; 6] {
        let corners = self.corners();
        QUAD_TRIANGLES.map(|index| corners[index])
    }
}

fn faded_color(vertex: &Vertex) -> Vec4 {
    let mut color = vertex.color();
    color.w *= vertex.half_width().min(1.0);
    color
}

/// Corner `vertex_index` of a non-indexed `6 × segments` draw, as the
/// vertex-pulling shaders compute it.
pub fn pulled_corner(lines: &[Vertex], frame: &FrameUniforms, vertex_index: u32) -> Option<AaCorner> {
    let (segment, corner) = pull_corner(vertex_index);
    let line_id_a = segment as usize * 2;
    let a = lines.get(line_id_a)?;
    let b = lines.get(line_id_a + 1)?;
    Some(AaSegment::new(a, b, frame)?.corner(corner))
}

/// Corner of instance `instance` at template position `quad_pos`, as the
/// instancing shader computes it.
pub fn instanced_corner(
    lines: &[Vertex],
    frame: &FrameUniforms,
    instance: u32,
    quad_pos: [f32; 2],
) -> Option<AaCorner> {
    let line_id_a = instance as usize * 2;
    let a = lines.get(line_id_a)?;
    let b = lines.get(line_id_a + 1)?;
    Some(AaSegment::new(a, b, frame)?.corner(template_corner(quad_pos)))
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fragment coverage for interpolated distances `(u, v, line_width, line_length)`.
///
/// The smoothstep lower edge `1 - 2r/w` puts 50% coverage exactly on the
/// un-fattened edge, so feathering does not shift the apparent width.
pub fn coverage(distance: Vec4, aa_radius: Vec2) -> f32 {
    let [u, v, line_width, line_length] = distance.to_array();
    let au = 1.0 - smoothstep(1.0 - (2.0 * aa_radius.x) / line_width, 1.0, (u / line_width).abs());
    let av = 1.0 - smoothstep(1.0 - (2.0 * aa_radius.y) / line_length, 1.0, (v / line_length).abs());
    au.min(av)
}

/// Final fragment alpha for interpolated corner data.
pub fn fragment_alpha(color: Vec4, distance: Vec4, aa_radius: Vec2) -> f32 {
    color.w * coverage(distance, aa_radius)
}
