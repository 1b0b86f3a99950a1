//! Host-side expansion of line segments into triangle quads.
//!
//! The cheap baseline: no antialiasing feathering, widths in model units.

use glam::Vec3;

use crate::corners::VERTICES_PER_SEGMENT;
use crate::error::{LineError, Result};
use crate::vertex::{segments, Vertex};

/// Caller-owned, fixed-capacity destination for expanded quads.
///
/// Allocated once and reused every frame; it never grows past `capacity`.
pub struct QuadArena {
    quads: Vec<Vertex>,
    capacity: usize,
}

impl QuadArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            quads: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.quads
    }

    pub fn clear(&mut self) {
        self.quads.clear();
    }
}

/// Direction and in-plane normal of a segment, or `None` when it has zero length.
///
/// The normal is a fixed 90° rotation in the XY plane with z carried through,
/// so it is perpendicular to `dir` for segments lying in that plane.
pub fn segment_normal(v0: &Vertex, v1: &Vertex) -> Option<(Vec3, Vec3)> {
    let dir = (v1.position() - v0.position()).try_normalize()?;
    let normal = Vec3::new(-dir.y, dir.x, dir.z);
    Some((dir, normal))
}

/// Expand `lines` (vertex pairs) into 6 vertices per segment inside `arena`.
///
/// Each endpoint is offset by its own half width times `width_scale`.
/// Capacity is checked before anything is written; on overflow the arena is
/// left empty and `CapacityExceeded` is returned. Zero-length segments are
/// skipped.
pub fn expand_lines<'a>(
    lines: &[Vertex],
    arena: &'a mut QuadArena,
    width_scale: f32,
) -> Result<&'a [Vertex]> {
    arena.clear();

    let pairs = segments(lines)?;
    let required = (lines.len() / 2) * VERTICES_PER_SEGMENT as usize;
    if required > arena.capacity {
        return Err(LineError::CapacityExceeded {
            required,
            capacity: arena.capacity,
        });
    }

    for (v0, v1) in pairs {
        let Some((_, normal)) = segment_normal(v0, v1) else {
            log::trace!("Skipping zero-length segment at {:?}", v0.position());
            continue;
        };

        let width_0 = v0.half_width() * width_scale;
        let width_1 = v1.half_width() * width_scale;
        let offset_0 = normal * width_0;
        let offset_1 = normal * width_1;

        let a = Vertex::new(v0.position() + offset_0, width_0, v0.color());
        let b = Vertex::new(v0.position() - offset_0, width_0, v0.color());
        let c = Vertex::new(v1.position() + offset_1, width_1, v1.color());
        let d = Vertex::new(v1.position() - offset_1, width_1, v1.color());

        arena.quads.extend_from_slice(&[a, b, c, b, c, d]);
    }

    Ok(arena.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    const EPS: f32 = 1e-5;

    fn line(from: Vec3, to: Vec3, half_width: f32) -> [Vertex; 2] {
        [
            Vertex::new(from, half_width, Vec4::new(0.0, 0.0, 0.0, 1.0)),
            Vertex::new(to, half_width, Vec4::new(0.0, 0.0, 0.0, 1.0)),
        ]
    }

    fn xy(v: &Vertex) -> Vec2 {
        v.position().truncate()
    }

    #[test]
    fn test_horizontal_segment_corners() {
        let lines = line(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 2.0);
        let mut arena = QuadArena::new(64);
        let quads = expand_lines(&lines, &mut arena, 0.01).unwrap();

        assert_eq!(quads.len(), 6);
        let expected = [
            Vec2::new(0.0, 0.02),
            Vec2::new(0.0, -0.02),
            Vec2::new(10.0, 0.02),
            Vec2::new(0.0, -0.02),
            Vec2::new(10.0, 0.02),
            Vec2::new(10.0, -0.02),
        ];
        for (quad, expected) in quads.iter().zip(expected) {
            assert!(xy(quad).abs_diff_eq(expected, EPS), "{:?} != {:?}", xy(quad), expected);
        }
    }

    #[test]
    fn test_normal_is_orthogonal_unit() {
        let cases = [
            (Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)),
            (Vec3::new(-3.0, 2.0, 0.0), Vec3::new(4.0, -5.0, 0.0)),
            (Vec3::new(0.1, 0.1, 0.0), Vec3::new(0.1, 9.0, 0.0)),
            (Vec3::new(7.2, -2.0, 0.0), Vec3::new(7.6, 2.0, 0.0)),
        ];
        for (from, to) in cases {
            let [v0, v1] = line(from, to, 1.0);
            let (dir, normal) = segment_normal(&v0, &v1).unwrap();
            assert!(dir.dot(normal).abs() < EPS);
            assert!((normal.length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_quad_area_matches_width_times_length() {
        let from = Vec3::new(-1.0, 2.0, 0.0);
        let to = Vec3::new(3.0, -1.0, 0.0);
        let half_width = 25.0;
        let scale = 0.01;
        let lines = line(from, to, half_width);
        let mut arena = QuadArena::new(64);
        let quads = expand_lines(&lines, &mut arena, scale).unwrap();

        // Perimeter order A, C, D, B
        let polygon = [xy(&quads[0]), xy(&quads[2]), xy(&quads[5]), xy(&quads[1])];
        let mut twice_area = 0.0;
        for i in 0..polygon.len() {
            let p = polygon[i];
            let q = polygon[(i + 1) % polygon.len()];
            twice_area += p.x * q.y - q.x * p.y;
        }
        let area = twice_area.abs() * 0.5;
        let expected = 2.0 * half_width * scale * (to - from).length();
        assert!((area - expected).abs() < 1e-4, "{area} != {expected}");
    }

    #[test]
    fn test_per_endpoint_widths() {
        let lines = [
            Vertex::new(Vec3::ZERO, 1.0, Vec4::ONE),
            Vertex::new(Vec3::new(0.0, 5.0, 0.0), 3.0, Vec4::ONE),
        ];
        let mut arena = QuadArena::new(6);
        let quads = expand_lines(&lines, &mut arena, 1.0).unwrap();

        // Vertical segment: normal points along -x
        assert!((quads[0].position().x + 1.0).abs() < EPS);
        assert!((quads[2].position().x + 3.0).abs() < EPS);
        assert_eq!(quads[2].half_width(), 3.0);
    }

    #[test]
    fn test_capacity_exceeded_writes_nothing() {
        let mut lines = line(Vec3::ZERO, Vec3::X, 1.0).to_vec();
        lines.extend(line(Vec3::Y, Vec3::ONE, 1.0));
        let mut arena = QuadArena::new(11);

        let result = expand_lines(&lines, &mut arena, 1.0);
        assert_eq!(
            result.unwrap_err(),
            LineError::CapacityExceeded {
                required: 12,
                capacity: 11
            }
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let mut lines = line(Vec3::ZERO, Vec3::X, 1.0).to_vec();
        lines.extend(line(Vec3::Y, Vec3::ONE, 1.0));
        let mut arena = QuadArena::new(12);

        assert_eq!(expand_lines(&lines, &mut arena, 1.0).unwrap().len(), 12);
        assert_eq!(arena.capacity(), 12);
    }

    #[test]
    fn test_degenerate_segment_skipped() {
        let mut lines = line(Vec3::ONE, Vec3::ONE, 1.0).to_vec();
        lines.extend(line(Vec3::ZERO, Vec3::X, 1.0));
        let mut arena = QuadArena::new(64);

        let quads = expand_lines(&lines, &mut arena, 1.0).unwrap();
        assert_eq!(quads.len(), 6);
        assert!(quads.iter().all(|v| v.position().is_finite()));
    }

    #[test]
    fn test_arena_reused_between_frames() {
        let lines = line(Vec3::ZERO, Vec3::X, 1.0);
        let mut arena = QuadArena::new(64);

        expand_lines(&lines, &mut arena, 1.0).unwrap();
        expand_lines(&lines, &mut arena, 1.0).unwrap();
        assert_eq!(arena.len(), 6);
    }

    #[test]
    fn test_odd_stream_rejected() {
        let lines = [Vertex::default(); 3];
        let mut arena = QuadArena::new(64);
        assert_eq!(
            expand_lines(&lines, &mut arena, 1.0).unwrap_err(),
            LineError::UnpairedVertex { len: 3 }
        );
    }
}
