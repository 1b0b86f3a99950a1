//! Demo scene: a row of slanted bars of increasing width next to a spoked ring

use glam::{Vec3, Vec4};
use line_geometry::Vertex;

pub const BAR_COUNT: usize = 16;
pub const SPOKE_COUNT: usize = 32;

const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Refill `lines` with the demo scene. The buffer is reused across frames.
pub fn generate_line_data(lines: &mut Vec<Vertex>) {
    lines.clear();

    // Half widths 0.5, 1.5, 2.5, ... so the first bar is sub-pixel
    for i in 0..BAR_COUNT {
        let x = -7.2 + 0.6 * i as f32;
        let half_width = 0.5 + i as f32;
        lines.push(Vertex::new(Vec3::new(x - 0.4, -2.0, 0.0), half_width, BLACK));
        lines.push(Vertex::new(Vec3::new(x + 0.4, 2.0, 0.0), half_width, BLACK));
    }

    let center = Vec3::new(4.5, 0.0, 0.0);
    let (inner, outer) = (0.4, 2.0);
    let d_theta = std::f32::consts::TAU / SPOKE_COUNT as f32;
    for i in 0..SPOKE_COUNT {
        let (sin, cos) = (i as f32 * d_theta).sin_cos();
        let spoke = Vec3::new(sin, cos, 0.0);
        lines.push(Vertex::new(center + spoke * inner, 1.0, BLACK));
        lines.push(Vertex::new(center + spoke * outer, 1.0, BLACK));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_is_paired() {
        let mut lines = Vec::new();
        generate_line_data(&mut lines);
        assert_eq!(lines.len(), 2 * (BAR_COUNT + SPOKE_COUNT));
        assert!(line_geometry::segments(&lines).is_ok());
    }

    #[test]
    fn test_bar_widths_increase() {
        let mut lines = Vec::new();
        generate_line_data(&mut lines);
        let widths: Vec<f32> = lines[..2 * BAR_COUNT].iter().step_by(2).map(|v| v.half_width()).collect();
        assert_eq!(widths[0], 0.5);
        assert_eq!(widths[BAR_COUNT - 1], 15.5);
        assert!(widths.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_spokes_span_ring() {
        let mut lines = Vec::new();
        generate_line_data(&mut lines);
        let center = Vec3::new(4.5, 0.0, 0.0);
        for pair in lines[2 * BAR_COUNT..].chunks_exact(2) {
            assert!(((pair[0].position() - center).length() - 0.4).abs() < 1e-5);
            assert!(((pair[1].position() - center).length() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_regeneration_replaces_contents() {
        let mut lines = Vec::new();
        generate_line_data(&mut lines);
        generate_line_data(&mut lines);
        assert_eq!(lines.len(), 2 * (BAR_COUNT + SPOKE_COUNT));
    }
}
