//! Strategy selection and the interface every backend implements

use line_geometry::{FrameUniforms, LineError, Vertex};

/// The six ways of turning line segments into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Native line primitives, one pixel wide
    GlLines,
    /// Quads expanded on the host, no antialiasing
    CpuLines,
    /// Quads expanded per segment in a compute pre-pass
    GeometryStage,
    /// Vertex pulling from a float texture
    TexBuffer,
    /// Vertex pulling from a storage buffer
    Ssbo,
    /// One template quad instanced per segment
    Instancing,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::GlLines,
        Strategy::CpuLines,
        Strategy::GeometryStage,
        Strategy::TexBuffer,
        Strategy::Ssbo,
        Strategy::Instancing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::GlLines => "GL Lines",
            Strategy::CpuLines => "CPU Lines",
            Strategy::GeometryStage => "Geometry Stage Lines",
            Strategy::TexBuffer => "Tex. Buffer Lines",
            Strategy::Ssbo => "SSBO Lines",
            Strategy::Instancing => "Instancing Lines",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Strategy::GlLines => 0,
            Strategy::CpuLines => 1,
            Strategy::GeometryStage => 2,
            Strategy::TexBuffer => 3,
            Strategy::Ssbo => 4,
            Strategy::Instancing => 5,
        }
    }

    /// Number keys 1-6 map onto `ALL` in order.
    pub fn from_digit(digit: u32) -> Option<Strategy> {
        let index = digit.checked_sub(1)? as usize;
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Strategy {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A line drawing backend.
///
/// Stateless per draw: `update` overwrites the device's buffers wholesale and
/// returns the count `render` should draw with. GPU resources are released
/// when the device is dropped.
pub trait LineDevice {
    fn strategy(&self) -> Strategy;

    /// Upload `lines` (vertex pairs) and the frame uniforms.
    fn update(
        &mut self,
        queue: &wgpu::Queue,
        lines: &[Vertex],
        frame: &FrameUniforms,
    ) -> Result<u32, LineError>;

    /// Encode work that has to finish before the render pass begins.
    ///
    /// Returns whether a pass was encoded, and with it `timestamp_writes`.
    fn prepare(
        &self,
        _encoder: &mut wgpu::CommandEncoder,
        _count: u32,
        _timestamp_writes: Option<wgpu::ComputePassTimestampWrites<'_>>,
    ) -> bool {
        false
    }

    fn render(&self, render_pass: &mut wgpu::RenderPass<'_>, count: u32);
}

/// Reject streams the devices cannot hold before anything is written.
pub(crate) fn check_lines(lines: &[Vertex], capacity: usize) -> Result<(), LineError> {
    if lines.len() % 2 != 0 {
        return Err(LineError::UnpairedVertex { len: lines.len() });
    }
    if lines.len() > capacity {
        return Err(LineError::CapacityExceeded {
            required: lines.len(),
            capacity,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_select_strategies() {
        assert_eq!(Strategy::from_digit(1), Some(Strategy::GlLines));
        assert_eq!(Strategy::from_digit(6), Some(Strategy::Instancing));
        assert_eq!(Strategy::from_digit(0), None);
        assert_eq!(Strategy::from_digit(7), None);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, strategy) in Strategy::ALL.iter().enumerate() {
            assert_eq!(strategy.index(), i);
        }
    }

    #[test]
    fn test_next_cycles() {
        let mut strategy = Strategy::GlLines;
        for _ in 0..Strategy::ALL.len() {
            strategy = strategy.next();
        }
        assert_eq!(strategy, Strategy::GlLines);
        assert_eq!(Strategy::Instancing.next(), Strategy::GlLines);
    }

    #[test]
    fn test_check_lines() {
        let lines = [Vertex::default(); 4];
        assert!(check_lines(&lines, 4).is_ok());
        assert_eq!(
            check_lines(&lines, 2),
            Err(LineError::CapacityExceeded {
                required: 4,
                capacity: 2
            })
        );
        assert_eq!(
            check_lines(&lines[..3], 4),
            Err(LineError::UnpairedVertex { len: 3 })
        );
    }
}
