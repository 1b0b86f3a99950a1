//! Construction-time configuration for line devices

use crate::error::{LineError, Result};
use crate::vertex::Vertex;

/// Default vertex ceiling per upload. Keeps the largest storage binding
/// (the geometry stage's expanded buffer, 3 x 48 bytes per line vertex)
/// below wgpu's default 128 MiB limit.
pub const DEFAULT_MAX_VERTICES: usize = 1 << 19;

/// Default conversion from stored half width to model units on the CPU path.
pub const DEFAULT_WIDTH_SCALE: f32 = 0.01;

pub const DEFAULT_AA_RADIUS: [f32; 2] = [2.0, 2.0];

pub const DEFAULT_TEXELS_PER_ROW: u32 = 4096;

const MAX_VERTICES_ENV: &str = "GPU_LINES_MAX_VERTICES";
const AA_RADIUS_ENV: &str = "GPU_LINES_AA_RADIUS";

#[derive(Clone, Debug, PartialEq)]
pub struct LineConfig {
    /// Hard ceiling on line vertices per update. Buffers never grow past it.
    pub max_vertices: usize,
    /// Multiplier applied to each endpoint's half width by the CPU expander
    pub width_scale: f32,
    /// x: feather radius across the line, y: extension along it, in viewport units (two per pixel)
    pub aa_radius: [f32; 2],
    /// Row width of the texture-backed vertex store
    pub texels_per_row: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_vertices: DEFAULT_MAX_VERTICES,
            width_scale: DEFAULT_WIDTH_SCALE,
            aa_radius: DEFAULT_AA_RADIUS,
            texels_per_row: DEFAULT_TEXELS_PER_ROW,
        }
    }
}

impl LineConfig {
    /// Default configuration with `GPU_LINES_MAX_VERTICES` and
    /// `GPU_LINES_AA_RADIUS` (`"x,y"`) applied when present and well formed.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_VERTICES_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(value) => config.max_vertices = value,
                Err(_) => log::warn!("Ignoring {}={:?}: not an integer", MAX_VERTICES_ENV, raw),
            }
        }

        if let Some(raw) = lookup(AA_RADIUS_ENV) {
            match parse_pair(&raw) {
                Some(pair) => config.aa_radius = pair,
                None => log::warn!("Ignoring {}={:?}: expected \"x,y\"", AA_RADIUS_ENV, raw),
            }
        }

        config
    }

    /// `per_vertex` slots for every line vertex the config admits.
    pub fn scaled_capacity(&self, per_vertex: usize) -> Result<usize> {
        self.max_vertices.checked_mul(per_vertex).ok_or_else(|| {
            LineError::InvalidConfig(format!(
                "max_vertices {} x {per_vertex} overflows",
                self.max_vertices
            ))
        })
    }

    /// Number of expanded vertices the CPU arena must hold (6 per segment).
    pub fn quad_capacity(&self) -> Result<usize> {
        self.scaled_capacity(3)
    }

    /// Bytes for `per_vertex` records of `record_size` bytes per line vertex.
    pub fn buffer_size(&self, per_vertex: usize, record_size: usize) -> Result<u64> {
        let bytes = self.scaled_capacity(per_vertex)?.checked_mul(record_size).ok_or_else(|| {
            LineError::InvalidConfig(format!(
                "max_vertices {} needs more than {} bytes",
                self.max_vertices,
                usize::MAX
            ))
        })?;
        Ok(bytes as u64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_vertices < 2 {
            return Err(LineError::InvalidConfig(format!(
                "max_vertices must hold at least one segment, got {}",
                self.max_vertices
            )));
        }
        if !(self.width_scale.is_finite() && self.width_scale > 0.0) {
            return Err(LineError::InvalidConfig(format!(
                "width_scale must be positive, got {}",
                self.width_scale
            )));
        }
        // Both radii feed smoothstep lower edges; zero would collapse the edge interval
        if !self.aa_radius.iter().all(|r| r.is_finite() && *r > 0.0) {
            return Err(LineError::InvalidConfig(format!(
                "aa_radius components must be positive, got {:?}",
                self.aa_radius
            )));
        }
        // The host quad arena is the largest allocation sized from max_vertices
        self.buffer_size(3, std::mem::size_of::<Vertex>())?;
        if self.texels_per_row == 0 {
            return Err(LineError::InvalidConfig(
                "texels_per_row must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_pair(raw: &str) -> Option<[f32; 2]> {
    let (x, y) = raw.split_once(',')?;
    Some([x.trim().parse().ok()?, y.trim().parse().ok()?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LineConfig::default().validate().is_ok());
        assert_eq!(LineConfig::default().quad_capacity(), Ok(DEFAULT_MAX_VERTICES * 3));
        assert_eq!(
            LineConfig::default().buffer_size(1, std::mem::size_of::<Vertex>()),
            Ok(DEFAULT_MAX_VERTICES as u64 * 32)
        );
    }

    #[test]
    fn test_rejects_overflowing_capacity() {
        let config = LineConfig::from_lookup(|key| match key {
            MAX_VERTICES_ENV => Some(usize::MAX.to_string()),
            _ => None,
        });
        assert_eq!(config.max_vertices, usize::MAX);
        assert!(matches!(config.validate(), Err(LineError::InvalidConfig(_))));
        assert!(config.quad_capacity().is_err());
        assert!(config.buffer_size(1, 32).is_err());

        // Fits the quad count but not the byte size
        let config = LineConfig {
            max_vertices: usize::MAX / 3,
            ..Default::default()
        };
        assert!(config.quad_capacity().is_ok());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_aa_radius() {
        let config = LineConfig {
            aa_radius: [0.0, 2.0],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LineError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_tiny_capacity() {
        let config = LineConfig {
            max_vertices: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = LineConfig::from_lookup(|key| match key {
            MAX_VERTICES_ENV => Some("1024".to_string()),
            AA_RADIUS_ENV => Some(" 1.5, 3 ".to_string()),
            _ => None,
        });
        assert_eq!(config.max_vertices, 1024);
        assert_eq!(config.aa_radius, [1.5, 3.0]);
    }

    #[test]
    fn test_malformed_env_is_ignored() {
        let config = LineConfig::from_lookup(|key| match key {
            MAX_VERTICES_ENV => Some("lots".to_string()),
            AA_RADIUS_ENV => Some("2".to_string()),
            _ => None,
        });
        assert_eq!(config, LineConfig::default());
    }
}
