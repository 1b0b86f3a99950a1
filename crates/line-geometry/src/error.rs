//! Error type shared by the expander and every device backend

use thiserror::Error;

/// Errors produced while preparing line geometry for a draw.
///
/// None of these are fatal: the caller logs, skips the frame's draw and may
/// retry with less data next frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LineError {
    /// The destination buffer cannot hold the requested geometry.
    #[error("Not enough space to generate quads from lines: need {required} vertices, capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    /// Segments are consumed two vertices at a time.
    #[error("Line vertex stream has odd length {len}; segments need vertex pairs")]
    UnpairedVertex { len: usize },

    /// A configuration value is out of range.
    #[error("Invalid line configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = LineError> = std::result::Result<T, E>;
