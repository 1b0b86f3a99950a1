//! # Line Geometry
//!
//! Host-side model for wide, antialiased line segments: the vertex record
//! every strategy consumes, the per-draw frame uniforms, the CPU quad
//! expander, and the screen-space AA quad routine the GPU shaders mirror.

pub mod aa_quad;
pub mod config;
pub mod corners;
pub mod cpu_expand;
pub mod error;
pub mod frame;
pub mod vertex;

pub use aa_quad::*;
pub use config::*;
pub use corners::*;
pub use cpu_expand::*;
pub use error::*;
pub use frame::*;
pub use vertex::*;
