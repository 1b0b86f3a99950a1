//! # Line Renderer
//!
//! wgpu backends that draw the same wide, antialiased line segments six
//! different ways, selectable at runtime through [`Strategy`].

pub mod camera;
pub mod cpu_lines;
pub mod device;
pub mod geometry_stage;
pub mod gl_lines;
pub mod gpu_timer;
pub mod instancing;
mod layouts;
mod pipeline;
pub mod renderer;
pub mod shaders;
pub mod ssbo;
pub mod tex_buffer;

pub use camera::*;
pub use device::*;
pub use renderer::*;
