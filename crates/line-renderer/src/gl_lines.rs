//! Native line primitives, the baseline every other strategy is compared against

use line_geometry::{FrameUniforms, LineConfig, LineError, Vertex};

use crate::device::{check_lines, LineDevice, Strategy};
use crate::layouts::line_vertex_layout;
use crate::pipeline::{check_buffer_size, create_frame_bind_group, create_frame_buffer, LinePipeline};
use crate::shaders;

pub struct GlLinesDevice {
    render_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    line_buffer: wgpu::Buffer,
    capacity: usize,
}

impl GlLinesDevice {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &LineConfig) -> Result<Self, LineError> {
        let size = config.buffer_size(1, std::mem::size_of::<Vertex>())?;
        check_buffer_size(&device.limits(), "GL lines vertex buffer", size, false)?;

        let frame_buffer = create_frame_buffer(device, "GL Lines Frame Buffer");
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("GL Lines Vertex Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (bind_group_layout, bind_group) =
            create_frame_bind_group(device, "GL Lines Bind Group", &frame_buffer);
        let shader = shaders::create_module(device, "GL Lines Shader", shaders::plain_source());

        let render_pipeline = LinePipeline {
            label: "GL Lines Pipeline",
            shader: &shader,
            bind_group_layout: &bind_group_layout,
            vs_entry: "vs_plain",
            fs_entry: "fs_plain",
            buffers: &[line_vertex_layout()],
            topology: wgpu::PrimitiveTopology::LineList,
            format,
        }
        .create(device);

        log::info!("✓ GL lines device initialized ({} vertices)", config.max_vertices);

        Ok(Self {
            render_pipeline,
            frame_buffer,
            bind_group,
            line_buffer,
            capacity: config.max_vertices,
        })
    }
}

impl LineDevice for GlLinesDevice {
    fn strategy(&self) -> Strategy {
        Strategy::GlLines
    }

    fn update(&mut self, queue: &wgpu::Queue, lines: &[Vertex], frame: &FrameUniforms) -> Result<u32, LineError> {
        check_lines(lines, self.capacity)?;

        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(lines));
        }
        Ok(lines.len() as u32)
    }

    fn render(&self, render_pass: &mut wgpu::RenderPass<'_>, count: u32) {
        if count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
        render_pass.draw(0..count, 0..1);
    }
}
