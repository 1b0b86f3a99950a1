//! Quads expanded on the host every frame and uploaded as a triangle list

use line_geometry::{expand_lines, FrameUniforms, LineConfig, LineError, QuadArena, Vertex};

use crate::device::{LineDevice, Strategy};
use crate::layouts::line_vertex_layout;
use crate::pipeline::{check_buffer_size, create_frame_bind_group, create_frame_buffer, LinePipeline};
use crate::shaders;

pub struct CpuLinesDevice {
    render_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    quad_buffer: wgpu::Buffer,
    arena: QuadArena,
    width_scale: f32,
}

impl CpuLinesDevice {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &LineConfig) -> Result<Self, LineError> {
        let capacity = config.quad_capacity()?;
        let size = config.buffer_size(3, std::mem::size_of::<Vertex>())?;
        check_buffer_size(&device.limits(), "CPU lines quad buffer", size, false)?;

        let frame_buffer = create_frame_buffer(device, "CPU Lines Frame Buffer");
        let quad_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("CPU Lines Quad Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (bind_group_layout, bind_group) =
            create_frame_bind_group(device, "CPU Lines Bind Group", &frame_buffer);
        let shader = shaders::create_module(device, "CPU Lines Shader", shaders::plain_source());

        let render_pipeline = LinePipeline {
            label: "CPU Lines Pipeline",
            shader: &shader,
            bind_group_layout: &bind_group_layout,
            vs_entry: "vs_plain",
            fs_entry: "fs_plain",
            buffers: &[line_vertex_layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            format,
        }
        .create(device);

        log::info!("✓ CPU lines device initialized ({} quad vertices)", capacity);

        Ok(Self {
            render_pipeline,
            frame_buffer,
            bind_group,
            quad_buffer,
            arena: QuadArena::new(capacity),
            width_scale: config.width_scale,
        })
    }
}

impl LineDevice for CpuLinesDevice {
    fn strategy(&self) -> Strategy {
        Strategy::CpuLines
    }

    fn update(&mut self, queue: &wgpu::Queue, lines: &[Vertex], frame: &FrameUniforms) -> Result<u32, LineError> {
        let quads = expand_lines(lines, &mut self.arena, self.width_scale)?;

        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
        if !quads.is_empty() {
            queue.write_buffer(&self.quad_buffer, 0, bytemuck::cast_slice(quads));
        }
        log::trace!("Expanded {} lines into {} quad vertices", lines.len(), quads.len());
        Ok(quads.len() as u32)
    }

    fn render(&self, render_pass: &mut wgpu::RenderPass<'_>, count: u32) {
        if count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        render_pass.draw(0..count, 0..1);
    }
}
