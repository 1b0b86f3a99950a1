//! One indexed template quad drawn per segment

use line_geometry::{FrameUniforms, LineConfig, LineError, Vertex, TEMPLATE_INDICES, TEMPLATE_QUAD};
use wgpu::util::DeviceExt;

use crate::device::{check_lines, LineDevice, Strategy};
use crate::layouts::{segment_instance_layout, template_quad_layout};
use crate::pipeline::{check_buffer_size, create_frame_bind_group, create_frame_buffer, LinePipeline};
use crate::shaders;

pub struct InstancingDevice {
    render_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    quad_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    capacity: usize,
}

impl InstancingDevice {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &LineConfig) -> Result<Self, LineError> {
        let size = config.buffer_size(1, std::mem::size_of::<Vertex>())?;
        check_buffer_size(&device.limits(), "Instancing line buffer", size, false)?;

        let frame_buffer = create_frame_buffer(device, "Instancing Frame Buffer");
        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Template Quad Buffer"),
            contents: bytemuck::cast_slice(&TEMPLATE_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Template Quad Index Buffer"),
            contents: bytemuck::cast_slice(&TEMPLATE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instancing Line Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (bind_group_layout, bind_group) =
            create_frame_bind_group(device, "Instancing Bind Group", &frame_buffer);
        let shader = shaders::create_module(device, "Instancing Lines Shader", shaders::instancing_source());

        let render_pipeline = LinePipeline {
            label: "Instancing Lines Pipeline",
            shader: &shader,
            bind_group_layout: &bind_group_layout,
            vs_entry: "vs_instancing",
            fs_entry: "fs_aa",
            buffers: &[template_quad_layout(), segment_instance_layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            format,
        }
        .create(device);

        log::info!("✓ Instancing lines device initialized ({} vertices)", config.max_vertices);

        Ok(Self {
            render_pipeline,
            frame_buffer,
            bind_group,
            quad_buffer,
            index_buffer,
            line_buffer,
            capacity: config.max_vertices,
        })
    }
}

impl LineDevice for InstancingDevice {
    fn strategy(&self) -> Strategy {
        Strategy::Instancing
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
        let segments = count / 2;
        if segments == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.line_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..TEMPLATE_INDICES.len() as u32, 0, 0..segments);
    }
}
