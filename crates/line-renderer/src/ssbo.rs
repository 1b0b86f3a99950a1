//! Vertex pulling from a read-only storage buffer

use line_geometry::{FrameUniforms, LineConfig, LineError, Vertex, VERTICES_PER_SEGMENT};

use crate::device::{check_lines, LineDevice, Strategy};
use crate::pipeline::{check_buffer_size, create_frame_buffer, storage_entry, uniform_entry, LinePipeline};
use crate::shaders;

pub struct SsboDevice {
    render_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl SsboDevice {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &LineConfig) -> Result<Self, LineError> {
        let size = config.buffer_size(1, std::mem::size_of::<Vertex>())?;
        check_buffer_size(&device.limits(), "SSBO line buffer", size, true)?;

        let frame_buffer = create_frame_buffer(device, "SSBO Frame Buffer");
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SSBO Line Buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSBO Bind Group Layout"),
            entries: &[
                // Frame uniforms - Binding 0
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                // Lines (Storage) - Binding 1
                storage_entry(1, wgpu::ShaderStages::VERTEX, true),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSBO Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: line_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = shaders::create_module(device, "SSBO Lines Shader", shaders::ssbo_source());
        let render_pipeline = LinePipeline {
            label: "SSBO Lines Pipeline",
            shader: &shader,
            bind_group_layout: &bind_group_layout,
            vs_entry: "vs_ssbo",
            fs_entry: "fs_aa",
            buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            format,
        }
        .create(device);

        log::info!("✓ SSBO lines device initialized ({} vertices)", config.max_vertices);

        Ok(Self {
            render_pipeline,
            frame_buffer,
            line_buffer,
            bind_group,
            capacity: config.max_vertices,
        })
    }
}

impl LineDevice for SsboDevice {
    fn strategy(&self) -> Strategy {
        Strategy::Ssbo
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
        let segments = count / 2;
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..segments * VERTICES_PER_SEGMENT, 0..1);
    }
}
