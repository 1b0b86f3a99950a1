//! Per-segment expansion in a compute pre-pass
//!
//! WebGPU has no geometry stage. `cs_expand` runs one invocation per segment
//! and writes the six vertices a geometry shader would have emitted into a
//! buffer that the render pass then reads as ordinary vertex input.

use bytemuck::{Pod, Zeroable};
use line_geometry::{FrameUniforms, LineConfig, LineError, Vertex, VERTICES_PER_SEGMENT};

use crate::device::{check_lines, LineDevice, Strategy};
use crate::pipeline::{
    check_buffer_size, create_frame_bind_group, create_frame_buffer, storage_entry, uniform_entry, LinePipeline,
};
use crate::shaders;

pub const WORKGROUP_SIZE: u32 = 64;

/// A fully transformed corner, as written by the compute pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ExpandedVertex {
    pub clip_position: [f32; 4],
    pub color: [f32; 4],
    pub distance: [f32; 4],
}

impl ExpandedVertex {
    pub const fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: &[wgpu::VertexAttribute] = &[
            // clip_position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            },
            // color
            wgpu::VertexAttribute {
                offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
            // distance
            wgpu::VertexAttribute {
                offset: (std::mem::size_of::<[f32; 4]>() * 2) as wgpu::BufferAddress,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x4,
            },
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ExpandedVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ExpandParams {
    pub segment_count: u32,
    pub _padding: [u32; 3],
}

/// Workgroups needed to give every segment its own invocation.
pub fn workgroup_count(segments: u32) -> u32 {
    segments.div_ceil(WORKGROUP_SIZE)
}

pub struct GeometryStageDevice {
    compute_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    expanded_buffer: wgpu::Buffer,
    compute_bind_group: wgpu::BindGroup,
    render_bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl GeometryStageDevice {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &LineConfig) -> Result<Self, LineError> {
        let limits = device.limits();
        let line_size = config.buffer_size(1, std::mem::size_of::<Vertex>())?;
        let expanded_size = config.buffer_size(3, std::mem::size_of::<ExpandedVertex>())?;
        check_buffer_size(&limits, "Geometry stage line buffer", line_size, true)?;
        check_buffer_size(&limits, "Geometry stage expanded buffer", expanded_size, true)?;

        let max_segments = (config.max_vertices / 2) as u64;
        let max_invocations = u64::from(limits.max_compute_workgroups_per_dimension) * u64::from(WORKGROUP_SIZE);
        if max_segments > max_invocations {
            return Err(LineError::InvalidConfig(format!(
                "{max_segments} segments exceed the {max_invocations} compute invocations one dispatch allows"
            )));
        }

        let frame_buffer = create_frame_buffer(device, "Geometry Stage Frame Buffer");
        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Expand Params Buffer"),
            size: std::mem::size_of::<ExpandParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Geometry Stage Line Buffer"),
            size: line_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let expanded_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Expanded Vertex Buffer"),
            size: expanded_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });

        let compute_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Expand Bind Group Layout"),
            entries: &[
                // Frame uniforms - Binding 0
                uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                // Lines (Storage) - Binding 1
                storage_entry(1, wgpu::ShaderStages::COMPUTE, true),
                // Expanded vertices (Storage) - Binding 2
                storage_entry(2, wgpu::ShaderStages::COMPUTE, false),
                // Params (Uniform) - Binding 3
                uniform_entry(3, wgpu::ShaderStages::COMPUTE),
            ],
        });

        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Expand Bind Group"),
            layout: &compute_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: line_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: expanded_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = shaders::create_module(device, "Geometry Stage Shader", shaders::geometry_stage_source());

        let compute_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Expand Pipeline Layout"),
            bind_group_layouts: &[&compute_bind_group_layout],
            push_constant_ranges: &[],
        });

        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Expand Pipeline"),
            layout: Some(&compute_pipeline_layout),
            module: &shader,
            entry_point: Some("cs_expand"),
            compilation_options: Default::default(),
            cache: None,
        });

        let (render_bind_group_layout, render_bind_group) =
            create_frame_bind_group(device, "Geometry Stage Render Bind Group", &frame_buffer);

        let render_pipeline = LinePipeline {
            label: "Geometry Stage Lines Pipeline",
            shader: &shader,
            bind_group_layout: &render_bind_group_layout,
            vs_entry: "vs_expanded",
            fs_entry: "fs_aa",
            buffers: &[ExpandedVertex::desc()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            format,
        }
        .create(device);

        log::info!(
            "✓ Geometry stage lines device initialized ({} segments)",
            max_segments
        );

        Ok(Self {
            compute_pipeline,
            render_pipeline,
            frame_buffer,
            params_buffer,
            line_buffer,
            expanded_buffer,
            compute_bind_group,
            render_bind_group,
            capacity: config.max_vertices,
        })
    }
}

impl LineDevice for GeometryStageDevice {
    fn strategy(&self) -> Strategy {
        Strategy::GeometryStage
    }

    fn update(&mut self, queue: &wgpu::Queue, lines: &[Vertex], frame: &FrameUniforms) -> Result<u32, LineError> {
        check_lines(lines, self.capacity)?;

        let params = ExpandParams {
            segment_count: (lines.len() / 2) as u32,
            _padding: [0; 3],
        };
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(lines));
        }
        Ok(lines.len() as u32)
    }

    fn prepare(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        count: u32,
        timestamp_writes: Option<wgpu::ComputePassTimestampWrites<'_>>,
    ) -> bool {
        let segments = count / 2;
        if segments == 0 {
            return false;
        }
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Expand Pass"),
            timestamp_writes,
        });
        compute_pass.set_pipeline(&self.compute_pipeline);
        compute_pass.set_bind_group(0, &self.compute_bind_group, &[]);
        compute_pass.dispatch_workgroups(workgroup_count(segments), 1, 1);
        true
    }

    fn render(&self, render_pass: &mut wgpu::RenderPass<'_>, count: u32) {
        let vertices = (count / 2) * VERTICES_PER_SEGMENT;
        if vertices == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.render_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.expanded_buffer.slice(..));
        render_pass.draw(0..vertices, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_sizes() {
        // Must match the WGSL structs in geometry_stage.wgsl
        assert_eq!(std::mem::size_of::<ExpandedVertex>(), 48);
        assert_eq!(std::mem::size_of::<ExpandParams>(), 16);
        assert_eq!(ExpandedVertex::desc().array_stride, 48);
    }

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
    }

    #[test]
    fn test_default_capacity_fits_one_dispatch() {
        let config = LineConfig::default();
        let segments = (config.max_vertices / 2) as u32;
        assert!(workgroup_count(segments) <= wgpu::Limits::default().max_compute_workgroups_per_dimension);
    }
}
