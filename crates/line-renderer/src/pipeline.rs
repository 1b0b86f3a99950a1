//! Descriptor boilerplate shared by the backends

use line_geometry::{FrameUniforms, LineError};

pub(crate) fn create_frame_buffer(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<FrameUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub(crate) fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    read_only: bool,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Frame uniforms alone at binding 0, for backends that read lines as vertex input.
///
/// The fragment stage needs them too: coverage is computed from `aa_radius`.
pub(crate) fn create_frame_bind_group(
    device: &wgpu::Device,
    label: &str,
    frame_buffer: &wgpu::Buffer,
) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT)],
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: frame_buffer.as_entire_binding(),
        }],
    });
    (layout, bind_group)
}

pub(crate) struct LinePipeline<'a> {
    pub label: &'a str,
    pub shader: &'a wgpu::ShaderModule,
    pub bind_group_layout: &'a wgpu::BindGroupLayout,
    pub vs_entry: &'a str,
    pub fs_entry: &'a str,
    pub buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub topology: wgpu::PrimitiveTopology,
    pub format: wgpu::TextureFormat,
}

impl LinePipeline<'_> {
    /// Alpha blended, no depth test, both windings drawn.
    pub fn create(&self, device: &wgpu::Device) -> wgpu::RenderPipeline {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(self.label),
            bind_group_layouts: &[self.bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some(self.vs_entry),
                buffers: self.buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some(self.fs_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: self.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

/// Fail construction up front instead of letting wgpu raise a validation error.
pub(crate) fn check_buffer_size(limits: &wgpu::Limits, label: &str, size: u64, storage: bool) -> Result<(), LineError> {
    if size > limits.max_buffer_size {
        return Err(LineError::InvalidConfig(format!(
            "{label} needs {size} bytes, device allows {}",
            limits.max_buffer_size
        )));
    }
    if storage && size > u64::from(limits.max_storage_buffer_binding_size) {
        return Err(LineError::InvalidConfig(format!(
            "{label} needs {size} bytes, storage bindings are limited to {}",
            limits.max_storage_buffer_binding_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_limits() {
        let limits = wgpu::Limits::default();
        let storage_limit = u64::from(limits.max_storage_buffer_binding_size);

        assert!(check_buffer_size(&limits, "lines", storage_limit, true).is_ok());
        assert!(check_buffer_size(&limits, "lines", storage_limit + 1, true).is_err());
        assert!(check_buffer_size(&limits, "lines", storage_limit + 1, false).is_ok());
        assert!(check_buffer_size(&limits, "lines", limits.max_buffer_size + 1, false).is_err());
    }
}
