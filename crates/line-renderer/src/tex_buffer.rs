//! Vertex pulling from a float texture
//!
//! Each vertex occupies two `Rgba32Float` texels (`pos_width`, then `color`)
//! laid out row-major. The shader recovers the row width from
//! `textureDimensions`, so only the texture's shape needs to agree with the
//! upload below.

use line_geometry::{FrameUniforms, LineConfig, LineError, Vertex, VERTICES_PER_SEGMENT};

use crate::device::{check_lines, LineDevice, Strategy};
use crate::pipeline::{create_frame_buffer, uniform_entry, LinePipeline};
use crate::shaders;

const TEXELS_PER_VERTEX: usize = 2;
const TEXEL_SIZE: u32 = std::mem::size_of::<[f32; 4]>() as u32;

/// Rows needed to hold `texel_count` texels at `row_width` per row.
pub fn texture_rows(texel_count: usize, row_width: u32) -> usize {
    texel_count.div_ceil(row_width as usize)
}

/// Split an upload into whole rows and the texels left over for a final partial row.
pub fn split_rows(texel_count: usize, row_width: u32) -> (u32, u32) {
    let row_width = row_width as usize;
    ((texel_count / row_width) as u32, (texel_count % row_width) as u32)
}

pub struct TexBufferDevice {
    render_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    line_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    row_width: u32,
    capacity: usize,
}

impl TexBufferDevice {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &LineConfig) -> Result<Self, LineError> {
        let max_dimension = device.limits().max_texture_dimension_2d;
        let row_width = config.texels_per_row;
        let rows = texture_rows(config.scaled_capacity(TEXELS_PER_VERTEX)?, row_width);
        if row_width > max_dimension || rows > max_dimension as usize {
            return Err(LineError::InvalidConfig(format!(
                "line texture of {row_width}x{rows} texels exceeds the device limit of {max_dimension}"
            )));
        }
        let rows = rows as u32;

        let frame_buffer = create_frame_buffer(device, "Tex Buffer Frame Buffer");
        let line_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Line Texture"),
            size: wgpu::Extent3d {
                width: row_width,
                height: rows,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let line_view = line_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Tex Buffer Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                // Rgba32Float is not filterable; the shader only uses textureLoad
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Tex Buffer Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&line_view),
                },
            ],
        });

        let shader = shaders::create_module(device, "Tex Buffer Lines Shader", shaders::tex_buffer_source());
        let render_pipeline = LinePipeline {
            label: "Tex Buffer Lines Pipeline",
            shader: &shader,
            bind_group_layout: &bind_group_layout,
            vs_entry: "vs_tex_buffer",
            fs_entry: "fs_aa",
            buffers: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            format,
        }
        .create(device);

        log::info!(
            "✓ Tex buffer lines device initialized ({}x{} texels)",
            row_width,
            rows
        );

        Ok(Self {
            render_pipeline,
            frame_buffer,
            line_texture,
            bind_group,
            row_width,
            capacity: config.max_vertices,
        })
    }

    fn write_texels(&self, queue: &wgpu::Queue, texels: &[[f32; 4]], origin_y: u32, width: u32, height: u32) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.line_texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: origin_y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * TEXEL_SIZE),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

impl LineDevice for TexBufferDevice {
    fn strategy(&self) -> Strategy {
        Strategy::TexBuffer
    }

    fn update(&mut self, queue: &wgpu::Queue, lines: &[Vertex], frame: &FrameUniforms) -> Result<u32, LineError> {
        check_lines(lines, self.capacity)?;

        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));

        let texels: &[[f32; 4]] = bytemuck::cast_slice(lines);
        let (full_rows, remainder) = split_rows(texels.len(), self.row_width);
        let full_len = (full_rows * self.row_width) as usize;
        if full_rows > 0 {
            self.write_texels(queue, &texels[..full_len], 0, self.row_width, full_rows);
        }
        if remainder > 0 {
            self.write_texels(queue, &texels[full_len..], full_rows, remainder, 1);
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
