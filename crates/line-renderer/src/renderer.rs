//! Line rendering engine: one device per strategy, one active at a time

use line_geometry::{FrameUniforms, LineConfig, LineError, Vertex};

use crate::cpu_lines::CpuLinesDevice;
use crate::device::{LineDevice, Strategy};
use crate::geometry_stage::GeometryStageDevice;
use crate::gl_lines::GlLinesDevice;
use crate::gpu_timer::GpuTimer;
use crate::instancing::InstancingDevice;
use crate::ssbo::SsboDevice;
use crate::tex_buffer::TexBufferDevice;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::WHITE;

pub struct LineRenderer {
    devices: Vec<Box<dyn LineDevice>>,
    active: Strategy,
    count: u32,
    timer: Option<GpuTimer>,
}

impl LineRenderer {
    /// Build every backend up front so switching strategies never allocates.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, config: &LineConfig) -> Result<Self, LineError> {
        config.validate()?;

        let mut devices: Vec<Box<dyn LineDevice>> = Vec::with_capacity(Strategy::ALL.len());
        for strategy in Strategy::ALL {
            let line_device: Box<dyn LineDevice> = match strategy {
                Strategy::GlLines => Box::new(GlLinesDevice::new(device, format, config)?),
                Strategy::CpuLines => Box::new(CpuLinesDevice::new(device, format, config)?),
                Strategy::GeometryStage => Box::new(GeometryStageDevice::new(device, format, config)?),
                Strategy::TexBuffer => Box::new(TexBufferDevice::new(device, format, config)?),
                Strategy::Ssbo => Box::new(SsboDevice::new(device, format, config)?),
                Strategy::Instancing => Box::new(InstancingDevice::new(device, format, config)?),
            };
            debug_assert_eq!(line_device.strategy(), strategy);
            devices.push(line_device);
        }

        log::info!("✓ Line renderer initialized with {} strategies", devices.len());

        Ok(Self {
            devices,
            active: Strategy::GlLines,
            count: 0,
            timer: GpuTimer::new(device),
        })
    }

    pub fn strategy(&self) -> Strategy {
        self.active
    }

    /// Switch backends. The next frame must call `update` before drawing anything.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        if strategy != self.active {
            log::info!("Switched to {}", strategy.name());
            self.active = strategy;
            self.count = 0;
        }
    }

    /// Upload this frame's lines to the active backend.
    ///
    /// On error nothing is drawn until the next successful update.
    pub fn update(&mut self, queue: &wgpu::Queue, lines: &[Vertex], frame: &FrameUniforms) -> Result<u32, LineError> {
        self.count = 0;
        let count = self.devices[self.active.index()].update(queue, lines, frame)?;
        log::debug!("{}: {} lines -> draw count {}", self.active.name(), lines.len(), count);
        self.count = count;
        Ok(count)
    }

    /// Draw the last update into `view`. Returns the GPU milliseconds spent on
    /// the frame's passes when timestamp queries are available.
    pub fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView) -> Option<f32> {
        let line_device = &self.devices[self.active.index()];
        let timer = self.timer.as_ref();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Line Render Encoder"),
        });

        let prepared = line_device.prepare(&mut encoder, self.count, timer.map(GpuTimer::compute_writes));

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Line Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: timer.map(|timer| timer.render_writes(!prepared)),
                occlusion_query_set: None,
            });

            line_device.render(&mut render_pass, self.count);
        }

        if let Some(timer) = timer {
            timer.resolve(&mut encoder);
        }
        queue.submit(std::iter::once(encoder.finish()));

        timer.and_then(|timer| timer.read(device, queue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec2, Vec3, Vec4};
    use line_geometry::coverage;

    const SIZE: u32 = 64;
    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    fn create_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = match pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())) {
            Ok(adapter) => adapter,
            Err(err) => {
                eprintln!("skipping render test, no adapter: {err}");
                return None;
            }
        };
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Test Device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        }))
        .unwrap();
        Some((device, queue))
    }

    /// Red channel inverted: black ink blended over the white clear.
    fn render_ink(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        renderer: &mut LineRenderer,
        strategy: Strategy,
        lines: &[Vertex],
        frame: &FrameUniforms,
    ) -> Vec<u8> {
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Test Target"),
            size: wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());

        renderer.set_strategy(strategy);
        renderer.update(queue, lines, frame).unwrap();
        renderer.render(device, queue, &view);

        // 64 RGBA8 texels is exactly the 256-byte row alignment
        let bytes_per_row = SIZE * 4;
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Test Staging Buffer"),
            size: u64::from(bytes_per_row * SIZE),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(SIZE),
                },
            },
            wgpu::Extent3d {
                width: SIZE,
                height: SIZE,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .unwrap();
        let ink = slice.get_mapped_range().chunks_exact(4).map(|texel| 255 - texel[0]).collect();
        staging.unmap();
        ink
    }

    fn pixel(ink: &[u8], x: u32, y: u32) -> u8 {
        ink[(y * SIZE + x) as usize]
    }

    #[test]
    fn test_strategies_render_alike() {
        let Some((device, queue)) = create_device() else {
            return;
        };
        let config = LineConfig {
            max_vertices: 64,
            ..Default::default()
        };
        let mut renderer = LineRenderer::new(&device, TARGET_FORMAT, &config).unwrap();

        // Horizontal segment across the middle half of the target, 2 px half width
        let black = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let lines = [
            Vertex::new(Vec3::new(-0.5, 0.0, 0.0), 4.0, black),
            Vertex::new(Vec3::new(0.5, 0.0, 0.0), 4.0, black),
        ];
        let aa_radius = Vec2::new(2.0, 2.0);
        let frame = FrameUniforms::new(Mat4::IDENTITY, Vec2::splat(SIZE as f32), aa_radius);

        let mut images = Vec::new();
        for strategy in Strategy::ALL {
            images.push((strategy, render_ink(&device, &queue, &mut renderer, strategy, &lines, &frame)));
        }

        let cpu = &images[Strategy::CpuLines.index()].1;
        assert!(cpu.iter().any(|&ink| ink > 0), "CPU lines drew nothing");

        let reference = &images[Strategy::GeometryStage.index()].1;
        for (strategy, ink) in &images[Strategy::TexBuffer.index()..] {
            let max_diff = reference
                .iter()
                .zip(ink)
                .map(|(a, b)| a.abs_diff(*b))
                .max()
                .unwrap_or(0);
            assert!(max_diff <= 1, "{strategy} differs from the geometry stage by {max_diff}");
        }

        // Row `SIZE / 2 + k` has its center k + 0.5 px below the line, 2k + 1 viewport units
        let line_width = 4.0 + aa_radius.x;
        let line_length = 0.5 * (SIZE as f32 + 2.0 * aa_radius.y);
        for (row, u) in [(32, 1.0), (34, 5.0), (36, 9.0)] {
            let expected = coverage(Vec4::new(u, 1.0, line_width, line_length), aa_radius) * 255.0;
            let actual = f32::from(pixel(reference, SIZE / 2, row));
            assert!((actual - expected).abs() <= 2.0, "row {row}: {actual} vs {expected}");
        }
        assert_eq!(pixel(reference, SIZE / 2, 32), 255);
        assert_eq!(pixel(reference, SIZE / 2, 36), 0);
        // Past the extended end of the segment
        assert_eq!(pixel(reference, 4, SIZE / 2), 0);
    }
}
