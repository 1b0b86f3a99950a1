//! GPU time spent on a frame's line passes, measured with timestamp queries
//!
//! Query 0 is written at the start of the first pass the frame encodes (the
//! compute pre-pass when the active device has one, the render pass
//! otherwise) and query 1 at the end of the render pass.

const QUERY_COUNT: u32 = 2;
const RESOLVE_SIZE: u64 = QUERY_COUNT as u64 * std::mem::size_of::<u64>() as u64;

pub struct GpuTimer {
    query_set: wgpu::QuerySet,
    resolve_buffer: wgpu::Buffer,
    readback_buffer: wgpu::Buffer,
}

impl GpuTimer {
    /// `None` when the device was created without `Features::TIMESTAMP_QUERY`.
    pub fn new(device: &wgpu::Device) -> Option<Self> {
        if !device.features().contains(wgpu::Features::TIMESTAMP_QUERY) {
            log::info!("Timestamp queries unavailable, GPU time will not be reported");
            return None;
        }

        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("Line Timestamp Queries"),
            ty: wgpu::QueryType::Timestamp,
            count: QUERY_COUNT,
        });
        let resolve_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Timestamp Resolve Buffer"),
            size: RESOLVE_SIZE,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Timestamp Readback Buffer"),
            size: RESOLVE_SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Some(Self {
            query_set,
            resolve_buffer,
            readback_buffer,
        })
    }

    pub(crate) fn compute_writes(&self) -> wgpu::ComputePassTimestampWrites<'_> {
        wgpu::ComputePassTimestampWrites {
            query_set: &self.query_set,
            beginning_of_pass_write_index: Some(0),
            end_of_pass_write_index: None,
        }
    }

    /// The render pass always closes the span and opens it when no pre-pass did.
    pub(crate) fn render_writes(&self, opens_span: bool) -> wgpu::RenderPassTimestampWrites<'_> {
        wgpu::RenderPassTimestampWrites {
            query_set: &self.query_set,
            beginning_of_pass_write_index: opens_span.then_some(0),
            end_of_pass_write_index: Some(1),
        }
    }

    pub(crate) fn resolve(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.resolve_query_set(&self.query_set, 0..QUERY_COUNT, &self.resolve_buffer, 0);
        encoder.copy_buffer_to_buffer(&self.resolve_buffer, 0, &self.readback_buffer, 0, RESOLVE_SIZE);
    }

    /// Wait for the submitted frame and return its GPU time in milliseconds.
    pub(crate) fn read(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Option<f32> {
        let slice = self.readback_buffer.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        // TODO: read back a frame late through a small ring of buffers instead of stalling
        if let Err(err) = device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        }) {
            log::warn!("Timestamp readback failed: {err}");
            return None;
        }

        let elapsed = {
            let data = slice.get_mapped_range();
            let timestamps: &[u64] = bytemuck::cast_slice(&data);
            elapsed_ms(timestamps[0], timestamps[1], queue.get_timestamp_period())
        };
        self.readback_buffer.unmap();
        elapsed
    }
}

/// Milliseconds between two raw timestamps. `None` if the counter went backwards.
pub fn elapsed_ms(begin: u64, end: u64, period_ns: f32) -> Option<f32> {
    let ticks = end.checked_sub(begin)?;
    Some((ticks as f64 * f64::from(period_ns) / 1_000_000.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_ms() {
        assert_eq!(elapsed_ms(1_000, 3_000_000, 1.0), Some(2.999));
        assert_eq!(elapsed_ms(0, 1_000_000, 2.5), Some(2.5));
        assert_eq!(elapsed_ms(10, 10, 1.0), Some(0.0));
    }

    #[test]
    fn test_counter_going_backwards_is_discarded() {
        assert_eq!(elapsed_ms(10, 5, 1.0), None);
    }
}
