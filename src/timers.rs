//! Frame timing, averaged over a fixed window of frames

use line_renderer::Strategy;

pub const AVERAGE_FRAMES: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTimings {
    /// Scene generation, milliseconds
    pub scene_ms: f32,
    /// Upload plus command submission, milliseconds
    pub update_ms: f32,
    /// Pre-pass plus render pass on the GPU, when timestamp queries exist
    pub gpu_ms: Option<f32>,
    /// Whole frame, milliseconds
    pub frame_ms: f32,
}

impl FrameTimings {
    pub fn fps(&self) -> f32 {
        if self.frame_ms > 0.0 {
            1000.0 / self.frame_ms
        } else {
            0.0
        }
    }

    /// Window title; the GPU column is left out when it was never measured.
    pub fn title(&self, strategy: Strategy) -> String {
        match self.gpu_ms {
            Some(gpu_ms) => format!(
                "Method : {} - {:6.4}ms - {:6.4}ms - {:6.4}ms - {:.0} FPS",
                strategy.name(),
                self.scene_ms,
                self.update_ms,
                gpu_ms,
                self.fps()
            ),
            None => format!(
                "Method : {} - {:6.4}ms - {:6.4}ms - {:.0} FPS",
                strategy.name(),
                self.scene_ms,
                self.update_ms,
                self.fps()
            ),
        }
    }
}

#[derive(Default)]
pub struct FrameTimers {
    sum: FrameTimings,
    gpu_sum: f32,
    gpu_frames: u32,
    frames: u32,
}

impl FrameTimers {
    /// Accumulate one frame. Every `AVERAGE_FRAMES` frames the averages are
    /// returned and the accumulators reset.
    pub fn record(&mut self, frame: FrameTimings) -> Option<FrameTimings> {
        self.sum.scene_ms += frame.scene_ms;
        self.sum.update_ms += frame.update_ms;
        self.sum.frame_ms += frame.frame_ms;
        if let Some(gpu_ms) = frame.gpu_ms {
            self.gpu_sum += gpu_ms;
            self.gpu_frames += 1;
        }
        self.frames += 1;

        if self.frames < AVERAGE_FRAMES {
            return None;
        }

        let n = self.frames as f32;
        let average = FrameTimings {
            scene_ms: self.sum.scene_ms / n,
            update_ms: self.sum.update_ms / n,
            gpu_ms: (self.gpu_frames > 0).then(|| self.gpu_sum / self.gpu_frames as f32),
            frame_ms: self.sum.frame_ms / n,
        };
        *self = Self::default();
        Some(average)
    }
}
