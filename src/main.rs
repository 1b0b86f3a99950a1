//! GPU Lines
//!
//! Draws the same set of wide, antialiased line segments with six different
//! strategies and reports how long each one takes.

mod scene;
mod timers;

use glam::Vec2;
use line_geometry::{LineConfig, Vertex};
use line_renderer::{Camera, LineRenderer, Strategy};
use std::sync::Arc;
use std::time::Instant;
use timers::{FrameTimers, FrameTimings};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

type BoxError = Box<dyn std::error::Error>;

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    renderer: LineRenderer,
    camera: Camera,
    aa_radius: Vec2,

    lines: Vec<Vertex>,
    timers: FrameTimers,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>, line_config: &LineConfig) -> Result<Self, BoxError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        // GPU time is reported only where timestamp queries are supported
        let required_features = adapter.features() & wgpu::Features::TIMESTAMP_QUERY;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let aa_radius = Vec2::from(line_config.aa_radius);
        let renderer = LineRenderer::new(&device, surface_format, line_config)?;
        let camera = Camera::new(config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            camera,
            aa_radius,
            lines: Vec::new(),
            timers: FrameTimers::default(),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    /// Returns averaged timings once every few frames.
    fn render(&mut self) -> Result<Option<FrameTimings>, wgpu::SurfaceError> {
        let now = Instant::now();
        let frame_ms = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let t0 = Instant::now();
        scene::generate_line_data(&mut self.lines);
        let scene_ms = t0.elapsed().as_secs_f32() * 1000.0;

        let t1 = Instant::now();
        let frame = self.camera.to_frame_uniforms(self.aa_radius);
        if let Err(err) = self.renderer.update(&self.queue, &self.lines, &frame) {
            log::error!("{}: {err}", self.renderer.strategy().name());
        }
        let gpu_ms = self.renderer.render(&self.device, &self.queue, &view);
        let update_ms = t1.elapsed().as_secs_f32() * 1000.0;

        output.present();

        Ok(self.timers.record(FrameTimings {
            scene_ms,
            update_ms,
            gpu_ms,
            frame_ms,
        }))
    }
}

fn digit_key(key_code: KeyCode) -> Option<u32> {
    match key_code {
        KeyCode::Digit1 => Some(1),
        KeyCode::Digit2 => Some(2),
        KeyCode::Digit3 => Some(3),
        KeyCode::Digit4 => Some(4),
        KeyCode::Digit5 => Some(5),
        KeyCode::Digit6 => Some(6),
        _ => None,
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    line_config: LineConfig,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("GPU Lines")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone(), &self.line_config)) {
            Ok(gpu_state) => {
                self.window = Some(window);
                self.gpu_state = Some(gpu_state);
            }
            Err(err) => {
                log::error!("Failed to initialize GPU: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let Some(gpu_state) = &mut self.gpu_state else {
                    return;
                };
                let current = gpu_state.renderer.strategy();
                let selected = match key_code {
                    KeyCode::Tab => Some(current.next()),
                    _ => digit_key(key_code).and_then(Strategy::from_digit),
                };
                if let Some(strategy) = selected {
                    gpu_state.renderer.set_strategy(strategy);
                }
                if key_code == KeyCode::KeyP {
                    gpu_state.camera.projection = gpu_state.camera.projection.toggled();
                    log::info!("Projection: {:?}", gpu_state.camera.projection);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Right {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some(last_pos) = self.last_mouse_pos {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.rotate(-delta_x * 0.005, delta_y * 0.005);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y * 10.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };

                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state
                        .camera
                        .zoom(-scroll * gpu_state.camera.distance / 100.0);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render() {
                        Ok(Some(timings)) => {
                            window.set_title(&timings.title(gpu_state.renderer.strategy()));
                        }
                        Ok(None) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting GPU lines demo...");
    log::info!("Keys: 1-6 select a strategy, Tab cycles, P toggles projection, Esc quits");

    let line_config = LineConfig::from_env();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        line_config,
        mouse_pressed: false,
        last_mouse_pos: None,
    };

    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
    }
}
