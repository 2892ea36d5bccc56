//! Spindrift: a spectral deep-water ocean renderer.
//!
//! The wave field is synthesized in the frequency domain (Phillips
//! spectrum, deep-water dispersion) and brought to world space by a GPU
//! butterfly FFT every frame.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use spindrift::camera::Camera;
use spindrift::cli::Args;
use spindrift::gpu::GpuContext;
use spindrift::ocean::OceanMesh;
use spindrift::params::{Preset, RecordingConfig, RenderConfig, SimulationParams, ViewParams};
use spindrift::rendering::RenderSystem;
use spindrift::simulation::OceanSimulation;

/// Main application state
struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    render_system: Option<RenderSystem>,
    simulation: Option<OceanSimulation>,

    simulation_params: SimulationParams,
    view_params: ViewParams,
    render_config: RenderConfig,
    recording_config: Option<RecordingConfig>,

    /// Mesh geometry inputs the current vertex buffer was built from.
    built_mesh: (u32, f32),

    /// Simulation time (seconds); advances by `time_step` per frame.
    t: f32,
    paused: bool,
    frame_num: usize,
    next_frame: Instant,

    dragging: bool,
    cursor: Option<(f64, f64)>,
}

impl App {
    fn new(
        simulation_params: SimulationParams,
        view_params: ViewParams,
        recording_config: Option<RecordingConfig>,
        paused: bool,
    ) -> Self {
        Self {
            window: None,
            gpu: None,
            render_system: None,
            simulation: None,
            built_mesh: (simulation_params.modes, simulation_params.scale),
            simulation_params,
            view_params,
            render_config: RenderConfig::default(),
            recording_config,
            t: 0.0,
            paused,
            frame_num: 0,
            next_frame: Instant::now(),
            dragging: false,
            cursor: None,
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };
        let interval = Duration::from_millis(self.view_params.interval_ms);
        let now = Instant::now();
        if interval.is_zero() || now >= self.next_frame {
            self.next_frame = now + interval;
            window.request_redraw();
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Spindrift")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_gpu(Arc::clone(&window)) {
            log::error!("Initialization failed: {:#}", e);
            event_loop.exit();
            return;
        }

        log::info!("running; ESC quits, SPACE pauses, arrows orbit, 1-4 load presets");
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let (Some(gpu), Some(render_system)) = (&self.gpu, &mut self.render_system) {
                    render_system.resize(gpu, size.width, size.height);
                    self.render_config.window_width = size.width.max(1);
                    self.render_config.window_height = size.height.max(1);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
                if !self.dragging {
                    self.cursor = None;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some((last_x, last_y)) = self.cursor {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        self.view_params.step_yaw(dx * 0.3);
                        self.view_params.step_pitch(dy * 0.2);
                    }
                }
                self.cursor = Some((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                self.view_params.step_zoom(-amount);
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

impl App {
    fn init_gpu(&mut self, window: Arc<Window>) -> anyhow::Result<()> {
        let size = window.inner_size();
        let (gpu, surface) = pollster::block_on(GpuContext::new(Some(window)))?;
        let surface = surface.ok_or_else(|| anyhow::anyhow!("no surface for window"))?;

        let simulation = OceanSimulation::new(&gpu, &self.simulation_params)?;
        let mesh = OceanMesh::new(self.simulation_params.modes, self.simulation_params.scale);
        self.built_mesh = (self.simulation_params.modes, self.simulation_params.scale);

        if let Some(config) = &self.recording_config {
            std::fs::create_dir_all(config.frames_dir())?;
            log::info!(
                "recording {} frames to {}",
                config.total_frames(),
                config.frames_dir()
            );
        }

        let render_system = RenderSystem::new(
            &gpu,
            surface,
            (size.width, size.height),
            &mesh,
            &simulation,
            self.recording_config.clone(),
        )?;

        self.gpu = Some(gpu);
        self.simulation = Some(simulation);
        self.render_system = Some(render_system);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => self.paused = !self.paused,
            KeyCode::ArrowLeft => self.view_params.step_yaw(-3.0),
            KeyCode::ArrowRight => self.view_params.step_yaw(3.0),
            KeyCode::ArrowUp => self.view_params.step_pitch(2.0),
            KeyCode::ArrowDown => self.view_params.step_pitch(-2.0),
            KeyCode::PageUp => self.view_params.step_distance(-0.1),
            KeyCode::PageDown => self.view_params.step_distance(0.1),
            KeyCode::Equal | KeyCode::NumpadAdd => self.view_params.step_zoom(-2.0),
            KeyCode::Minus | KeyCode::NumpadSubtract => self.view_params.step_zoom(2.0),
            KeyCode::KeyR => self.reseed(),
            KeyCode::Digit1 => self.apply_preset("calm"),
            KeyCode::Digit2 => self.apply_preset("default"),
            KeyCode::Digit3 => self.apply_preset("sunset"),
            KeyCode::Digit4 => self.apply_preset("glass"),
            _ => {}
        }
    }

    /// Draw a fresh seed pair from the wall clock.
    fn reseed(&mut self) {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos();
        self.simulation_params.seed = [
            (nanos % 997) as f32 / 997.0,
            (nanos / 997 % 991) as f32 / 991.0,
        ];
        self.simulation_params.bump();
        log::info!("reseeded: {:?}", self.simulation_params.seed);
    }

    fn apply_preset(&mut self, name: &str) {
        if let Some(preset) = Preset::by_name(name) {
            self.simulation_params.adopt(&preset.simulation);
            self.view_params.adopt(&preset.view);
            log::info!("preset '{}' applied", name);
        }
    }

    /// Render a single frame, re-synchronizing GPU state with the
    /// parameters first.
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(render_system), Some(simulation)) = (
            &self.gpu,
            &mut self.render_system,
            &mut self.simulation,
        ) else {
            return;
        };

        match simulation.sync(gpu, &self.simulation_params) {
            Ok(_) => {
                let geometry = (self.simulation_params.modes, self.simulation_params.scale);
                if geometry != self.built_mesh {
                    let mesh = OceanMesh::new(geometry.0, geometry.1);
                    render_system.rebind_simulation(gpu, &mesh, simulation);
                    self.built_mesh = geometry;
                }
            }
            Err(e) => {
                log::warn!("ignoring invalid parameter change: {:#}", e);
            }
        }

        let camera = Camera::from_params(
            &self.view_params,
            &self.render_config,
            self.simulation_params.scale,
        );
        render_system.update_uniforms(gpu, &camera, &self.view_params, &self.render_config);

        match render_system.render(gpu, simulation, self.t, self.frame_num) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = render_system.window_size();
                render_system.resize(gpu, width, height);
            }
            Err(e) => log::error!("render error: {:?}", e),
        }

        if !self.paused {
            self.t += self.simulation_params.time_step;
        }
        self.frame_num += 1;

        if let Some(config) = &self.recording_config {
            if self.frame_num >= config.total_frames() {
                log::info!("recording complete ({} frames)", self.frame_num);
                event_loop.exit();
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let (simulation_params, view_params) = args.resolve()?;
    let recording_config = args.recording_config();

    let mut app = App::new(simulation_params, view_params, recording_config, args.paused);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
