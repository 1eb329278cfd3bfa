mod panel;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use lightbox_compose::{Composition, SceneConfig, compose};
use lightbox_render::{Camera, FrameDriver, FrameScheduler, OrbitController};
use lightbox_render_wgpu::{FrameStats, WgpuRenderer};
use panel::LightPanel;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "lightbox-desktop", about = "Interactive light and shadow scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Pixels of trackpad scroll per wheel line.
const PIXELS_PER_LINE: f32 = 50.0;

/// Application state.
struct AppState {
    scene: Composition,
    camera: Camera,
    orbit: OrbitController,
    driver: FrameDriver,
    panel: LightPanel,
    show_panel: bool,
    drag: Option<MouseButton>,
    last_stats: FrameStats,
}

impl AppState {
    fn new(config: &SceneConfig) -> Self {
        let scene = compose(config);
        for problem in &scene.diagnostics {
            tracing::warn!("config: {problem}");
        }

        let c = &config.camera;
        let camera = Camera::perspective(c.position, c.target, c.fov_degrees, c.near, c.far);
        let orbit = OrbitController::from_camera(&camera);

        let mut panel = LightPanel::default();
        scene.wire(&mut panel);

        let driver = FrameDriver::new(scene.animated);

        tracing::info!(
            nodes = scene.graph.node_count(),
            light = %scene.light_kind,
            controls = panel.len(),
            "scene composed"
        );

        Self {
            scene,
            camera,
            orbit,
            driver,
            panel,
            show_panel: true,
            drag: None,
            last_stats: FrameStats::default(),
        }
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        match key {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::F1 => self.show_panel = !self.show_panel,
            KeyCode::Space if self.driver.tracked().is_some() => {
                let on = !self.driver.is_animating();
                self.driver.set_animating(on);
                tracing::info!(on, "animation toggled");
            }
            _ => {}
        }
    }

    fn handle_drag(&mut self, dx: f32, dy: f32) {
        match self.drag {
            Some(MouseButton::Left) => self.orbit.rotate(dx, dy),
            Some(MouseButton::Right | MouseButton::Middle) => self.orbit.pan(dx, dy),
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("controls")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Lightbox");
                ui.separator();

                let timer = self.driver.timer();
                ui.label(format!(
                    "Frame {}  {:.0} fps  ({:.2} ms avg)",
                    self.driver.frames(),
                    timer.fps(),
                    timer.average().as_secs_f64() * 1000.0
                ));
                ui.label(format!(
                    "Instances: {}  Draw calls: {}",
                    self.last_stats.instances, self.last_stats.draw_calls
                ));
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    self.camera.eye.x, self.camera.eye.y, self.camera.eye.z
                ));
                ui.separator();

                egui::CollapsingHeader::new(format!("Light ({})", self.scene.light_kind))
                    .default_open(true)
                    .show(ui, |ui| {
                        self.panel.show(ui, &mut self.scene.graph);
                    });

                if self.driver.tracked().is_some() {
                    let mut on = self.driver.is_animating();
                    if ui.checkbox(&mut on, "Animate (Space)").changed() {
                        self.driver.set_animating(on);
                    }
                }

                if !self.scene.diagnostics.is_empty() {
                    ui.separator();
                    ui.heading("Config warnings");
                    for problem in &self.scene.diagnostics {
                        ui.colored_label(egui::Color32::YELLOW, problem.to_string());
                    }
                }

                ui.separator();
                ui.small("F1: Toggle Panel | LMB: Orbit | RMB: Pan | Wheel: Zoom | Esc: Quit");
            });
    }
}

/// Frame scheduler backed by the window's redraw requests.
struct WindowScheduler<'a>(&'a Window);

impl FrameScheduler for WindowScheduler<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

/// Everything that exists only while a window is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Lightbox")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lightbox_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct GpuApp {
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: &SceneConfig) -> Self {
        Self {
            state: AppState::new(config),
            egui_ctx: EguiContext::default(),
            gpu: None,
            init_error: None,
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let state = &mut self.state;
        {
            let mut scheduler = WindowScheduler(&gpu.window);
            let target = gpu.renderer.target(&gpu.device, &gpu.queue, &view);
            state.last_stats = state.driver.tick(
                &mut scheduler,
                &mut state.scene.graph,
                &mut state.camera,
                Some(&mut state.orbit),
                &target,
            );
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state
                    .camera
                    .set_viewport(gpu.config.width, gpu.config.height);
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                self.init_error = Some(e);
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
        // A release must end the drag even when egui takes the event.
        if let WindowEvent::MouseInput {
            state: ElementState::Released,
            ..
        } = event
        {
            self.state.drag = None;
        }

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                self.state
                    .camera
                    .set_viewport(gpu.config.width, gpu.config.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key, event_loop);
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => {
                self.state.drag = Some(button);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.state.orbit.zoom(scroll);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.handle_drag(delta.0 as f32, delta.1 as f32);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("lightbox-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::from_path(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let event_loop = EventLoop::new()?;
    // The frame driver requests every redraw itself.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(&config);
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
