use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use lumen_common::{EngineConfig, GraphicsConfig, OutlineConfig, Transform};
use lumen_render::{Camera, CameraMovement, Renderer, Shader};
use lumen_render_wgpu::{MeshData, MeshId, MeshRenderable, Program, WgpuRenderer, WgpuShader};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowId};

#[derive(Parser)]
#[command(name = "lumen-desktop", about = "Lumen desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

const MOVEMENT_KEYS: [(KeyCode, CameraMovement); 6] = [
    (KeyCode::KeyW, CameraMovement::Forward),
    (KeyCode::KeyS, CameraMovement::Backward),
    (KeyCode::KeyA, CameraMovement::Left),
    (KeyCode::KeyD, CameraMovement::Right),
    (KeyCode::Space, CameraMovement::Up),
    (KeyCode::ControlLeft, CameraMovement::Down),
];

const SPRINT_MULTIPLIER: f32 = 3.0;
// Pixel scroll deltas per line of wheel movement.
const PIXELS_PER_LINE: f32 = 50.0;
const SPIN_SPEED: f32 = 0.8;
const MAX_FLOOR_DIVISIONS: u32 = 64;

fn demo_scene(cube: MeshId, plane: MeshId) -> Vec<MeshRenderable> {
    vec![
        MeshRenderable::new(
            "floor",
            plane,
            Transform::from_position(Vec3::new(0.0, -0.5, -8.0))
                .with_scale(Vec3::new(40.0, 1.0, 40.0)),
        )
        .with_color([0.35, 0.35, 0.38, 1.0]),
        MeshRenderable::new("crate", cube, Transform::from_position(Vec3::new(0.0, 0.0, -6.0)))
            .with_color([0.2, 0.45, 0.9, 1.0])
            .outlined(),
        MeshRenderable::new(
            "spinner",
            cube,
            Transform::from_position(Vec3::new(3.0, 0.5, -8.0))
                .with_rotation(Vec3::new(0.3, 1.0, 0.0), 0.0),
        )
        .with_color([0.85, 0.25, 0.2, 1.0])
        .outlined(),
        MeshRenderable::new(
            "pillar",
            cube,
            Transform::from_position(Vec3::new(-3.0, 1.0, -8.0))
                .with_scale(Vec3::new(1.0, 3.0, 1.0)),
        )
        .with_color([0.7, 0.7, 0.65, 1.0]),
        MeshRenderable::new(
            "glass pane",
            cube,
            Transform::from_position(Vec3::new(-1.5, 0.0, -3.5))
                .with_scale(Vec3::new(1.5, 1.5, 0.1)),
        )
        .with_color([0.3, 0.7, 1.0, 0.35]),
        MeshRenderable::new(
            "glass block",
            cube,
            Transform::from_position(Vec3::new(1.5, 0.0, -10.0)),
        )
        .with_color([0.3, 1.0, 0.5, 0.45])
        .outlined(),
    ]
}

/// Split the scene into opaque and transparent submission lists.
fn submission_order(
    objects: &[MeshRenderable],
    eye: Vec3,
) -> (Vec<&MeshRenderable>, Vec<&MeshRenderable>) {
    let (mut transparent, mut opaque): (Vec<_>, Vec<_>) =
        objects.iter().partition(|o| o.is_transparent());
    // Earlier draws leave the stencil set under them, so outlined items go first.
    opaque.sort_by_key(|o| !o.outline);
    // Back to front.
    transparent.sort_by(|a, b| {
        let da = a.transform.position.distance_squared(eye);
        let db = b.transform.position.distance_squared(eye);
        db.total_cmp(&da)
    });
    (opaque, transparent)
}

/// Application state independent of the GPU.
struct AppState {
    config: EngineConfig,
    camera: Camera,
    renderer: Renderer,
    objects: Vec<MeshRenderable>,
    spinning: Option<usize>,
    floor: Option<MeshId>,
    floor_divisions: u32,
    uploaded_floor_divisions: u32,
    show_inspector: bool,
    keys_held: HashSet<KeyCode>,
    mouse_captured: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(config: EngineConfig) -> Self {
        let camera = Camera::from_config(Vec3::new(0.0, 1.0, 2.0), Vec3::Y, &config.camera);
        let renderer = Renderer::new(&config.outline);
        Self {
            config,
            camera,
            renderer,
            objects: Vec::new(),
            spinning: None,
            floor: None,
            floor_divisions: 1,
            uploaded_floor_divisions: 1,
            show_inspector: true,
            keys_held: HashSet::new(),
            mouse_captured: false,
            last_frame: Instant::now(),
        }
    }

    fn populate(&mut self, cube: MeshId, plane: MeshId) {
        self.objects = demo_scene(cube, plane);
        self.spinning = self.objects.iter().position(|o| o.name == "spinner");
        self.floor = Some(plane);
    }

    /// Floor mesh and grid size to upload, if the inspector changed it.
    fn take_floor_rebuild(&mut self) -> Option<(MeshId, u32)> {
        let floor = self.floor?;
        if self.floor_divisions == self.uploaded_floor_divisions {
            return None;
        }
        self.uploaded_floor_divisions = self.floor_divisions;
        Some((floor, self.floor_divisions))
    }

    fn update(&mut self, dt: f32) {
        let sprinting = self.keys_held.contains(&KeyCode::ShiftLeft);
        let base = self.config.camera.movement_speed;
        self.camera
            .set_movement_speed(if sprinting { base * SPRINT_MULTIPLIER } else { base });

        for (key, direction) in MOVEMENT_KEYS {
            if self.keys_held.contains(&key) {
                self.camera.process_keyboard(direction, dt);
            }
        }

        if let Some(object) = self.spinning.and_then(|i| self.objects.get_mut(i)) {
            let angle = object.transform.rotation_angle + SPIN_SPEED * dt;
            object.transform.rotation_angle = angle % std::f32::consts::TAU;
        }
    }

    /// Returns `true` when the application should quit. Auto-repeated
    /// presses only keep the key held.
    fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> bool {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
            return false;
        }
        if repeat {
            return false;
        }

        match key {
            KeyCode::F1 => self.show_inspector = !self.show_inspector,
            KeyCode::KeyO => {
                let outline = !self.objects.iter().all(|o| o.outline);
                for object in &mut self.objects {
                    object.outline = outline;
                }
                tracing::info!(outline, "toggled outlines");
            }
            KeyCode::Escape => return true,
            _ => {}
        }
        false
    }

    fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        let y = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        self.camera.process_mouse_scroll(y);
    }

    /// Queue the scene and flush it through the wgpu recorder.
    fn flush_scene(&mut self, gpu: &WgpuRenderer) {
        let (opaque, transparent) = submission_order(&self.objects, self.camera.position());

        let mut gfx = gpu.graphics_state();
        let mut main = gpu.shader(Program::Main);
        let mut outline = gpu.shader(Program::Outline);
        main.enable();

        let mut frame = self.renderer.begin_frame::<WgpuShader<'_>>();
        for object in opaque {
            frame.submit_opaque(object);
        }
        for object in transparent {
            frame.submit_transparent(object);
        }
        frame.flush(&mut gfx, &mut main, &mut outline);
    }

    fn draw_ui(&mut self, ctx: &EguiContext, pipelines: usize) {
        if !self.show_inspector {
            return;
        }

        egui::SidePanel::left("inspector")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Lumen");
                ui.separator();

                let camera = &self.camera;
                let p = camera.position();
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
                ui.label(format!(
                    "Yaw: {:.1}  Pitch: {:.1}  FOV: {:.1}",
                    camera.yaw(),
                    camera.pitch(),
                    camera.fov()
                ));
                ui.label(format!("Speed: {:.1}", camera.movement_speed()));
                ui.separator();

                let stats = self.renderer.last_stats();
                ui.heading("Frame");
                ui.label(format!("Frame: {}", stats.frame));
                ui.label(format!(
                    "Opaque: {}  Transparent: {}  Outlines: {}",
                    stats.opaque, stats.transparent, stats.outlines
                ));
                ui.label(format!(
                    "Draw calls: {}  Pipelines: {}",
                    stats.draw_calls(),
                    pipelines
                ));
                ui.separator();

                ui.heading("Floor");
                ui.add(
                    egui::Slider::new(&mut self.floor_divisions, 1..=MAX_FLOOR_DIVISIONS)
                        .text("divisions"),
                );
                ui.separator();

                ui.heading("Outlines");
                for object in &mut self.objects {
                    ui.checkbox(&mut object.outline, object.name.as_str());
                }

                ui.separator();
                ui.small("F1: Inspector | O: Outlines | RMB: Look | WASD: Move | Shift: Sprint");
            });
    }
}

/// Window, surface and GPU resources, created once the event loop resumes.
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
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        graphics: &GraphicsConfig,
        outline: &OutlineConfig,
    ) -> Result<Self> {
        let mut attrs = Window::default_attributes()
            .with_title("Lumen")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        if graphics.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        window.set_cursor_visible(graphics.show_mouse);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lumen_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let present_mode = if graphics.v_sync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            outline,
        );

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
            backend = adapter.get_info().backend.to_str(),
            ?present_mode,
            "GPU initialised"
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

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct App {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl App {
    fn new(config: EngineConfig) -> Self {
        Self {
            state: AppState::new(config),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn set_mouse_captured(&mut self, captured: bool) {
        self.state.mouse_captured = captured;
        let Some(gpu) = &self.gpu else {
            return;
        };
        let grab = if captured {
            CursorGrabMode::Confined
        } else {
            CursorGrabMode::None
        };
        if let Err(e) = gpu.window.set_cursor_grab(grab) {
            tracing::debug!("cursor grab unavailable: {e}");
        }
        gpu.window
            .set_cursor_visible(!captured && self.state.config.graphics.show_mouse);
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
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

        if let Some((floor, divisions)) = self.state.take_floor_rebuild() {
            let grid = MeshData::grid(divisions);
            if gpu.renderer.reload_mesh(&gpu.device, &gpu.queue, floor, &grid) {
                tracing::debug!(divisions, "rebuilt floor mesh");
            }
        }
        self.state.flush_scene(&gpu.renderer);
        let graphics = &self.state.config.graphics;
        let view_proj = self
            .state
            .camera
            .projection_matrix(gpu.aspect(), graphics.near_plane, graphics.far_plane)
            * self.state.camera.view_matrix();
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, view_proj);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let pipelines = gpu.renderer.pipeline_count();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, pipelines);
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
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let config = &self.state.config;
        match Gpu::new(event_loop, &self.egui_ctx, &config.graphics, &config.outline) {
            Ok(mut gpu) => {
                let cube = gpu.renderer.add_mesh(&gpu.device, &MeshData::cube());
                let plane = gpu.renderer.add_mesh(&gpu.device, &MeshData::plane());
                self.state.populate(cube, plane);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise GPU: {e:#}");
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
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if self
                    .state
                    .handle_key(key, key_state == ElementState::Pressed, repeat)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: button_state,
                ..
            } => self.set_mouse_captured(button_state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => self.state.handle_scroll(delta),
            WindowEvent::RedrawRequested => self.redraw(),
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
            if self.state.mouse_captured {
                // Screen y grows downwards; pitch grows upwards.
                self.state
                    .camera
                    .process_mouse_movement(delta.0 as f32, -delta.1 as f32, true);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    tracing::info!(config = ?cli.config, "lumen-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let mut state = AppState::new(EngineConfig::default());
        state.populate(MeshId(0), MeshId(1));
        state
    }

    #[test]
    fn scene_mixes_opaque_and_transparent() {
        let state = state();
        let transparent = state.objects.iter().filter(|o| o.is_transparent()).count();
        assert!(transparent >= 2);
        assert!(transparent < state.objects.len());
        assert!(state.spinning.is_some());
    }

    #[test]
    fn o_toggles_every_outline() {
        let mut state = state();
        assert!(!state.handle_key(KeyCode::KeyO, true, false));
        assert!(state.objects.iter().all(|o| o.outline));
        state.handle_key(KeyCode::KeyO, false, false);
        state.handle_key(KeyCode::KeyO, true, false);
        assert!(state.objects.iter().all(|o| !o.outline));
    }

    #[test]
    fn repeated_keys_do_not_toggle() {
        let mut state = state();
        let outlines: Vec<bool> = state.objects.iter().map(|o| o.outline).collect();

        state.handle_key(KeyCode::F1, true, false);
        assert!(!state.show_inspector);
        state.handle_key(KeyCode::F1, true, true);
        state.handle_key(KeyCode::KeyO, true, true);
        assert!(!state.show_inspector);
        assert_eq!(state.objects.iter().map(|o| o.outline).collect::<Vec<_>>(), outlines);

        // Repeats still count as held.
        state.handle_key(KeyCode::KeyW, true, true);
        assert!(state.keys_held.contains(&KeyCode::KeyW));
    }

    #[test]
    fn floor_rebuilds_once_per_change() {
        let mut state = state();
        assert_eq!(state.take_floor_rebuild(), None);

        state.floor_divisions = 8;
        assert_eq!(state.take_floor_rebuild(), Some((MeshId(1), 8)));
        assert_eq!(state.take_floor_rebuild(), None);

        let mut bare = AppState::new(EngineConfig::default());
        bare.floor_divisions = 4;
        assert_eq!(bare.take_floor_rebuild(), None);
    }

    #[test]
    fn escape_requests_quit() {
        let mut state = state();
        assert!(state.handle_key(KeyCode::Escape, true, false));
        assert!(!state.handle_key(KeyCode::Escape, false, false));
    }

    #[test]
    fn held_keys_move_camera() {
        let mut state = state();
        let start = state.camera.position();
        state.handle_key(KeyCode::KeyW, true, false);
        state.update(0.1);
        let walked = state.camera.position().distance(start);
        assert!((walked - 4.0).abs() < 1e-3, "walked {walked}");

        state.handle_key(KeyCode::ShiftLeft, true, false);
        let before = state.camera.position();
        state.update(0.1);
        let sprinted = state.camera.position().distance(before);
        assert!((sprinted - 12.0).abs() < 1e-3, "sprinted {sprinted}");
    }

    #[test]
    fn transparent_objects_sorted_back_to_front() {
        let state = state();
        let eye = state.camera.position();
        let (opaque, transparent) = submission_order(&state.objects, eye);
        assert_eq!(opaque.len() + transparent.len(), state.objects.len());

        let distances: Vec<f32> = transparent
            .iter()
            .map(|o| o.transform.position.distance(eye))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] >= w[1]), "{distances:?}");

        let first_plain = opaque.iter().position(|o| !o.outline).unwrap();
        assert!(opaque[first_plain..].iter().all(|o| !o.outline));
    }

    #[test]
    fn scroll_zooms_within_limits() {
        let mut state = state();
        state.handle_scroll(MouseScrollDelta::LineDelta(0.0, 30.0));
        assert_eq!(state.camera.fov(), 70.0);
        state.handle_scroll(MouseScrollDelta::LineDelta(0.0, -100.0));
        assert_eq!(state.camera.fov(), 100.0);
    }
}
