mod input;
mod timing;

use crate::anim::Animator;
use crate::assets::{Asset, AssetManager};
use crate::config::{ConfigError, ViewerConfig};
use crate::interaction::{screen, InteractionController};
use crate::render::{PickHit, PickingService, Viewport, ViewerCamera};
use crate::scene::{serialization, Scene};
use input::{action_for_key, InputAction};
use timing::FrameTiming;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

/// Window, input and scene state. Nothing is drawn to the window; the scene,
/// its materials and the camera are kept current for a renderer to consume.
pub struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    scene: Scene,
    camera: ViewerCamera,
    viewport: Viewport,
    animator: Animator,
    picking: PickingService,
    assets: AssetManager,
    controller: Option<InteractionController>,
    mouse_pos: Option<(f32, f32)>,
    timing: FrameTiming,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(config: ViewerConfig, scene: Scene) -> Self {
        let camera = initial_camera(&scene, &config.interaction.start_view);
        // Without both devices the viewer still shows the scene, just inert.
        let controller = match InteractionController::new(&scene, &config.interaction) {
            Ok(controller) => Some(controller),
            Err(err) => {
                log::warn!("Interactions disabled: {}", err);
                None
            }
        };
        let now = Instant::now();
        Self {
            window: None,
            viewport: Viewport::new(config.window.width, config.window.height, 1.0),
            animator: Animator::new(),
            picking: PickingService::new(
                config.picking.widget_enabled,
                config.picking.hover_enabled,
            ),
            assets: AssetManager::new(&config.dropzone.allowed_extensions),
            controller,
            mouse_pos: None,
            timing: FrameTiming::new(config.window.title.clone(), now),
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: now,
            camera,
            scene,
            config,
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>, scale_factor: f64) {
        self.viewport = Viewport::new(new_size.width, new_size.height, scale_factor);
        let narrow = self
            .viewport
            .is_narrow(self.config.interaction.responsive.narrow_max_width);
        if let Some(controller) = &mut self.controller {
            controller.set_narrow_viewport(narrow);
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn pick_at_cursor(&self) -> Option<PickHit> {
        let (x, y) = self.mouse_pos?;
        self.picking
            .pick(&self.scene, &self.camera, &self.viewport, x, y)
    }

    fn handle_hover(&mut self) {
        let object = self.pick_at_cursor().map(|hit| hit.node);
        let Some(event) = self.picking.update_hover(object) else {
            return;
        };
        if let Some(controller) = &mut self.controller {
            controller.on_hover_changed(&self.scene, &event);
        }
    }

    fn handle_click(&mut self) {
        let hit = self.pick_at_cursor();
        let mut event = self.picking.click(hit);
        if let Some(controller) = &mut self.controller {
            controller.on_hit(&self.scene, &mut event);
        }
        self.picking.commit_selection(&event);
        if let Some(node) = self
            .picking
            .selected_object()
            .and_then(|id| self.scene.node(id))
        {
            log::debug!("Transform gizmo attached to {}", node.name);
        }
    }

    fn handle_dropped_file(&mut self, path: &Path) {
        match self.assets.import_path(path) {
            Ok(mut asset) => self.on_asset_loaded(&mut asset),
            Err(err) => log::warn!("Drop ignored: {}", err),
        }
    }

    fn on_asset_loaded(&mut self, asset: &mut Asset) {
        if let Asset::Environment(environment) = asset {
            if self.config.dropzone.auto_set_environment {
                match self.scene.environment() {
                    Some(previous) => log::info!(
                        "Environment {} replaced by {}",
                        previous.name,
                        environment.name
                    ),
                    None => log::info!("Environment set to {}", environment.name),
                }
                self.scene.set_environment(Arc::clone(&*environment));
            }
        }
        screen::apply_dropped_texture(&mut self.scene, asset, &self.config.screen);
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let refresh_title = self.timing.update(now);
        self.animator
            .tick(&mut self.scene, &mut self.camera, self.timing.frame_dt);
        if let Some(controller) = &mut self.controller {
            controller.update(&self.scene, &mut self.animator);
        }

        if refresh_title {
            let status = match &self.controller {
                Some(controller) => controller.status(),
                None => "interactions disabled".to_string(),
            };
            if let Some(window) = &self.window {
                window.set_title(&self.timing.title(&status));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ))
            .with_resizable(true);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);
        self.handle_resize(size, window.scale_factor());
        self.update_target_frame_duration(&window);
        if let Some(controller) = &mut self.controller {
            controller.snap_to_rest(&self.scene, &mut self.animator);
        }
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                match action_for_key(event.physical_key, pressed, event.repeat) {
                    InputAction::CloseDevices => {
                        if let Some(controller) = &mut self.controller {
                            controller.on_close_requested();
                        }
                    }
                    InputAction::None => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                let scale_factor = self
                    .window
                    .as_ref()
                    .map(|window| window.scale_factor())
                    .unwrap_or(1.0);
                self.handle_resize(new_size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = self.window.clone() {
                    self.handle_resize(window.inner_size(), scale_factor);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = Some((position.x as f32, position.y as f32));
                self.handle_hover();
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_pos = None;
                self.handle_hover();
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.handle_click();
            }
            WindowEvent::DroppedFile(path) => {
                self.handle_dropped_file(&path);
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

/// Camera at the configured start view, or framing the whole scene.
fn initial_camera(scene: &Scene, start_view: &str) -> ViewerCamera {
    if let Some(view) = scene.view(start_view) {
        let mut camera = ViewerCamera::default();
        camera.set_view(view);
        return camera;
    }
    scene
        .bounds()
        .map(|bounds| ViewerCamera::from_bounds(&bounds))
        .unwrap_or_default()
}

/// Interactive two-device product viewer.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(version)]
struct Args {
    /// Scene document to load instead of the configured one.
    scene: Option<PathBuf>,
    /// Viewer configuration file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load scene {path}: {source}")]
    Scene {
        path: String,
        #[source]
        source: serialization::SerializationError,
    },
}

/// Relative asset paths are resolved against the crate root.
fn resolve_asset_path(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
    }
}

fn load(args: Args) -> Result<(ViewerConfig, Scene), LaunchError> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let scene_path = args
        .scene
        .unwrap_or_else(|| resolve_asset_path(&config.scene_path));
    let scene = serialization::load_scene_from_file(&scene_path).map_err(|source| {
        LaunchError::Scene {
            path: scene_path.display().to_string(),
            source,
        }
    })?;
    Ok((config, scene))
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let (config, scene) = match load(Args::parse()) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    log::info!("🚀 Tabletop viewer");
    log::info!("   Hover a device to preview it, click to open, ESC to close");
    log::info!("   Drop an image on the window to put it on the screens");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, scene);
    event_loop.run_app(&mut app).expect("Event loop error");

    log::info!("👋 Goodbye!");
}
