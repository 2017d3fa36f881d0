use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use showcase_common::Rgb;
use showcase_driver::{FrameScheduler, ResizeEvent, Surface, SystemClock};
use showcase_input::ControlAction;
use showcase_materials::MaterialKind;
use showcase_render_wgpu::{FrameTarget, WgpuRenderer};
use showcase_setup::{ShowcaseConfig, Stage};
use showcase_tools::SceneInspector;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "showcase-desktop", about = "Material showcase desktop window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory texture paths are resolved against
    #[arg(long, default_value = "./static")]
    asset_root: PathBuf,
}

/// Window-side GPU resources, created once the event loop resumes.
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
            .with_title("Material Showcase")
            .with_inner_size(LogicalSize::new(1280.0, 720.0));
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
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("showcase_device"),
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
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
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
}

/// Viewport changes the driver hands to the window. They are collected
/// during `on_resize` and applied once afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSurface {
    logical: (u32, u32),
    scale: f32,
    dirty: bool,
}

impl PendingSurface {
    fn new(logical: (u32, u32), scale: f32) -> Self {
        Self {
            logical,
            scale,
            dirty: false,
        }
    }

    /// Render size in physical pixels, if the driver changed anything since
    /// the last call.
    fn take_render_size(&mut self) -> Option<(u32, u32)> {
        if !std::mem::take(&mut self.dirty) {
            return None;
        }
        let width = ((self.logical.0 as f32 * self.scale).round() as u32).max(1);
        let height = ((self.logical.1 as f32 * self.scale).round() as u32).max(1);
        Some((width, height))
    }
}

impl Surface for PendingSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.logical = (width, height);
        self.dirty = true;
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.dirty = true;
    }
}

/// Swapchain extent for the window's physical size; `None` while minimized.
fn swapchain_extent(size: PhysicalSize<u32>) -> Option<(u32, u32)> {
    (size.width > 0 && size.height > 0).then_some((size.width, size.height))
}

/// Next frame arrives as a `RedrawRequested` event.
struct WindowScheduler<'a>(&'a Window);

impl FrameScheduler for WindowScheduler<'_> {
    fn request_frame(&mut self) {
        self.0.request_redraw();
    }
}

#[derive(Default)]
struct UiState {
    show_panel: bool,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

fn draw_ui(ctx: &EguiContext, stage: &mut Stage<SystemClock>, ui_state: &UiState) {
    if !ui_state.show_panel {
        return;
    }
    let Ok(material) = stage.material().cloned() else {
        return;
    };

    egui::SidePanel::left("inspector")
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading("Material Showcase");
            ui.separator();

            let summary = SceneInspector::summary(&stage.scene, &stage.driver);
            ui.label(format!(
                "Frames: {}  Elapsed: {:.1}s",
                summary.frames, summary.elapsed
            ));
            ui.label(format!(
                "Viewport: {}x{} @ {}",
                summary.viewport.0, summary.viewport.1, summary.scale
            ));
            ui.label(format!(
                "Textures: {} ready, {} pending, {} failed",
                summary.textures_ready, summary.textures_pending, summary.textures_failed
            ));
            ui.separator();

            ui.heading("Material");
            let current = material.kind.name();
            let mut preset = current;
            egui::ComboBox::from_label("Preset")
                .selected_text(preset)
                .show_ui(ui, |ui| {
                    for name in MaterialKind::NAMES {
                        ui.selectable_value(&mut preset, name, name);
                    }
                });
            if preset != current {
                if let Err(e) = stage.swap_preset(preset) {
                    tracing::warn!("preset swap failed: {e}");
                }
            }

            let mut rgb = material.color.to_array();
            let mut transparent = material.transparent;
            let mut flat_shading = material.flat_shading;
            let mut changed = false;
            ui.horizontal(|ui| {
                ui.label("Color");
                changed |= ui.color_edit_button_rgb(&mut rgb).changed();
            });
            changed |= ui.checkbox(&mut transparent, "Transparent").changed();
            changed |= ui.checkbox(&mut flat_shading, "Flat shading").changed();
            if changed {
                let result = stage.update_material(|m| {
                    m.color = Rgb::new(rgb[0], rgb[1], rgb[2]);
                    m.transparent = transparent;
                    m.flat_shading = flat_shading;
                });
                if let Err(e) = result {
                    tracing::warn!("material update failed: {e}");
                }
            }

            let values = stage
                .material()
                .map(|m| stage.panel.values(m))
                .unwrap_or_default();
            if !values.is_empty() {
                egui::CollapsingHeader::new(stage.panel.title.clone())
                    .default_open(!stage.panel.closed_folders)
                    .show(ui, |ui| {
                        for (slider, mut value) in values {
                            let response = ui.add(
                                egui::Slider::new(&mut value, slider.min..=slider.max)
                                    .step_by(slider.step as f64)
                                    .text(slider.binding.label()),
                            );
                            if response.changed() {
                                if let Err(e) = stage.edit_material(slider.binding, value) {
                                    tracing::warn!("edit rejected: {e}");
                                }
                            }
                        }
                    });
            }

            ui.separator();
            ui.heading("Objects");
            for id in SceneInspector::list_objects(&stage.scene) {
                if let Some(info) = SceneInspector::inspect_object(&stage.scene, id) {
                    ui.label(format!(
                        "{} ({}) rot=({:.2}, {:.2})",
                        info.name, info.shape, info.rotation[0], info.rotation[1]
                    ));
                }
            }

            ui.separator();
            ui.small("F1: Toggle Panel | LMB: Orbit | Wheel: Zoom");
        });
}

struct GpuApp {
    stage: Stage<SystemClock>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    ui: UiState,
}

impl GpuApp {
    fn new(stage: Stage<SystemClock>) -> Self {
        Self {
            stage,
            gpu: None,
            egui_ctx: EguiContext::default(),
            ui: UiState {
                show_panel: true,
                ..UiState::default()
            },
        }
    }

    /// Match the swapchain to the window, then report the window's logical
    /// size and scale to the driver.
    fn sync_viewport(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let size = gpu.window.inner_size();
        if let Some((width, height)) = swapchain_extent(size) {
            if (width, height) != (gpu.config.width, gpu.config.height) {
                gpu.config.width = width;
                gpu.config.height = height;
                gpu.surface.configure(&gpu.device, &gpu.config);
            }
        }

        let scale = gpu.window.scale_factor();
        let logical = size.to_logical::<f64>(scale);
        let event = ResizeEvent::new(
            logical.width.round() as u32,
            logical.height.round() as u32,
            scale as f32,
        );
        let viewport = self.stage.driver.viewport();
        let mut pending = PendingSurface::new((viewport.width(), viewport.height()), viewport.scale());
        self.stage
            .driver
            .on_resize(event, &mut self.stage.camera, &mut pending);
        if let Some((width, height)) = pending.take_render_size() {
            gpu.renderer.resize(&gpu.device, width, height);
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
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

        {
            let mut target = FrameTarget {
                renderer: &mut gpu.renderer,
                device: &gpu.device,
                queue: &gpu.queue,
                view: &view,
            };
            let mut scheduler = WindowScheduler(&gpu.window);
            let stage = &mut self.stage;
            if let Some(report) = stage.driver.frame(
                &mut stage.scene,
                &mut stage.camera,
                Some(&mut stage.controls),
                &mut target,
                &mut scheduler,
            ) {
                tracing::trace!(
                    index = report.index,
                    draws = report.output.draws,
                    "frame drawn"
                );
            }
        }

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &mut self.stage, &self.ui);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        // egui paints over the full swapchain at the window's own scale.
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

    fn handle_pointer(&mut self, event: &WindowEvent) {
        match *event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.ui.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.ui.last_cursor.replace(position);
                if !self.ui.dragging {
                    return;
                }
                let (Some(last), Some(gpu)) = (last, &self.gpu) else {
                    return;
                };
                let height = gpu.window.inner_size().height;
                self.stage.controls.apply(ControlAction::drag(
                    position.x - last.x,
                    position.y - last.y,
                    height,
                ));
            }
            WindowEvent::CursorLeft { .. } => {
                self.ui.last_cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 40.0) as f32,
                };
                self.stage.controls.apply(ControlAction::Zoom(steps));
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
                event_loop.exit();
                return;
            }
        }

        self.sync_viewport();
        if let Some(gpu) = &self.gpu {
            self.stage.driver.start(&mut WindowScheduler(&gpu.window));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // A release must end the drag even when egui swallows it.
        if let WindowEvent::MouseInput {
            button: MouseButton::Left,
            state: ElementState::Released,
            ..
        } = event
        {
            self.ui.dragging = false;
        }

        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.sync_viewport();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::F1),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.ui.show_panel = !self.ui.show_panel;
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            ref pointer => self.handle_pointer(pointer),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("showcase-desktop starting");

    let config = match &cli.config {
        Some(path) => ShowcaseConfig::load(path)?,
        None => ShowcaseConfig::default(),
    };
    let mut stage = Stage::build(&config, SystemClock::start(), 1280, 720, 1.0)?;
    let ready = stage.load_textures(&cli.asset_root);
    tracing::info!(
        ready,
        root = %cli.asset_root.display(),
        "textures loaded"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(stage);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_driver::{DriverConfig, ManualClock, RenderLoopDriver};
    use showcase_render::PerspectiveCamera;

    #[test]
    fn resize_yields_one_render_size_with_final_scale() {
        let mut driver = RenderLoopDriver::new(DriverConfig::default(), ManualClock::new(), 1280, 720, 1.0);
        let mut camera = PerspectiveCamera::new(75.0, 1280.0 / 720.0, 0.1, 100.0);
        let mut pending = PendingSurface::new((1280, 720), 1.0);

        assert!(driver.on_resize(ResizeEvent::new(800, 600, 1.5), &mut camera, &mut pending));
        assert_eq!(pending.take_render_size(), Some((1200, 900)));
        assert_eq!(pending.take_render_size(), None);
    }

    #[test]
    fn capped_scale_shrinks_render_size_only() {
        let mut driver = RenderLoopDriver::new(DriverConfig::default(), ManualClock::new(), 1280, 720, 1.0);
        let mut camera = PerspectiveCamera::new(75.0, 1280.0 / 720.0, 0.1, 100.0);
        let mut pending = PendingSurface::new((1280, 720), 1.0);

        // A 3x display: the window is 2400x1800 physical pixels.
        driver.on_resize(ResizeEvent::new(800, 600, 3.0), &mut camera, &mut pending);
        assert_eq!(pending.take_render_size(), Some((1600, 1200)));
        assert_eq!(swapchain_extent(PhysicalSize::new(2400, 1800)), Some((2400, 1800)));
    }

    #[test]
    fn degenerate_resize_leaves_surface_untouched() {
        let mut driver = RenderLoopDriver::new(DriverConfig::default(), ManualClock::new(), 1280, 720, 1.0);
        let mut camera = PerspectiveCamera::new(75.0, 1280.0 / 720.0, 0.1, 100.0);
        let mut pending = PendingSurface::new((1280, 720), 1.0);

        assert!(!driver.on_resize(ResizeEvent::new(0, 600, 1.0), &mut camera, &mut pending));
        assert_eq!(pending.take_render_size(), None);
        assert_eq!(swapchain_extent(PhysicalSize::new(0, 600)), None);
    }
}
