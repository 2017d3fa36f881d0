use serde::{Deserialize, Serialize};
use showcase_common::ObjectId;
use showcase_input::OrbitControls;
use showcase_render::{Camera, Renderer};
use showcase_scene::Scene;

use crate::clock::Clock;
use crate::host::{FrameScheduler, ResizeEvent, Surface};
use crate::spin::{Orientation, SpinRates, orientation_at};
use crate::viewport::{DEFAULT_MAX_PIXEL_RATIO, ViewportState};

/// Tunables for the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub spin: SpinRates,
    /// Ceiling applied to the host's device pixel ratio.
    pub max_pixel_ratio: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            spin: SpinRates::default(),
            max_pixel_ratio: DEFAULT_MAX_PIXEL_RATIO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
}

/// What one frame did.
#[derive(Debug, Clone)]
pub struct FrameReport<O> {
    /// Zero-based frame index.
    pub index: u64,
    pub elapsed: f64,
    pub orientation: Orientation,
    /// Objects that were rotated this frame.
    pub oriented: usize,
    pub output: O,
}

/// Drives the frame sequence.
///
/// Owns the viewport and the clock; borrows the scene, camera, renderer and
/// scheduler per call so the host keeps ownership of its resources.
#[derive(Debug)]
pub struct RenderLoopDriver<K: Clock> {
    config: DriverConfig,
    clock: K,
    viewport: ViewportState,
    managed: Vec<ObjectId>,
    state: DriverState,
    frames: u64,
}

impl<K: Clock> RenderLoopDriver<K> {
    /// Driver for an initial viewport. Zero dimensions are bumped to one pixel.
    pub fn new(config: DriverConfig, clock: K, width: u32, height: u32, scale: f32) -> Self {
        let viewport = ViewportState::at_least_one_pixel(width, height, scale, config.max_pixel_ratio);
        Self {
            config,
            clock,
            viewport,
            managed: Vec::new(),
            state: DriverState::Idle,
            frames: 0,
        }
    }

    /// Add an object whose orientation the driver animates.
    pub fn manage(&mut self, id: ObjectId) {
        if !self.managed.contains(&id) {
            self.managed.push(id);
        }
    }

    pub fn managed(&self) -> &[ObjectId] {
        &self.managed
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut K {
        &mut self.clock
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    /// Begin the frame sequence by scheduling the first frame.
    ///
    /// Starting an already running driver is ignored, so a host can never end
    /// up with two interleaved sequences.
    pub fn start(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.state == DriverState::Running {
            tracing::warn!("render loop already running; start ignored");
            return;
        }
        self.state = DriverState::Running;
        tracing::info!(
            objects = self.managed.len(),
            width = self.viewport.width(),
            height = self.viewport.height(),
            scale = self.viewport.scale(),
            "render loop started"
        );
        scheduler.request_frame();
    }

    /// Apply a viewport change: aspect ratio, projection, surface size and scale.
    ///
    /// Returns false and leaves everything untouched when either dimension is zero.
    pub fn on_resize(
        &mut self,
        event: ResizeEvent,
        camera: &mut impl Camera,
        surface: &mut impl Surface,
    ) -> bool {
        let Some(viewport) = ViewportState::new(
            event.width,
            event.height,
            event.scale,
            self.config.max_pixel_ratio,
        ) else {
            tracing::debug!(
                width = event.width,
                height = event.height,
                "degenerate viewport; resize skipped"
            );
            return false;
        };

        self.viewport = viewport;
        camera.set_aspect(viewport.aspect());
        camera.recompute_projection();
        surface.resize(viewport.width(), viewport.height());
        surface.set_scale(viewport.scale());

        tracing::debug!(
            width = viewport.width(),
            height = viewport.height(),
            scale = viewport.scale(),
            aspect = viewport.aspect(),
            "viewport resized"
        );
        true
    }

    /// Rotate every managed object to its orientation at `elapsed`.
    /// Returns how many objects were found in the scene.
    pub fn orient(&self, scene: &mut Scene, elapsed: f64) -> (Orientation, usize) {
        let orientation = orientation_at(self.config.spin, elapsed);
        let rotation = orientation.to_quat();
        let mut oriented = 0;
        for id in &self.managed {
            if scene.set_rotation(*id, rotation) {
                oriented += 1;
            } else {
                tracing::debug!(id = %id.short(), "managed object not in scene");
            }
        }
        (orientation, oriented)
    }

    /// Produce one frame and schedule the next. Does nothing while idle.
    pub fn frame<C, R, S>(
        &mut self,
        scene: &mut Scene,
        camera: &mut C,
        controls: Option<&mut OrbitControls>,
        renderer: &mut R,
        scheduler: &mut S,
    ) -> Option<FrameReport<R::Output>>
    where
        C: Camera,
        R: Renderer,
        S: FrameScheduler,
    {
        if self.state != DriverState::Running {
            return None;
        }

        let elapsed = self.clock.elapsed_seconds();
        let (orientation, oriented) = self.orient(scene, elapsed);

        if let Some(controls) = controls {
            controls.update(camera);
        }

        let output = renderer.render(scene, camera);
        scheduler.request_frame();

        let index = self.frames;
        self.frames += 1;
        tracing::trace!(index, elapsed, "frame produced");

        Some(FrameReport {
            index,
            elapsed,
            orientation,
            oriented,
            output,
        })
    }
}
