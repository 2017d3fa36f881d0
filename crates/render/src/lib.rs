//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderer cannot mutate the scene.
//! - A camera's projection only changes when `recompute_projection` runs.
//! - Textures that are not ready never fail a frame; they are reported and skipped.

mod camera;
mod renderer;

pub use camera::{Camera, PerspectiveCamera};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "showcase-render v0.1.0"
}
