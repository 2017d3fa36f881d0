//! wgpu render backend for the material showcase.
//!
//! Draws every scene object with its primitive's mesh and its material's
//! preset shading, lit by the scene's first point light.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Double-sided materials are drawn without face culling.
//! - Transparent objects draw after opaque ones, farthest first.
//! - The swapchain keeps the window size; only the offscreen render size
//!   follows the capped pixel ratio.

mod gpu;
pub mod mesh;
mod shaders;

pub use gpu::{FrameStats, FrameTarget, WgpuRenderer};

pub fn crate_info() -> &'static str {
    "showcase-render-wgpu v0.1.0"
}
