use showcase_materials::{LoadState, TextureCache, TextureId};
use showcase_scene::Scene;
use std::fmt::Write;

use crate::camera::Camera;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a camera, then produces one frame. It
/// never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the scene as seen by the camera.
    fn render<C: Camera>(&mut self, scene: &Scene, camera: &C) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable dump of the scene. Used by the headless CLI and
/// by tests of the frame loop.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn texture_label(textures: &TextureCache, id: TextureId) -> &'static str {
    match textures.state(id) {
        Some(LoadState::Ready { .. }) => "ready",
        Some(LoadState::Pending) => "pending",
        Some(LoadState::Failed(_)) => "failed",
        None => "missing",
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render<C: Camera>(&mut self, scene: &Scene, camera: &C) -> String {
        self.frames += 1;
        let mut out = String::new();
        let eye = camera.position();
        let _ = writeln!(out, "=== Frame {} ===", self.frames);
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) aspect={:.4}",
            eye.x,
            eye.y,
            eye.z,
            camera.aspect()
        );
        let _ = writeln!(
            out,
            "Objects: {}  Lights: {}",
            scene.object_count(),
            scene.lights().len()
        );
        if let Some(env) = scene.environment() {
            let _ = writeln!(out, "Environment: {}", texture_label(scene.textures(), env));
        }

        for (id, object) in scene.objects() {
            let (x, y, z) = object.transform.rotation.to_euler(glam::EulerRot::XYZ);
            let p = object.transform.position;
            let _ = write!(
                out,
                "  [{}] {} {} pos=({:.2}, {:.2}, {:.2}) rot=({:.4}, {:.4}, {:.4})",
                id.short(),
                object.name,
                object.primitive.name(),
                p.x,
                p.y,
                p.z,
                x,
                y,
                z
            );
            match scene.materials().get(object.material) {
                Some(material) => {
                    let _ = write!(out, " material={}", material.kind.name());
                    for (slot, texture) in material.maps.assigned() {
                        let _ = write!(out, " {slot}={}", texture_label(scene.textures(), texture));
                    }
                }
                None => {
                    tracing::warn!(object = %id.short(), "object references unknown material");
                    let _ = write!(out, " material=?");
                }
            }
            out.push('\n');
        }

        out
    }
}
