use serde::Serialize;
use showcase_common::ObjectId;
use showcase_driver::{Clock, DriverState, RenderLoopDriver};
use showcase_scene::Scene;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the scene and the render loop for
/// debugging and development UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene and render loop.
    pub fn summary<K: Clock>(scene: &Scene, driver: &RenderLoopDriver<K>) -> SceneSummary {
        let viewport = driver.viewport();
        let (textures_ready, textures_pending, textures_failed) = scene.textures().readiness();
        SceneSummary {
            objects: scene.object_count(),
            lights: scene.lights().len(),
            frames: driver.frames(),
            elapsed: driver.elapsed_seconds(),
            viewport: (viewport.width(), viewport.height()),
            scale: viewport.scale(),
            running: driver.state() == DriverState::Running,
            textures_ready,
            textures_pending,
            textures_failed,
        }
    }

    /// Describe one object, if attached.
    pub fn inspect_object(scene: &Scene, id: ObjectId) -> Option<ObjectInfo> {
        scene.get(id).map(|object| {
            let p = object.transform.position;
            let (rx, ry, rz) = object.transform.rotation.to_euler(glam::EulerRot::XYZ);
            ObjectInfo {
                id,
                name: object.name.clone(),
                shape: object.primitive.name(),
                preset: scene
                    .materials()
                    .get(object.material)
                    .map(|m| m.kind.name())
                    .unwrap_or("?"),
                position: [p.x, p.y, p.z],
                rotation: [rx, ry, rz],
            }
        })
    }

    /// List all object ids in the scene.
    pub fn list_objects(scene: &Scene) -> Vec<ObjectId> {
        scene.objects().keys().copied().collect()
    }
}

/// Summary of scene and loop state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub objects: usize,
    pub lights: usize,
    pub frames: u64,
    pub elapsed: f64,
    pub viewport: (u32, u32),
    pub scale: f32,
    pub running: bool,
    pub textures_ready: usize,
    pub textures_pending: usize,
    pub textures_failed: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: objects={} lights={} frames={} elapsed={:.2}s viewport={}x{}@{} textures={}/{}/{} (ready/pending/failed){}",
            self.objects,
            self.lights,
            self.frames,
            self.elapsed,
            self.viewport.0,
            self.viewport.1,
            self.scale,
            self.textures_ready,
            self.textures_pending,
            self.textures_failed,
            if self.running { "" } else { " [idle]" }
        )
    }
}

/// Detailed info about a single object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub name: String,
    pub shape: &'static str,
    pub preset: &'static str,
    pub position: [f32; 3],
    /// XYZ Euler angles in radians.
    pub rotation: [f32; 3],
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Object [{}] {} ({}, {}) pos=({:.2}, {:.2}, {:.2}) rot=({:.3}, {:.3}, {:.3})",
            self.id.short(),
            self.name,
            self.shape,
            self.preset,
            self.position[0],
            self.position[1],
            self.position[2],
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use showcase_common::Transform;
    use showcase_driver::{DriverConfig, FrameFlag, ManualClock};
    use showcase_materials::Material;
    use showcase_scene::{PointLight, Primitive, SceneObject};

    fn scene() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let material = scene
            .materials_mut()
            .insert(Material::preset("toon").unwrap());
        let id = scene
            .attach(SceneObject {
                name: "plane".into(),
                primitive: Primitive::Plane {
                    width: 1.0,
                    height: 1.0,
                },
                material,
                transform: Transform::at(Vec3::new(1.0, 2.0, 3.0)),
            })
            .unwrap();
        scene.add_light(PointLight::default());
        (scene, id)
    }

    #[test]
    fn summary_idle_driver() {
        let (scene, _) = scene();
        let driver = RenderLoopDriver::new(DriverConfig::default(), ManualClock::new(), 800, 600, 1.0);
        let summary = SceneInspector::summary(&scene, &driver);
        assert_eq!(summary.objects, 1);
        assert_eq!(summary.lights, 1);
        assert_eq!(summary.frames, 0);
        assert!(!summary.running);
        assert!(summary.to_string().contains("[idle]"));
    }

    #[test]
    fn summary_running_driver() {
        let (scene, _) = scene();
        let mut driver =
            RenderLoopDriver::new(DriverConfig::default(), ManualClock::new(), 800, 600, 3.0);
        driver.start(&mut FrameFlag::new());
        let summary = SceneInspector::summary(&scene, &driver);
        assert!(summary.running);
        assert_eq!(summary.scale, 2.0);
        assert!(summary.to_string().contains("viewport=800x600@2"));
    }

    #[test]
    fn inspect_object_found() {
        let (scene, id) = scene();
        let info = SceneInspector::inspect_object(&scene, id).unwrap();
        assert_eq!(info.position, [1.0, 2.0, 3.0]);
        assert_eq!(info.shape, "plane");
        assert_eq!(info.preset, "toon");
        assert!(info.to_string().contains("plane"));
    }

    #[test]
    fn inspect_object_not_found() {
        let (scene, _) = scene();
        assert!(SceneInspector::inspect_object(&scene, ObjectId::new()).is_none());
    }

    #[test]
    fn list_objects() {
        let (scene, id) = scene();
        assert_eq!(SceneInspector::list_objects(&scene), vec![id]);
    }
}
