use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use showcase_common::{ObjectId, Rgb, Transform};
use showcase_materials::{MaterialHandle, MaterialLibrary, TextureCache, TextureId};
use std::collections::BTreeMap;

/// Parametric mesh shapes the showcase can display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Primitive {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Sphere { .. } => "sphere",
            Primitive::Plane { .. } => "plane",
            Primitive::Torus { .. } => "torus",
        }
    }
}

/// A renderable entity in the scene.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub primitive: Primitive,
    pub material: MaterialHandle,
    pub transform: Transform,
}

/// Omnidirectional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            intensity: 30.0,
            position: Vec3::new(2.0, 3.0, 4.0),
        }
    }
}

/// Errors from scene operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown material handle: {0:?}")]
    UnknownMaterial(MaterialHandle),
}

/// The scene root.
///
/// Holds the attached objects, lights, and the material and texture
/// registries they reference. The environment texture doubles as the
/// background, projected equirectangularly.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    lights: Vec<PointLight>,
    materials: MaterialLibrary,
    textures: TextureCache,
    environment: Option<TextureId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an object under the root. Returns its id.
    pub fn attach(&mut self, object: SceneObject) -> Result<ObjectId, SceneError> {
        if self.materials.get(object.material).is_none() {
            return Err(SceneError::UnknownMaterial(object.material));
        }
        let id = ObjectId::new();
        tracing::debug!(
            id = %id.short(),
            name = %object.name,
            shape = object.primitive.name(),
            "object attached"
        );
        self.objects.insert(id, object);
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Replace an object's rotation. Returns false if the id is unknown.
    pub fn set_rotation(&mut self, id: ObjectId, rotation: Quat) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }

    /// Read-only access to all objects (BTreeMap for deterministic iteration).
    pub fn objects(&self) -> &BTreeMap<ObjectId, SceneObject> {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Use a texture as both environment lighting and background.
    pub fn set_environment(&mut self, texture: TextureId) {
        tracing::info!(texture = texture.0, "environment map set");
        self.environment = Some(texture);
    }

    pub fn environment(&self) -> Option<TextureId> {
        self.environment
    }

    /// Background texture, only once its bytes are available.
    pub fn background(&self) -> Option<TextureId> {
        self.environment.filter(|id| self.textures.is_ready(*id))
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureCache {
        &mut self.textures
    }

    /// Deterministic hash over object transforms in canonical order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        for (id, object) in &self.objects {
            let t = &object.transform;
            mix(&mut h, id.0.as_bytes());
            for v in t.position.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in t.rotation.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            for v in t.scale.to_array() {
                mix(&mut h, &v.to_le_bytes());
            }
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_materials::{ColorSpace, Material};

    fn sphere() -> Primitive {
        Primitive::Sphere {
            radius: 0.5,
            width_segments: 32,
            height_segments: 32,
        }
    }

    fn scene_with_material() -> (Scene, MaterialHandle) {
        let mut scene = Scene::new();
        let handle = scene.materials_mut().insert(Material::default());
        (scene, handle)
    }

    #[test]
    fn scene_starts_empty() {
        let scene = Scene::new();
        assert_eq!(scene.object_count(), 0);
        assert!(scene.lights().is_empty());
        assert!(scene.environment().is_none());
    }

    #[test]
    fn attach_siblings() {
        let (mut scene, material) = scene_with_material();
        let a = scene
            .attach(SceneObject {
                name: "sphere".into(),
                primitive: sphere(),
                material,
                transform: Transform::at(Vec3::new(-2.0, 0.0, 0.0)),
            })
            .unwrap();
        let b = scene
            .attach(SceneObject {
                name: "plane".into(),
                primitive: Primitive::Plane {
                    width: 1.0,
                    height: 1.0,
                },
                material,
                transform: Transform::default(),
            })
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.get(a).unwrap().transform.position.x, -2.0);
    }

    #[test]
    fn attach_rejects_unknown_material() {
        let mut scene = Scene::new();
        let err = scene
            .attach(SceneObject {
                name: "orphan".into(),
                primitive: sphere(),
                material: MaterialHandle(99),
                transform: Transform::default(),
            })
            .unwrap_err();
        assert!(matches!(err, SceneError::UnknownMaterial(MaterialHandle(99))));
    }

    #[test]
    fn set_rotation_updates_only_known_ids() {
        let (mut scene, material) = scene_with_material();
        let id = scene
            .attach(SceneObject {
                name: "sphere".into(),
                primitive: sphere(),
                material,
                transform: Transform::default(),
            })
            .unwrap();
        let rot = Quat::from_rotation_y(1.0);
        assert!(scene.set_rotation(id, rot));
        assert_eq!(scene.get(id).unwrap().transform.rotation, rot);
        assert!(!scene.set_rotation(ObjectId::new(), rot));
    }

    #[test]
    fn background_waits_for_texture() {
        let mut scene = Scene::new();
        let env = scene
            .textures_mut()
            .request("textures/environmentMap/2k.hdr", ColorSpace::Linear);
        scene.set_environment(env);
        assert_eq!(scene.environment(), Some(env));
        assert_eq!(scene.background(), None);
    }

    #[test]
    fn state_hash_tracks_rotation() {
        let (mut scene, material) = scene_with_material();
        let id = scene
            .attach(SceneObject {
                name: "torus".into(),
                primitive: Primitive::Torus {
                    radius: 0.5,
                    tube: 0.2,
                    radial_segments: 32,
                    tubular_segments: 32,
                },
                material,
                transform: Transform::default(),
            })
            .unwrap();
        let before = scene.state_hash();
        assert_eq!(before, scene.state_hash());
        scene.set_rotation(id, Quat::from_rotation_x(-1.5));
        assert_ne!(before, scene.state_hash());
    }

    #[test]
    fn default_light_matches_showcase() {
        let light = PointLight::default();
        assert_eq!(light.intensity, 30.0);
        assert_eq!(light.position, Vec3::new(2.0, 3.0, 4.0));
    }
}
