use serde::{Deserialize, Serialize};
use showcase_common::Rgb;
use std::collections::BTreeMap;

use crate::texture::TextureId;

/// A handle referencing a material in a [`MaterialLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

/// Which faces of a surface are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Shading model plus the parameters that belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "snake_case")]
pub enum MaterialKind {
    /// Unlit; color and map only.
    Basic,
    /// Surface normals mapped to color.
    Normal,
    /// Lighting baked into a matcap texture.
    Matcap,
    /// Grayscale by distance from the camera.
    Depth,
    /// Diffuse only.
    Lambert,
    Phong {
        #[serde(default = "default_shininess")]
        shininess: f32,
        #[serde(default = "default_specular")]
        specular: Rgb,
    },
    /// Quantized diffuse, stepped by the gradient map when present.
    Toon,
    Standard {
        #[serde(default = "default_metalness")]
        metalness: f32,
        #[serde(default = "default_roughness")]
        roughness: f32,
        #[serde(default = "default_ao_intensity")]
        ao_intensity: f32,
    },
    Physical {
        #[serde(default = "default_metalness")]
        metalness: f32,
        #[serde(default = "default_roughness")]
        roughness: f32,
        #[serde(default)]
        clearcoat: f32,
        #[serde(default)]
        clearcoat_roughness: f32,
        #[serde(default)]
        sheen: f32,
        #[serde(default)]
        transmission: f32,
        #[serde(default = "default_ior")]
        ior: f32,
    },
}

fn default_shininess() -> f32 {
    100.0
}

fn default_specular() -> Rgb {
    Rgb::from_hex(0x1188ff)
}

fn default_metalness() -> f32 {
    0.7
}

fn default_roughness() -> f32 {
    0.2
}

fn default_ao_intensity() -> f32 {
    1.0
}

fn default_ior() -> f32 {
    1.5
}

impl MaterialKind {
    /// Every preset name, in the order the showcase cycles through them.
    pub const NAMES: [&'static str; 9] = [
        "basic", "normal", "matcap", "depth", "lambert", "phong", "toon", "standard", "physical",
    ];

    /// Preset with its default parameters, looked up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "basic" => Self::Basic,
            "normal" => Self::Normal,
            "matcap" => Self::Matcap,
            "depth" => Self::Depth,
            "lambert" => Self::Lambert,
            "phong" => Self::Phong {
                shininess: default_shininess(),
                specular: default_specular(),
            },
            "toon" => Self::Toon,
            "standard" => Self::Standard {
                metalness: default_metalness(),
                roughness: default_roughness(),
                ao_intensity: default_ao_intensity(),
            },
            "physical" => Self::Physical {
                metalness: default_metalness(),
                roughness: default_roughness(),
                clearcoat: 0.0,
                clearcoat_roughness: 0.0,
                sheen: 0.0,
                transmission: 0.0,
                ior: default_ior(),
            },
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Normal => "normal",
            Self::Matcap => "matcap",
            Self::Depth => "depth",
            Self::Lambert => "lambert",
            Self::Phong { .. } => "phong",
            Self::Toon => "toon",
            Self::Standard { .. } => "standard",
            Self::Physical { .. } => "physical",
        }
    }

    /// Whether the shading model reacts to scene lights.
    pub fn is_lit(&self) -> bool {
        matches!(
            self,
            Self::Lambert | Self::Phong { .. } | Self::Toon | Self::Standard { .. } | Self::Physical { .. }
        )
    }
}

/// Optional texture slots. Unset slots are simply not sampled.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialMaps {
    pub map: Option<TextureId>,
    pub ao_map: Option<TextureId>,
    pub alpha_map: Option<TextureId>,
    pub matcap: Option<TextureId>,
    pub gradient_map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub roughness_map: Option<TextureId>,
    pub metalness_map: Option<TextureId>,
    pub displacement_map: Option<TextureId>,
}

impl MaterialMaps {
    /// All assigned texture ids with their slot names.
    pub fn assigned(&self) -> Vec<(&'static str, TextureId)> {
        [
            ("map", self.map),
            ("ao_map", self.ao_map),
            ("alpha_map", self.alpha_map),
            ("matcap", self.matcap),
            ("gradient_map", self.gradient_map),
            ("normal_map", self.normal_map),
            ("roughness_map", self.roughness_map),
            ("metalness_map", self.metalness_map),
            ("displacement_map", self.displacement_map),
        ]
        .into_iter()
        .filter_map(|(slot, id)| id.map(|id| (slot, id)))
        .collect()
    }
}

/// A surface material shared by any number of scene objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Rgb,
    pub side: Side,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub flat_shading: bool,
    pub maps: MaterialMaps,
}

impl Material {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            color: Rgb::WHITE,
            side: Side::Front,
            wireframe: false,
            transparent: false,
            opacity: 1.0,
            flat_shading: false,
            maps: MaterialMaps::default(),
        }
    }

    /// Preset by name with the showcase's tuning: every preset is double
    /// sided so the plane stays visible from behind.
    pub fn preset(name: &str) -> Option<Self> {
        let kind = MaterialKind::from_name(name)?;
        Some(Self {
            side: Side::Double,
            ..Self::new(kind)
        })
    }

    /// Opacity actually applied when blending.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(MaterialKind::Basic)
    }
}

/// Registry of materials addressed by handle.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: BTreeMap<MaterialHandle, Material>,
    next: u64,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next);
        self.next += 1;
        tracing::debug!(handle = handle.0, preset = material.kind.name(), "material registered");
        self.materials.insert(handle, material);
        handle
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(&handle)
    }

    pub fn get_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(&handle)
    }

    pub fn handles(&self) -> Vec<MaterialHandle> {
        self.materials.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in MaterialKind::NAMES {
            let kind = MaterialKind::from_name(name).unwrap();
            assert_eq!(kind.name(), name);
        }
        assert!(MaterialKind::from_name("lava").is_none());
    }

    #[test]
    fn standard_preset_defaults() {
        let m = Material::preset("standard").unwrap();
        assert_eq!(m.side, Side::Double);
        match m.kind {
            MaterialKind::Standard {
                metalness,
                roughness,
                ..
            } => {
                assert_eq!(metalness, 0.7);
                assert_eq!(roughness, 0.2);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn phong_preset_defaults() {
        let m = Material::preset("phong").unwrap();
        assert_eq!(
            m.kind,
            MaterialKind::Phong {
                shininess: 100.0,
                specular: Rgb::from_hex(0x1188ff),
            }
        );
    }

    #[test]
    fn lit_presets() {
        assert!(!MaterialKind::Basic.is_lit());
        assert!(!MaterialKind::Depth.is_lit());
        assert!(MaterialKind::Lambert.is_lit());
        assert!(MaterialKind::from_name("physical").unwrap().is_lit());
    }

    #[test]
    fn opacity_only_applies_when_transparent() {
        let mut m = Material::default();
        m.opacity = 0.5;
        assert_eq!(m.effective_opacity(), 1.0);
        m.transparent = true;
        assert_eq!(m.effective_opacity(), 0.5);
    }

    #[test]
    fn assigned_maps_lists_only_set_slots() {
        let mut maps = MaterialMaps::default();
        assert!(maps.assigned().is_empty());
        maps.ao_map = Some(TextureId(7));
        assert_eq!(maps.assigned(), vec![("ao_map", TextureId(7))]);
    }

    #[test]
    fn library_insert_and_edit() {
        let mut lib = MaterialLibrary::new();
        let a = lib.insert(Material::default());
        let b = lib.insert(Material::preset("toon").unwrap());
        assert_ne!(a, b);
        assert_eq!(lib.len(), 2);

        lib.get_mut(a).unwrap().wireframe = true;
        assert!(lib.get(a).unwrap().wireframe);
        assert_eq!(lib.handles(), vec![a, b]);
    }
}
