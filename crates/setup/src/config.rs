use glam::Vec3;
use serde::{Deserialize, Serialize};
use showcase_driver::DriverConfig;
use showcase_materials::{Material, MaterialKind, Side};
use showcase_scene::Primitive;
use showcase_tools::ParamBinding;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown material preset `{0}`")]
    UnknownPreset(String),
    #[error("`{param}` does not apply to the {preset} preset")]
    ParamNotApplicable { param: &'static str, preset: String },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: String, value: f64 },
}

fn out_of_range(field: impl Into<String>, value: impl Into<f64>) -> ConfigError {
    ConfigError::OutOfRange {
        field: field.into(),
        value: value.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: Vec3::new(1.0, 1.0, 2.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Packed `0xRRGGBB`.
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 30.0,
            position: Vec3::new(2.0, 3.0, 4.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub name: String,
    pub primitive: Primitive,
    #[serde(default)]
    pub position: Vec3,
}

/// Texture paths per material slot, relative to the asset root.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub map: Option<PathBuf>,
    pub ao_map: Option<PathBuf>,
    pub alpha_map: Option<PathBuf>,
    pub matcap: Option<PathBuf>,
    pub gradient_map: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
    pub roughness_map: Option<PathBuf>,
    pub metalness_map: Option<PathBuf>,
    pub displacement_map: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub preset: String,
    /// Packed `0xRRGGBB`.
    pub color: u32,
    pub side: Side,
    pub wireframe: bool,
    pub transparent: bool,
    pub opacity: f32,
    pub flat_shading: bool,
    /// Phong specular color, packed `0xRRGGBB`.
    pub specular: Option<u32>,
    /// Overrides for the preset's numeric parameters.
    pub params: BTreeMap<ParamBinding, f32>,
    pub textures: TextureConfig,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            preset: "standard".into(),
            color: 0xffffff,
            side: Side::Double,
            wireframe: false,
            transparent: false,
            opacity: 1.0,
            flat_shading: false,
            specular: None,
            params: BTreeMap::new(),
            textures: TextureConfig {
                map: Some("textures/door/color.jpg".into()),
                ao_map: Some("textures/door/ambientOcclusion.jpg".into()),
                ..TextureConfig::default()
            },
        }
    }
}

impl MaterialConfig {
    /// Build the material, without textures, checking every override.
    pub fn build(&self) -> Result<Material, ConfigError> {
        let mut material =
            Material::preset(&self.preset).ok_or_else(|| ConfigError::UnknownPreset(self.preset.clone()))?;
        material.color = showcase_common::Rgb::from_hex(self.color);
        material.side = self.side;
        material.wireframe = self.wireframe;
        material.transparent = self.transparent;
        material.flat_shading = self.flat_shading;

        if !(0.0..=1.0).contains(&self.opacity) {
            // NaN fails `contains` too.
            return Err(out_of_range("material.opacity", self.opacity));
        }
        material.opacity = self.opacity;

        if let Some(hex) = self.specular {
            match &mut material.kind {
                MaterialKind::Phong { specular, .. } => *specular = showcase_common::Rgb::from_hex(hex),
                _ => {
                    return Err(ConfigError::ParamNotApplicable {
                        param: "specular",
                        preset: self.preset.clone(),
                    });
                }
            }
        }

        for (&binding, &value) in &self.params {
            let (min, max) = binding.range();
            if !(min..=max).contains(&value) {
                return Err(out_of_range(format!("material.params.{}", binding.label()), value));
            }
            if !binding.write(&mut material, value) {
                return Err(ConfigError::ParamNotApplicable {
                    param: binding.label(),
                    preset: self.preset.clone(),
                });
            }
        }
        Ok(material)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub closed_folders: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            closed_folders: true,
        }
    }
}

/// Top-level showcase configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub driver: DriverConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub light: LightConfig,
    pub objects: Vec<ObjectConfig>,
    pub material: MaterialConfig,
    /// Equirectangular environment map, also used as background.
    pub environment_map: Option<PathBuf>,
    pub panel: PanelConfig,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            light: LightConfig::default(),
            objects: vec![
                ObjectConfig {
                    name: "sphere".into(),
                    primitive: Primitive::Sphere {
                        radius: 0.5,
                        width_segments: 32,
                        height_segments: 32,
                    },
                    position: Vec3::new(-2.0, 0.0, 0.0),
                },
                ObjectConfig {
                    name: "plane".into(),
                    primitive: Primitive::Plane {
                        width: 1.0,
                        height: 1.0,
                    },
                    position: Vec3::ZERO,
                },
                ObjectConfig {
                    name: "torus".into(),
                    primitive: Primitive::Torus {
                        radius: 0.5,
                        tube: 0.2,
                        radial_segments: 32,
                        tubular_segments: 32,
                    },
                    position: Vec3::new(2.0, 0.0, 0.0),
                },
            ],
            material: MaterialConfig::default(),
            environment_map: Some("textures/environmentMap/2k.hdr".into()),
            panel: PanelConfig::default(),
        }
    }
}

impl ShowcaseConfig {
    /// Read and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate YAML text. Missing fields keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.driver.max_pixel_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(out_of_range("driver.max_pixel_ratio", ratio));
        }
        for (field, rate) in [("driver.spin.x", self.driver.spin.x), ("driver.spin.y", self.driver.spin.y)] {
            if !rate.is_finite() {
                return Err(out_of_range(field, rate));
            }
        }

        let cam = &self.camera;
        if cam.fov_degrees.is_nan() || cam.fov_degrees <= 0.0 || cam.fov_degrees >= 180.0 {
            return Err(out_of_range("camera.fov_degrees", cam.fov_degrees));
        }
        if cam.near.is_nan() || cam.near <= 0.0 {
            return Err(out_of_range("camera.near", cam.near));
        }
        if cam.far.is_nan() || cam.far <= cam.near {
            return Err(out_of_range("camera.far", cam.far));
        }

        let damping = self.controls.damping_factor;
        if !(0.0..=1.0).contains(&damping) {
            return Err(out_of_range("controls.damping_factor", damping));
        }

        if !(self.light.intensity.is_finite() && self.light.intensity >= 0.0) {
            return Err(out_of_range("light.intensity", self.light.intensity));
        }

        for object in &self.objects {
            validate_primitive(&object.name, &object.primitive)?;
        }

        self.material.build()?;
        Ok(())
    }
}

fn validate_primitive(name: &str, primitive: &Primitive) -> Result<(), ConfigError> {
    let positive = |field: &str, v: f32| {
        if v.is_finite() && v > 0.0 {
            Ok(())
        } else {
            Err(out_of_range(format!("objects.{name}.{field}"), v))
        }
    };
    let at_least = |field: &str, v: u32, min: u32| {
        if v >= min {
            Ok(())
        } else {
            Err(out_of_range(format!("objects.{name}.{field}"), v))
        }
    };
    match *primitive {
        Primitive::Sphere {
            radius,
            width_segments,
            height_segments,
        } => {
            positive("radius", radius)?;
            at_least("width_segments", width_segments, 3)?;
            at_least("height_segments", height_segments, 2)
        }
        Primitive::Plane { width, height } => {
            positive("width", width)?;
            positive("height", height)
        }
        Primitive::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => {
            positive("radius", radius)?;
            positive("tube", tube)?;
            at_least("radial_segments", radial_segments, 2)?;
            at_least("tubular_segments", tubular_segments, 3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ShowcaseConfig::default();
        config.validate().unwrap();
        assert_eq!(config.objects.len(), 3);
        assert_eq!(config.driver.max_pixel_ratio, 2.0);
        assert_eq!(config.camera.fov_degrees, 75.0);
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ShowcaseConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ShowcaseConfig::default());
    }

    #[test]
    fn partial_yaml_overrides() {
        let yaml = r#"
driver:
  spin:
    y: 0.5
  max_pixel_ratio: 1.5
material:
  preset: phong
  specular: 0x1188ff
  params:
    shininess: 100
  textures:
    map: textures/door/color.jpg
light:
  color: 0xff0000
"#;
        let config = ShowcaseConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.driver.spin.y, 0.5);
        assert_eq!(config.driver.spin.x, -0.15);
        assert_eq!(config.driver.max_pixel_ratio, 1.5);
        assert_eq!(config.light.color, 0xff0000);
        let material = config.material.build().unwrap();
        assert_eq!(material.kind.name(), "phong");
    }

    #[test]
    fn objects_from_yaml() {
        let yaml = r#"
objects:
  - name: ball
    primitive: { shape: sphere, radius: 1, width_segments: 16, height_segments: 8 }
    position: [0, 1, 0]
"#;
        let config = ShowcaseConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.objects.len(), 1);
        assert_eq!(config.objects[0].position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn rejects_unknown_preset() {
        let err = ShowcaseConfig::from_yaml_str("material: { preset: lava }").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(p) if p == "lava"));
    }

    #[test]
    fn rejects_inapplicable_param() {
        let yaml = "material: { preset: lambert, params: { metalness: 0.5 } }";
        let err = ShowcaseConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ParamNotApplicable { param: "metalness", .. }));
    }

    #[test]
    fn rejects_out_of_range_param() {
        let yaml = "material: { preset: standard, params: { roughness: 2.0 } }";
        assert!(matches!(
            ShowcaseConfig::from_yaml_str(yaml),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn param_overrides_checked_without_slider() {
        // Opaque materials have no opacity slider; the override is still bounded.
        for yaml in [
            "material: { preset: basic, params: { opacity: 5.0 } }",
            "material: { preset: basic, params: { opacity: .nan } }",
            "material: { preset: phong, params: { shininess: -1 } }",
        ] {
            assert!(
                matches!(ShowcaseConfig::from_yaml_str(yaml), Err(ConfigError::OutOfRange { .. })),
                "{yaml}"
            );
        }
        let config =
            ShowcaseConfig::from_yaml_str("material: { preset: basic, params: { opacity: 0.25 } }")
                .unwrap();
        assert_eq!(config.material.build().unwrap().opacity, 0.25);
    }

    #[test]
    fn rejects_bad_pixel_ratio_and_camera() {
        assert!(ShowcaseConfig::from_yaml_str("driver: { max_pixel_ratio: 0 }").is_err());
        assert!(ShowcaseConfig::from_yaml_str("camera: { near: 5, far: 1 }").is_err());
        assert!(ShowcaseConfig::from_yaml_str("camera: { fov_degrees: 0 }").is_err());
    }

    #[test]
    fn rejects_degenerate_primitive() {
        let yaml = r#"
objects:
  - name: flat
    primitive: { shape: plane, width: 0, height: 1 }
"#;
        let err = ShowcaseConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("objects.flat.width"));
    }

    #[test]
    fn yaml_roundtrip_through_file() {
        let config = ShowcaseConfig::default();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_yaml().unwrap().as_bytes()).unwrap();
        let loaded = ShowcaseConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ShowcaseConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
