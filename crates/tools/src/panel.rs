use serde::{Deserialize, Serialize};
use showcase_materials::{Material, MaterialKind};

/// A material parameter a slider can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamBinding {
    Metalness,
    Roughness,
    AoIntensity,
    Shininess,
    Opacity,
    Clearcoat,
    ClearcoatRoughness,
    Sheen,
    Transmission,
    Ior,
}

impl ParamBinding {
    pub fn label(self) -> &'static str {
        match self {
            ParamBinding::Metalness => "metalness",
            ParamBinding::Roughness => "roughness",
            ParamBinding::AoIntensity => "aoMapIntensity",
            ParamBinding::Shininess => "shininess",
            ParamBinding::Opacity => "opacity",
            ParamBinding::Clearcoat => "clearcoat",
            ParamBinding::ClearcoatRoughness => "clearcoatRoughness",
            ParamBinding::Sheen => "sheen",
            ParamBinding::Transmission => "transmission",
            ParamBinding::Ior => "ior",
        }
    }

    /// Inclusive bounds a value must fall in.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamBinding::Shininess => (0.0, 1000.0),
            ParamBinding::AoIntensity => (0.0, 10.0),
            ParamBinding::Ior => (1.0, 2.333),
            _ => (0.0, 1.0),
        }
    }

    /// Current value on `material`, or `None` if its preset has no such parameter.
    pub fn read(self, material: &Material) -> Option<f32> {
        if self == ParamBinding::Opacity {
            return Some(material.opacity);
        }
        match (self, &material.kind) {
            (ParamBinding::Shininess, MaterialKind::Phong { shininess, .. }) => Some(*shininess),
            (ParamBinding::Metalness, MaterialKind::Standard { metalness, .. })
            | (ParamBinding::Metalness, MaterialKind::Physical { metalness, .. }) => Some(*metalness),
            (ParamBinding::Roughness, MaterialKind::Standard { roughness, .. })
            | (ParamBinding::Roughness, MaterialKind::Physical { roughness, .. }) => Some(*roughness),
            (ParamBinding::AoIntensity, MaterialKind::Standard { ao_intensity, .. }) => {
                Some(*ao_intensity)
            }
            (ParamBinding::Clearcoat, MaterialKind::Physical { clearcoat, .. }) => Some(*clearcoat),
            (
                ParamBinding::ClearcoatRoughness,
                MaterialKind::Physical {
                    clearcoat_roughness,
                    ..
                },
            ) => Some(*clearcoat_roughness),
            (ParamBinding::Sheen, MaterialKind::Physical { sheen, .. }) => Some(*sheen),
            (ParamBinding::Transmission, MaterialKind::Physical { transmission, .. }) => {
                Some(*transmission)
            }
            (ParamBinding::Ior, MaterialKind::Physical { ior, .. }) => Some(*ior),
            _ => None,
        }
    }

    /// Store `value` on `material`. Returns false if the preset lacks the parameter.
    pub fn write(self, material: &mut Material, value: f32) -> bool {
        if self == ParamBinding::Opacity {
            material.opacity = value;
            return true;
        }
        let slot = match (self, &mut material.kind) {
            (ParamBinding::Shininess, MaterialKind::Phong { shininess, .. }) => shininess,
            (ParamBinding::Metalness, MaterialKind::Standard { metalness, .. })
            | (ParamBinding::Metalness, MaterialKind::Physical { metalness, .. }) => metalness,
            (ParamBinding::Roughness, MaterialKind::Standard { roughness, .. })
            | (ParamBinding::Roughness, MaterialKind::Physical { roughness, .. }) => roughness,
            (ParamBinding::AoIntensity, MaterialKind::Standard { ao_intensity, .. }) => ao_intensity,
            (ParamBinding::Clearcoat, MaterialKind::Physical { clearcoat, .. }) => clearcoat,
            (
                ParamBinding::ClearcoatRoughness,
                MaterialKind::Physical {
                    clearcoat_roughness,
                    ..
                },
            ) => clearcoat_roughness,
            (ParamBinding::Sheen, MaterialKind::Physical { sheen, .. }) => sheen,
            (ParamBinding::Transmission, MaterialKind::Physical { transmission, .. }) => transmission,
            (ParamBinding::Ior, MaterialKind::Physical { ior, .. }) => ior,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// A ranged numeric control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slider {
    pub binding: ParamBinding,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Slider {
    pub fn new(binding: ParamBinding, min: f32, max: f32) -> Self {
        Self {
            binding,
            min,
            max,
            step: (max - min) / 100.0,
        }
    }

    /// Slider spanning the binding's full range.
    pub fn full(binding: ParamBinding) -> Self {
        let (min, max) = binding.range();
        Self::new(binding, min, max)
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// Errors from panel edits.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("no `{}` control on this panel", .0.label())]
    UnknownControl(ParamBinding),
    #[error("`{}` does not apply to the {} preset", .0.label(), .1)]
    NotApplicable(ParamBinding, &'static str),
    #[error("`{}` must be finite, got {}", .0.label(), .1)]
    NonFinite(ParamBinding, f32),
}

/// Debug panel of sliders bound to one material's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterPanel {
    pub title: String,
    /// Start with folders collapsed.
    pub closed_folders: bool,
    sliders: Vec<Slider>,
}

impl ParameterPanel {
    /// Sliders for every parameter `material`'s preset exposes.
    pub fn for_material(material: &Material) -> Self {
        use ParamBinding::*;

        let mut sliders = match material.kind {
            MaterialKind::Phong { .. } => vec![Shininess],
            MaterialKind::Standard { .. } => vec![Metalness, Roughness, AoIntensity],
            MaterialKind::Physical { .. } => vec![
                Metalness,
                Roughness,
                Clearcoat,
                ClearcoatRoughness,
                Sheen,
                Transmission,
                Ior,
            ],
            _ => Vec::new(),
        };
        if material.transparent {
            sliders.push(Opacity);
        }
        let sliders = sliders.into_iter().map(Slider::full).collect();

        Self {
            title: format!("{} material", material.kind.name()),
            closed_folders: true,
            sliders,
        }
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn slider(&self, binding: ParamBinding) -> Option<&Slider> {
        self.sliders.iter().find(|s| s.binding == binding)
    }

    /// Current slider values read from `material`.
    pub fn values(&self, material: &Material) -> Vec<(Slider, f32)> {
        self.sliders
            .iter()
            .filter_map(|s| s.binding.read(material).map(|v| (*s, v)))
            .collect()
    }

    /// Set a parameter through its slider, clamped into range. Returns the stored value.
    pub fn set(
        &self,
        binding: ParamBinding,
        value: f32,
        material: &mut Material,
    ) -> Result<f32, PanelError> {
        let slider = self
            .slider(binding)
            .ok_or(PanelError::UnknownControl(binding))?;
        if !value.is_finite() {
            return Err(PanelError::NonFinite(binding, value));
        }
        let clamped = slider.clamp(value);
        if !binding.write(material, clamped) {
            return Err(PanelError::NotApplicable(binding, material.kind.name()));
        }
        tracing::debug!(param = binding.label(), value = clamped, "material parameter set");
        Ok(clamped)
    }
}
