//! Configuration and assembly of the showcase stage.
//!
//! Every configuration field defaults to the classic showcase: sphere, plane
//! and torus sharing a standard material, one point light, a perspective
//! camera at (1, 1, 2) with damped orbit controls.

pub mod config;
pub mod stage;

pub use config::{
    CameraConfig, ConfigError, ControlsConfig, LightConfig, MaterialConfig, ObjectConfig,
    ShowcaseConfig, TextureConfig,
};
pub use stage::{SetupError, Stage};

pub fn crate_info() -> &'static str {
    "showcase-setup v0.1.0"
}
