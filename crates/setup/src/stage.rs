use std::path::Path;

use showcase_common::{ObjectId, Rgb, Transform};
use showcase_driver::{Clock, RenderLoopDriver};
use showcase_input::OrbitControls;
use showcase_materials::{
    ColorSpace, Filter, Material, MaterialHandle, MaterialKind, MaterialMaps, TextureCache,
    TextureError,
};
use showcase_render::{Camera, PerspectiveCamera};
use showcase_scene::{PointLight, Scene, SceneError, SceneObject};
use showcase_tools::{PanelError, ParamBinding, ParameterPanel};

use crate::config::{ConfigError, ShowcaseConfig, TextureConfig};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Everything a host needs to run the showcase: the scene with its shared
/// material, a camera with orbit controls, the parameter panel and a driver
/// that animates every configured object.
#[derive(Debug)]
pub struct Stage<K: Clock> {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub driver: RenderLoopDriver<K>,
    pub panel: ParameterPanel,
    material: MaterialHandle,
    objects: Vec<ObjectId>,
}

impl<K: Clock> Stage<K> {
    /// Assemble a stage for a `width` x `height` logical viewport.
    ///
    /// Textures are only requested here; call [`Stage::load_textures`] to read them.
    pub fn build(
        config: &ShowcaseConfig,
        clock: K,
        width: u32,
        height: u32,
        scale: f32,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let mut scene = Scene::new();
        let mut material = config.material.build()?;
        material.maps = request_maps(scene.textures_mut(), &config.material.textures)?;
        let handle = scene.materials_mut().insert(material);

        let mut driver = RenderLoopDriver::new(config.driver, clock, width, height, scale);

        let mut objects = Vec::with_capacity(config.objects.len());
        for object in &config.objects {
            let id = scene.attach(SceneObject {
                name: object.name.clone(),
                primitive: object.primitive,
                material: handle,
                transform: Transform::at(object.position),
            })?;
            driver.manage(id);
            objects.push(id);
        }

        scene.add_light(PointLight {
            color: Rgb::from_hex(config.light.color),
            intensity: config.light.intensity,
            position: config.light.position,
        });

        if let Some(path) = &config.environment_map {
            let env = scene.textures_mut().request(path, ColorSpace::Linear);
            scene.set_environment(env);
        }

        let cam = &config.camera;
        let mut camera = PerspectiveCamera::new(
            cam.fov_degrees,
            driver.viewport().aspect(),
            cam.near,
            cam.far,
        );
        camera.look_at(cam.position, config.controls.target);

        let mut controls = OrbitControls::new(&mut camera, config.controls.target);
        controls.enable_damping = config.controls.enable_damping;
        controls.damping_factor = config.controls.damping_factor;

        let mut panel = ParameterPanel::for_material(material_ref(&scene, handle)?);
        panel.closed_folders = config.panel.closed_folders;

        tracing::info!(
            objects = objects.len(),
            preset = config.material.preset.as_str(),
            textures = scene.textures().len(),
            "stage assembled"
        );

        Ok(Self {
            scene,
            camera,
            controls,
            driver,
            panel,
            material: handle,
            objects,
        })
    }

    /// The material every object shares.
    pub fn material_handle(&self) -> MaterialHandle {
        self.material
    }

    pub fn material(&self) -> Result<&Material, SetupError> {
        material_ref(&self.scene, self.material)
    }

    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Set a material parameter through the panel.
    pub fn edit_material(&mut self, binding: ParamBinding, value: f32) -> Result<f32, SetupError> {
        let material = self
            .scene
            .materials_mut()
            .get_mut(self.material)
            .ok_or(SceneError::UnknownMaterial(self.material))?;
        Ok(self.panel.set(binding, value, material)?)
    }

    /// Change the shared material directly, then rebuild the panel so its
    /// sliders match the result.
    pub fn update_material(&mut self, edit: impl FnOnce(&mut Material)) -> Result<(), SetupError> {
        let material = self
            .scene
            .materials_mut()
            .get_mut(self.material)
            .ok_or(SceneError::UnknownMaterial(self.material))?;
        edit(material);

        let closed = self.panel.closed_folders;
        self.panel = ParameterPanel::for_material(material);
        self.panel.closed_folders = closed;
        Ok(())
    }

    /// Switch the shared material to another preset, keeping its color,
    /// sidedness, blending and maps.
    pub fn swap_preset(&mut self, name: &str) -> Result<(), SetupError> {
        let kind =
            MaterialKind::from_name(name).ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        self.update_material(|material| material.kind = kind)?;
        tracing::info!(preset = name, "material preset swapped");
        Ok(())
    }

    /// Read pending textures from under `root`. Returns how many became ready.
    pub fn load_textures(&mut self, root: impl AsRef<Path>) -> usize {
        self.scene.textures_mut().load_pending(root)
    }
}

fn material_ref(scene: &Scene, handle: MaterialHandle) -> Result<&Material, SetupError> {
    scene
        .materials()
        .get(handle)
        .ok_or(SetupError::Scene(SceneError::UnknownMaterial(handle)))
}

/// Request every configured map. Color and matcap maps are sRGB, the rest
/// hold data. Gradient maps sample nearest so toon bands stay hard.
fn request_maps(cache: &mut TextureCache, textures: &TextureConfig) -> Result<MaterialMaps, TextureError> {
    let mut request = |path: &Option<std::path::PathBuf>, color_space| {
        path.as_ref().map(|p| cache.request(p, color_space))
    };
    let maps = MaterialMaps {
        map: request(&textures.map, ColorSpace::Srgb),
        matcap: request(&textures.matcap, ColorSpace::Srgb),
        ao_map: request(&textures.ao_map, ColorSpace::Linear),
        alpha_map: request(&textures.alpha_map, ColorSpace::Linear),
        gradient_map: request(&textures.gradient_map, ColorSpace::Linear),
        normal_map: request(&textures.normal_map, ColorSpace::Linear),
        roughness_map: request(&textures.roughness_map, ColorSpace::Linear),
        metalness_map: request(&textures.metalness_map, ColorSpace::Linear),
        displacement_map: request(&textures.displacement_map, ColorSpace::Linear),
    };
    if let Some(gradient) = maps.gradient_map {
        cache.set_filter(gradient, Filter::Nearest)?;
    }
    Ok(maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_driver::{FrameFlag, ManualClock};
    use showcase_materials::LoadState;
    use showcase_render::DebugTextRenderer;

    fn stage() -> Stage<ManualClock> {
        Stage::build(&ShowcaseConfig::default(), ManualClock::new(), 800, 600, 1.0).unwrap()
    }

    #[test]
    fn default_stage_matches_showcase() {
        let stage = stage();
        assert_eq!(stage.scene.object_count(), 3);
        assert_eq!(stage.objects().len(), 3);
        assert_eq!(stage.driver.managed(), stage.objects());
        assert_eq!(stage.scene.lights().len(), 1);
        assert_eq!(stage.scene.lights()[0].intensity, 30.0);
        assert!((stage.camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(stage.camera.position(), glam::Vec3::new(1.0, 1.0, 2.0));
        assert!(stage.controls.enable_damping);

        let material = stage.material().unwrap();
        assert_eq!(material.kind.name(), "standard");
        assert!(material.maps.map.is_some());
        assert!(material.maps.ao_map.is_some());
        assert!(stage.panel.slider(ParamBinding::Metalness).is_some());
        assert!(stage.scene.environment().is_some());
        // Environment not loaded yet, so no background.
        assert!(stage.scene.background().is_none());
    }

    #[test]
    fn objects_spread_along_x() {
        let stage = stage();
        let xs: Vec<f32> = stage
            .objects()
            .iter()
            .map(|id| stage.scene.get(*id).unwrap().transform.position.x)
            .collect();
        assert_eq!(xs, vec![-2.0, 0.0, 2.0]);
    }

    #[test]
    fn color_spaces_follow_slot() {
        let mut config = ShowcaseConfig::default();
        config.material.textures.gradient_map = Some("textures/gradients/3.jpg".into());
        config.material.textures.matcap = Some("textures/matcaps/1.png".into());
        let stage = Stage::build(&config, ManualClock::new(), 800, 600, 1.0).unwrap();
        let maps = stage.material().unwrap().maps;
        let textures = stage.scene.textures();

        assert_eq!(textures.get(maps.map.unwrap()).unwrap().color_space, ColorSpace::Srgb);
        assert_eq!(textures.get(maps.matcap.unwrap()).unwrap().color_space, ColorSpace::Srgb);
        assert_eq!(textures.get(maps.ao_map.unwrap()).unwrap().color_space, ColorSpace::Linear);
        let gradient = textures.get(maps.gradient_map.unwrap()).unwrap();
        assert_eq!(gradient.filter, Filter::Nearest);
        assert!(!gradient.generate_mipmaps);
    }

    #[test]
    fn edit_goes_through_panel() {
        let mut stage = stage();
        assert_eq!(stage.edit_material(ParamBinding::Roughness, 3.0).unwrap(), 1.0);
        assert_eq!(ParamBinding::Roughness.read(stage.material().unwrap()), Some(1.0));
        assert!(matches!(
            stage.edit_material(ParamBinding::Shininess, 10.0),
            Err(SetupError::Panel(PanelError::UnknownControl(_)))
        ));
    }

    #[test]
    fn swap_preset_rebuilds_panel() {
        let mut stage = stage();
        stage.swap_preset("phong").unwrap();
        let material = stage.material().unwrap();
        assert_eq!(material.kind.name(), "phong");
        assert!(material.maps.map.is_some());
        assert!(stage.panel.slider(ParamBinding::Shininess).is_some());
        assert!(stage.panel.slider(ParamBinding::Metalness).is_none());

        assert!(matches!(
            stage.swap_preset("lava"),
            Err(SetupError::Config(ConfigError::UnknownPreset(_)))
        ));
    }

    #[test]
    fn transparency_toggle_adds_opacity_slider() {
        let mut stage = stage();
        stage.panel.closed_folders = false;
        stage
            .update_material(|m| {
                m.transparent = true;
                m.opacity = 0.4;
            })
            .unwrap();
        assert!(stage.panel.slider(ParamBinding::Opacity).is_some());
        assert!(!stage.panel.closed_folders);
        assert_eq!(stage.edit_material(ParamBinding::Opacity, 0.9).unwrap(), 0.9);
    }

    #[test]
    fn textures_load_from_root() {
        let dir = tempfile::tempdir().unwrap();
        let door = dir.path().join("textures/door");
        std::fs::create_dir_all(&door).unwrap();
        std::fs::write(door.join("color.jpg"), b"not really a jpeg").unwrap();

        let mut stage = stage();
        assert_eq!(stage.load_textures(dir.path()), 1);
        let maps = stage.material().unwrap().maps;
        assert!(stage.scene.textures().is_ready(maps.map.unwrap()));
        assert!(matches!(
            stage.scene.textures().state(maps.ao_map.unwrap()),
            Some(LoadState::Failed(_))
        ));
    }

    #[test]
    fn stage_runs_frames() {
        let mut stage = stage();
        let mut flag = FrameFlag::new();
        let mut renderer = DebugTextRenderer::new();
        stage.driver.start(&mut flag);
        stage.driver.clock_mut().advance(2.0);
        let report = stage
            .driver
            .frame(
                &mut stage.scene,
                &mut stage.camera,
                Some(&mut stage.controls),
                &mut renderer,
                &mut flag,
            )
            .unwrap();
        assert_eq!(report.oriented, 3);
        assert!(report.output.contains("Objects: 3  Lights: 1"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ShowcaseConfig::default();
        config.material.preset = "nope".into();
        assert!(matches!(
            Stage::build(&config, ManualClock::new(), 800, 600, 1.0),
            Err(SetupError::Config(ConfigError::UnknownPreset(_)))
        ));
    }
}
