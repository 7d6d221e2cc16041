//! File and command-line configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glam::Vec3;
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::camera::CameraRig;
use crate::cli::Cli;
use crate::core::accumulation::Extent;
use crate::demo::demo_mesh_objects;
use crate::environment::{Camera, DirectionalLight, Environment, MeshObject, DEFAULT_FAR, DEFAULT_FIELD_OF_VIEW, DEFAULT_NEAR};
use crate::loaders::{load_mesh_objects, load_skybox, Skybox};
use crate::scene::SphereSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Radians; 0 looks down +Z
    pub yaw: f32,
    /// Radians; positive looks up
    pub pitch: f32,
    /// Vertical, degrees
    pub field_of_view: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let rig = CameraRig::default();
        Self {
            position: rig.position.to_array(),
            yaw: rig.yaw,
            pitch: rig.pitch,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Direction the light travels
    pub direction: [f32; 3],
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [-0.3, -1.0, -0.5],
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub gltf: Option<PathBuf>,
    pub skybox: Option<PathBuf>,
    /// Use the built-in pyramid and box when no glTF scene is set
    pub demo_meshes: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gltf: None,
            skybox: None,
            demo_meshes: true,
        }
    }
}

impl SceneConfig {
    /// The glTF scene when one is configured, otherwise the demo meshes (if enabled)
    pub fn mesh_objects(&self) -> Result<Vec<MeshObject>> {
        match &self.gltf {
            Some(path) => load_mesh_objects(path),
            None if self.demo_meshes => Ok(demo_mesh_objects()),
            None => Ok(Vec::new()),
        }
    }

    /// Configured skybox, or a flat sky when none is set or it fails to load
    pub fn skybox(&self) -> Skybox {
        match &self.skybox {
            Some(path) => load_skybox(path).unwrap_or_else(|e| {
                warn!("{:#}; using a flat sky", e);
                Skybox::default()
            }),
            None => Skybox::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// Everything the binary needs to set up a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    pub spheres: SphereSettings,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub scene: SceneConfig,
    pub output: OutputConfig,
    /// Fixed seed for reproducible scenes; entropy when absent
    pub seed: Option<u64>,
}

impl TracerConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// File named by `--config` (or defaults), overridden by the other flags, validated
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.gltf {
            self.scene.gltf = Some(path.clone());
        }
        if let Some(path) = &cli.skybox {
            self.scene.skybox = Some(path.clone());
        }
        if let Some(count) = cli.spheres {
            self.spheres.count = count;
        }
        if let Some(seed) = cli.seed {
            self.seed = Some(seed);
        }
        if cli.no_demo_meshes {
            self.scene.demo_meshes = false;
        }
        if let Some(width) = cli.width {
            self.output.width = width;
        }
        if let Some(height) = cli.height {
            self.output.height = height;
        }
    }

    /// Swap inverted ranges and reject values no scene can be built from
    pub fn validate(&mut self) -> Result<()> {
        let spheres = &mut self.spheres;
        if spheres.radius.min > spheres.radius.max {
            std::mem::swap(&mut spheres.radius.min, &mut spheres.radius.max);
        }
        for range in [
            &mut spheres.glossy_smoothness,
            &mut spheres.metallic_smoothness,
            &mut spheres.emission_value,
        ] {
            if range.0 > range.1 {
                std::mem::swap(&mut range.0, &mut range.1);
            }
        }

        if spheres.radius.min < 0.0 {
            bail!("Sphere radius must be non-negative, got {}", spheres.radius.min);
        }
        if spheres.placement_radius <= 0.0 {
            bail!("Placement radius must be positive, got {}", spheres.placement_radius);
        }
        let fov = self.camera.field_of_view;
        if fov <= 0.0 || fov >= 180.0 {
            bail!("Field of view must be in (0, 180) degrees, got {}", fov);
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            bail!(
                "Camera clip planes must satisfy 0 < near < far, got {} and {}",
                self.camera.near,
                self.camera.far
            );
        }
        if self.output.width == 0 || self.output.height == 0 {
            bail!("Output size must be non-zero, got {}x{}", self.output.width, self.output.height);
        }
        Ok(())
    }

    pub fn camera_rig(&self) -> CameraRig {
        CameraRig::new(
            Vec3::from_array(self.camera.position),
            self.camera.yaw,
            self.camera.pitch,
        )
    }

    /// Environment with the configured camera, light and `mesh_objects`
    pub fn environment(&self, mesh_objects: Vec<MeshObject>) -> Environment {
        let mut camera = Camera::new(self.camera_rig().transform(), self.camera.field_of_view);
        camera.near = self.camera.near;
        camera.far = self.camera.far;

        let light = DirectionalLight::new(Vec3::from_array(self.light.direction), self.light.intensity);

        Environment::new(camera, light, mesh_objects)
    }

    /// Seeded RNG when a seed is configured, otherwise from OS entropy
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.output.width, self.output.height)
    }
}
