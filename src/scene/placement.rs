use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Material, MaterialCategory, Sphere, DIELECTRIC_SPECULAR};
use crate::math::{random_color_hsv, random_in_disk, uniform_in_range};

pub const DEFAULT_SPHERE_COUNT: u32 = 100;
pub const DEFAULT_PLACEMENT_RADIUS: f32 = 100.0;
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Inclusive radius bounds for generated spheres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusRange {
    pub min: f32,
    pub max: f32,
}

impl RadiusRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn fixed(radius: f32) -> Self {
        Self::new(radius, radius)
    }

    pub fn contains(&self, radius: f32) -> bool {
        radius >= self.min && radius <= self.max
    }
}

impl Default for RadiusRange {
    fn default() -> Self {
        Self::new(3.0, 8.0)
    }
}

/// Parameters of the random sphere field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereSettings {
    pub count: u32,
    pub radius: RadiusRange,
    pub placement_radius: f32,
    pub max_retries: u32,
    pub glossy_smoothness: (f32, f32),
    pub metallic_smoothness: (f32, f32),
    pub emission_value: (f32, f32),
}

impl Default for SphereSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_SPHERE_COUNT,
            radius: RadiusRange::default(),
            placement_radius: DEFAULT_PLACEMENT_RADIUS,
            max_retries: DEFAULT_MAX_RETRIES,
            glossy_smoothness: (0.2, 0.6),
            metallic_smoothness: (0.6, 1.0),
            emission_value: (1.0, 3.5),
        }
    }
}

/// Place up to `settings.count` non-overlapping spheres on the ground plane.
///
/// Each slot gets `max_retries + 1` attempts; a slot whose every candidate
/// overlaps an accepted sphere is dropped, so the result may be shorter than
/// requested. Overlap is checked against the full accepted list.
pub fn generate_spheres<R: Rng + ?Sized>(rng: &mut R, settings: &SphereSettings) -> Vec<Sphere> {
    let mut spheres: Vec<Sphere> = Vec::with_capacity(settings.count as usize);

    'slots: for _ in 0..settings.count {
        let mut candidate = None;

        for _ in 0..=settings.max_retries {
            let radius = uniform_in_range(rng, settings.radius.min, settings.radius.max);
            let disk = random_in_disk(rng, settings.placement_radius);
            let position = Vec3::new(disk.x, radius, disk.y);

            let trial = Sphere {
                position,
                radius,
                material: Material::default(),
            };

            if !spheres.iter().any(|other| trial.overlaps(other)) {
                candidate = Some(trial);
                break;
            }
        }

        let Some(mut sphere) = candidate else {
            continue 'slots;
        };

        sphere.material = random_material(rng, settings);
        spheres.push(sphere);
    }

    spheres
}

/// Draw a colour and a selector, then fill the fields of the chosen bucket.
pub fn random_material<R: Rng + ?Sized>(rng: &mut R, settings: &SphereSettings) -> Material {
    let color = random_color_hsv(rng, (0.0, 1.0));
    let category = MaterialCategory::from_selector(rng.gen::<f32>());
    material_for(category, color, rng, settings)
}

fn material_for<R: Rng + ?Sized>(
    category: MaterialCategory,
    color: Vec3,
    rng: &mut R,
    settings: &SphereSettings,
) -> Material {
    match category {
        MaterialCategory::Diffuse => Material {
            albedo: color,
            specular: DIELECTRIC_SPECULAR,
            smoothness: 0.0,
            emission: Vec3::ZERO,
        },
        MaterialCategory::GlossyDielectric => {
            let (lo, hi) = settings.glossy_smoothness;
            Material {
                albedo: color,
                specular: Vec3::ONE,
                smoothness: uniform_in_range(rng, lo, hi),
                emission: Vec3::ZERO,
            }
        }
        MaterialCategory::Metallic => {
            let (lo, hi) = settings.metallic_smoothness;
            Material {
                albedo: Vec3::ZERO,
                specular: color,
                smoothness: uniform_in_range(rng, lo, hi),
                emission: Vec3::ZERO,
            }
        }
        MaterialCategory::Emissive => Material {
            albedo: Vec3::ZERO,
            specular: Vec3::ZERO,
            smoothness: 0.0,
            emission: random_color_hsv(rng, settings.emission_value),
        },
    }
}
