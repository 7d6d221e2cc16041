//! Scene geometry: analytic spheres, mesh-derived triangles and their
//! packed GPU representation.

pub mod buffers;
pub mod extraction;
pub mod placement;

use glam::Vec3;

pub use buffers::SceneBuffers;
pub use extraction::extract_triangles;
pub use placement::{generate_spheres, RadiusRange, SphereSettings};

/// Dielectric Fresnel baseline reflectance
pub const DIELECTRIC_SPECULAR: Vec3 = Vec3::splat(0.04);

/// Surface response shared by spheres and triangles
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Material {
    pub albedo: Vec3,
    pub specular: Vec3,
    pub smoothness: f32,
    pub emission: Vec3,
}

/// Material bucket picked for a randomly placed sphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialCategory {
    Diffuse,
    GlossyDielectric,
    Metallic,
    Emissive,
}

impl MaterialCategory {
    /// Map a selector in [0, 1) onto its bucket.
    /// Lower bounds are inclusive: 0.4 is glossy, 0.6 metallic, 0.9 emissive.
    pub fn from_selector(selector: f32) -> Self {
        if selector < 0.4 {
            MaterialCategory::Diffuse
        } else if selector < 0.6 {
            MaterialCategory::GlossyDielectric
        } else if selector < 0.9 {
            MaterialCategory::Metallic
        } else {
            MaterialCategory::Emissive
        }
    }
}

/// Analytic sphere resting on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub position: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    /// True when the two spheres interpenetrate. Touching spheres do not overlap.
    pub fn overlaps(&self, other: &Sphere) -> bool {
        let min_dist = self.radius + other.radius;
        self.position.distance_squared(other.position) < min_dist * min_dist
    }
}

/// World-space triangle with a flat face normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub normal: Vec3,
    pub material: Material,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        Self {
            v0,
            v1,
            v2,
            normal: face_normal(v0, v1, v2),
            material,
        }
    }
}

/// Normalized `(v1 - v0) x (v2 - v0)`; zero for degenerate triangles.
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}
