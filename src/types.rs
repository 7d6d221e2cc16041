use glam::{Mat4, Vec3, Vec4};

use crate::scene::{Sphere, Triangle};

/// Per-frame uniform block consumed by the path tracing program
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub camera_to_world: [[f32; 4]; 4],
    pub camera_inverse_projection: [[f32; 4]; 4],
    pub directional_light: [f32; 4], // xyz = forward, w = intensity
    pub pixel_offset: [f32; 2],
    pub seed: f32,
    pub sphere_count: u32,
    pub triangle_count: u32,
    pub _pad: [u32; 3],
}

impl FrameUniforms {
    pub fn new(
        camera_to_world: Mat4,
        camera_inverse_projection: Mat4,
        light_forward: Vec3,
        light_intensity: f32,
        pixel_offset: [f32; 2],
        seed: f32,
    ) -> Self {
        Self {
            camera_to_world: camera_to_world.to_cols_array_2d(),
            camera_inverse_projection: camera_inverse_projection.to_cols_array_2d(),
            directional_light: Vec4::from((light_forward, light_intensity)).to_array(),
            pixel_offset,
            seed,
            sphere_count: 0,
            triangle_count: 0,
            _pad: [0; 3],
        }
    }

    pub fn with_counts(mut self, sphere_count: u32, triangle_count: u32) -> Self {
        self.sphere_count = sphere_count;
        self.triangle_count = triangle_count;
        self
    }
}

/// Uniform block for the running-mean blend pass
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AccumulateUniforms {
    pub sample_count: u32,
    pub _pad: [u32; 3],
}

impl AccumulateUniforms {
    pub fn new(sample_count: u32) -> Self {
        Self {
            sample_count,
            _pad: [0; 3],
        }
    }
}

/// Packed sphere record: 14 tightly packed f32 fields (56 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereRecord {
    pub position: [f32; 3],
    pub radius: f32,
    pub albedo: [f32; 3],
    pub specular: [f32; 3],
    pub smoothness: f32,
    pub emission: [f32; 3],
}

/// Packed triangle record: 22 tightly packed f32 fields (88 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TriangleRecord {
    pub v0: [f32; 3],
    pub v1: [f32; 3],
    pub v2: [f32; 3],
    pub normal: [f32; 3],
    pub albedo: [f32; 3],
    pub specular: [f32; 3],
    pub smoothness: f32,
    pub emission: [f32; 3],
}

pub const SPHERE_STRIDE: usize = 56;
pub const TRIANGLE_STRIDE: usize = 88;
pub const FRAME_UNIFORMS_SIZE: usize = 176;

const _: () = assert!(std::mem::size_of::<SphereRecord>() == SPHERE_STRIDE);
const _: () = assert!(std::mem::size_of::<TriangleRecord>() == TRIANGLE_STRIDE);
const _: () = assert!(std::mem::size_of::<FrameUniforms>() == FRAME_UNIFORMS_SIZE);

impl From<&Sphere> for SphereRecord {
    fn from(sphere: &Sphere) -> Self {
        Self {
            position: sphere.position.to_array(),
            radius: sphere.radius,
            albedo: sphere.material.albedo.to_array(),
            specular: sphere.material.specular.to_array(),
            smoothness: sphere.material.smoothness,
            emission: sphere.material.emission.to_array(),
        }
    }
}

impl From<&Triangle> for TriangleRecord {
    fn from(triangle: &Triangle) -> Self {
        Self {
            v0: triangle.v0.to_array(),
            v1: triangle.v1.to_array(),
            v2: triangle.v2.to_array(),
            normal: triangle.normal.to_array(),
            albedo: triangle.material.albedo.to_array(),
            specular: triangle.material.specular.to_array(),
            smoothness: triangle.material.smoothness,
            emission: triangle.material.emission.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Material;

    #[test]
    fn test_sphere_record_field_order() {
        let sphere = Sphere {
            position: Vec3::new(1.0, 2.0, 3.0),
            radius: 4.0,
            material: Material {
                albedo: Vec3::new(5.0, 6.0, 7.0),
                specular: Vec3::new(8.0, 9.0, 10.0),
                smoothness: 11.0,
                emission: Vec3::new(12.0, 13.0, 14.0),
            },
        };

        let record = SphereRecord::from(&sphere);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&record));
        let expected: Vec<f32> = (1..=14).map(|i| i as f32).collect();
        assert_eq!(floats, expected.as_slice());
    }

    #[test]
    fn test_triangle_record_field_order() {
        let triangle = Triangle {
            v0: Vec3::new(1.0, 2.0, 3.0),
            v1: Vec3::new(4.0, 5.0, 6.0),
            v2: Vec3::new(7.0, 8.0, 9.0),
            normal: Vec3::new(10.0, 11.0, 12.0),
            material: Material {
                albedo: Vec3::new(13.0, 14.0, 15.0),
                specular: Vec3::new(16.0, 17.0, 18.0),
                smoothness: 19.0,
                emission: Vec3::new(20.0, 21.0, 22.0),
            },
        };

        let record = TriangleRecord::from(&triangle);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&record));
        let expected: Vec<f32> = (1..=22).map(|i| i as f32).collect();
        assert_eq!(floats, expected.as_slice());
    }

    #[test]
    fn test_frame_uniforms_light_packing() {
        let uniforms = FrameUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::new(0.0, -1.0, 0.0),
            1.5,
            [0.25, 0.75],
            0.5,
        )
        .with_counts(3, 7);

        assert_eq!(uniforms.directional_light, [0.0, -1.0, 0.0, 1.5]);
        assert_eq!(uniforms.pixel_offset, [0.25, 0.75]);
        assert_eq!(uniforms.sphere_count, 3);
        assert_eq!(uniforms.triangle_count, 7);
    }
}
