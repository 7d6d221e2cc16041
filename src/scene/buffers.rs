use super::{Sphere, Triangle};
use crate::types::{SphereRecord, TriangleRecord};

/// Fixed-layout sphere and triangle records, ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneBuffers {
    spheres: Vec<SphereRecord>,
    triangles: Vec<TriangleRecord>,
}

impl SceneBuffers {
    pub fn pack(spheres: &[Sphere], triangles: &[Triangle]) -> Self {
        Self {
            spheres: spheres.iter().map(SphereRecord::from).collect(),
            triangles: triangles.iter().map(TriangleRecord::from).collect(),
        }
    }

    pub fn sphere_count(&self) -> u32 {
        self.spheres.len() as u32
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangles.len() as u32
    }

    pub fn spheres(&self) -> &[SphereRecord] {
        &self.spheres
    }

    pub fn triangles(&self) -> &[TriangleRecord] {
        &self.triangles
    }

    pub fn sphere_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spheres)
    }

    pub fn triangle_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    /// Sphere bytes for binding; an empty list becomes one zeroed record
    /// because zero-sized storage bindings are invalid.
    pub fn sphere_upload_bytes(&self) -> Vec<u8> {
        upload_bytes(&self.spheres)
    }

    /// Triangle bytes for binding; same empty-list rule as spheres
    pub fn triangle_upload_bytes(&self) -> Vec<u8> {
        upload_bytes(&self.triangles)
    }
}

fn upload_bytes<T: bytemuck::Pod + Default>(records: &[T]) -> Vec<u8> {
    if records.is_empty() {
        bytemuck::bytes_of(&T::default()).to_vec()
    } else {
        bytemuck::cast_slice(records).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Material;
    use crate::types::{SPHERE_STRIDE, TRIANGLE_STRIDE};
    use glam::Vec3;

    #[test]
    fn test_byte_lengths_match_strides() {
        let sphere = Sphere {
            position: Vec3::ONE,
            radius: 1.0,
            material: Material::default(),
        };
        let triangle = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, Material::default());

        let buffers = SceneBuffers::pack(&[sphere, sphere, sphere], &[triangle, triangle]);
        assert_eq!(buffers.sphere_bytes().len(), 3 * SPHERE_STRIDE);
        assert_eq!(buffers.triangle_bytes().len(), 2 * TRIANGLE_STRIDE);
    }

    #[test]
    fn test_empty_scene_uploads_placeholder_record() {
        let buffers = SceneBuffers::default();
        assert_eq!(buffers.sphere_count(), 0);
        assert_eq!(buffers.sphere_upload_bytes().len(), SPHERE_STRIDE);
        assert_eq!(buffers.triangle_upload_bytes().len(), TRIANGLE_STRIDE);
        assert!(buffers.triangle_upload_bytes().iter().all(|&b| b == 0));
    }
}
