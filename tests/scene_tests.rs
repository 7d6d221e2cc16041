use glam::{Quat, Vec3};
use path_tracer::environment::{MaterialDescriptor, MeshGeometry, MeshObject, Transform};
use path_tracer::scene::extraction::skipped_objects;
use path_tracer::scene::{extract_triangles, SceneBuffers, Sphere};
use path_tracer::types::{SphereRecord, TriangleRecord, SPHERE_STRIDE, TRIANGLE_STRIDE};

fn unit_triangle() -> MeshGeometry {
    MeshGeometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2])
}

#[cfg(test)]
mod extraction_tests {
    use super::*;

    #[test]
    fn test_vertices_transformed_to_world() {
        let transform = Transform {
            translation: Vec3::new(10.0, 0.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let objects = vec![MeshObject::new("tri", transform, unit_triangle(), MaterialDescriptor::default())];

        let triangles = extract_triangles(&objects);
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0].v0, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(triangles[0].v1, Vec3::new(12.0, 0.0, 0.0));
        assert_eq!(triangles[0].v2, Vec3::new(10.0, 2.0, 0.0));
        assert!((triangles[0].normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_rotation_turns_normal() {
        let transform = Transform {
            translation: Vec3::ZERO,
            rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        let objects = vec![MeshObject::new("tri", transform, unit_triangle(), MaterialDescriptor::default())];

        let normal = extract_triangles(&objects)[0].normal;
        assert!((normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_faces_follow_index_order_with_one_material() {
        let quad = MeshGeometry::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        let transform = Transform {
            translation: Vec3::new(3.0, -1.0, 2.0),
            rotation: Quat::from_rotation_y(0.7),
            scale: Vec3::new(2.0, 1.0, 1.5),
        };
        let descriptor = MaterialDescriptor {
            base_color: Some(Vec3::new(0.8, 0.2, 0.1)),
            ..Default::default()
        };
        let object = MeshObject::new("quad", transform, quad.clone(), descriptor);
        let local_to_world = object.local_to_world();

        let triangles = extract_triangles(std::slice::from_ref(&object));
        assert_eq!(triangles.len(), 2);

        for (k, triangle) in triangles.iter().enumerate() {
            let corner = |j: usize| local_to_world.transform_point3(quad.positions[quad.indices[3 * k + j] as usize]);
            assert_eq!(triangle.v0, corner(0));
            assert_eq!(triangle.v1, corner(1));
            assert_eq!(triangle.v2, corner(2));
            assert_eq!(triangle.material, triangles[0].material);
        }
        assert_eq!(triangles[0].material.albedo, Vec3::new(0.8, 0.2, 0.1));
    }

    #[test]
    fn test_missing_collaborators_skipped_in_order() {
        let mut no_geometry = MeshObject::new("a", Transform::IDENTITY, unit_triangle(), MaterialDescriptor::default());
        no_geometry.geometry = None;
        let mut no_material = MeshObject::new("b", Transform::IDENTITY, unit_triangle(), MaterialDescriptor::default());
        no_material.material = None;
        let first = MeshObject::new(
            "c",
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            unit_triangle(),
            MaterialDescriptor::default(),
        );
        let second = MeshObject::new(
            "d",
            Transform::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            unit_triangle(),
            MaterialDescriptor::default(),
        );

        let objects = vec![no_geometry, first, no_material, second];
        let triangles = extract_triangles(&objects);
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[0].v0.x, 1.0);
        assert_eq!(triangles[1].v0.x, 2.0);
        assert_eq!(skipped_objects(&objects), 2);
    }

    #[test]
    fn test_descriptor_defaults_resolve_to_white_glossy() {
        let objects = vec![MeshObject::new("tri", Transform::IDENTITY, unit_triangle(), MaterialDescriptor::default())];
        let material = extract_triangles(&objects)[0].material;
        assert_eq!(material.albedo, Vec3::ONE);
        assert_eq!(material.specular, Vec3::ONE);
        assert_eq!(material.smoothness, 0.5);
        assert_eq!(material.emission, Vec3::ZERO);
    }

    #[test]
    fn test_emission_carried_through() {
        let descriptor = MaterialDescriptor {
            emission: Some(Vec3::new(2.0, 1.0, 0.5)),
            ..Default::default()
        };
        let objects = vec![MeshObject::new("lamp", Transform::IDENTITY, unit_triangle(), descriptor)];
        assert_eq!(extract_triangles(&objects)[0].material.emission, Vec3::new(2.0, 1.0, 0.5));
    }
}

#[cfg(test)]
mod buffer_tests {
    use super::*;
    use path_tracer::scene::Material;

    #[test]
    fn test_sphere_bytes_follow_record_layout() {
        let sphere = Sphere {
            position: Vec3::new(1.0, 2.0, 3.0),
            radius: 2.0,
            material: Material {
                albedo: Vec3::new(0.1, 0.2, 0.3),
                specular: Vec3::splat(0.04),
                smoothness: 0.0,
                emission: Vec3::ZERO,
            },
        };
        let buffers = SceneBuffers::pack(&[sphere], &[]);
        let bytes = buffers.sphere_bytes();
        assert_eq!(bytes.len(), SPHERE_STRIDE);

        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(&floats[0..4], &[1.0, 2.0, 3.0, 2.0]);
        assert_eq!(&floats[4..7], &[0.1, 0.2, 0.3]);

        let record: SphereRecord = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(record, SphereRecord::from(&sphere));
    }

    #[test]
    fn test_triangle_records_in_extraction_order() {
        let objects = vec![
            MeshObject::new("a", Transform::IDENTITY, unit_triangle(), MaterialDescriptor::default()),
            MeshObject::new(
                "b",
                Transform::from_translation(Vec3::new(0.0, 0.0, -5.0)),
                unit_triangle(),
                MaterialDescriptor::default(),
            ),
        ];
        let triangles = extract_triangles(&objects);
        let buffers = SceneBuffers::pack(&[], &triangles);

        assert_eq!(buffers.triangle_count(), 2);
        assert_eq!(buffers.triangle_bytes().len(), 2 * TRIANGLE_STRIDE);
        let records: &[TriangleRecord] = buffers.triangles();
        assert_eq!(records[1].v0, [0.0, 0.0, -5.0]);
        assert_eq!(records[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_empty_lists_still_upload_one_record() {
        let buffers = SceneBuffers::pack(&[], &[]);
        assert_eq!(buffers.sphere_count(), 0);
        assert_eq!(buffers.triangle_count(), 0);
        assert!(buffers.sphere_bytes().is_empty());
        assert_eq!(buffers.sphere_upload_bytes().len(), SPHERE_STRIDE);
        assert_eq!(buffers.triangle_upload_bytes().len(), TRIANGLE_STRIDE);
    }
}
