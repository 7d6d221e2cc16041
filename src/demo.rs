use glam::{Quat, Vec3};

use crate::environment::{MaterialDescriptor, MeshGeometry, MeshObject, Transform};

// ============================================================================
// Geometry - Object-local meshes
// ============================================================================

/// Square pyramid: 4 sides plus a 2-triangle base, apex on +Y
pub fn pyramid_geometry(half_size: f32, height: f32) -> MeshGeometry {
    let positions = vec![
        Vec3::new(-half_size, 0.0, -half_size),
        Vec3::new(half_size, 0.0, -half_size),
        Vec3::new(half_size, 0.0, half_size),
        Vec3::new(-half_size, 0.0, half_size),
        Vec3::new(0.0, height, 0.0),
    ];
    let indices = vec![
        0, 1, 4, // front
        1, 2, 4, // right
        2, 3, 4, // back
        3, 0, 4, // left
        0, 2, 1, // base
        0, 3, 2,
    ];
    MeshGeometry::new(positions, indices)
}

/// Axis-aligned box centred on the origin, outward winding
pub fn box_geometry(size: Vec3) -> MeshGeometry {
    let h = size * 0.5;
    let positions = vec![
        Vec3::new(-h.x, -h.y, -h.z),
        Vec3::new(h.x, -h.y, -h.z),
        Vec3::new(h.x, h.y, -h.z),
        Vec3::new(-h.x, h.y, -h.z),
        Vec3::new(-h.x, -h.y, h.z),
        Vec3::new(h.x, -h.y, h.z),
        Vec3::new(h.x, h.y, h.z),
        Vec3::new(-h.x, h.y, h.z),
    ];
    let indices = vec![
        4, 5, 6, 4, 6, 7, // +z
        1, 0, 3, 1, 3, 2, // -z
        5, 1, 2, 5, 2, 6, // +x
        0, 4, 7, 0, 7, 3, // -x
        7, 6, 2, 7, 2, 3, // +y
        0, 1, 5, 0, 5, 4, // -y
    ];
    MeshGeometry::new(positions, indices)
}

// ============================================================================
// Demo Scene - Used when no glTF file is configured
// ============================================================================

/// A glossy red pyramid and a rotated metallic gold box
pub fn demo_mesh_objects() -> Vec<MeshObject> {
    let pyramid = MeshObject::new(
        "pyramid",
        Transform::from_translation(Vec3::new(-12.0, 0.0, -20.0)),
        pyramid_geometry(6.0, 10.0),
        MaterialDescriptor {
            base_color: Some(Vec3::new(0.9, 0.2, 0.2)),
            metallic: Some(0.0),
            smoothness: Some(0.7),
            emission: None,
        },
    );

    let gold_box = MeshObject::new(
        "box",
        Transform {
            translation: Vec3::new(14.0, 4.0, -16.0),
            rotation: Quat::from_rotation_y(0.6),
            scale: Vec3::ONE,
        },
        box_geometry(Vec3::splat(8.0)),
        MaterialDescriptor {
            base_color: Some(Vec3::new(1.0, 0.78, 0.34)),
            metallic: Some(1.0),
            smoothness: Some(0.9),
            emission: None,
        },
    );

    vec![pyramid, gold_box]
}
