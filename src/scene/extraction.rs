use glam::Vec3;

use super::{Material, Triangle, DIELECTRIC_SPECULAR};
use crate::environment::{MaterialDescriptor, MeshObject};

/// Convert mesh collaborators into world-space triangles.
///
/// Object order and index order are preserved. An object missing geometry or
/// material, or indexing past its vertex list, contributes nothing.
pub fn extract_triangles(objects: &[MeshObject]) -> Vec<Triangle> {
    let mut triangles = Vec::new();

    for object in objects {
        let (Some(geometry), Some(descriptor)) = (&object.geometry, &object.material) else {
            continue;
        };

        if !geometry.indices_in_bounds() {
            continue;
        }

        let material = resolve_material(descriptor);
        let local_to_world = object.local_to_world();

        triangles.reserve(geometry.triangle_count());
        for face in geometry.indices.chunks_exact(3) {
            let [v0, v1, v2] = [face[0], face[1], face[2]]
                .map(|i| local_to_world.transform_point3(geometry.positions[i as usize]));
            triangles.push(Triangle::new(v0, v1, v2, material));
        }
    }

    triangles
}

/// Object-level material: metallic above 0.5 reflects its base colour,
/// anything else is a dielectric with the Fresnel baseline when rough.
pub fn resolve_material(descriptor: &MaterialDescriptor) -> Material {
    let resolved = descriptor.resolve();

    let (albedo, specular) = if resolved.metallic > 0.5 {
        (Vec3::ZERO, resolved.base_color)
    } else if resolved.smoothness > 0.0 {
        (resolved.base_color, Vec3::ONE)
    } else {
        (resolved.base_color, DIELECTRIC_SPECULAR)
    };

    Material {
        albedo,
        specular,
        smoothness: resolved.smoothness,
        emission: resolved.emission,
    }
}

/// Number of objects `extract_triangles` would skip
pub fn skipped_objects(objects: &[MeshObject]) -> usize {
    objects
        .iter()
        .filter(|object| match (&object.geometry, &object.material) {
            (Some(geometry), Some(_)) => !geometry.indices_in_bounds(),
            _ => true,
        })
        .count()
}
