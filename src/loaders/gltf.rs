use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use log::{debug, info};
use std::path::Path;

use crate::environment::{MaterialDescriptor, MeshGeometry, MeshObject, Transform};

/// Loads a glTF file as one mesh object per primitive.
///
/// Positions stay object-local; the node hierarchy's world matrix becomes the
/// object's transform so moving it later re-extracts correctly.
pub fn load_mesh_objects(path: impl AsRef<Path>) -> Result<Vec<MeshObject>> {
    let path = path.as_ref();
    info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, _images) =
        gltf::import(path).with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    debug!(
        "glTF contents: {} scenes, {} nodes, {} meshes, {} materials",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count(),
        gltf.materials().count()
    );

    let mut objects = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &Mat4::IDENTITY, &mut objects)?;
        }
    }

    info!("Loaded {} mesh objects from {:?}", objects.len(), path);
    Ok(objects)
}

/// Recursively walks glTF nodes, composing transforms
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    objects: &mut Vec<MeshObject>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, objects)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, objects)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    objects: &mut Vec<MeshObject>,
) -> Result<()> {
    let mesh_name = mesh
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh{}", mesh.index()));

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping non-triangle primitive in {}", mesh_name);
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(Vec3::from_array)
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let material = material_descriptor(&primitive.material());

        objects.push(MeshObject::new(
            format!("{}/{}", mesh_name, primitive.index()),
            Transform::from_matrix(*transform),
            MeshGeometry::new(positions, indices),
            material,
        ));
    }

    Ok(())
}

/// PBR metallic-roughness block as a material descriptor.
/// The glTF default material leaves every field unset.
fn material_descriptor(material: &gltf::Material) -> MaterialDescriptor {
    if material.index().is_none() {
        return MaterialDescriptor::default();
    }

    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let emissive = Vec3::from_array(material.emissive_factor());

    MaterialDescriptor {
        base_color: Some(Vec3::new(r, g, b)),
        metallic: Some(pbr.metallic_factor()),
        smoothness: Some(1.0 - pbr.roughness_factor()),
        emission: (emissive != Vec3::ZERO).then_some(emissive),
    }
}
