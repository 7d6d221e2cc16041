//! Host-side world the core observes: camera, directional light and mesh
//! objects, each carrying a transform with an environment-owned dirty flag.

use glam::{Mat4, Quat, Vec3};

pub const DEFAULT_FIELD_OF_VIEW: f32 = 60.0;
pub const DEFAULT_NEAR: f32 = 0.3;
pub const DEFAULT_FAR: f32 = 1000.0;

/// Rigid transform with non-uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Rotation that turns the local forward axis (-Z) toward `direction`
    pub fn looking_along(translation: Vec3, direction: Vec3) -> Self {
        let mut direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = Vec3::NEG_Z;
        }
        let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, direction);
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn local_to_world(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// World-space forward direction (local -Z)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A value plus a dirty flag set on every write and consumed by polling
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    value: T,
    changed: bool,
}

impl<T> Tracked<T> {
    /// Starts clean; the initial value is not a change
    pub fn new(value: T) -> Self {
        Self {
            value,
            changed: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and mark it changed, even if equal
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.changed = true;
    }

    /// Mutate in place and mark it changed
    pub fn modify(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.changed = true;
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Read and clear the dirty flag
    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Perspective camera; the view anchor of the scene
#[derive(Debug, Clone)]
pub struct Camera {
    pub transform: Tracked<Transform>,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(transform: Transform, field_of_view: f32) -> Self {
        Self {
            transform: Tracked::new(transform),
            field_of_view,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }

    /// Camera-to-world matrix, scale excluded
    pub fn camera_to_world(&self) -> Mat4 {
        let t = self.transform.get();
        Mat4::from_rotation_translation(t.rotation, t.translation)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.field_of_view.to_radians(), aspect, self.near, self.far)
    }

    pub fn inverse_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect).inverse()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Transform::IDENTITY, DEFAULT_FIELD_OF_VIEW)
    }
}

/// Directional light; only its orientation and intensity matter
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub transform: Tracked<Transform>,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, intensity: f32) -> Self {
        Self {
            transform: Tracked::new(Transform::looking_along(Vec3::ZERO, direction)),
            intensity,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.get().forward()
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(-0.3, -1.0, -0.5), 1.0)
    }
}

/// Object-local vertex positions and a triangle index list grouped in threes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when every index addresses an existing vertex
    pub fn indices_in_bounds(&self) -> bool {
        let len = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < len)
    }
}

/// Material description with optional fields; see [`MaterialDescriptor::resolve`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MaterialDescriptor {
    pub base_color: Option<Vec3>,
    pub metallic: Option<f32>,
    pub smoothness: Option<f32>,
    /// `Some` when emission is enabled
    pub emission: Option<Vec3>,
}

/// Descriptor fields after defaults are applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMaterial {
    pub base_color: Vec3,
    pub metallic: f32,
    pub smoothness: f32,
    pub emission: Vec3,
}

impl MaterialDescriptor {
    pub const DEFAULT_BASE_COLOR: Vec3 = Vec3::ONE;
    pub const DEFAULT_METALLIC: f32 = 0.0;
    pub const DEFAULT_SMOOTHNESS: f32 = 0.5;

    pub fn resolve(&self) -> ResolvedMaterial {
        ResolvedMaterial {
            base_color: self.base_color.unwrap_or(Self::DEFAULT_BASE_COLOR),
            metallic: self.metallic.unwrap_or(Self::DEFAULT_METALLIC),
            smoothness: self.smoothness.unwrap_or(Self::DEFAULT_SMOOTHNESS),
            emission: self.emission.unwrap_or(Vec3::ZERO),
        }
    }
}

/// Mesh collaborator: a transform plus optional geometry and material
#[derive(Debug, Clone)]
pub struct MeshObject {
    pub name: String,
    pub transform: Tracked<Transform>,
    pub geometry: Option<MeshGeometry>,
    pub material: Option<MaterialDescriptor>,
}

impl MeshObject {
    pub fn new(
        name: impl Into<String>,
        transform: Transform,
        geometry: MeshGeometry,
        material: MaterialDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Tracked::new(transform),
            geometry: Some(geometry),
            material: Some(material),
        }
    }

    pub fn local_to_world(&self) -> Mat4 {
        self.transform.get().local_to_world()
    }
}

/// Handle to a transform-bearing collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedEntity {
    Camera,
    Light,
    MeshObject(usize),
}

/// What the change tracker needs from the environment
pub trait TransformSource {
    /// Read and clear the entity's dirty flag. Unknown entities report false.
    fn take_changed(&mut self, entity: TrackedEntity) -> bool;

    /// Current vertical field of view of the watched camera, in degrees
    fn field_of_view(&self) -> f32;
}

/// Everything the host exposes to the core
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub camera: Camera,
    pub light: DirectionalLight,
    pub mesh_objects: Vec<MeshObject>,
}

impl Environment {
    pub fn new(camera: Camera, light: DirectionalLight, mesh_objects: Vec<MeshObject>) -> Self {
        Self {
            camera,
            light,
            mesh_objects,
        }
    }

    /// Camera, light, then every mesh object, in order
    pub fn tracked_entities(&self) -> Vec<TrackedEntity> {
        let mut entities = vec![TrackedEntity::Camera, TrackedEntity::Light];
        entities.extend((0..self.mesh_objects.len()).map(TrackedEntity::MeshObject));
        entities
    }
}

impl TransformSource for Environment {
    fn take_changed(&mut self, entity: TrackedEntity) -> bool {
        match entity {
            TrackedEntity::Camera => self.camera.transform.take_changed(),
            TrackedEntity::Light => self.light.transform.take_changed(),
            TrackedEntity::MeshObject(index) => self
                .mesh_objects
                .get_mut(index)
                .map(|object| object.transform.take_changed())
                .unwrap_or(false),
        }
    }

    fn field_of_view(&self) -> f32 {
        self.camera.field_of_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracked_starts_clean() {
        let tracked = Tracked::new(Transform::IDENTITY);
        assert!(!tracked.has_changed());
    }

    #[test]
    fn test_tracked_take_changed_consumes_flag() {
        let mut tracked = Tracked::new(1);
        tracked.set(1);
        assert!(tracked.take_changed());
        assert!(!tracked.take_changed());

        tracked.modify(|v| *v += 1);
        assert_eq!(*tracked.get(), 2);
        assert!(tracked.take_changed());
    }

    #[test]
    fn test_material_defaults() {
        let resolved = MaterialDescriptor::default().resolve();
        assert_eq!(resolved.base_color, Vec3::ONE);
        assert_eq!(resolved.metallic, 0.0);
        assert_eq!(resolved.smoothness, 0.5);
        assert_eq!(resolved.emission, Vec3::ZERO);
    }

    #[test]
    fn test_light_forward_follows_direction() {
        let light = DirectionalLight::new(Vec3::new(0.0, -1.0, 0.0), 2.0);
        assert!((light.forward() - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_transform_matrix_roundtrip() {
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };
        let back = Transform::from_matrix(transform.local_to_world());
        assert!((back.translation - transform.translation).length() < 1e-5);
        assert!((back.scale - transform.scale).length() < 1e-5);
    }

    #[test]
    fn test_tracked_entities_order() {
        let mut env = Environment::default();
        env.mesh_objects.push(MeshObject::new(
            "a",
            Transform::IDENTITY,
            MeshGeometry::default(),
            MaterialDescriptor::default(),
        ));
        assert_eq!(
            env.tracked_entities(),
            vec![
                TrackedEntity::Camera,
                TrackedEntity::Light,
                TrackedEntity::MeshObject(0)
            ]
        );
    }

    #[test]
    fn test_unknown_mesh_entity_reports_unchanged() {
        let mut env = Environment::default();
        assert!(!env.take_changed(TrackedEntity::MeshObject(3)));
    }
}
