use glam::Vec3;
use path_tracer::core::ChangeTracker;
use path_tracer::environment::{
    Camera, DirectionalLight, Environment, MaterialDescriptor, MeshGeometry, MeshObject, Transform,
};

fn environment_with_meshes(count: usize) -> Environment {
    let objects = (0..count)
        .map(|i| {
            MeshObject::new(
                format!("mesh{}", i),
                Transform::from_translation(Vec3::new(i as f32, 0.0, 0.0)),
                MeshGeometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]),
                MaterialDescriptor::default(),
            )
        })
        .collect();
    Environment::new(Camera::default(), DirectionalLight::default(), objects)
}

fn primed(env: &mut Environment) -> ChangeTracker {
    let mut tracker = ChangeTracker::new();
    tracker.watch(env.tracked_entities());
    tracker.poll(env);
    tracker
}

#[cfg(test)]
mod change_tracker_tests {
    use super::*;

    #[test]
    fn test_quiet_environment_reports_nothing() {
        let mut env = environment_with_meshes(2);
        let mut tracker = primed(&mut env);
        assert!(!tracker.poll(&mut env).any());
    }

    #[test]
    fn test_camera_move_reported_once() {
        let mut env = environment_with_meshes(0);
        let mut tracker = primed(&mut env);

        env.camera.transform.set(Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        assert!(tracker.poll(&mut env).transforms);
        assert!(!tracker.poll(&mut env).transforms);
    }

    #[test]
    fn test_rewriting_same_value_counts_as_change() {
        let mut env = environment_with_meshes(1);
        let mut tracker = primed(&mut env);

        let same = *env.mesh_objects[0].transform.get();
        env.mesh_objects[0].transform.set(same);
        assert!(tracker.poll(&mut env).transforms);
    }

    #[test]
    fn test_every_dirty_flag_cleared_in_one_poll() {
        let mut env = environment_with_meshes(3);
        let mut tracker = primed(&mut env);

        env.light.transform.modify(|t| t.translation.y += 1.0);
        for object in &mut env.mesh_objects {
            object.transform.modify(|t| t.translation.z -= 1.0);
        }

        assert!(tracker.poll(&mut env).transforms);
        assert!(!env.light.transform.has_changed());
        assert!(env.mesh_objects.iter().all(|o| !o.transform.has_changed()));
    }

    #[test]
    fn test_field_of_view_change_is_not_a_transform_change() {
        let mut env = environment_with_meshes(0);
        let mut tracker = primed(&mut env);

        env.camera.field_of_view = 75.0;
        let changes = tracker.poll(&mut env);
        assert!(changes.field_of_view);
        assert!(!changes.transforms);
        assert_eq!(tracker.last_field_of_view(), Some(75.0));
    }

    #[test]
    fn test_unwatched_mesh_ignored_until_watch_refreshed() {
        let mut env = environment_with_meshes(1);
        let mut tracker = primed(&mut env);

        env.mesh_objects.push(env.mesh_objects[0].clone());
        env.mesh_objects[1].transform.modify(|t| t.scale = Vec3::splat(2.0));
        assert!(!tracker.poll(&mut env).transforms);

        tracker.watch(env.tracked_entities());
        assert!(tracker.poll(&mut env).transforms);
    }
}
