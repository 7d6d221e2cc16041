use crate::environment::{TrackedEntity, TransformSource};

/// Outcome of one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    /// Some watched transform was written since the previous poll
    pub transforms: bool,
    /// The camera field of view differs from the last observed value
    pub field_of_view: bool,
}

impl Changes {
    pub fn any(&self) -> bool {
        self.transforms || self.field_of_view
    }
}

/// Polls a watch-set of transforms and the camera field of view.
///
/// Polling is destructive: it clears the dirty flag of every watched entity
/// and records the field of view it saw.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    watched: Vec<TrackedEntity>,
    last_field_of_view: Option<f32>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the watch-set
    pub fn watch(&mut self, entities: impl IntoIterator<Item = TrackedEntity>) {
        self.watched.clear();
        self.watched.extend(entities);
    }

    pub fn watched(&self) -> &[TrackedEntity] {
        &self.watched
    }

    pub fn last_field_of_view(&self) -> Option<f32> {
        self.last_field_of_view
    }

    pub fn poll<S: TransformSource + ?Sized>(&mut self, source: &mut S) -> Changes {
        // every flag is consumed, so no short-circuit
        let transforms = self
            .watched
            .iter()
            .fold(false, |changed, &entity| source.take_changed(entity) | changed);

        let fov = source.field_of_view();
        let field_of_view = self.last_field_of_view != Some(fov);
        self.last_field_of_view = Some(fov);

        Changes {
            transforms,
            field_of_view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSource {
        dirty: Vec<bool>,
        consulted: usize,
        fov: f32,
    }

    impl TransformSource for CountingSource {
        fn take_changed(&mut self, entity: TrackedEntity) -> bool {
            self.consulted += 1;
            match entity {
                TrackedEntity::MeshObject(i) => std::mem::replace(&mut self.dirty[i], false),
                _ => false,
            }
        }

        fn field_of_view(&self) -> f32 {
            self.fov
        }
    }

    #[test]
    fn test_all_flags_consumed_even_after_first_hit() {
        let mut source = CountingSource {
            dirty: vec![true, true, true],
            consulted: 0,
            fov: 60.0,
        };
        let mut tracker = ChangeTracker::new();
        tracker.watch((0..3).map(TrackedEntity::MeshObject));

        assert!(tracker.poll(&mut source).transforms);
        assert_eq!(source.consulted, 3);
        assert!(source.dirty.iter().all(|d| !d));
    }

    #[test]
    fn test_first_poll_observes_field_of_view() {
        let mut source = CountingSource {
            dirty: vec![],
            consulted: 0,
            fov: 45.0,
        };
        let mut tracker = ChangeTracker::new();

        let first = tracker.poll(&mut source);
        assert!(first.field_of_view);
        assert!(!first.transforms);
        assert_eq!(tracker.last_field_of_view(), Some(45.0));
        assert!(!tracker.poll(&mut source).any());
    }
}
