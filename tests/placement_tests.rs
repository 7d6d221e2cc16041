use path_tracer::scene::{generate_spheres, RadiusRange, SphereSettings};
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Counts every value pulled from the wrapped source
struct DrawCounter<R> {
    inner: R,
    draws: usize,
}

impl<R: RngCore> RngCore for DrawCounter<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += 1;
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws += 1;
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod placement_tests {
    use super::*;

    #[test]
    fn test_accepted_spheres_never_overlap() {
        let mut rng = StdRng::seed_from_u64(42);
        let settings = SphereSettings {
            count: 300,
            placement_radius: 60.0,
            ..Default::default()
        };

        let spheres = generate_spheres(&mut rng, &settings);
        assert!(!spheres.is_empty());

        for (i, a) in spheres.iter().enumerate() {
            for b in &spheres[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a.position, b.position);
            }
        }
    }

    #[test]
    fn test_crowded_field_drops_slots() {
        let mut rng = StdRng::seed_from_u64(7);
        let settings = SphereSettings {
            count: 200,
            radius: RadiusRange::fixed(5.0),
            placement_radius: 20.0,
            max_retries: 3,
            ..Default::default()
        };

        let spheres = generate_spheres(&mut rng, &settings);
        assert!(spheres.len() < 200);
    }

    #[test]
    fn test_radius_and_position_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let settings = SphereSettings {
            count: 150,
            radius: RadiusRange::new(1.0, 4.0),
            placement_radius: 80.0,
            ..Default::default()
        };

        for sphere in generate_spheres(&mut rng, &settings) {
            assert!(settings.radius.contains(sphere.radius));
            assert_eq!(sphere.position.y, sphere.radius);
            let planar = glam::Vec2::new(sphere.position.x, sphere.position.z);
            assert!(planar.length() <= settings.placement_radius + 1e-3);
        }
    }

    #[test]
    fn test_constant_random_source_places_one_sphere() {
        let mut rng = StepRng::new(0, 0);
        let settings = SphereSettings {
            count: 2,
            radius: RadiusRange::fixed(5.0),
            ..Default::default()
        };

        let spheres = generate_spheres(&mut rng, &settings);
        assert_eq!(spheres.len(), 1);
        assert_eq!(spheres[0].radius, 5.0);
    }

    #[test]
    fn test_each_slot_gets_retry_budget_plus_one_attempts() {
        let mut rng = DrawCounter {
            inner: StepRng::new(0, 0),
            draws: 0,
        };
        let settings = SphereSettings {
            count: 2,
            radius: RadiusRange::fixed(5.0),
            max_retries: 10,
            ..Default::default()
        };

        let spheres = generate_spheres(&mut rng, &settings);
        assert_eq!(spheres.len(), 1);
        // first slot: one attempt (radius + disk) and a diffuse material (colour + selector),
        // second slot: eleven rejected attempts
        assert_eq!(rng.draws, 3 + 4 + 11 * 3);
    }

    #[test]
    fn test_same_seed_same_field() {
        let settings = SphereSettings::default();
        let a = generate_spheres(&mut StdRng::seed_from_u64(99), &settings);
        let b = generate_spheres(&mut StdRng::seed_from_u64(99), &settings);
        assert_eq!(a, b);
    }
}
