use glam::Vec2;
use rand::Rng;

/// `min + u * (max - min)` with `u` uniform in [0, 1). Accepts `min == max`.
pub fn uniform_in_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.gen::<f32>() * (max - min)
}

/// Uniform point inside a disk of the given radius centred on the origin.
pub fn random_in_disk<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec2 {
    let r = radius * rng.gen::<f32>().sqrt();
    let theta = std::f32::consts::TAU * rng.gen::<f32>();
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_in_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(uniform_in_range(&mut rng, 5.0, 5.0), 5.0);
        }
    }

    #[test]
    fn test_uniform_in_range_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            let v = uniform_in_range(&mut rng, 3.0, 8.0);
            assert!((3.0..8.0).contains(&v));
        }
    }

    #[test]
    fn test_disk_points_inside_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(random_in_disk(&mut rng, 100.0).length() <= 100.0 + 1e-3);
        }
    }

    #[test]
    fn test_constant_source_gives_constant_point() {
        let mut rng = StepRng::new(0, 0);
        let a = random_in_disk(&mut rng, 50.0);
        let b = random_in_disk(&mut rng, 50.0);
        assert_eq!(a, b);
        assert_eq!(a, Vec2::ZERO);
    }
}
