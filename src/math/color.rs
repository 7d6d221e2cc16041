use glam::Vec3;
use rand::Rng;

use super::sampling::uniform_in_range;

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let h_prime = (h.rem_euclid(1.0) * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

/// Random colour with hue and saturation uniform in [0, 1) and value uniform
/// in `value_range`. A value above 1 yields an HDR colour.
pub fn random_color_hsv<R: Rng + ?Sized>(rng: &mut R, value_range: (f32, f32)) -> Vec3 {
    let hue = rng.gen::<f32>();
    let saturation = rng.gen::<f32>();
    let value = uniform_in_range(rng, value_range.0, value_range.1);
    hsv_to_rgb(hue, saturation, value)
}
