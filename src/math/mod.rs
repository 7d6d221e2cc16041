mod color;
mod sampling;

pub use color::{hsv_to_rgb, random_color_hsv};
pub use sampling::{random_in_disk, uniform_in_range};
