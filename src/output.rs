use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageBuffer, Rgb, Rgb32FImage};

use crate::core::accumulation::HostImage;

const DISPLAY_GAMMA: f32 = 1.0 / 2.2;

/// Write an accumulated image to disk.
///
/// `.hdr` stores linear float radiance; every other extension gets an 8-bit
/// image clamped to [0, 1] with display gamma applied.
pub fn save_image(image: &HostImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let extent = image.extent();

    let is_hdr = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("hdr"));

    let dynamic = if is_hdr {
        let data: Vec<f32> = image.pixels().iter().flat_map(|p| [p[0], p[1], p[2]]).collect();
        let buffer: Rgb32FImage = ImageBuffer::from_raw(extent.width, extent.height, data)
            .context("Pixel count does not match image extent")?;
        DynamicImage::ImageRgb32F(buffer)
    } else {
        let data: Vec<u8> = image
            .pixels()
            .iter()
            .flat_map(|p| [to_display_byte(p[0]), to_display_byte(p[1]), to_display_byte(p[2])])
            .collect();
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_raw(extent.width, extent.height, data)
                .context("Pixel count does not match image extent")?;
        DynamicImage::ImageRgb8(buffer)
    };

    dynamic
        .save(path)
        .with_context(|| format!("Failed to save image: {:?}", path))?;
    log::info!("Wrote {}x{} image to {:?}", extent.width, extent.height, path);
    Ok(())
}

fn to_display_byte(linear: f32) -> u8 {
    let v = linear.max(0.0).powf(DISPLAY_GAMMA).min(1.0);
    (v * 255.0).round() as u8
}
