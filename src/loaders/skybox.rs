use std::borrow::Cow;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use glam::Vec3;
use image::{GenericImageView, ImageReader};
use log::warn;

/// Equirectangular sky in linear RGBA32F
#[derive(Debug, Clone, PartialEq)]
pub struct Skybox {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl Skybox {
    /// Single-colour sky used when no image is configured or loading fails
    pub fn flat(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![[color.x, color.y, color.z, 1.0]],
        }
    }

    /// True when both sides fit within a 2D texture limit
    pub fn fits(&self, max_dimension: u32) -> bool {
        self.width <= max_dimension && self.height <= max_dimension
    }

    /// This sky when it fits `max_dimension`, otherwise the default flat sky
    pub fn within_limit(&self, max_dimension: u32) -> Cow<'_, Skybox> {
        if self.fits(max_dimension) {
            return Cow::Borrowed(self);
        }
        warn!(
            "Skybox {}x{} exceeds the {} texel texture limit; using a flat sky",
            self.width, self.height, max_dimension
        );
        Cow::Owned(Skybox::default())
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

impl Default for Skybox {
    fn default() -> Self {
        Self::flat(Vec3::new(0.6, 0.7, 0.9))
    }
}

/// Load an equirectangular image; `.hdr` keeps radiance above 1.0
pub fn load_skybox(path: impl AsRef<Path>) -> Result<Skybox> {
    let path = path.as_ref();

    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open skybox image: {:?}", path))?
        .decode()
        .with_context(|| format!("Failed to decode skybox image: {:?}", path))?;
    let (width, height) = img.dimensions();
    ensure!(width > 0 && height > 0, "Skybox image {:?} is empty", path);

    let rgba = img.to_rgba32f();
    let pixels = rgba
        .as_raw()
        .chunks_exact(4)
        .map(|px| [px[0], px[1], px[2], px[3]])
        .collect();

    log::info!("Loaded skybox {:?} ({}x{})", path, width, height);

    Ok(Skybox {
        width,
        height,
        pixels,
    })
}
