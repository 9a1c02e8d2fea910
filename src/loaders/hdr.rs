use anyhow::{Context, Result};
use std::path::Path;

/// Decoded equirectangular environment: RGBA 32-bit float pixels.
#[derive(Debug, Clone)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

/// Decode a Radiance `.hdr` file into linear float RGBA.
pub fn load_hdr(path: impl AsRef<Path>) -> Result<HdrImage> {
    let path = path.as_ref();
    let image = image::open(path)
        .context(format!("Failed to load HDR environment: {:?}", path))?;

    let rgb = image.into_rgb32f();
    let (width, height) = rgb.dimensions();

    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for pixel in rgb.pixels() {
        pixels.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 1.0]);
    }

    log::info!("hdr: decoded {}x{} environment {:?}", width, height, path);
    Ok(HdrImage {
        width,
        height,
        pixels,
    })
}
