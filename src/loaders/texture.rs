use anyhow::{Context, Result};
use std::path::Path;

/// Decoded 8-bit RGBA texture (the tiling normal map).
#[derive(Debug, Clone)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn load_texture(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let image = image::open(path).context(format!("Failed to load texture: {:?}", path))?;

    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();

    log::info!("texture: decoded {}x{} {:?}", width, height, path);
    Ok(RgbaImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
