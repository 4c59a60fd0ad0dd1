use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{Error, Result};

/// Encode interleaved RGB pixels as an 8-bit PNG.
pub fn encode_rgb_png(width: u32, height: u32, rgb_data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(rgb_data, width, height, ExtendedColorType::Rgb8)
        .map_err(Error::encode)?;
    Ok(out)
}
