use jpeg_encoder::{ColorType, Encoder};

use crate::error::{Error, Result};

/// Encode interleaved RGB pixels as a baseline JPEG with optimized Huffman tables.
pub fn encode_rgb_jpeg(width: u32, height: u32, rgb_data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::Encode(format!(
                "{}x{} exceeds the JPEG limit of {} pixels per side",
                width,
                height,
                u16::MAX
            )));
        }
    };
    let expected = width as usize * height as usize * 3;
    if rgb_data.len() != expected {
        return Err(Error::Encode(format!(
            "RGB buffer has {} bytes, expected {}",
            rgb_data.len(),
            expected
        )));
    }

    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, quality.clamp(1, 100));
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(rgb_data, w, h, ColorType::Rgb)
        .map_err(Error::encode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_jpeg_markers() {
        let data = vec![128u8; 16 * 8 * 3];
        let bytes = encode_rgb_jpeg(16, 8, &data, 95).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn rejects_oversized_dimensions() {
        assert!(matches!(
            encode_rgb_jpeg(70_000, 1, &[], 95),
            Err(Error::Encode(_))
        ));
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(encode_rgb_jpeg(4, 4, &[0u8; 10], 95).is_err());
    }
}
