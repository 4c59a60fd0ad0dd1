use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use image::{RgbImage, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::Size;

/// Largest size with the source's aspect ratio that fits inside `target`.
///
/// The binding side equals the target exactly; the other side is the floor of
/// the exact rational product, never below one pixel. Integer arithmetic keeps
/// the result free of float rounding.
pub fn fit_dimensions(source: Size, target: Size) -> Size {
    let (sw, sh) = (source.width as u64, source.height as u64);
    let (tw, th) = (target.width as u64, target.height as u64);

    if tw * sh <= th * sw {
        // width binds
        let h = (sh * tw / sw).clamp(1, th);
        Size::new(target.width, h as u32)
    } else {
        let w = (sw * th / sh).clamp(1, tw);
        Size::new(w as u32, target.height)
    }
}

fn resize_u8_buffer(
    data: &[u8],
    src: Size,
    dst: Size,
    pixel_type: PixelType,
    filter: FilterType,
) -> Result<Vec<u8>> {
    let resize_options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(filter));
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(src.width, src.height, data.to_vec(), pixel_type)
        .map_err(Error::resize)?;
    let mut dst_image = Image::new(dst.width, dst.height, pixel_type);
    resizer
        .resize(&src_image, &mut dst_image, &resize_options)
        .map_err(Error::resize)?;

    Ok(dst_image.into_vec())
}

/// Resample an RGB image to exactly `dst` with the given convolution filter.
pub fn resize_rgb_image(src: &RgbImage, dst: Size, filter: FilterType) -> Result<RgbImage> {
    let src_size = Size::new(src.width(), src.height());
    if src_size == dst {
        return Ok(src.clone());
    }
    if src_size.is_empty() || dst.is_empty() {
        return Err(Error::Resize(format!("cannot resize {} to {}", src_size, dst)));
    }
    debug!("Resizing RGB {} -> {} ({:?})", src_size, dst, filter);

    let out = resize_u8_buffer(src.as_raw(), src_size, dst, PixelType::U8x3, filter)?;
    RgbImage::from_raw(dst.width, dst.height, out)
        .ok_or_else(|| Error::Resize(format!("resized buffer does not match {}", dst)))
}

/// Resample an RGBA image to exactly `dst`. Alpha is premultiplied during
/// convolution so transparent pixels do not bleed color.
pub fn resize_rgba_image(src: &RgbaImage, dst: Size, filter: FilterType) -> Result<RgbaImage> {
    let src_size = Size::new(src.width(), src.height());
    if src_size == dst {
        return Ok(src.clone());
    }
    if src_size.is_empty() || dst.is_empty() {
        return Err(Error::Resize(format!("cannot resize {} to {}", src_size, dst)));
    }
    debug!("Resizing RGBA {} -> {} ({:?})", src_size, dst, filter);

    let out = resize_u8_buffer(src.as_raw(), src_size, dst, PixelType::U8x4, filter)?;
    RgbaImage::from_raw(dst.width, dst.height, out)
        .ok_or_else(|| Error::Resize(format!("resized buffer does not match {}", dst)))
}
