//! Backdrop synthesis for padded canvases.
use fast_image_resize::FilterType;
use image::{DynamicImage, Rgb, RgbImage, imageops};
use tracing::debug;

use crate::core::params::BackdropParams;
use crate::core::processing::ops::{adjust_brightness, adjust_color, flatten_onto};
use crate::core::processing::resize::resize_rgb_image;
use crate::error::{Error, Result};
use crate::types::{BackdropStyle, Size};

/// Blur sigma that is still run at full resolution; larger sigmas blur a
/// proportionally reduced raster.
const FULL_RES_BLUR_SIGMA: f32 = 8.0;

fn to_rgb(image: &DynamicImage, fill: [u8; 3]) -> RgbImage {
    if image.color().has_alpha() {
        flatten_onto(&image.to_rgba8(), fill)
    } else {
        image.to_rgb8()
    }
}

/// Gaussian blur of `img` with `sigma` measured in `img` pixels.
fn blur_scaled(img: &RgbImage, sigma: f32) -> Result<RgbImage> {
    if sigma <= 0.0 {
        return Ok(img.clone());
    }
    let size = Size::new(img.width(), img.height());
    let work_scale = (sigma / FULL_RES_BLUR_SIGMA).max(1.0);
    if work_scale <= 1.0 {
        return Ok(imageops::blur(img, sigma));
    }

    let reduced = Size::new(
        ((size.width as f32 / work_scale).round() as u32).max(1),
        ((size.height as f32 / work_scale).round() as u32).max(1),
    );
    debug!(
        "Blurring backdrop on {} raster (sigma {:.1} -> {:.1})",
        reduced,
        sigma,
        sigma / work_scale
    );
    let small = resize_rgb_image(img, reduced, FilterType::Bilinear)?;
    let blurred = imageops::blur(&small, sigma / work_scale);
    resize_rgb_image(&blurred, size, FilterType::Bilinear)
}

/// Build the background a scaled source is pasted onto.
///
/// `Blurred` stretches the whole source to `target`, blurs it heavily and mutes
/// it (brightness then saturation). `Solid` is a flat fill.
pub fn synthesize(image: &DynamicImage, target: Size, params: &BackdropParams) -> Result<RgbImage> {
    if target.is_empty() {
        return Err(Error::Resize(format!("cannot synthesize backdrop of {}", target)));
    }
    match params.style {
        BackdropStyle::Solid => Ok(RgbImage::from_pixel(target.width, target.height, Rgb(params.fill))),
        BackdropStyle::Blurred => {
            let rgb = to_rgb(image, params.fill);
            let stretched = resize_rgb_image(&rgb, target, FilterType::Bilinear)?;
            let blurred = blur_scaled(&stretched, params.blur_sigma)?;
            let darker = adjust_brightness(&blurred, params.brightness);
            Ok(adjust_color(&darker, params.saturation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processing::ops::luma;

    fn half_and_half(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, _| {
            if x < w / 2 { Rgb([240, 20, 20]) } else { Rgb([20, 20, 240]) }
        }))
    }

    #[test]
    fn blurred_backdrop_has_target_size_and_is_muted() {
        let src = half_and_half(200, 150);
        let out = synthesize(&src, Size::new(300, 300), &BackdropParams::default()).unwrap();
        assert_eq!(out.dimensions(), (300, 300));

        let max_luma = out.pixels().map(luma).max().unwrap();
        assert!(max_luma < 128, "brightness 0.5 caps luma, got {}", max_luma);
    }

    #[test]
    fn blur_smears_the_hard_edge() {
        let src = half_and_half(100, 40);
        let params = BackdropParams {
            brightness: 1.0,
            saturation: 1.0,
            ..BackdropParams::default()
        };
        let out = synthesize(&src, Size::new(100, 40), &params).unwrap();
        let left = out.get_pixel(48, 20);
        let right = out.get_pixel(52, 20);
        assert!((left[0] as i32 - right[0] as i32).abs() < 60);
    }

    #[test]
    fn flat_source_stays_flat_after_blur() {
        let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([200, 100, 50])));
        let params = BackdropParams {
            brightness: 1.0,
            saturation: 1.0,
            ..BackdropParams::default()
        };
        let out = synthesize(&src, Size::new(128, 96), &params).unwrap();
        for p in out.pixels() {
            assert!((p[0] as i32 - 200).abs() <= 2);
            assert!((p[2] as i32 - 50).abs() <= 2);
        }
    }

    #[test]
    fn solid_style_fills_with_color() {
        let src = half_and_half(10, 10);
        let params = BackdropParams {
            style: BackdropStyle::Solid,
            ..BackdropParams::default()
        };
        let out = synthesize(&src, Size::new(7, 5), &params).unwrap();
        assert!(out.pixels().all(|p| p.0 == [255, 255, 255]));
    }
}
