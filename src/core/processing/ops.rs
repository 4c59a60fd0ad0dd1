//! Pixel-level tonal operations on RGB buffers.
//!
//! Every adjustment is a linear blend between the image and a "degenerate"
//! version of it: `out = degenerate + factor * (image - degenerate)`. A factor
//! of 1.0 returns the image unchanged, 0.0 returns the degenerate image and
//! values above 1.0 push away from it.
use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// ITU-R 601-2 luma with 16-bit fixed-point rounding.
#[inline]
pub fn luma(p: &Rgb<u8>) -> u8 {
    let [r, g, b] = p.0;
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

#[inline]
fn blend_channel(degenerate: u8, value: u8, factor: f32) -> u8 {
    let d = degenerate as f32;
    (d + factor * (value as f32 - d)).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn is_identity(factor: f32) -> bool {
    (factor - 1.0).abs() < f32::EPSILON
}

/// Blend each pixel of `img` against the degenerate pixel produced by `degenerate_at`.
fn blend_with<F>(img: &RgbImage, factor: f32, degenerate_at: F) -> RgbImage
where
    F: Fn(u32, u32, &Rgb<u8>) -> [u8; 3],
{
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, p) in img.enumerate_pixels() {
        let d = degenerate_at(x, y, p);
        out.put_pixel(
            x,
            y,
            Rgb([
                blend_channel(d[0], p[0], factor),
                blend_channel(d[1], p[1], factor),
                blend_channel(d[2], p[2], factor),
            ]),
        );
    }
    out
}

/// Scale intensities toward black.
pub fn adjust_brightness(img: &RgbImage, factor: f32) -> RgbImage {
    if is_identity(factor) {
        return img.clone();
    }
    blend_with(img, factor, |_, _, _| [0, 0, 0])
}

/// Saturation: blend against the per-pixel grayscale.
pub fn adjust_color(img: &RgbImage, factor: f32) -> RgbImage {
    if is_identity(factor) {
        return img.clone();
    }
    blend_with(img, factor, |_, _, p| {
        let l = luma(p);
        [l, l, l]
    })
}

/// Contrast: blend against a flat gray at the image's mean luma.
pub fn adjust_contrast(img: &RgbImage, factor: f32) -> RgbImage {
    if is_identity(factor) {
        return img.clone();
    }
    let count = img.width() as u64 * img.height() as u64;
    if count == 0 {
        return img.clone();
    }
    let sum: u64 = img.pixels().map(|p| luma(p) as u64).sum();
    let mean = (sum as f64 / count as f64 + 0.5) as u8;
    blend_with(img, factor, |_, _, _| [mean, mean, mean])
}

/// 3x3 smoothing kernel `[1 1 1; 1 5 1; 1 1 1] / 13`. Border pixels are copied.
/// `imageproc::filter::filter3x3` would clamp at the edges and change the
/// border, so the sharpness blend would alter edge pixels it should leave alone.
pub fn smooth(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut out = img.clone();
    if w < 3 || h < 3 {
        return out;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = [0u32; 3];
            for dy in 0..3 {
                for dx in 0..3 {
                    let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                    let p = img.get_pixel(x + dx - 1, y + dy - 1);
                    for c in 0..3 {
                        acc[c] += p[c] as u32 * weight;
                    }
                }
            }
            out.put_pixel(
                x,
                y,
                Rgb([
                    ((acc[0] + 6) / 13) as u8,
                    ((acc[1] + 6) / 13) as u8,
                    ((acc[2] + 6) / 13) as u8,
                ]),
            );
        }
    }
    out
}

/// Sharpness: blend against the smoothed image.
pub fn adjust_sharpness(img: &RgbImage, factor: f32) -> RgbImage {
    if is_identity(factor) {
        return img.clone();
    }
    let smoothed = smooth(img);
    blend_with(img, factor, |x, y, _| smoothed.get_pixel(x, y).0)
}

/// Composite `src` over `dst` using the source alpha.
#[inline]
pub fn blend_over(dst: &Rgb<u8>, src: &Rgba<u8>) -> Rgb<u8> {
    let a = src[3] as u32;
    let inv = 255 - a;
    Rgb([
        ((src[0] as u32 * a + dst[0] as u32 * inv + 127) / 255) as u8,
        ((src[1] as u32 * a + dst[1] as u32 * inv + 127) / 255) as u8,
        ((src[2] as u32 * a + dst[2] as u32 * inv + 127) / 255) as u8,
    ])
}

/// Drop the alpha channel by compositing onto a flat background color.
pub fn flatten_onto(img: &RgbaImage, background: [u8; 3]) -> RgbImage {
    let bg = Rgb(background);
    let mut out = RgbImage::new(img.width(), img.height());
    for (x, y, p) in img.enumerate_pixels() {
        out.put_pixel(x, y, blend_over(&bg, p));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x * 255 / w.max(1)) as u8, (y * 255 / h.max(1)) as u8, 90])
        })
    }

    #[test]
    fn identity_factors_leave_pixels_unchanged() {
        let img = gradient(16, 9);
        assert_eq!(adjust_brightness(&img, 1.0), img);
        assert_eq!(adjust_color(&img, 1.0), img);
        assert_eq!(adjust_contrast(&img, 1.0), img);
        assert_eq!(adjust_sharpness(&img, 1.0), img);
    }

    #[test]
    fn half_brightness_halves_intensity() {
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 100, 51]));
        let out = adjust_brightness(&img, 0.5);
        assert_eq!(out.get_pixel(2, 2).0, [100, 50, 26]);
    }

    #[test]
    fn zero_color_is_grayscale() {
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 0]));
        let out = adjust_color(&img, 0.0);
        let p = out.get_pixel(0, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        assert_eq!(p[0], luma(&Rgb([255, 0, 0])));
    }

    #[test]
    fn contrast_spreads_values_around_mean() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        img.put_pixel(1, 0, Rgb([200, 200, 200]));
        let out = adjust_contrast(&img, 2.0);
        assert!(out.get_pixel(0, 0)[0] < 100);
        assert!(out.get_pixel(1, 0)[0] > 200);
    }

    #[test]
    fn smooth_keeps_border_and_flat_regions() {
        let img = RgbImage::from_pixel(5, 5, Rgb([40, 80, 120]));
        assert_eq!(smooth(&img), img);
    }

    #[test]
    fn smooth_copies_border_of_textured_image() {
        let img = RgbImage::from_fn(6, 6, |x, y| {
            if (x + y) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        });
        let out = smooth(&img);
        for i in 0..6 {
            assert_eq!(out.get_pixel(i, 0), img.get_pixel(i, 0));
            assert_eq!(out.get_pixel(i, 5), img.get_pixel(i, 5));
            assert_eq!(out.get_pixel(0, i), img.get_pixel(0, i));
            assert_eq!(out.get_pixel(5, i), img.get_pixel(5, i));
        }
        // white center with four white diagonals: (5*255 + 4*255) / 13
        assert_eq!(out.get_pixel(2, 2)[0], 177);
    }

    #[test]
    fn blend_over_respects_alpha_extremes() {
        let bg = Rgb([10, 20, 30]);
        assert_eq!(blend_over(&bg, &Rgba([200, 200, 200, 0])), bg);
        assert_eq!(blend_over(&bg, &Rgba([200, 150, 100, 255])), Rgb([200, 150, 100]));
    }

    #[test]
    fn flatten_transparent_pixels_take_background() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0]));
        let out = flatten_onto(&img, [255, 255, 255]);
        assert_eq!(out.get_pixel(1, 1).0, [255, 255, 255]);
    }
}
