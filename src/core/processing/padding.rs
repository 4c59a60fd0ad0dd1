use image::{RgbImage, RgbaImage};
use tracing::debug;

use crate::core::processing::ops::blend_over;
use crate::types::{Point, Rect, Size};

fn check_fits(src: Size, offset: Point, canvas: Size) -> Result<(), String> {
    let placed = Rect::new(offset.x, offset.y, src.width, src.height);
    if placed.fits_within(canvas) {
        Ok(())
    } else {
        Err(format!("image {} at {:?} exceeds canvas {}", src, offset, canvas))
    }
}

/// Copy an opaque image into `canvas` at `offset`.
pub fn paste_opaque(canvas: &mut RgbImage, src: &RgbImage, offset: Point) -> Result<(), String> {
    let canvas_size = Size::new(canvas.width(), canvas.height());
    let (cols, rows) = src.dimensions();
    check_fits(Size::new(cols, rows), offset, canvas_size)?;

    debug!(
        "Pasting {}x{} at ({}, {}) onto {}",
        cols, rows, offset.x, offset.y, canvas_size
    );

    let src_stride = cols as usize * 3;
    let dst_stride = canvas.width() as usize * 3;
    let src_raw = src.as_raw();
    let dst_raw: &mut [u8] = canvas;
    // Copy per row using slice copies to minimize per-pixel indexing
    for row in 0..rows as usize {
        let src_offset = row * src_stride;
        let dst_offset = (row + offset.y as usize) * dst_stride + offset.x as usize * 3;
        dst_raw[dst_offset..dst_offset + src_stride]
            .copy_from_slice(&src_raw[src_offset..src_offset + src_stride]);
    }
    Ok(())
}

/// Composite an image with transparency onto `canvas` at `offset`.
pub fn paste_blended(canvas: &mut RgbImage, src: &RgbaImage, offset: Point) -> Result<(), String> {
    let canvas_size = Size::new(canvas.width(), canvas.height());
    check_fits(Size::new(src.width(), src.height()), offset, canvas_size)?;

    debug!(
        "Blending {}x{} at ({}, {}) onto {}",
        src.width(),
        src.height(),
        offset.x,
        offset.y,
        canvas_size
    );

    for (x, y, p) in src.enumerate_pixels() {
        let (cx, cy) = (x + offset.x, y + offset.y);
        let blended = blend_over(canvas.get_pixel(cx, cy), p);
        canvas.put_pixel(cx, cy, blended);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    #[test]
    fn opaque_paste_lands_at_offset() {
        let mut canvas = RgbImage::from_pixel(6, 4, Rgb([0, 0, 0]));
        let src = RgbImage::from_pixel(2, 2, Rgb([9, 9, 9]));
        paste_opaque(&mut canvas, &src, Point::new(3, 1)).unwrap();
        assert_eq!(canvas.get_pixel(3, 1).0, [9, 9, 9]);
        assert_eq!(canvas.get_pixel(4, 2).0, [9, 9, 9]);
        assert_eq!(canvas.get_pixel(2, 1).0, [0, 0, 0]);
        assert_eq!(canvas.get_pixel(5, 3).0, [0, 0, 0]);
    }

    #[test]
    fn paste_out_of_bounds_is_rejected() {
        let mut canvas = RgbImage::new(4, 4);
        let src = RgbImage::new(3, 3);
        assert!(paste_opaque(&mut canvas, &src, Point::new(2, 0)).is_err());
    }

    #[test]
    fn blended_paste_keeps_background_under_transparency() {
        let mut canvas = RgbImage::from_pixel(4, 4, Rgb([50, 60, 70]));
        let mut src = RgbaImage::from_pixel(2, 1, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([255, 0, 0, 0]));
        paste_blended(&mut canvas, &src, Point::new(1, 1)).unwrap();
        assert_eq!(canvas.get_pixel(1, 1).0, [255, 0, 0]);
        assert_eq!(canvas.get_pixel(2, 1).0, [50, 60, 70]);
    }
}
