//! Spectral residual saliency (Hou & Zhang, 2007).
//!
//! The log-amplitude spectrum of natural images is locally smooth; whatever
//! deviates from its local average (the "residual") corresponds to regions
//! that stand out. The residual is recombined with the original phase,
//! transformed back to the spatial domain, squared, smoothed and normalized
//! into a map in `[0, 1]`.
use std::sync::Arc;

use image::GrayImage;
use image::imageops::{self, FilterType};
use ndarray::{Array2, ArrayViewMut1, Zip};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use tracing::debug;

use crate::core::processing::detect::DetectionError;

/// Working images whose intensity standard deviation is below this are flat.
const FLAT_STD_EPSILON: f32 = 1e-3;
const LOG_AMPLITUDE_FLOOR: f32 = 1e-12;
const SMOOTHING_SIGMA: f32 = 8.0;
const MIN_WORKING_SIZE: u32 = 8;

/// Mirror an out-of-range index back into `0..n`, excluding the edge pixel.
#[inline]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    if i < 0 {
        i = -i;
    }
    if i >= n {
        i = 2 * n - 2 - i;
    }
    i.clamp(0, n - 1) as usize
}

/// Separable convolution with a symmetric odd-length kernel and reflected borders.
fn convolve_separable(src: &Array2<f32>, kernel: &[f32]) -> Array2<f32> {
    let (rows, cols) = src.dim();
    let half = (kernel.len() / 2) as isize;

    let mut horizontal = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let cc = reflect101(c as isize + k as isize - half, cols);
                acc += w * src[[r, cc]];
            }
            horizontal[[r, c]] = acc;
        }
    }

    let mut out = Array2::<f32>::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let rr = reflect101(r as isize + k as isize - half, rows);
                acc += w * horizontal[[rr, c]];
            }
            out[[r, c]] = acc;
        }
    }
    out
}

fn box_blur3(src: &Array2<f32>) -> Array2<f32> {
    convolve_separable(src, &[1.0 / 3.0; 3])
}

fn gaussian5(src: &Array2<f32>, sigma: f32) -> Array2<f32> {
    let mut kernel: Vec<f32> = (-2..=2)
        .map(|k: i32| (-((k * k) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    convolve_separable(src, &kernel)
}

fn process_lane(
    mut lane: ArrayViewMut1<'_, Complex<f32>>,
    fft: &Arc<dyn Fft<f32>>,
    scratch: &mut Vec<Complex<f32>>,
) {
    scratch.clear();
    scratch.extend(lane.iter().copied());
    fft.process(scratch);
    lane.iter_mut()
        .zip(scratch.iter())
        .for_each(|(dst, src)| *dst = *src);
}

/// In-place 2-D FFT as row transforms followed by column transforms.
fn fft2d(data: &mut Array2<Complex<f32>>, planner: &mut FftPlanner<f32>, inverse: bool) {
    let (rows, cols) = data.dim();
    let (row_fft, col_fft) = if inverse {
        (planner.plan_fft_inverse(cols), planner.plan_fft_inverse(rows))
    } else {
        (planner.plan_fft_forward(cols), planner.plan_fft_forward(rows))
    };

    let mut scratch = Vec::with_capacity(rows.max(cols));
    for lane in data.rows_mut() {
        process_lane(lane, &row_fft, &mut scratch);
    }
    for lane in data.columns_mut() {
        process_lane(lane, &col_fft, &mut scratch);
    }

    if inverse {
        let norm = 1.0 / (rows * cols) as f32;
        data.mapv_inplace(|v| v * norm);
    }
}

/// Compute a spectral residual saliency map of `gray` on a square working
/// raster of `working_size` pixels. The returned map is normalized to `[0, 1]`.
pub fn spectral_residual(
    gray: &GrayImage,
    working_size: u32,
) -> Result<Array2<f32>, DetectionError> {
    if gray.width() == 0 || gray.height() == 0 {
        return Err(DetectionError::EmptyImage);
    }
    let n = working_size.max(MIN_WORKING_SIZE);
    let small = imageops::resize(gray, n, n, FilterType::Triangle);
    let side = n as usize;

    let intensities = Array2::from_shape_fn((side, side), |(r, c)| {
        small.get_pixel(c as u32, r as u32)[0] as f32 / 255.0
    });
    let mean = intensities.sum() / (side * side) as f32;
    let std = (intensities.mapv(|v| (v - mean) * (v - mean)).sum() / (side * side) as f32).sqrt();
    if std < FLAT_STD_EPSILON {
        return Err(DetectionError::DegenerateMap(format!(
            "flat image (std {:.5})",
            std
        )));
    }

    let mut planner = FftPlanner::<f32>::new();
    let mut spectrum = intensities.mapv(|v| Complex::new(v, 0.0));
    fft2d(&mut spectrum, &mut planner, false);

    let log_amplitude = spectrum.mapv(|v| v.norm().max(LOG_AMPLITUDE_FLOOR).ln());
    let phase = spectrum.mapv(|v| v.arg());
    let residual = &log_amplitude - &box_blur3(&log_amplitude);

    Zip::from(&mut spectrum)
        .and(&residual)
        .and(&phase)
        .for_each(|s, &res, &theta| *s = Complex::from_polar(res.exp(), theta));
    fft2d(&mut spectrum, &mut planner, true);

    let smoothed = gaussian5(&spectrum.mapv(|v| v.norm_sqr()), SMOOTHING_SIGMA);

    let max = smoothed.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() || max <= 0.0 {
        return Err(DetectionError::DegenerateMap(format!(
            "saliency maximum is {}",
            max
        )));
    }
    debug!("Spectral residual computed on {}x{} (max {:.4e})", n, n, max);

    Ok(smoothed.mapv(|v| (v / max).clamp(0.0, 1.0)))
}

/// Quantize a `[0, 1]` map to 8 bits (truncating) and resample it to `width` x `height`.
pub fn to_gray_map(map: &Array2<f32>, width: u32, height: u32) -> GrayImage {
    let (rows, cols) = map.dim();
    let quantized = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        image::Luma([(map[[y as usize, x as usize]] * 255.0) as u8])
    });
    if quantized.dimensions() == (width, height) {
        return quantized;
    }
    imageops::resize(&quantized, width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square_on_black(size: u32, sq: (u32, u32, u32)) -> GrayImage {
        let (sx, sy, side) = sq;
        GrayImage::from_fn(size, size, |x, y| {
            if x >= sx && x < sx + side && y >= sy && y < sy + side {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn reflect101_mirrors_without_repeating_edge() {
        assert_eq!(reflect101(-1, 5), 1);
        assert_eq!(reflect101(-2, 5), 2);
        assert_eq!(reflect101(5, 5), 3);
        assert_eq!(reflect101(2, 5), 2);
        assert_eq!(reflect101(3, 1), 0);
    }

    #[test]
    fn gaussian_kernel_preserves_flat_maps() {
        let flat = Array2::from_elem((6, 6), 0.25f32);
        let out = gaussian5(&flat, 8.0);
        assert!(out.iter().all(|v| (v - 0.25).abs() < 1e-5));
    }

    #[test]
    fn fft_roundtrip_restores_signal() {
        let mut planner = FftPlanner::<f32>::new();
        let original = Array2::from_shape_fn((8, 8), |(r, c)| Complex::new((r * 8 + c) as f32, 0.0));
        let mut data = original.clone();
        fft2d(&mut data, &mut planner, false);
        fft2d(&mut data, &mut planner, true);
        Zip::from(&data).and(&original).for_each(|a, b| {
            assert!((a - b).norm() < 1e-3);
        });
    }

    #[test]
    fn flat_image_is_degenerate() {
        let img = GrayImage::from_pixel(40, 30, Luma([128]));
        assert!(matches!(
            spectral_residual(&img, 64),
            Err(DetectionError::DegenerateMap(_))
        ));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = GrayImage::new(0, 0);
        assert!(matches!(spectral_residual(&img, 64), Err(DetectionError::EmptyImage)));
    }

    #[test]
    fn map_is_normalized() {
        let img = square_on_black(128, (80, 20, 30));
        let map = spectral_residual(&img, 64).unwrap();
        assert_eq!(map.dim(), (64, 64));
        let max = map.iter().copied().fold(0.0f32, f32::max);
        assert!((max - 1.0).abs() < 1e-6);
        assert!(map.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn map_squares_before_smoothing() {
        let img = GrayImage::from_fn(128, 128, |x, y| {
            if (70..110).contains(&x) && (20..60).contains(&y) {
                Luma([240])
            } else {
                Luma([((x * 7 + y * 13) % 64) as u8])
            }
        });
        let map = spectral_residual(&img, 64).unwrap();

        let small = imageops::resize(&img, 64, 64, FilterType::Triangle);
        let mut spectrum = Array2::from_shape_fn((64, 64), |(r, c)| {
            Complex::new(small.get_pixel(c as u32, r as u32)[0] as f32 / 255.0, 0.0)
        });
        let mut planner = FftPlanner::<f32>::new();
        fft2d(&mut spectrum, &mut planner, false);
        let log_amplitude = spectrum.mapv(|v| v.norm().max(LOG_AMPLITUDE_FLOOR).ln());
        let residual = &log_amplitude - &box_blur3(&log_amplitude);
        Zip::from(&mut spectrum)
            .and(&residual)
            .for_each(|s, &res| *s = Complex::from_polar(res.exp(), s.arg()));
        fft2d(&mut spectrum, &mut planner, true);

        let reference = gaussian5(&spectrum.mapv(|v| v.norm() * v.norm()), SMOOTHING_SIGMA);
        let max = reference.iter().copied().fold(0.0f32, f32::max);
        Zip::from(&map).and(&reference).for_each(|&got, &want| {
            assert!((got - want / max).abs() < 1e-3, "got {} want {}", got, want / max);
        });
    }

    #[test]
    fn gray_map_is_resampled_to_requested_size() {
        let map = Array2::from_elem((64, 64), 1.0f32);
        let gray = to_gray_map(&map, 120, 90);
        assert_eq!(gray.dimensions(), (120, 90));
        assert_eq!(gray.get_pixel(60, 45)[0], 255);
    }
}
