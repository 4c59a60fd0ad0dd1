//! Subject detection: find the most salient region of a source image.
//!
//! `SubjectDetector` is the capability seam; `SpectralResidualDetector` is the
//! shipped implementation (spectral residual saliency, Otsu binarization,
//! largest 8-connected region, margin expansion). Detection failures are never
//! fatal: `detect_or_fallback` substitutes a centered default region.
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::region_labelling::{Connectivity, connected_components};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::params::DetectorParams;
use crate::core::processing::saliency::{spectral_residual, to_gray_map};
use crate::types::{DetectionSource, Point, Rect, Size, SourceImage};

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("image has no pixels")]
    EmptyImage,

    #[error("degenerate saliency map: {0}")]
    DegenerateMap(String),

    #[error("no salient region found")]
    NoRegions,
}

/// Salient rectangle in source coordinates plus the point reframing centers on.
///
/// The rectangle always lies inside the image and the centroid inside the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectRegion {
    rect: Rect,
    centroid: Point,
    source: DetectionSource,
}

impl SubjectRegion {
    /// Build a region centered on `rect`; None if `rect` is empty or leaves `image`.
    pub fn new(rect: Rect, image: Size, source: DetectionSource) -> Option<Self> {
        if !rect.fits_within(image) {
            return None;
        }
        Some(Self {
            rect,
            centroid: rect.center(),
            source,
        })
    }

    /// Centered rectangle spanning the middle half of each axis.
    /// Tiny images grow the extent so it still covers the centroid.
    pub fn fallback(image: Size) -> Self {
        let (x, width) = Self::fallback_span(image.width);
        let (y, height) = Self::fallback_span(image.height);
        Self {
            rect: Rect::new(x, y, width, height),
            centroid: Point::new(image.width / 2, image.height / 2),
            source: DetectionSource::Fallback,
        }
    }

    fn fallback_span(len: u32) -> (u32, u32) {
        let start = len / 4;
        let extent = (len / 2).max(len / 2 - start + 1).min(len - start).max(1);
        (start.min(len.saturating_sub(1)), extent)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn source(&self) -> DetectionSource {
        self.source
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DetectionSource::Fallback
    }
}

pub trait SubjectDetector: Send + Sync {
    /// Locate the subject, or None when nothing usable is found.
    fn detect(&self, image: &DynamicImage) -> Option<SubjectRegion>;
}

#[derive(Debug, Clone, Default)]
pub struct SpectralResidualDetector {
    params: DetectorParams,
}

#[derive(Debug, Clone, Copy)]
struct Blob {
    area: u64,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl Blob {
    fn new(x: u32, y: u32) -> Self {
        Self {
            area: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.area += 1;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// Size of the raster the map is thresholded on: source aspect, long side capped.
fn analysis_size(image: Size, max_side: u32) -> Size {
    let long = image.width.max(image.height);
    if long <= max_side {
        return image;
    }
    let scale = max_side as f64 / long as f64;
    Size::new(
        ((image.width as f64 * scale).round() as u32).max(1),
        ((image.height as f64 * scale).round() as u32).max(1),
    )
}

/// Bounding box of the largest 8-connected foreground region. Ties keep the
/// region found first in scan order.
fn largest_region(binary: &GrayImage) -> Option<Rect> {
    let labels = connected_components(binary, Connectivity::Eight, Luma([0u8]));
    let mut blobs: Vec<Option<Blob>> = Vec::new();

    for (x, y, label) in labels.enumerate_pixels() {
        let id = label[0] as usize;
        if id == 0 {
            continue;
        }
        if blobs.len() <= id {
            blobs.resize(id + 1, None);
        }
        blobs[id].get_or_insert_with(|| Blob::new(x, y)).add(x, y);
    }

    let mut best: Option<Blob> = None;
    for blob in blobs.into_iter().flatten() {
        if best.map_or(true, |b| blob.area > b.area) {
            best = Some(blob);
        }
    }
    best.map(|b| Rect::new(b.min_x, b.min_y, b.max_x - b.min_x + 1, b.max_y - b.min_y + 1))
}

/// Map a rectangle from analysis raster coordinates to source coordinates,
/// rounding outward.
fn scale_rect(rect: Rect, from: Size, to: Size) -> Rect {
    if from == to {
        return rect;
    }
    let (fw, fh) = (from.width as u64, from.height as u64);
    let (tw, th) = (to.width as u64, to.height as u64);
    let x0 = rect.x as u64 * tw / fw;
    let y0 = rect.y as u64 * th / fh;
    let x1 = (rect.right() * tw).div_ceil(fw).min(tw);
    let y1 = (rect.bottom() * th).div_ceil(fh).min(th);
    Rect::new(
        x0 as u32,
        y0 as u32,
        (x1 - x0).max(1) as u32,
        (y1 - y0).max(1) as u32,
    )
}

/// Grow `rect` by `margin` of its size on each side, clamped to the image.
pub fn expand_with_margin(rect: Rect, image: Size, margin: f64) -> Rect {
    let x = (rect.x as f64 - rect.width as f64 * margin).max(0.0) as u32;
    let y = (rect.y as f64 - rect.height as f64 * margin).max(0.0) as u32;
    let x = x.min(image.width.saturating_sub(1));
    let y = y.min(image.height.saturating_sub(1));
    let grown_w = (rect.width as f64 * (1.0 + 2.0 * margin)) as u32;
    let grown_h = (rect.height as f64 * (1.0 + 2.0 * margin)) as u32;
    Rect::new(
        x,
        y,
        grown_w.min(image.width - x).max(1),
        grown_h.min(image.height - y).max(1),
    )
}

impl SpectralResidualDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    /// Run the full detection and report why it failed, if it did.
    pub fn analyze(&self, image: &DynamicImage) -> Result<SubjectRegion, DetectionError> {
        let size = Size::new(image.width(), image.height());
        if size.is_empty() {
            return Err(DetectionError::EmptyImage);
        }

        let gray = image.to_luma8();
        let map = spectral_residual(&gray, self.params.working_size)?;

        let analysis = analysis_size(size, self.params.analysis_max_side.max(1));
        let gray_map = to_gray_map(&map, analysis.width, analysis.height);

        let level = otsu_level(&gray_map);
        let binary = GrayImage::from_fn(analysis.width, analysis.height, |x, y| {
            if gray_map.get_pixel(x, y)[0] > level {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        debug!("Saliency map {} thresholded at Otsu level {}", analysis, level);

        let bbox = largest_region(&binary).ok_or(DetectionError::NoRegions)?;
        let bbox = scale_rect(bbox, analysis, size);
        let expanded = expand_with_margin(bbox, size, self.params.margin);

        SubjectRegion::new(expanded, size, DetectionSource::Saliency).ok_or_else(|| {
            DetectionError::DegenerateMap(format!("region {} outside image {}", expanded, size))
        })
    }
}

impl SubjectDetector for SpectralResidualDetector {
    fn detect(&self, image: &DynamicImage) -> Option<SubjectRegion> {
        match self.analyze(image) {
            Ok(region) => Some(region),
            Err(e) => {
                debug!("Spectral residual detection failed: {}", e);
                None
            }
        }
    }
}

/// Detect the subject of `source`, falling back to the centered default region.
pub fn detect_or_fallback(detector: &dyn SubjectDetector, source: &SourceImage) -> SubjectRegion {
    match detector.detect(source.image()) {
        Some(region) => {
            info!(
                "Subject detected in {} at {:?}, bounding box {}",
                source.id(),
                region.centroid(),
                region.rect()
            );
            region
        }
        None => {
            let region = SubjectRegion::fallback(source.size());
            warn!(
                "Subject detection failed for {}; using default centered region {} (degraded framing)",
                source.id(),
                region.rect()
            );
            region
        }
    }
}
