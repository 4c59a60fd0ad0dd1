//! Shared types and enums used across adreframe.
//! Includes geometry primitives (`Size`, `Point`, `Rect`), the externally supplied
//! `TargetSpec`, the pixel containers `SourceImage` and `Canvas`, and the
//! CLI-facing enums `OutputFormat` and `BackdropStyle`.
use clap::ValueEnum;
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Width/height pair in pixels.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height. Callers must reject empty sizes first.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle; origin at the top-left corner.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && (p.x as u64) < self.right() && p.y >= self.y && (p.y as u64) < self.bottom()
    }

    /// True when the rectangle is non-empty and lies fully inside `bounds`.
    pub fn fits_within(&self, bounds: Size) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= bounds.width as u64
            && self.bottom() <= bounds.height as u64
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// A named placement size, e.g. `instagram_feed` at 1080x1080.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TargetSpec {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub label: String,
}

impl TargetSpec {
    pub fn new(id: impl Into<String>, width: u32, height: u32, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            label: label.into(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// File name used for this target's output, e.g. `instagram_feed_1080x1080.jpg`.
    pub fn file_name(&self, format: OutputFormat) -> String {
        format!(
            "{}_{}x{}.{}",
            self.id,
            self.width,
            self.height,
            format.extension()
        )
    }
}

impl std::fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}x{})", self.label, self.width, self.height)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Jpeg => write!(f, "JPEG"),
            OutputFormat::Png => write!(f, "PNG"),
        }
    }
}

/// How padded areas are filled when the subject does not cover the target.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackdropStyle {
    /// Stretched, heavily blurred and muted copy of the source
    Blurred,
    /// Flat fill color
    Solid,
}

impl std::fmt::Display for BackdropStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackdropStyle::Blurred => write!(f, "Blurred"),
            BackdropStyle::Solid => write!(f, "Solid"),
        }
    }
}

/// A decoded source image. Read-only once loaded and shared across all targets.
#[derive(Debug, Clone)]
pub struct SourceImage {
    id: String,
    image: DynamicImage,
}

impl SourceImage {
    pub fn new(id: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            id: id.into(),
            image,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }

    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

/// Output buffer of exactly one target's dimensions, always three-channel RGB.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub target_id: String,
    pub pixels: RgbImage,
}

impl Canvas {
    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }
}

/// Where a subject region came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum DetectionSource {
    Saliency,
    Fallback,
}
