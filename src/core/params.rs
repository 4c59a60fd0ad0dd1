use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{BackdropStyle, OutputFormat};

/// Aspect-ratio difference above which the source is padded instead of cropped.
pub const ASPECT_MISMATCH_THRESHOLD: f64 = 0.3;
/// Fraction of the detected subject's width/height added on each side.
pub const SUBJECT_MARGIN: f64 = 0.1;
/// Side length of the square raster the spectral residual is computed on.
pub const SALIENCY_WORKING_SIZE: u32 = 64;
/// Long side of the raster the saliency map is thresholded and labelled on.
pub const SALIENCY_ANALYSIS_MAX_SIDE: u32 = 512;
/// Gaussian sigma (in target pixels) of the padded backdrop blur.
pub const BACKDROP_BLUR_SIGMA: f32 = 50.0;
pub const BACKDROP_BRIGHTNESS: f32 = 0.5;
pub const BACKDROP_SATURATION: f32 = 0.6;
pub const AD_CONTRAST: f32 = 1.1;
pub const AD_COLOR: f32 = 1.15;
pub const AD_SHARPNESS: f32 = 1.2;
pub const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub margin: f64,
    pub working_size: u32,
    pub analysis_max_side: u32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            margin: SUBJECT_MARGIN,
            working_size: SALIENCY_WORKING_SIZE,
            analysis_max_side: SALIENCY_ANALYSIS_MAX_SIDE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerParams {
    pub mismatch_threshold: f64,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            mismatch_threshold: ASPECT_MISMATCH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropParams {
    pub style: BackdropStyle,
    pub blur_sigma: f32,
    pub brightness: f32,
    pub saturation: f32,
    /// Fill color for `BackdropStyle::Solid`
    pub fill: [u8; 3],
}

impl Default for BackdropParams {
    fn default() -> Self {
        Self {
            style: BackdropStyle::Blurred,
            blur_sigma: BACKDROP_BLUR_SIGMA,
            brightness: BACKDROP_BRIGHTNESS,
            saturation: BACKDROP_SATURATION,
            fill: [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceParams {
    pub enabled: bool,
    pub contrast: f32,
    pub color: f32,
    pub sharpness: f32,
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            enabled: true,
            contrast: AD_CONTRAST,
            color: AD_COLOR,
            sharpness: AD_SHARPNESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputParams {
    pub format: OutputFormat,
    /// JPEG quality, 1..=100
    pub quality: u8,
}

impl Default for OutputParams {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: JPEG_QUALITY,
        }
    }
}

/// Reframing parameters suitable for config files and CLI overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReframeParams {
    pub detector: DetectorParams,
    pub planner: PlannerParams,
    pub backdrop: BackdropParams,
    pub enhance: EnhanceParams,
    pub output: OutputParams,
    /// Worker threads for per-target jobs; None means one per core
    pub workers: Option<usize>,
}

impl ReframeParams {
    /// Load parameters from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
