//! Per-target reframing strategies.
//!
//! A `Reframer` turns one source image plus its detected subject into the canvas
//! of a single target. `LocalReframer` runs the full plan, backdrop, compose and
//! enhance chain in-process. `RemoteReframer` delegates the padded area to an
//! outpainting collaborator behind `OutpaintClient`; no client ships with the
//! crate.
use fast_image_resize::FilterType;
use image::{Rgb, RgbImage};
use tracing::{debug, warn};

use crate::core::params::ReframeParams;
use crate::core::processing::backdrop::synthesize;
use crate::core::processing::compose::compose;
use crate::core::processing::detect::SubjectRegion;
use crate::core::processing::enhance::enhance;
use crate::core::processing::plan::{Extension, ReframePlan, pad_plan, plan};
use crate::core::processing::resize::resize_rgb_image;
use crate::error::{Error, Result};
use crate::types::{Canvas, Size, SourceImage, TargetSpec};

pub trait Reframer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce the canvas of `target` for `source`. The subject is detected
    /// once per source by the caller and shared across targets.
    fn reframe(
        &self,
        source: &SourceImage,
        subject: &SubjectRegion,
        target: &TargetSpec,
    ) -> Result<Canvas>;
}

fn ensure_inputs(source: &SourceImage, target: &TargetSpec) -> Result<()> {
    if source.size().is_empty() {
        return Err(Error::EmptySource {
            source_id: source.id().to_string(),
        });
    }
    if target.size().is_empty() {
        return Err(Error::InvalidTarget {
            target: target.id.clone(),
            width: target.width,
            height: target.height,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct LocalReframer {
    params: ReframeParams,
}

impl LocalReframer {
    pub fn new(params: ReframeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ReframeParams {
        &self.params
    }
}

impl Reframer for LocalReframer {
    fn name(&self) -> &'static str {
        "local"
    }

    fn reframe(
        &self,
        source: &SourceImage,
        subject: &SubjectRegion,
        target: &TargetSpec,
    ) -> Result<Canvas> {
        ensure_inputs(source, target)?;
        let plan = plan(source.size(), target, subject, &self.params.planner)?;

        let backdrop = match &plan {
            ReframePlan::Pad(p) if p.background_required => {
                Some(synthesize(source.image(), p.target, &self.params.backdrop)?)
            }
            _ => None,
        };
        let canvas = compose(source, target, &plan, backdrop)?;
        Ok(enhance(canvas, &self.params.enhance))
    }
}

/// Outpainting collaborator: extends `scaled` by `extension` pixels per edge.
pub trait OutpaintClient: Send + Sync {
    fn outpaint(&self, scaled: &RgbImage, extension: Extension) -> Result<RgbImage>;
}

/// Pads every target through an `OutpaintClient`. When the client fails, the
/// target is still produced by padding onto a flat white canvas.
pub struct RemoteReframer<C: OutpaintClient> {
    client: C,
    fill: [u8; 3],
}

impl<C: OutpaintClient> RemoteReframer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            fill: [255, 255, 255],
        }
    }

    pub fn with_fill(mut self, fill: [u8; 3]) -> Self {
        self.fill = fill;
        self
    }
}

impl<C: OutpaintClient> Reframer for RemoteReframer<C> {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn reframe(
        &self,
        source: &SourceImage,
        _subject: &SubjectRegion,
        target: &TargetSpec,
    ) -> Result<Canvas> {
        ensure_inputs(source, target)?;
        let pad = pad_plan(source.size(), target.size());
        let extension = pad.extension();
        let rgb = source.image().to_rgb8();

        if extension.is_zero() {
            debug!("No extension needed for {}; plain resize", target.id);
            let pixels = resize_rgb_image(&rgb, target.size(), FilterType::Lanczos3)?;
            return Ok(Canvas {
                target_id: target.id.clone(),
                pixels,
            });
        }

        let scaled = resize_rgb_image(&rgb, pad.scaled, FilterType::Lanczos3)?;
        debug!("Outpainting {} for {} with {:?}", pad.scaled, target.id, extension);
        match self.client.outpaint(&scaled, extension) {
            Ok(pixels) => {
                let produced = Size::new(pixels.width(), pixels.height());
                if produced != target.size() {
                    return Err(Error::Composition {
                        source_id: source.id().to_string(),
                        target_id: target.id.clone(),
                        detail: format!("outpainting returned {} instead of {}", produced, target.size()),
                    });
                }
                Ok(Canvas {
                    target_id: target.id.clone(),
                    pixels,
                })
            }
            Err(e) => {
                warn!("Outpainting failed for {} -> {}: {}; padding with flat fill", source.id(), target.id, e);
                let backdrop = RgbImage::from_pixel(target.width, target.height, Rgb(self.fill));
                compose(source, target, &ReframePlan::Pad(pad), Some(backdrop))
            }
        }
    }
}
