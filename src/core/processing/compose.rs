//! Execute a `ReframePlan` against a source image.
use fast_image_resize::FilterType;
use image::RgbImage;
use tracing::debug;

use crate::core::processing::ops::flatten_onto;
use crate::core::processing::padding::{paste_blended, paste_opaque};
use crate::core::processing::plan::{CropPlan, PadPlan, ReframePlan};
use crate::core::processing::resize::{resize_rgb_image, resize_rgba_image};
use crate::error::{Error, Result};
use crate::types::{Canvas, Size, SourceImage, TargetSpec};

/// Background transparent sources are flattened onto before cropping.
const CROP_MATTE: [u8; 3] = [255, 255, 255];

fn composition_error(source: &SourceImage, target: &TargetSpec, detail: String) -> Error {
    Error::Composition {
        source_id: source.id().to_string(),
        target_id: target.id.clone(),
        detail,
    }
}

fn compose_crop(source: &SourceImage, plan: &CropPlan) -> Result<RgbImage> {
    let c = plan.crop;
    let window = source.image().crop_imm(c.x, c.y, c.width, c.height);
    let rgb = if window.color().has_alpha() {
        flatten_onto(&window.to_rgba8(), CROP_MATTE)
    } else {
        window.to_rgb8()
    };
    resize_rgb_image(&rgb, plan.target, FilterType::Lanczos3)
}

fn compose_pad(
    source: &SourceImage,
    target: &TargetSpec,
    plan: &PadPlan,
    backdrop: Option<RgbImage>,
) -> Result<RgbImage> {
    let mut canvas = match backdrop {
        Some(b) if Size::new(b.width(), b.height()) == plan.target => b,
        Some(b) => {
            return Err(composition_error(
                source,
                target,
                format!("backdrop is {}x{}, expected {}", b.width(), b.height(), plan.target),
            ));
        }
        None if plan.background_required => {
            return Err(composition_error(
                source,
                target,
                format!("pad to {} needs a backdrop", plan.target),
            ));
        }
        None => RgbImage::new(plan.target.width, plan.target.height),
    };

    let pasted = if source.has_alpha() {
        let scaled = resize_rgba_image(&source.image().to_rgba8(), plan.scaled, FilterType::Lanczos3)?;
        paste_blended(&mut canvas, &scaled, plan.offset)
    } else {
        let scaled = resize_rgb_image(&source.image().to_rgb8(), plan.scaled, FilterType::Lanczos3)?;
        paste_opaque(&mut canvas, &scaled, plan.offset)
    };
    pasted.map_err(|detail| composition_error(source, target, detail))?;
    Ok(canvas)
}

/// Produce the canvas for `target` following `plan`.
///
/// `backdrop` is only consulted for pad plans; crop plans ignore it.
pub fn compose(
    source: &SourceImage,
    target: &TargetSpec,
    plan: &ReframePlan,
    backdrop: Option<RgbImage>,
) -> Result<Canvas> {
    plan.validate(source.id(), &target.id, source.size())?;

    let pixels = match plan {
        ReframePlan::Crop(c) => compose_crop(source, c)?,
        ReframePlan::Pad(p) => compose_pad(source, target, p, backdrop)?,
    };

    let produced = Size::new(pixels.width(), pixels.height());
    if produced != target.size() {
        return Err(composition_error(
            source,
            target,
            format!("produced {} instead of {}", produced, target.size()),
        ));
    }
    debug!("Composed {} for {}", produced, target.id);

    Ok(Canvas {
        target_id: target.id.clone(),
        pixels,
    })
}
