use tracing::debug;

use crate::core::params::EnhanceParams;
use crate::core::processing::ops::{adjust_color, adjust_contrast, adjust_sharpness};
use crate::types::Canvas;

/// Apply the ad "pop": contrast, then saturation, then sharpness.
pub fn enhance(canvas: Canvas, params: &EnhanceParams) -> Canvas {
    if !params.enabled {
        return canvas;
    }
    debug!(
        "Enhancing {} (contrast {}, color {}, sharpness {})",
        canvas.target_id, params.contrast, params.color, params.sharpness
    );
    let pixels = adjust_contrast(&canvas.pixels, params.contrast);
    let pixels = adjust_color(&pixels, params.color);
    let pixels = adjust_sharpness(&pixels, params.sharpness);
    Canvas {
        target_id: canvas.target_id,
        pixels,
    }
}
