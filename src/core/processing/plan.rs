//! Geometry planning: decide between crop-to-fit and scale-and-pad for one
//! target, and compute the exact pixel geometry of that decision.
//!
//! All arithmetic is integer-exact so plans are reproducible and the output
//! dimensions always equal the target.
use tracing::debug;

use crate::core::params::PlannerParams;
use crate::core::processing::detect::SubjectRegion;
use crate::core::processing::resize::fit_dimensions;
use crate::error::{Error, Result};
use crate::types::{Point, Rect, Size, TargetSpec};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    /// Window of the source kept, in source pixels
    pub crop: Rect,
    /// target width / crop width
    pub scale_factor: f64,
    pub target: Size,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadPlan {
    pub scale_factor: f64,
    /// Source scaled with its aspect ratio preserved
    pub scaled: Size,
    /// Top-left corner of the scaled source on the canvas
    pub offset: Point,
    pub target: Size,
    /// False when the scaled source already covers the whole canvas
    pub background_required: bool,
}

/// Pixels added on each edge around the scaled source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extension {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Extension {
    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }
}

impl PadPlan {
    pub fn extension(&self) -> Extension {
        Extension {
            left: self.offset.x,
            right: self.target.width - self.scaled.width - self.offset.x,
            top: self.offset.y,
            bottom: self.target.height - self.scaled.height - self.offset.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReframePlan {
    Crop(CropPlan),
    Pad(PadPlan),
}

impl ReframePlan {
    pub fn target(&self) -> Size {
        match self {
            ReframePlan::Crop(c) => c.target,
            ReframePlan::Pad(p) => p.target,
        }
    }

    pub fn is_pad(&self) -> bool {
        matches!(self, ReframePlan::Pad(_))
    }

    pub fn scale_factor(&self) -> f64 {
        match self {
            ReframePlan::Crop(c) => c.scale_factor,
            ReframePlan::Pad(p) => p.scale_factor,
        }
    }

    /// Check the plan geometry against the source it will be applied to.
    pub fn validate(&self, source_id: &str, target_id: &str, source: Size) -> Result<()> {
        let detail = match self {
            ReframePlan::Crop(c) if !c.crop.fits_within(source) => {
                Some(format!("crop {} outside source {}", c.crop, source))
            }
            ReframePlan::Pad(p) => {
                let placed = Rect::new(p.offset.x, p.offset.y, p.scaled.width, p.scaled.height);
                (!placed.fits_within(p.target))
                    .then(|| format!("scaled {} at {:?} outside canvas {}", p.scaled, p.offset, p.target))
            }
            _ => None,
        };
        match detail {
            Some(detail) => Err(Error::Composition {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
                detail,
            }),
            None => Ok(()),
        }
    }
}

/// Aspect-preserving scale of `source` into `target`, centered. Both sizes
/// must be non-empty.
pub(crate) fn pad_plan(source: Size, target: Size) -> PadPlan {
    let scaled = fit_dimensions(source, target);
    PadPlan {
        scale_factor: (target.width as f64 / source.width as f64)
            .min(target.height as f64 / source.height as f64),
        scaled,
        offset: Point::new(
            (target.width - scaled.width) / 2,
            (target.height - scaled.height) / 2,
        ),
        target,
        background_required: scaled != target,
    }
}

fn crop_window(source: Size, target: Size, centroid: Point) -> Rect {
    let (sw, sh) = (source.width as u64, source.height as u64);
    let (tw, th) = (target.width as u64, target.height as u64);

    let (cw, ch) = if sw * th > sh * tw {
        (sh * tw / th, sh)
    } else {
        (sw, sw * th / tw)
    };
    let cw = cw.clamp(1, sw) as u32;
    let ch = ch.clamp(1, sh) as u32;

    let x = centroid
        .x
        .saturating_sub(cw / 2)
        .min(source.width - cw);
    let y = centroid
        .y
        .saturating_sub(ch / 2)
        .min(source.height - ch);
    Rect::new(x, y, cw, ch)
}

/// Choose and compute the reframing geometry of `source` for `target`.
pub fn plan(
    source: Size,
    target: &TargetSpec,
    subject: &SubjectRegion,
    params: &PlannerParams,
) -> Result<ReframePlan> {
    let target_size = target.size();
    if target_size.is_empty() {
        return Err(Error::InvalidTarget {
            target: target.id.clone(),
            width: target.width,
            height: target.height,
        });
    }
    if source.is_empty() {
        return Err(Error::EmptySource {
            source_id: format!("<{} source>", source),
        });
    }

    let mismatch = (source.aspect_ratio() - target_size.aspect_ratio()).abs();
    let plan = if mismatch > params.mismatch_threshold {
        ReframePlan::Pad(pad_plan(source, target_size))
    } else {
        let crop = crop_window(source, target_size, subject.centroid());
        ReframePlan::Crop(CropPlan {
            crop,
            scale_factor: target_size.width as f64 / crop.width as f64,
            target: target_size,
        })
    };

    debug!(
        "Planned {} for {} (ratio mismatch {:.3}): {:?}",
        if plan.is_pad() { "pad" } else { "crop" },
        target.id,
        mismatch,
        plan
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionSource;
    use proptest::prelude::*;

    fn subject_at(image: Size, rect: Rect) -> SubjectRegion {
        SubjectRegion::new(rect, image, DetectionSource::Saliency).unwrap()
    }

    #[test]
    fn wide_source_into_square_pads() {
        // 4000x3000 -> 1080x1080: ratio gap 0.333 exceeds 0.3
        let source = Size::new(4000, 3000);
        let target = TargetSpec::new("instagram_feed", 1080, 1080, "Instagram Feed");
        let subject = SubjectRegion::fallback(source);
        let plan = plan(source, &target, &subject, &PlannerParams::default()).unwrap();

        let ReframePlan::Pad(pad) = plan else {
            panic!("expected pad plan, got {:?}", plan);
        };
        assert_eq!(pad.scaled, Size::new(1080, 810));
        assert_eq!(pad.offset, Point::new(0, 135));
        assert!(pad.background_required);
        assert!((pad.scale_factor - 0.27).abs() < 1e-9);
        assert_eq!(
            pad.extension(),
            Extension {
                left: 0,
                right: 0,
                top: 135,
                bottom: 135
            }
        );
    }

    #[test]
    fn wide_source_into_banner_pads_horizontally() {
        // 4000x3000 -> 1200x630: ratio gap 0.571
        let source = Size::new(4000, 3000);
        let target = TargetSpec::new("facebook_feed", 1200, 630, "Facebook Feed");
        let plan = plan(source, &target, &SubjectRegion::fallback(source), &PlannerParams::default()).unwrap();
        let ReframePlan::Pad(pad) = plan else {
            panic!("expected pad plan, got {:?}", plan);
        };
        assert_eq!(pad.scaled, Size::new(840, 630));
        assert_eq!(pad.offset, Point::new(180, 0));
    }

    #[test]
    fn near_ratio_crops_with_centroid_inside() {
        // 1000x1000 -> 1200x1000: ratio gap 0.2, subject on the right edge
        let source = Size::new(1000, 1000);
        let target = TargetSpec::new("wide", 1200, 1000, "Wide");
        let subject = subject_at(source, Rect::new(900, 400, 100, 100));
        let plan = plan(source, &target, &subject, &PlannerParams::default()).unwrap();

        let ReframePlan::Crop(crop) = plan else {
            panic!("expected crop plan, got {:?}", plan);
        };
        assert_eq!(crop.crop, Rect::new(0, 34, 1000, 833));
        assert!(crop.crop.contains(subject.centroid()));
        assert!((crop.scale_factor - 1.2).abs() < 1e-9);
    }

    #[test]
    fn matching_ratio_crops_full_source() {
        // 4000x3000 -> 1200x900: identical 4:3 ratio
        let source = Size::new(4000, 3000);
        let target = TargetSpec::new("classic", 1200, 900, "Classic 4:3");
        let subject = subject_at(source, Rect::new(3000, 200, 400, 400));
        let plan = plan(source, &target, &subject, &PlannerParams::default()).unwrap();
        assert_eq!(
            plan,
            ReframePlan::Crop(CropPlan {
                crop: Rect::new(0, 0, 4000, 3000),
                scale_factor: 0.3,
                target: Size::new(1200, 900),
            })
        );
    }

    #[test]
    fn pad_plan_centers_scaled_source() {
        let pad = pad_plan(Size::new(400, 300), Size::new(108, 108));
        assert_eq!(pad.scaled, Size::new(108, 81));
        assert_eq!(pad.offset, Point::new(0, 13));
        assert_eq!(pad.extension().bottom, 14);
        assert!(pad.background_required);
        assert!(!pad_plan(Size::new(400, 300), Size::new(200, 150)).background_required);
    }

    #[test]
    fn crop_window_shifts_at_edges() {
        let source = Size::new(2000, 1000);
        let target = Size::new(1000, 1000);
        let left = crop_window(source, target, Point::new(10, 500));
        assert_eq!(left, Rect::new(0, 0, 1000, 1000));
        let right = crop_window(source, target, Point::new(1990, 500));
        assert_eq!(right, Rect::new(1000, 0, 1000, 1000));
        let mid = crop_window(source, target, Point::new(1200, 500));
        assert_eq!(mid, Rect::new(700, 0, 1000, 1000));
    }

    #[test]
    fn zero_target_is_rejected() {
        let source = Size::new(100, 100);
        let target = TargetSpec::new("broken", 0, 100, "Broken");
        let err = plan(source, &target, &SubjectRegion::fallback(source), &PlannerParams::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { width: 0, .. }));
        assert!(err.is_precondition());
    }

    #[test]
    fn equal_ratio_is_full_source_crop() {
        let source = Size::new(1600, 900);
        let target = TargetSpec::new("hd", 1280, 720, "HD");
        let subject = subject_at(source, Rect::new(0, 0, 50, 50));
        let plan = plan(source, &target, &subject, &PlannerParams::default()).unwrap();
        assert_eq!(
            plan,
            ReframePlan::Crop(CropPlan {
                crop: Rect::new(0, 0, 1600, 900),
                scale_factor: 0.8,
                target: Size::new(1280, 720),
            })
        );
    }

    #[test]
    fn validate_reports_out_of_bounds_crop() {
        let bad = ReframePlan::Crop(CropPlan {
            crop: Rect::new(50, 0, 100, 100),
            scale_factor: 1.0,
            target: Size::new(100, 100),
        });
        let err = bad.validate("photo", "square", Size::new(100, 100)).unwrap_err();
        match err {
            Error::Composition {
                source_id,
                target_id,
                detail,
            } => {
                assert_eq!(source_id, "photo");
                assert_eq!(target_id, "square");
                assert!(detail.contains("crop"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    fn arb_case() -> impl Strategy<Value = (Size, Size, u32, u32)> {
        (1u32..3000, 1u32..3000, 1u32..2000, 1u32..2000, 0u32..10_000, 0u32..10_000).prop_map(
            |(sw, sh, tw, th, fx, fy)| {
                (Size::new(sw, sh), Size::new(tw, th), fx % sw, fy % sh)
            },
        )
    }

    proptest! {
        #[test]
        fn plans_stay_in_bounds_and_hit_target((source, target, cx, cy) in arb_case()) {
            let spec = TargetSpec::new("t", target.width, target.height, "T");
            let subject = subject_at(source, Rect::new(cx, cy, 1, 1));
            let plan = plan(source, &spec, &subject, &PlannerParams::default()).unwrap();
            prop_assert_eq!(plan.target(), target);
            prop_assert!(plan.validate("s", "t", source).is_ok());

            match plan {
                ReframePlan::Crop(c) => {
                    prop_assert!(c.crop.fits_within(source));
                    prop_assert!(c.crop.contains(subject.centroid()));
                }
                ReframePlan::Pad(p) => {
                    let e = p.extension();
                    prop_assert_eq!(e.left + e.right + p.scaled.width, target.width);
                    prop_assert_eq!(e.top + e.bottom + p.scaled.height, target.height);
                    prop_assert!(p.scaled.width == target.width || p.scaled.height == target.height);
                    prop_assert_eq!(p.background_required, p.scaled != target);
                }
            }
        }

        #[test]
        fn planning_is_idempotent((source, target, cx, cy) in arb_case()) {
            let spec = TargetSpec::new("t", target.width, target.height, "T");
            let subject = subject_at(source, Rect::new(cx, cy, 1, 1));
            let params = PlannerParams::default();
            let a = plan(source, &spec, &subject, &params).unwrap();
            let b = plan(source, &spec, &subject, &params).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn equal_ratio_never_pads(w in 1u32..2000, h in 1u32..2000, k in 1u32..4) {
            let source = Size::new(w * k, h * k);
            let spec = TargetSpec::new("t", w, h, "T");
            let plan = plan(source, &spec, &SubjectRegion::fallback(source), &PlannerParams::default()).unwrap();
            prop_assert_eq!(
                plan,
                ReframePlan::Crop(CropPlan {
                    crop: Rect::new(0, 0, source.width, source.height),
                    scale_factor: w as f64 / source.width as f64,
                    target: Size::new(w, h),
                })
            );
        }
    }
}
