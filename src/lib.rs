#![doc = r#"
adreframe: content-aware reframing of ad creatives.

This crate reshapes one source image into many placement sizes (square feed posts,
vertical stories, wide banners, skyscrapers) without stretching the picture or
blindly center-cropping it. For each source it locates the visually important
subject once, then for every target it either crops around that subject or scales
the whole image and pads it onto a blurred, muted copy of itself. Every output is
finished with a light contrast, saturation and sharpness boost.

Stability
---------
The public library API is experimental in initial releases and may evolve.

Add dependency
--------------
```toml
[dependencies]
adreframe = "0.1"
```

Quick start: reframe an image into the built-in catalog
-------------------------------------------------------
```rust,no_run
use std::path::Path;
use adreframe::{default_catalog, reframe_source_to_dir, ReframeParams};

fn main() -> adreframe::Result<()> {
    let report = reframe_source_to_dir(
        Path::new("/data/summer_sale.jpg"),
        Path::new("/out/summer_sale"),
        &default_catalog(),
        &ReframeParams::default(),
    )?;
    println!("written={} failed={}", report.succeeded(), report.failed());
    Ok(())
}
```

Reframe in memory
-----------------
```rust,no_run
use std::path::Path;
use adreframe::{load_source, reframe_to_buffer, ReframeParams, TargetSpec};

fn main() -> adreframe::Result<()> {
    let source = load_source(Path::new("/data/summer_sale.jpg"))?;
    let target = TargetSpec::new("story", 1080, 1920, "Story");
    let canvas = reframe_to_buffer(&source, &target, &ReframeParams::default())?;
    assert_eq!(canvas.pixels.dimensions(), (1080, 1920));
    Ok(())
}
```

Custom reframers
----------------
`Reframer` is the seam between "what size" and "how". `LocalReframer` runs the
in-process pipeline; `RemoteReframer` hands padded areas to any `OutpaintClient`
(for example an image-extension web service) and pads onto a flat fill if the
client fails.

```rust
use adreframe::{Extension, OutpaintClient, RemoteReframer};
use image::RgbImage;

struct Gray;

impl OutpaintClient for Gray {
    fn outpaint(&self, scaled: &RgbImage, e: Extension) -> adreframe::Result<RgbImage> {
        let w = scaled.width() + e.left + e.right;
        let h = scaled.height() + e.top + e.bottom;
        Ok(RgbImage::from_pixel(w, h, image::Rgb([128, 128, 128])))
    }
}

let _reframer = RemoteReframer::new(Gray);
```

Error handling
--------------
All public functions return `adreframe::Result<T>`. Per-target failures inside the
directory helpers are collected into `SourceReport` / `BatchReport` instead of
aborting the run.

Useful modules
--------------
- [`api`]: high-level, ergonomic entry points and reports.
- [`core`]: detection, planning, backdrop, composition and enhancement.
- [`io`]: image decoding, the target catalog and encoders.
- [`types`]: geometry and shared types.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::params::ReframeParams;
pub use error::{Error, Result};
pub use types::{
    BackdropStyle, Canvas, OutputFormat, Point, Rect, Size, SourceImage, TargetSpec,
};

// Processing seams
pub use core::processing::detect::{
    SpectralResidualDetector, SubjectDetector, SubjectRegion, detect_or_fallback,
};
pub use core::processing::pipeline::{LocalReframer, OutpaintClient, Reframer, RemoteReframer};
pub use core::processing::plan::{Extension, ReframePlan, plan};

// Catalog
pub use io::catalog::{default_catalog, load_catalog, select_targets};

// High-level API re-exports
pub use api::{
    BatchReport, SourceReport, UnitOutcome, UnitStatus, detect_subject, iterate_source_images,
    load_source, process_directory_to_path, reframe_image_to_dir, reframe_source_to_dir,
    reframe_to_buffer,
};
