//! High-level, ergonomic library API: reframe a source image into every target
//! of a catalog, either in memory or to files, plus batch helpers for
//! directories. Prefer these entrypoints over the low-level processing modules.
//!
//! Every (source, target) pair is an independent unit: a failure is recorded
//! in the returned report and never aborts the remaining targets.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::core::params::{DetectorParams, OutputParams, ReframeParams};
use crate::core::processing::detect::{SpectralResidualDetector, SubjectRegion, detect_or_fallback};
use crate::core::processing::pipeline::{LocalReframer, Reframer};
use crate::core::processing::save::save_canvas;
use crate::error::{Error, Result};
use crate::io::reader::{is_supported_image, open_source};
use crate::types::{Canvas, DetectionSource, SourceImage, TargetSpec};

/// Decode a source image from disk.
pub fn load_source(path: &Path) -> Result<SourceImage> {
    open_source(path)
}

/// Run the spectral residual detector, falling back to the centered region.
pub fn detect_subject(source: &SourceImage, params: &DetectorParams) -> SubjectRegion {
    let detector = SpectralResidualDetector::new(params.clone());
    detect_or_fallback(&detector, source)
}

/// Reframe `source` for a single target in memory (no disk I/O).
pub fn reframe_to_buffer(
    source: &SourceImage,
    target: &TargetSpec,
    params: &ReframeParams,
) -> Result<Canvas> {
    let subject = detect_subject(source, &params.detector);
    LocalReframer::new(params.clone()).reframe(source, &subject, target)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitStatus {
    Written,
    Failed,
}

/// Outcome of one (source, target) unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitOutcome {
    pub target_id: String,
    pub status: UnitStatus,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source_id: String,
    pub detection: DetectionSource,
    pub reframer: String,
    pub outcomes: Vec<UnitOutcome>,
}

impl SourceReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == UnitStatus::Written)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Aggregate of a directory run. Counts are per (source, target) unit; sources
/// that cannot be decoded count once as an error.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub sources: Vec<SourceReport>,
}

impl BatchReport {
    fn absorb(&mut self, report: SourceReport) {
        self.processed += report.succeeded();
        self.errors += report.failed();
        self.sources.push(report);
    }
}

fn build_pool(workers: Option<usize>) -> Result<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = workers {
        builder = builder.num_threads(n.max(1));
    }
    builder.build().map_err(Error::external)
}

fn run_unit(
    source: &SourceImage,
    subject: &SubjectRegion,
    target: &TargetSpec,
    reframer: &dyn Reframer,
    output_dir: &Path,
    output: &OutputParams,
) -> UnitOutcome {
    let path = output_dir.join(target.file_name(output.format));
    let result = reframer
        .reframe(source, subject, target)
        .and_then(|canvas| save_canvas(&canvas, &path, output));

    match result {
        Ok(()) => UnitOutcome {
            target_id: target.id.clone(),
            status: UnitStatus::Written,
            output: Some(path),
            error: None,
        },
        Err(e) => {
            error!("Failed {} -> {}: {}", source.id(), target.id, e);
            UnitOutcome {
                target_id: target.id.clone(),
                status: UnitStatus::Failed,
                output: None,
                error: Some(e.to_string()),
            }
        }
    }
}

fn reframe_on_pool(
    pool: &rayon::ThreadPool,
    source: &SourceImage,
    output_dir: &Path,
    targets: &[TargetSpec],
    reframer: &dyn Reframer,
    params: &ReframeParams,
) -> Result<SourceReport> {
    std::fs::create_dir_all(output_dir)?;
    let subject = detect_subject(source, &params.detector);

    info!(
        "Reframing {} ({}) into {} targets with the {} reframer",
        source.id(),
        source.size(),
        targets.len(),
        reframer.name()
    );
    let outcomes: Vec<UnitOutcome> = pool.install(|| {
        targets
            .par_iter()
            .map(|target| run_unit(source, &subject, target, reframer, output_dir, &params.output))
            .collect()
    });

    let report = SourceReport {
        source_id: source.id().to_string(),
        detection: subject.source(),
        reframer: reframer.name().to_string(),
        outcomes,
    };
    if report.failed() > 0 {
        warn!(
            "{}: {} of {} targets failed",
            report.source_id,
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(report)
}

/// Reframe an already decoded source into `output_dir` with any `Reframer`.
///
/// The subject is detected once and shared by all targets, which run in
/// parallel on a pool of `params.workers` threads. Outcomes keep target order.
pub fn reframe_image_to_dir(
    source: &SourceImage,
    output_dir: &Path,
    targets: &[TargetSpec],
    reframer: &dyn Reframer,
    params: &ReframeParams,
) -> Result<SourceReport> {
    let pool = build_pool(params.workers)?;
    reframe_on_pool(&pool, source, output_dir, targets, reframer, params)
}

/// Decode `input` and write one file per target into `output_dir`.
pub fn reframe_source_to_dir(
    input: &Path,
    output_dir: &Path,
    targets: &[TargetSpec],
    params: &ReframeParams,
) -> Result<SourceReport> {
    let source = load_source(input)?;
    let reframer = LocalReframer::new(params.clone());
    reframe_image_to_dir(&source, output_dir, targets, &reframer, params)
}

/// Image files directly inside `input_dir`, sorted by path.
pub fn iterate_source_images(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files.into_iter())
}

/// Output subdirectory for `path`. The stem is used when free; a stem already
/// taken by another source gets its extension appended, then a counter.
fn batch_dir_name(path: &Path, stem: &str, used: &mut HashSet<String>) -> String {
    let mut name = stem.to_string();
    if used.contains(&name) {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            name = format!("{}_{}", stem, ext.to_ascii_lowercase());
        }
    }
    let base = name.clone();
    let mut n = 2;
    while used.contains(&name) {
        name = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(name.clone());
    name
}

/// Reframe every image in `input_dir` into `output_dir/<source id>/`. Sources
/// sharing a stem are kept apart (`promo/`, `promo_png/`). Non-image files are
/// skipped. If `continue_on_error` is false, the first source that cannot be
/// decoded or written is returned as an error.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    targets: &[TargetSpec],
    params: &ReframeParams,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;
    let reframer = LocalReframer::new(params.clone());
    let pool = build_pool(params.workers)?;
    let mut used = HashSet::new();
    let mut report = BatchReport::default();

    for path in iterate_source_images(input_dir)? {
        if !is_supported_image(&path) {
            report.skipped += 1;
            continue;
        }
        let source = match load_source(&path) {
            Ok(source) => source,
            Err(e) => {
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
                warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };
        let dest = output_dir.join(batch_dir_name(&path, source.id(), &mut used));
        match reframe_on_pool(&pool, &source, &dest, targets, &reframer, params) {
            Ok(source_report) => report.absorb(source_report),
            Err(e) => {
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
                warn!("Skipping {:?}: {}", path, e);
            }
        }
    }

    info!(
        "Batch finished: {} written, {} skipped, {} errors",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
