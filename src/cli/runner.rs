use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adreframe::api::{BatchReport, SourceReport, process_directory_to_path, reframe_source_to_dir};
use adreframe::io::{default_catalog, load_catalog, select_targets};
use adreframe::types::TargetSpec;
use adreframe::{ReframeParams, UnitStatus};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_params(args: &CliArgs) -> Result<ReframeParams, AppError> {
    let mut params = match &args.config {
        Some(path) => ReframeParams::from_json_file(path)?,
        None => ReframeParams::default(),
    };
    if let Some(format) = args.format {
        params.output.format = format;
    }
    if let Some(quality) = args.quality {
        params.output.quality = quality;
    }
    if let Some(style) = args.backdrop {
        params.backdrop.style = style;
    }
    if let Some(threshold) = args.threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AppError::InvalidThreshold { value: threshold });
        }
        params.planner.mismatch_threshold = threshold;
    }
    if args.no_enhance {
        params.enhance.enabled = false;
    }
    if args.workers.is_some() {
        params.workers = args.workers;
    }
    Ok(params)
}

fn build_targets(args: &CliArgs) -> Result<Vec<TargetSpec>, AppError> {
    let catalog = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => default_catalog(),
    };
    Ok(match &args.formats {
        Some(ids) => select_targets(&catalog, ids)?,
        None => catalog,
    })
}

fn log_source_report(report: &SourceReport) {
    for outcome in &report.outcomes {
        match (outcome.status, &outcome.output, &outcome.error) {
            (UnitStatus::Written, Some(path), _) => info!("  ✓ {} -> {:?}", outcome.target_id, path),
            (_, _, Some(e)) => warn!("  ✗ {}: {}", outcome.target_id, e),
            _ => warn!("  ✗ {}", outcome.target_id),
        }
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    let targets = build_targets(&args)?;
    if args.list_formats {
        for t in &targets {
            println!("{:<28} {:>5}x{:<5} {}", t.id, t.width, t.height, t.label);
        }
        return Ok(());
    }

    let params = build_params(&args)?;
    let output_dir = args.output_dir.clone().ok_or(AppError::MissingArgument {
        arg: "--output-dir".to_string(),
    })?;
    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.clone().ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        info!("Starting batch reframing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report: BatchReport =
            process_directory_to_path(&input_dir, &output_dir, &targets, &params, args.batch)
                .map_err(AppError::from)?;
        for source in &report.sources {
            info!("{} ({:?} subject):", source.source_id, source.detection);
            log_source_report(source);
        }

        info!("Batch reframing complete!");
        info!("Written: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);

        if report.errors > 0 {
            return Err(AppError::UnitsFailed {
                failed: report.errors,
                total: report.processed + report.errors,
            }
            .into());
        }
    } else {
        let input = args.input.clone().ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        info!("Reframing {:?} into {} formats", input, targets.len());

        let report = reframe_source_to_dir(&input, &output_dir, &targets, &params)
            .map_err(AppError::from)?;
        log_source_report(&report);
        info!(
            "Done: {} written, {} failed -> {:?}",
            report.succeeded(),
            report.failed(),
            output_dir
        );

        if report.failed() > 0 {
            return Err(AppError::UnitsFailed {
                failed: report.failed(),
                total: report.outcomes.len(),
            }
            .into());
        }
    }

    Ok(())
}
