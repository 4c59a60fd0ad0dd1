use clap::Parser;
use std::path::PathBuf;

use adreframe::types::{BackdropStyle, OutputFormat};

#[derive(Parser)]
#[command(name = "adreframe", version, about = "Content-aware ad image reframing")]
pub struct CliArgs {
    /// Input image (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing images (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output directory; one file per target format
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Comma-separated target ids to produce (default: whole catalog)
    #[arg(long, value_delimiter = ',')]
    pub formats: Option<Vec<String>>,

    /// JSON catalog of targets replacing the built-in table
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// JSON file with reframing parameters; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output encoding (jpeg or png)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Fill for padded areas (blurred or solid)
    #[arg(long, value_enum)]
    pub backdrop: Option<BackdropStyle>,

    /// Aspect-ratio difference above which images are padded instead of cropped
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Skip the contrast/color/sharpness boost
    #[arg(long, default_value_t = false)]
    pub no_enhance: bool,

    /// Worker threads per source (default: one per core)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Print the target catalog and exit
    #[arg(long, default_value_t = false)]
    pub list_formats: bool,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue with other images when one cannot be decoded
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
