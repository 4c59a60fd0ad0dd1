use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::core::params::OutputParams;
use crate::error::{Error, Result};
use crate::io::writers::jpeg::encode_rgb_jpeg;
use crate::io::writers::png::encode_rgb_png;
use crate::types::{Canvas, OutputFormat};

/// Encode a canvas in the configured output format.
pub fn encode_canvas(canvas: &Canvas, params: &OutputParams) -> Result<Vec<u8>> {
    let (w, h) = canvas.pixels.dimensions();
    match params.format {
        OutputFormat::Jpeg => encode_rgb_jpeg(w, h, canvas.pixels.as_raw(), params.quality),
        OutputFormat::Png => encode_rgb_png(w, h, canvas.pixels.as_raw()),
    }
}

/// Write `bytes` to `output` through a temp file in the same directory, so a
/// failure never leaves a partial file behind.
pub fn write_atomic(output: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Encode and save a canvas to `output`.
pub fn save_canvas(canvas: &Canvas, output: &Path, params: &OutputParams) -> Result<()> {
    let bytes = encode_canvas(canvas, params)?;
    write_atomic(output, &bytes)?;
    info!(
        "Saved {} {} ({} bytes) to {:?}",
        params.format,
        canvas.size(),
        bytes.len(),
        output
    );
    Ok(())
}
