//! JSONL export of the current canvas, one object record per line.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use canvas::DrawableObject;
use canvas::object;

use crate::CliError;

/// Write `objects` in paint order to `out`. Returns the number of lines.
///
/// # Errors
///
/// Returns [`CliError::Io`] or [`CliError::InvalidJson`] on write failure.
pub fn write_jsonl(objects: &[DrawableObject], out: &mut impl Write) -> Result<usize, CliError> {
    for obj in objects {
        serde_json::to_writer(&mut *out, &object::serialize(obj))?;
        out.write_all(b"\n")?;
    }
    Ok(objects.len())
}

/// Create (or truncate) `path` and export `objects` into it.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the file cannot be written.
pub fn export_to_path(objects: &[DrawableObject], path: &Path) -> Result<usize, CliError> {
    let mut out = BufWriter::new(File::create(path)?);
    let written = write_jsonl(objects, &mut out)?;
    out.flush()?;
    Ok(written)
}
