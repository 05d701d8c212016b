use anyhow::{Context, Result};
use arrow::{csv::WriterBuilder, record_batch::RecordBatch};
use std::{fs, fs::File, path::Path};
use tracing::debug;

/// Serialize the batch as comma-delimited text with a header row, the
/// same conventions the loader accepts. Returns bytes written.
pub fn write_report<P: AsRef<Path>>(batch: &RecordBatch, path: P) -> Result<u64> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;

    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(batch)
        .with_context(|| format!("writing CSV to {}", path.display()))?;
    drop(writer);

    let metadata = fs::metadata(path).context("getting output file metadata")?;
    debug!(bytes = metadata.len(), "wrote output file");
    Ok(metadata.len())
}
