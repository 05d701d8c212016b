use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, io::BufReader, path::Path};
use tracing::{debug, instrument};

use arrow::record_batch::RecordBatch;

pub mod classify;
pub mod convert;
pub mod pipeline;
pub mod schema;
pub mod sort;
pub mod write;

#[derive(Debug)]
pub struct RawTable {
    /// Column names from the header row, in file order.
    pub headers: Vec<String>,
    /// Each data row as a Vec of Strings (one per field).
    pub rows: Vec<Vec<String>>,
}

/// Read the whole report into memory: header row plus every record,
/// untyped. Typing happens later against the derived schema.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_report<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let file = File::open(&path)
        .with_context(|| format!("failed to open input file {}", path.as_ref().display()))?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(rows = rows.len(), cols = headers.len(), "loaded raw table");
    Ok(RawTable { headers, rows })
}

/// Fetch a column by name, downcast to its concrete array type.
pub(crate) fn column_as<'a, A: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A> {
    let idx = batch
        .schema()
        .index_of(name)
        .with_context(|| format!("missing column '{}'", name))?;
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| anyhow!("column '{}' has an unexpected type", name))
}
