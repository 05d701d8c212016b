use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Builder, Int64Builder, StringArray},
    datatypes::{DataType, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::process::RawTable;

/// Build typed columns from the raw string table. Metric columns become
/// Int64/Float64 with empty cells as nulls; everything else collects
/// into Utf8 exactly as it appeared in the input.
pub fn convert_to_typed(raw: &RawTable, schema: &Schema) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for (i, field) in schema.fields().iter().enumerate() {
        let cells = raw
            .rows
            .iter()
            .map(|row| row.get(i).map(String::as_str).unwrap_or(""));

        match field.data_type() {
            DataType::Int64 => {
                let mut b = Int64Builder::with_capacity(raw.rows.len());
                for (row_idx, cell) in cells.enumerate() {
                    match cell.trim() {
                        "" => b.append_null(),
                        v => b.append_value(v.parse::<i64>().with_context(|| {
                            // header occupies line 1
                            format!(
                                "non-numeric value '{}' in column '{}' at line {}",
                                v,
                                field.name(),
                                row_idx + 2
                            )
                        })?),
                    }
                }
                columns.push(Arc::new(b.finish()) as ArrayRef);
            }
            DataType::Float64 => {
                let mut b = Float64Builder::with_capacity(raw.rows.len());
                for (row_idx, cell) in cells.enumerate() {
                    match cell.trim() {
                        "" => b.append_null(),
                        v => b.append_value(v.parse::<f64>().with_context(|| {
                            format!(
                                "non-numeric value '{}' in column '{}' at line {}",
                                v,
                                field.name(),
                                row_idx + 2
                            )
                        })?),
                    }
                }
                columns.push(Arc::new(b.finish()) as ArrayRef);
            }
            _ => {
                let col: StringArray = cells.map(Some).collect();
                columns.push(Arc::new(col) as ArrayRef);
            }
        }
    }

    RecordBatch::try_new(Arc::new(schema.clone()), columns).context("assembling typed batch")
}
