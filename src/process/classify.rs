use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::warn;

use crate::process::{
    column_as,
    schema::{COL_CTR, COL_IMPRESSIONS, COL_POSITION, COL_SEO_ACTION},
};

pub const ACTION_IMPROVE_CTR: &str = "Improve CTR (title/meta/snippet)";
pub const ACTION_CONTENT_EXPANSION: &str = "Content expansion / optimization";
pub const ACTION_LOW_PRIORITY: &str = "Low priority / monitor";
pub const ACTION_NO_ACTION: &str = "No action";

/// Recommended action for one page, from its three core metrics.
///
/// Rules are evaluated top to bottom and the first match wins; the
/// middle rules overlap for some inputs, so the order is part of the
/// contract. A missing metric never satisfies a comparison, which means
/// a rule that does not read the missing field can still fire.
pub fn assign_action(
    impressions: Option<i64>,
    ctr: Option<f64>,
    position: Option<f64>,
) -> &'static str {
    let high_traffic = impressions.map_or(false, |v| v > 10_000);
    let weak_ctr = ctr.map_or(false, |v| v < 0.01);
    let first_page = position.map_or(false, |v| v <= 10.0);
    if high_traffic && weak_ctr && first_page {
        return ACTION_IMPROVE_CTR;
    }

    let solid_traffic = impressions.map_or(false, |v| v > 3_000);
    let striking_distance = position.map_or(false, |v| v > 8.0 && v <= 15.0);
    if solid_traffic && striking_distance {
        return ACTION_CONTENT_EXPANSION;
    }

    let thin_traffic = impressions.map_or(false, |v| v < 1_000);
    let buried = position.map_or(false, |v| v > 15.0);
    if thin_traffic && buried {
        return ACTION_LOW_PRIORITY;
    }

    ACTION_NO_ACTION
}

/// Evaluate the rules for every row and append the result as a
/// `seo_action` column. Rows keep their order; no rows are dropped.
pub fn append_action_column(batch: &RecordBatch) -> Result<RecordBatch> {
    let impressions: &Int64Array = column_as(batch, COL_IMPRESSIONS)?;
    let ctr: &Float64Array = column_as(batch, COL_CTR)?;
    let position: &Float64Array = column_as(batch, COL_POSITION)?;

    let mut incomplete = 0usize;
    let mut labels = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let imp = impressions.is_valid(i).then(|| impressions.value(i));
        let c = ctr.is_valid(i).then(|| ctr.value(i));
        let pos = position.is_valid(i).then(|| position.value(i));
        if imp.is_none() || c.is_none() || pos.is_none() {
            incomplete += 1;
        }
        labels.push(assign_action(imp, c, pos));
    }
    if incomplete > 0 {
        warn!(
            rows = incomplete,
            "rows with missing metric values; unmatched rules fall through"
        );
    }

    let mut fields: Vec<Arc<Field>> = batch.schema().fields().iter().cloned().collect();
    fields.push(Arc::new(Field::new(COL_SEO_ACTION, DataType::Utf8, false)));

    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    columns.push(Arc::new(StringArray::from(labels)) as ArrayRef);

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("appending action column")
}
