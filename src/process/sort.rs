use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Int64Array, StringArray, UInt32Array},
    compute::take,
    record_batch::RecordBatch,
};

use crate::process::{
    column_as,
    schema::{COL_IMPRESSIONS, COL_SEO_ACTION},
};

/// Reorder rows so the report reads group by group: action label
/// ascending, highest impressions first within each label. The
/// permutation comes from a stable sort, so equal (label, impressions)
/// pairs keep their input order. Null impressions sort after every
/// counted value in their group.
pub fn sort_by_priority(batch: &RecordBatch) -> Result<RecordBatch> {
    let actions: &StringArray = column_as(batch, COL_SEO_ACTION)?;
    let impressions: &Int64Array = column_as(batch, COL_IMPRESSIONS)?;

    let count = impressions_key(impressions);
    let mut order: Vec<u32> = (0..batch.num_rows() as u32).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (a as usize, b as usize);
        actions
            .value(a)
            .cmp(actions.value(b))
            .then_with(|| count[b].cmp(&count[a]))
    });

    let indices = UInt32Array::from(order);
    let columns = batch
        .columns()
        .iter()
        .map(|col| take(col.as_ref(), &indices, None))
        .collect::<Result<Vec<ArrayRef>, _>>()
        .context("reordering columns")?;

    RecordBatch::try_new(batch.schema(), columns).map_err(Into::into)
}

fn impressions_key(impressions: &Int64Array) -> Vec<i64> {
    (0..impressions.len())
        .map(|i| {
            if impressions.is_valid(i) {
                impressions.value(i)
            } else {
                i64::MIN
            }
        })
        .collect()
}
