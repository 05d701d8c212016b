use anyhow::{bail, Result};
use arrow::datatypes::{DataType, Field, Schema};

/// Columns the action rules read. All three must be present in the
/// input header; any other columns ride along untouched.
pub const COL_IMPRESSIONS: &str = "impressions";
pub const COL_CTR: &str = "ctr";
pub const COL_POSITION: &str = "position";

/// Computed column appended to the output.
pub const COL_SEO_ACTION: &str = "seo_action";

const REQUIRED_COLUMNS: [&str; 3] = [COL_IMPRESSIONS, COL_CTR, COL_POSITION];

/// Map the input header to an Arrow schema. The metric columns get
/// numeric types (nullable, since cells can be empty); everything else
/// stays Utf8 so pass-through columns are written back unchanged.
pub fn derive_schema(headers: &[String]) -> Result<Schema> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!(
            "input header is missing required column(s): {}",
            missing.join(", ")
        );
    }

    let fields: Vec<Field> = headers
        .iter()
        .map(|name| match name.as_str() {
            COL_IMPRESSIONS => Field::new(name, DataType::Int64, true),
            COL_CTR | COL_POSITION => Field::new(name, DataType::Float64, true),
            _ => Field::new(name, DataType::Utf8, true),
        })
        .collect();

    Ok(Schema::new(fields))
}
