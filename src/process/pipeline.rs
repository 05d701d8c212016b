use anyhow::Result;
use arrow::array::StringArray;
use std::{collections::BTreeMap, path::Path, time::Instant};
use tracing::{info, instrument};

use crate::process::{classify, column_as, convert, load_report, schema, sort, write};

/// Row and label totals for one completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub rows: usize,
    pub bytes_written: u64,
    pub action_counts: BTreeMap<String, usize>,
}

/// Load the page report, attach a recommended action to every row,
/// order rows by (action, impressions descending) and write the result.
#[instrument(
    level = "info",
    skip(input, output),
    fields(input = %input.as_ref().display(), output = %output.as_ref().display())
)]
pub fn prioritize_pages<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<RunSummary> {
    let start = Instant::now();

    let raw = load_report(&input)?;
    let table_schema = schema::derive_schema(&raw.headers)?;
    let batch = convert::convert_to_typed(&raw, &table_schema)?;
    let labelled = classify::append_action_column(&batch)?;
    let sorted = sort::sort_by_priority(&labelled)?;
    let bytes_written = write::write_report(&sorted, &output)?;

    let actions: &StringArray = column_as(&sorted, schema::COL_SEO_ACTION)?;
    let mut action_counts = BTreeMap::new();
    for i in 0..sorted.num_rows() {
        *action_counts.entry(actions.value(i).to_string()).or_insert(0) += 1;
    }

    info!(
        rows = sorted.num_rows(),
        bytes = bytes_written,
        elapsed = ?start.elapsed(),
        "report written"
    );
    Ok(RunSummary {
        rows: sorted.num_rows(),
        bytes_written,
        action_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::classify::{
        ACTION_CONTENT_EXPANSION, ACTION_IMPROVE_CTR, ACTION_LOW_PRIORITY,
    };
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,gsctriage=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const SAMPLE: &str = "\
page,impressions,ctr,position
/practice-areas,15000,0.005,5
/blog/filing-deadlines,5000,0.02,12
/attorneys/archive,500,0.03,20
";

    fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok((headers, rows))
    }

    #[test]
    fn orders_rows_by_action_then_impressions() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("pages.csv");
        let output = dir.path().join("actions.csv");
        fs::write(&input, SAMPLE)?;

        let summary = prioritize_pages(&input, &output)?;
        assert_eq!(summary.rows, 3);

        let (headers, rows) = read_rows(&output)?;
        assert_eq!(
            headers,
            vec!["page", "impressions", "ctr", "position", "seo_action"]
        );
        assert_eq!(rows.len(), 3);

        // labels sort lexicographically: Content… < Improve… < Low…
        assert_eq!(rows[0][0], "/blog/filing-deadlines");
        assert_eq!(rows[0][4], ACTION_CONTENT_EXPANSION);
        assert_eq!(rows[1][0], "/practice-areas");
        assert_eq!(rows[1][4], ACTION_IMPROVE_CTR);
        assert_eq!(rows[2][0], "/attorneys/archive");
        assert_eq!(rows[2][4], ACTION_LOW_PRIORITY);
        Ok(())
    }

    #[test]
    fn summary_counts_cover_every_row() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("pages.csv");
        let output = dir.path().join("actions.csv");
        fs::write(&input, SAMPLE)?;

        let summary = prioritize_pages(&input, &output)?;
        assert_eq!(summary.action_counts.values().sum::<usize>(), summary.rows);
        assert_eq!(summary.action_counts[ACTION_IMPROVE_CTR], 1);
        Ok(())
    }

    #[test]
    fn reruns_are_byte_identical() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("pages.csv");
        fs::write(&input, SAMPLE)?;

        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        prioritize_pages(&input, &first)?;
        prioritize_pages(&input, &second)?;

        assert_eq!(fs::read(&first)?, fs::read(&second)?);
        Ok(())
    }

    #[test]
    fn header_only_input_yields_header_only_output() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("pages.csv");
        let output = dir.path().join("actions.csv");
        fs::write(&input, "page,impressions,ctr,position\n")?;

        let summary = prioritize_pages(&input, &output)?;
        assert_eq!(summary.rows, 0);

        let (headers, rows) = read_rows(&output)?;
        assert_eq!(
            headers,
            vec!["page", "impressions", "ctr", "position", "seo_action"]
        );
        assert!(rows.is_empty());
        Ok(())
    }

    #[test]
    fn extra_columns_ride_along_unchanged() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("pages.csv");
        let output = dir.path().join("actions.csv");
        fs::write(
            &input,
            "page,impressions,ctr,position,country\n/home,500,0.03,20,AU\n",
        )?;

        prioritize_pages(&input, &output)?;

        let (headers, rows) = read_rows(&output)?;
        assert_eq!(
            headers,
            vec!["page", "impressions", "ctr", "position", "country", "seo_action"]
        );
        assert_eq!(rows[0][4], "AU");
        assert_eq!(rows[0][5], ACTION_LOW_PRIORITY);
        Ok(())
    }

    #[test]
    fn missing_input_file_is_fatal() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let output = dir.path().join("actions.csv");

        let err = prioritize_pages("does/not/exist.csv", &output).unwrap_err();
        assert!(err.to_string().contains("failed to open input file"));
        assert!(!output.exists());
    }

    #[test]
    fn missing_required_column_is_fatal() -> Result<()> {
        init_test_logging();
        let dir = tempdir()?;
        let input = dir.path().join("pages.csv");
        fs::write(&input, "page,impressions,ctr\n/home,500,0.03\n")?;

        let err = prioritize_pages(&input, dir.path().join("actions.csv")).unwrap_err();
        assert!(err.to_string().contains("position"));
        Ok(())
    }
}
