use anyhow::Result;
use gsctriage::process::pipeline::prioritize_pages;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Input and output paths are part of the contract, not configuration.
const INPUT_PATH: &str = "gsc_pages_mock_law_attorneys.csv";
const OUTPUT_PATH: &str = "gsc_pages_prioritized_actions.csv";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) run the pipeline over the fixed paths ────────────────────
    let summary = prioritize_pages(INPUT_PATH, OUTPUT_PATH)?;

    for (action, count) in &summary.action_counts {
        info!(action = %action, count, "assigned");
    }
    info!(
        rows = summary.rows,
        bytes = summary.bytes_written,
        "wrote {}",
        OUTPUT_PATH
    );
    Ok(())
}
