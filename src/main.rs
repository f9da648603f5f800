use std::env;
use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use category_report::config::Config;
use category_report::{report_from_dir, rolling_window_from_dir};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("category-report", String::as_str);

    anyhow::ensure!(
        args.len() <= 2,
        "Usage: BASE_DIR=<dir> {} [report|rolling]",
        program
    );

    let config = Config::from_env().context("Failed to read configuration")?;
    let started = Instant::now();

    match args.get(1).map_or("report", String::as_str) {
        "report" => {
            let stdout = io::stdout();
            report_from_dir(&config, stdout.lock())
                .await
                .with_context(|| {
                    format!("Failed to build report from '{}'", config.base_dir.display())
                })?;
        }
        "rolling" => {
            rolling_window_from_dir(&config).with_context(|| {
                format!(
                    "Failed to build rolling window table from '{}'",
                    config.transactions_path().display()
                )
            })?;
        }
        other => anyhow::bail!("Unknown job '{}', expected 'report' or 'rolling'", other),
    }

    info!(
        "elapsed time: {} microseconds",
        started.elapsed().as_micros()
    );
    Ok(())
}
