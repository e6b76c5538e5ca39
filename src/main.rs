use anyhow::{Context, Result};
use ingest_pipeline::{
    config::{load_env_file, Config},
    discover::plan_conversions,
    process::convert_csv_to_parquet,
};
use std::path::Path;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Optional settings file, resolved against the process working directory
/// (where the job is launched from), not the executable's directory.
const ENV_FILE: &str = ".env";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) load settings; nothing touches data before this passes ──
    load_env_file(Path::new(ENV_FILE)).with_context(|| format!("reading {}", ENV_FILE))?;
    let config = Config::from_env()?;
    info!(
        account = %config.account,
        user = %config.user,
        role = %config.role,
        warehouse = %config.warehouse,
        target = %config.qualified_raw_schema(),
        data = %config.local_data_path.display(),
        "startup"
    );

    // ─── 3) find inputs ─────────────────────────────────────────────
    let plan = plan_conversions(&config.local_data_path)?;
    if plan.is_empty() {
        info!("no delimited files found; exit");
        return Ok(());
    }
    info!("{} files to convert", plan.len());

    // ─── 4) convert one file at a time ──────────────────────────────
    let options = config.convert_options();
    let start = Instant::now();
    let mut total_rows = 0u64;
    for job in &plan {
        let report = convert_csv_to_parquet(&job.source, &job.destination, &options)
            .with_context(|| format!("converting {}", job.source.display()))?;
        total_rows += report.rows_written;
        println!("{}", serde_json::to_string(&report)?);
    }

    info!(files = plan.len(), rows = total_rows, elapsed = ?start.elapsed(), "all done");
    Ok(())
}
