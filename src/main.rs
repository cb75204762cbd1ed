use anyhow::Context as _;
use cloudsave_report::config::Settings;
use cloudsave_report::global::Global;
use cloudsave_report::{platforms, report};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Settings::new().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .parse_lossy(&config.logging.level),
        )
        .init();

    tracing::info!("starting cloud save report");

    let global = Global::init(config)?;
    let platforms = platforms::all(&global);

    let report = report::generate(&global, &platforms)
        .await
        .context("catalog discovery")?;

    let path = &global.config.report.path;
    report.write_csv(path)?;

    tracing::info!(
        rows = report.rows.len(),
        path = %path,
        elapsed_secs = global.started_at.elapsed().as_secs(),
        "report written"
    );

    Ok(())
}
