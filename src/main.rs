// src/main.rs

use anyhow::Result;
use eolscraper::{pipeline, Config, HttpFetcher};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,eolscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = Config::from_env_or_default()?;
    info!(
        output_dir = %cfg.output_dir.display(),
        windows_families = cfg.windows.len(),
        "configured"
    );

    // ─── 3) run every platform once ──────────────────────────────────
    let fetcher = HttpFetcher::new(&cfg.user_agent, cfg.min_fetch_interval())?;
    let summary = pipeline::run(&cfg, &fetcher).await;

    for (platform, err) in &summary.failed {
        warn!(%platform, error = %err, "skipped this run");
    }
    info!(files = summary.written.len(), "all done");
    Ok(())
}
