// src/pipeline.rs

use std::path::PathBuf;
use tracing::{error, info};

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::{chrome, firefox, windows};

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    /// `(platform, error)` for every platform that was abandoned.
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    fn record<T>(&mut self, platform: &str, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                let msg = format!("{:#}", e);
                error!(platform, error = %msg, "platform failed, continuing");
                self.failed.push((platform.to_string(), msg));
                None
            }
        }
    }
}

/// Process every configured platform, one after the other.
///
/// A platform failure is logged and recorded; the remaining platforms still run.
pub async fn run<F: Fetcher>(cfg: &Config, fetcher: &F) -> RunSummary {
    let mut summary = RunSummary::default();
    let root = cfg.output_dir.as_path();

    // ─── Chrome ─────────────────────────────────────────────────────
    if let Some(chrome_cfg) = &cfg.chrome {
        info!(platform = %chrome_cfg.platform, "processing chrome");
        if let Some(path) = summary.record("chrome", chrome::run(fetcher, chrome_cfg, root).await) {
            summary.written.push(path);
        }
    }

    // ─── Firefox ────────────────────────────────────────────────────
    if let Some(firefox_cfg) = &cfg.firefox {
        info!("processing firefox");
        if let Some(path) =
            summary.record("firefox", firefox::run(fetcher, firefox_cfg, root).await)
        {
            summary.written.push(path);
        }
    }

    // ─── Windows families ───────────────────────────────────────────
    for family in &cfg.windows {
        info!(family = %family.name, "processing windows family");
        if let Some(paths) =
            summary.record(&family.name, windows::run_family(fetcher, family, root).await)
        {
            summary.written.extend(paths);
        }
    }

    info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        "run complete"
    );
    summary
}
