// src/chrome.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::ChromeConfig;
use crate::emit::write_json_pretty;
use crate::fetch::Fetcher;
use crate::timeline::{self, parse_timestamp_date, ReleaseRecord};

/// One page of `.../versions/all/releases`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasesPage {
    #[serde(default)]
    pub releases: Vec<ApiRelease>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRelease {
    pub version: Option<String>,
    #[serde(default)]
    pub serving: Serving,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Serving {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

pub fn channel_url(cfg: &ChromeConfig, channel: &str, page_token: Option<&str>) -> Result<Url> {
    let raw = format!(
        "{}/{}/channels/{}/versions/all/releases",
        cfg.base_url.trim_end_matches('/'),
        cfg.platform,
        channel
    );
    let mut url = Url::parse(&raw).with_context(|| format!("parsing URL {}", raw))?;
    if let Some(token) = page_token {
        url.query_pairs_mut().append_pair("pageToken", token);
    }
    Ok(url)
}

/// Records for the releases on one page; entries without a version or a
/// parsable start time are dropped.
pub fn records_from_page(page: ReleasesPage, channel: &str) -> Vec<ReleaseRecord> {
    page.releases
        .into_iter()
        .filter_map(|r| {
            let version = r.version?;
            let start = r.serving.start_time?;
            let Some(published) = parse_timestamp_date(&start) else {
                debug!(%version, %start, "unparsable startTime, skipping");
                return None;
            };
            let eol = r.serving.end_time.as_deref().and_then(|end| {
                let parsed = parse_timestamp_date(end);
                if parsed.is_none() {
                    debug!(%version, end, "unparsable endTime, leaving eol empty");
                }
                parsed
            });
            Some(ReleaseRecord {
                version,
                published,
                eol,
                channel: Some(channel.to_string()),
                category: None,
            })
        })
        .collect()
}

#[instrument(level = "info", skip(fetcher, cfg))]
async fn fetch_channel<F: Fetcher>(
    fetcher: &F,
    cfg: &ChromeConfig,
    channel: &str,
) -> Result<Vec<ReleaseRecord>> {
    let mut out = Vec::new();
    let mut token: Option<String> = None;

    for page_no in 0..cfg.max_pages.max(1) {
        let url = channel_url(cfg, channel, token.as_deref())?;
        let body = fetcher.get_text(&url).await?;
        let page: ReleasesPage = serde_json::from_str(&body)
            .with_context(|| format!("decoding JSON from {}", url))?;

        token = page.next_page_token.clone().filter(|t| !t.is_empty());
        out.extend(records_from_page(page, channel));
        debug!(page = page_no, total = out.len(), "page done");

        if token.is_none() {
            return Ok(out);
        }
    }

    warn!(max_pages = cfg.max_pages, "page limit reached, timeline may be partial");
    Ok(out)
}

/// All channels merged into one timeline. Failing channels are logged and
/// skipped; it is an error only when every channel failed.
pub async fn collect_releases<F: Fetcher>(
    fetcher: &F,
    cfg: &ChromeConfig,
) -> Result<Vec<ReleaseRecord>> {
    let mut all = Vec::new();
    let mut succeeded = 0usize;

    for channel in &cfg.channels {
        match fetch_channel(fetcher, cfg, channel).await {
            Ok(records) => {
                info!(%channel, releases = records.len(), "channel fetched");
                succeeded += 1;
                all.extend(records);
            }
            Err(e) => warn!(%channel, error = %format!("{:#}", e), "skipping channel"),
        }
    }

    if succeeded == 0 && !cfg.channels.is_empty() {
        bail!("no Chrome channel could be fetched");
    }
    Ok(timeline::assemble(all))
}

pub async fn run<F: Fetcher>(fetcher: &F, cfg: &ChromeConfig, output_root: &Path) -> Result<PathBuf> {
    let records = collect_releases(fetcher, cfg).await?;
    let path = output_root.join(&cfg.output_path);
    write_json_pretty(&path, &records)?;
    Ok(path)
}
