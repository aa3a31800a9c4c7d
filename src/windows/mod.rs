// src/windows/mod.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::WindowsFamily;
use crate::emit::write_json_pretty;
use crate::fetch::Fetcher;
use crate::timeline::{self, Dated};

pub mod headers;
pub mod locate;
pub mod patch_tuesday;
pub mod rows;

pub use headers::{map_headers, ColumnMap, HeaderMapping};
pub use locate::{locate_tables, RawTableEntry};
pub use rows::ExtractedRow;

/// One monthly (or out-of-band) OS update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRow {
    pub date: NaiveDate,
    pub build: String,
    #[serde(rename = "KB")]
    pub kb: String,
    pub eol: Option<NaiveDate>,
    pub is_preview: bool,
}

impl Dated for UpdateRow {
    fn key(&self) -> &str {
        &self.build
    }

    fn published(&self) -> NaiveDate {
        self.date
    }
}

/// Contents of one `<prefix><version>.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsVersionFile {
    pub version: String,
    pub label: String,
    pub end_of_servicing: bool,
    pub updates: Vec<UpdateRow>,
}

/// Concatenated text of an element with whitespace runs collapsed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Header mapping, row extraction and EOL inference for one table.
pub fn extract_updates(table: ElementRef<'_>) -> Vec<UpdateRow> {
    let cols = match map_headers(headers::header_texts(table).as_slice()) {
        HeaderMapping::Complete(cols) => cols,
        HeaderMapping::Incomplete { missing } => {
            warn!(
                table = table.value().id().unwrap_or_default(),
                ?missing,
                "incomplete header schema, table yields no rows"
            );
            return Vec::new();
        }
    };

    let updates: Vec<UpdateRow> = rows::extract_rows(table, &cols)
        .into_iter()
        .filter_map(patch_tuesday::infer)
        .collect();
    timeline::assemble(updates)
}

/// Every located table on a release-health page, with its updates.
pub fn parse_release_page(html: &str) -> Vec<WindowsVersionFile> {
    let doc = Html::parse_document(html);
    locate_tables(&doc)
        .into_iter()
        .map(|entry| WindowsVersionFile {
            updates: extract_updates(entry.table),
            version: entry.version,
            label: entry.label,
            end_of_servicing: entry.end_of_servicing,
        })
        .collect()
}

/// Fetch one family's page and write a file per version table.
#[instrument(level = "info", skip_all, fields(family = %family.name))]
pub async fn run_family<F: Fetcher>(
    fetcher: &F,
    family: &WindowsFamily,
    output_root: &Path,
) -> Result<Vec<PathBuf>> {
    let url = Url::parse(&family.source_url)
        .with_context(|| format!("parsing URL {}", family.source_url))?;
    let html = fetcher.get_text(&url).await?;

    let files = parse_release_page(&html);
    info!(tables = files.len(), "parsed release page");

    let dir = output_root.join(&family.output_dir);
    let mut seen = HashSet::new();
    let mut written = Vec::new();
    let mut last_err = None;
    for file in files {
        if file.updates.is_empty() {
            warn!(version = %file.version, label = %file.label, "no updates found");
            continue;
        }
        if !seen.insert(file.version.clone()) {
            warn!(version = %file.version, label = %file.label, "version already written for this family, skipping table");
            continue;
        }
        let path = dir.join(format!("{}{}.json", family.output_prefix, file.version));
        match write_json_pretty(&path, &file) {
            Ok(()) => written.push(path),
            Err(e) => {
                warn!(version = %file.version, error = %format!("{:#}", e), "write failed, continuing");
                last_err = Some(e);
            }
        }
    }

    // only a family that wrote nothing counts as failed
    match last_err {
        Some(e) if written.is_empty() => Err(e),
        _ => Ok(written),
    }
}
