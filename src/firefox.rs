// src/firefox.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, trace, warn};
use url::Url;

use crate::config::{CatalogEolPolicy, FirefoxConfig};
use crate::emit::write_json_pretty;
use crate::fetch::Fetcher;
use crate::timeline::{self, parse_calendar_date, ReleaseRecord};

const MAJOR: &str = "major";
const STABILITY: &str = "stability";

/// `product-details` catalog: release key → entry.
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub releases: BTreeMap<String, CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub version: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
}

/// Major and stability releases, ESR line excluded, deduplicated and sorted.
pub fn records_from_catalog(catalog: Catalog) -> Vec<ReleaseRecord> {
    let mut out = Vec::new();

    for (key, entry) in catalog.releases {
        if key.contains("esr") {
            trace!(%key, "skipping ESR entry");
            continue;
        }
        let category = match entry.category.as_deref() {
            Some(c @ (MAJOR | STABILITY)) => c.to_string(),
            _ => continue,
        };
        let (Some(version), Some(date)) = (entry.version, entry.date) else {
            continue;
        };
        let Some(published) = parse_calendar_date(&date) else {
            warn!(%version, %date, "invalid date format, skipping");
            continue;
        };
        out.push(ReleaseRecord {
            version,
            published,
            eol: None,
            channel: None,
            category: Some(category),
        });
    }

    timeline::assemble(out)
}

/// Fill `eol` from later records. `records` must be in chronological order.
pub fn apply_eol(records: &mut [ReleaseRecord], policy: CatalogEolPolicy) {
    let is_major = |r: &ReleaseRecord| r.category.as_deref() == Some(MAJOR);

    for i in 0..records.len() {
        let current = records[i].published;
        records[i].eol = match policy {
            CatalogEolPolicy::NextMajor if !is_major(&records[i]) => None,
            CatalogEolPolicy::NextMajor => records[i + 1..]
                .iter()
                .find(|r| is_major(r) && r.published > current)
                .map(|r| r.published),
            CatalogEolPolicy::NextRecord => records[i + 1..]
                .iter()
                .find(|r| r.published > current)
                .map(|r| r.published),
        };
    }
}

pub fn build_timeline(catalog: Catalog, policy: CatalogEolPolicy) -> Vec<ReleaseRecord> {
    let mut records = records_from_catalog(catalog);
    apply_eol(&mut records, policy);
    records
}

#[instrument(level = "info", skip_all, fields(url = %cfg.source_url))]
pub async fn run<F: Fetcher>(fetcher: &F, cfg: &FirefoxConfig, output_root: &Path) -> Result<PathBuf> {
    let url =
        Url::parse(&cfg.source_url).with_context(|| format!("parsing URL {}", cfg.source_url))?;
    let body = fetcher.get_text(&url).await?;
    let catalog: Catalog =
        serde_json::from_str(&body).with_context(|| format!("decoding JSON from {}", url))?;

    let records = build_timeline(catalog, cfg.eol_policy);
    info!(releases = records.len(), policy = ?cfg.eol_policy, "built timeline");

    let path = output_root.join(&cfg.output_path);
    write_json_pretty(&path, &records)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use anyhow::Result;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const CATALOG: &str = r#"{"releases": {
        "firefox-122.0":      {"version": "122.0",      "date": "2024-01-23", "category": "major"},
        "firefox-122.0.1":    {"version": "122.0.1",    "date": "2024-02-06", "category": "stability"},
        "firefox-123.0":      {"version": "123.0",      "date": "2024-02-20", "category": "major"},
        "firefox-123.0b9":    {"version": "123.0b9",    "date": "2024-02-09", "category": "dev"},
        "firefox-115.8.0esr": {"version": "115.8.0esr", "date": "2024-02-20", "category": "esr"},
        "firefox-115.7.0esr": {"version": "115.7.0esr", "date": "2024-01-23", "category": "major"},
        "firefox-123.0.1":    {"version": "123.0.1",    "date": "2024-03-05", "category": "stability"},
        "firefox-124.0":      {"version": "124.0",      "date": "bogus",      "category": "major"},
        "firefox-0.0":        {"date": "2004-01-01", "category": "major"}
    }}"#;

    fn catalog() -> Catalog {
        serde_json::from_str(CATALOG).unwrap()
    }

    #[test]
    fn keeps_major_and_stability_only() {
        let recs = records_from_catalog(catalog());
        let versions: Vec<&str> = recs.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(versions, vec!["122.0", "122.0.1", "123.0", "123.0.1"]);
    }

    #[test]
    fn next_major_policy() {
        let recs = build_timeline(catalog(), CatalogEolPolicy::NextMajor);
        assert_eq!(recs[0].eol, Some(d(2024, 2, 20))); // 122.0 -> 123.0
        assert_eq!(recs[1].eol, None); // stability
        assert_eq!(recs[2].eol, None); // latest major
        assert_eq!(recs[3].eol, None);
    }

    #[test]
    fn next_record_policy() {
        let recs = build_timeline(catalog(), CatalogEolPolicy::NextRecord);
        assert_eq!(recs[0].eol, Some(d(2024, 2, 6)));
        assert_eq!(recs[1].eol, Some(d(2024, 2, 20)));
        assert_eq!(recs[2].eol, Some(d(2024, 3, 5)));
        assert_eq!(recs[3].eol, None);
    }

    #[test]
    fn duplicate_versions_keep_earlier_date() -> Result<()> {
        let catalog: Catalog = serde_json::from_str(
            r#"{"releases": {
                "firefox-50.0":     {"version": "50.0", "date": "2016-11-15", "category": "major"},
                "firefox-50.0-rel": {"version": "50.0", "date": "2016-11-08", "category": "major"}
            }}"#,
        )?;
        let recs = build_timeline(catalog, CatalogEolPolicy::NextMajor);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].published, d(2016, 11, 8));
        Ok(())
    }

    #[test]
    fn same_day_major_is_not_a_successor() {
        let mut recs = vec![
            ReleaseRecord {
                version: "a".into(),
                published: d(2024, 1, 1),
                eol: None,
                channel: None,
                category: Some(MAJOR.into()),
            },
            ReleaseRecord {
                version: "b".into(),
                published: d(2024, 1, 1),
                eol: None,
                channel: None,
                category: Some(MAJOR.into()),
            },
        ];
        apply_eol(&mut recs, CatalogEolPolicy::NextMajor);
        assert_eq!(recs[0].eol, None);
    }

    #[tokio::test]
    async fn run_fetches_and_writes() -> Result<()> {
        let tmp = TempDir::new()?;
        let cfg = FirefoxConfig {
            source_url: "https://pd.example/1.0/firefox.json".into(),
            output_path: PathBuf::from("firefox/versions/firefox_versions.json"),
            eol_policy: CatalogEolPolicy::NextMajor,
        };
        let fetcher = StubFetcher::default().with_page(&cfg.source_url, CATALOG);

        let path = run(&fetcher, &cfg, tmp.path()).await?;
        let back: Vec<ReleaseRecord> = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(back.len(), 4);
        assert_eq!(back[0].category.as_deref(), Some("major"));
        Ok(())
    }

    #[tokio::test]
    async fn run_rejects_malformed_catalog() {
        let tmp = TempDir::new().unwrap();
        let cfg = FirefoxConfig {
            source_url: "https://pd.example/1.0/firefox.json".into(),
            ..FirefoxConfig::default()
        };
        let fetcher = StubFetcher::default().with_page(&cfg.source_url, "<html>oops</html>");
        assert!(run(&fetcher, &cfg, tmp.path()).await.is_err());
        assert!(!tmp.path().join(&cfg.output_path).exists());
    }
}
