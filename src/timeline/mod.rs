// src/timeline/mod.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod dates;

pub use dates::{parse_calendar_date, parse_timestamp_date};

/// The platform-agnostic output unit for the browser timelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub version: String,
    pub published: NaiveDate,
    pub eol: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Anything that sits on a timeline: a unique key and a publish date.
pub trait Dated {
    fn key(&self) -> &str;
    fn published(&self) -> NaiveDate;
}

impl Dated for ReleaseRecord {
    fn key(&self) -> &str {
        &self.version
    }

    fn published(&self) -> NaiveDate {
        self.published
    }
}

/// Keep one item per key: the earliest published. Ties keep the first seen.
pub fn dedup_earliest<T: Dated>(items: Vec<T>) -> Vec<T> {
    let mut slot_of: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut out: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        match slot_of.get(item.key()) {
            Some(&idx) => {
                if item.published() < out[idx].published() {
                    out[idx] = item;
                }
            }
            None => {
                slot_of.insert(item.key().to_string(), out.len());
                out.push(item);
            }
        }
    }
    out
}

/// Stable ascending sort by publish date.
pub fn sort_chronological<T: Dated>(items: &mut [T]) {
    items.sort_by_key(|i| i.published());
}

/// Dedup then sort: unique keys, non-decreasing publish dates.
pub fn assemble<T: Dated>(items: Vec<T>) -> Vec<T> {
    let mut out = dedup_earliest(items);
    sort_chronological(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(version: &str, ymd: (i32, u32, u32)) -> ReleaseRecord {
        ReleaseRecord {
            version: version.into(),
            published: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
            eol: None,
            channel: None,
            category: None,
        }
    }

    #[test]
    fn duplicates_keep_earliest_date() {
        let out = assemble(vec![
            rec("120.0", (2024, 1, 9)),
            rec("121.0", (2024, 1, 23)),
            rec("120.0", (2023, 12, 19)),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].version, "120.0");
        assert_eq!(out[0].published, NaiveDate::from_ymd_opt(2023, 12, 19).unwrap());
        assert_eq!(out[1].version, "121.0");
    }

    #[test]
    fn assembled_sets_are_unique_and_ordered() {
        let out = assemble(vec![
            rec("c", (2024, 5, 1)),
            rec("a", (2024, 1, 1)),
            rec("b", (2024, 3, 1)),
            rec("a", (2024, 6, 1)),
            rec("d", (2024, 3, 1)),
        ]);
        let versions: Vec<&str> = out.iter().map(|r| r.key()).collect();
        assert_eq!(versions, vec!["a", "b", "d", "c"]);
        assert!(out.windows(2).all(|w| w[0].published <= w[1].published));
    }

    #[test]
    fn equal_dates_keep_first_seen() {
        let mut first = rec("x", (2024, 2, 2));
        first.channel = Some("stable".into());
        let mut second = rec("x", (2024, 2, 2));
        second.channel = Some("extended".into());
        let out = dedup_earliest(vec![first, second]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].channel.as_deref(), Some("stable"));
    }

    #[test]
    fn serializes_dates_as_iso_and_skips_absent_extras() {
        let mut r = rec("1.0", (2024, 3, 12));
        r.eol = NaiveDate::from_ymd_opt(2024, 4, 9);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["published"], "2024-03-12");
        assert_eq!(json["eol"], "2024-04-09");
        assert!(json.get("channel").is_none());
    }
}
