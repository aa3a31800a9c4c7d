// src/windows/headers.rs

use scraper::{ElementRef, Selector};
use tracing::trace;

use super::element_text;

/// Column index of each canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub build: usize,
    pub kb: usize,
}

impl ColumnMap {
    /// Number of mapped columns; shorter rows are malformed.
    pub const WIDTH: usize = 3;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderMapping {
    Complete(ColumnMap),
    /// At least one canonical field has no column; the table yields no rows.
    Incomplete { missing: Vec<&'static str> },
}

/// Classify free-text headers into `date`, `build` and `kb` columns.
pub fn map_headers<S: AsRef<str>>(headers: &[S]) -> HeaderMapping {
    let (mut date, mut build, mut kb) = (None, None, None);

    for (idx, raw) in headers.iter().enumerate() {
        let h = raw.as_ref().to_lowercase();
        if h.contains("availability date") || h.contains("release date") {
            date = Some(idx);
        } else if h.contains("build") {
            build = Some(idx);
        } else if h.contains("kb article") {
            kb = Some(idx);
        } else {
            trace!(header = %h, "ignoring column");
        }
    }

    match (date, build, kb) {
        (Some(date), Some(build), Some(kb)) => HeaderMapping::Complete(ColumnMap { date, build, kb }),
        _ => {
            let missing = [("date", date), ("build", build), ("kb", kb)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name)
                .collect();
            HeaderMapping::Incomplete { missing }
        }
    }
}

/// Text of every cell in the table's first row, whatever its tag.
pub fn header_texts(table: ElementRef<'_>) -> Vec<String> {
    let row_sel = Selector::parse("tr").expect("row selector should parse");
    let cell_sel = Selector::parse("th, td").expect("cell selector should parse");
    table
        .select(&row_sel)
        .next()
        .map(|row| row.select(&cell_sel).map(element_text).collect())
        .unwrap_or_default()
}
