// src/windows/locate.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, trace};

use super::element_text;

static HISTORY_TABLE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^historyTable_\d+$").expect("table id pattern should compile"));

const END_OF_SERVICING: &str = "end of servicing";

/// An update-history table with the version it belongs to.
#[derive(Debug, Clone)]
pub struct RawTableEntry<'a> {
    /// Emphasized text preceding the table, with ` (EOL)` appended when out of servicing.
    pub label: String,
    /// File-name safe version token derived from the label.
    pub version: String,
    pub table: ElementRef<'a>,
    pub end_of_servicing: bool,
}

/// Document-order markers relevant to table ownership.
#[derive(Debug)]
enum Anchor<'a> {
    /// A `<details>`; `None` when it has no `<summary>`.
    Disclosure(Option<bool>),
    Label(String),
    Table(ElementRef<'a>),
}

fn linearize(doc: &Html) -> Vec<Anchor<'_>> {
    let summary_sel = Selector::parse("summary").expect("summary selector should parse");
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| match el.value().name() {
            "details" => Some(Anchor::Disclosure(
                el.select(&summary_sel)
                    .next()
                    .map(|s| element_text(s).to_lowercase().contains(END_OF_SERVICING)),
            )),
            "strong" | "b" => {
                let text = element_text(el);
                (!text.is_empty()).then_some(Anchor::Label(text))
            }
            "table" if el.value().id().is_some_and(|id| HISTORY_TABLE_ID.is_match(id)) => {
                Some(Anchor::Table(el))
            }
            _ => None,
        })
        .collect()
}

/// Find every `historyTable_<n>` and resolve its label and servicing flag from
/// the nearest preceding label and disclosure.
#[instrument(level = "debug", skip(doc))]
pub fn locate_tables(doc: &Html) -> Vec<RawTableEntry<'_>> {
    let anchors = linearize(doc);
    let mut out = Vec::new();

    for (pos, anchor) in anchors.iter().enumerate() {
        let Anchor::Table(table) = anchor else {
            continue;
        };
        let id = table.value().id().unwrap_or_default();
        let preceding = &anchors[..pos];

        let disclosure = preceding.iter().rev().find_map(|a| match a {
            Anchor::Disclosure(summary) => Some(*summary),
            _ => None,
        });
        let end_of_servicing = match disclosure {
            Some(Some(flag)) => flag,
            Some(None) => {
                debug!(table = id, "disclosure has no summary, skipping");
                continue;
            }
            None => {
                debug!(table = id, "no enclosing disclosure, skipping");
                continue;
            }
        };

        let Some(mut label) = preceding.iter().rev().find_map(|a| match a {
            Anchor::Label(text) => Some(text.clone()),
            _ => None,
        }) else {
            debug!(table = id, "no version label, skipping");
            continue;
        };
        if end_of_servicing {
            label.push_str(" (EOL)");
        }

        let version = version_slug(&label);
        trace!(table = id, %label, %version, end_of_servicing, "located");
        out.push(RawTableEntry {
            label,
            version,
            table: *table,
            end_of_servicing,
        });
    }

    debug!(tables = out.len(), "located update tables");
    out
}

/// `"Version 23H2 (OS build 22631)"` → `"23h2"`, `"Windows Server 2022 (OS build 20348)"` → `"2022"`.
pub fn version_slug(label: &str) -> String {
    let lower = label.to_lowercase();
    let stripped = lower.replace("version", "");
    let tokens: Vec<&str> = stripped.split_whitespace().collect();
    let wanted = if lower.contains("server") { 2 } else { 0 };

    let slug = tokens.get(wanted).map(|t| sanitize(t)).unwrap_or_default();
    if slug.is_empty() {
        sanitize(&tokens.join("_"))
    } else {
        slug
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}
