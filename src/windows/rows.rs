// src/windows/rows.rs

use scraper::{ElementRef, Selector};
use tracing::debug;

use super::element_text;
use super::headers::ColumnMap;

/// Raw text of one data row, before date parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRow {
    pub date: String,
    pub build: String,
    pub kb: String,
}

/// Pull the mapped cells out of every data row; the first row is the header.
pub fn extract_rows(table: ElementRef<'_>, cols: &ColumnMap) -> Vec<ExtractedRow> {
    let row_sel = Selector::parse("tr").expect("row selector should parse");
    let cell_sel = Selector::parse("td, th").expect("cell selector should parse");
    let link_sel = Selector::parse("a[href]").expect("link selector should parse");
    let mut out = Vec::new();

    for (idx, row) in table.select(&row_sel).enumerate().skip(1) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.len() < ColumnMap::WIDTH {
            debug!(row = idx, cells = cells.len(), "short row, skipping");
            continue;
        }
        let (Some(date), Some(build), Some(kb)) =
            (cells.get(cols.date), cells.get(cols.build), cells.get(cols.kb))
        else {
            debug!(row = idx, cells = cells.len(), "row lacks a mapped column, skipping");
            continue;
        };

        out.push(ExtractedRow {
            date: element_text(*date),
            build: element_text(*build),
            kb: kb_text(*kb, &link_sel),
        });
    }

    out
}

/// KB numbers are usually links to the support article; prefer the link text.
fn kb_text(cell: ElementRef<'_>, link_sel: &Selector) -> String {
    cell.select(link_sel)
        .next()
        .map(element_text)
        .unwrap_or_else(|| element_text(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_table(html: &Html) -> ElementRef<'_> {
        html.select(&Selector::parse("table").unwrap())
            .next()
            .unwrap()
    }

    const COLS: ColumnMap = ColumnMap { date: 0, build: 1, kb: 2 };

    #[test]
    fn prefers_link_text_for_kb() {
        let html = Html::parse_fragment(
            r#"<table>
                <tr><th>Release date</th><th>OS build</th><th>KB article</th></tr>
                <tr><td>2024-03-12</td><td>19045.4046</td><td><a href="https://support.example/kb/5035845">KB5035845</a> (security)</td></tr>
                <tr><td>2024-02-13</td><td>19045.4046</td><td> KB5034763 </td></tr>
            </table>"#,
        );
        let rows = extract_rows(first_table(&html), &COLS);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kb, "KB5035845");
        assert_eq!(rows[1].kb, "KB5034763");
        assert_eq!(rows[0].date, "2024-03-12");
    }

    #[test]
    fn short_rows_are_skipped_and_later_rows_kept() {
        let html = Html::parse_fragment(
            r#"<table>
                <tr><th>Release date</th><th>OS build</th><th>KB article</th></tr>
                <tr><td>2024-03-12</td><td>19045.4046</td></tr>
                <tr><td>2024-02-13</td><td>19045.4046</td><td>KB5034763</td></tr>
            </table>"#,
        );
        let rows = extract_rows(first_table(&html), &COLS);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2024-02-13");
    }

    #[test]
    fn mapped_index_past_row_end_is_skipped() {
        let html = Html::parse_fragment(
            r#"<table>
                <tr><th>a</th><th>b</th><th>c</th><th>d</th></tr>
                <tr><td>1</td><td>2</td><td>3</td></tr>
            </table>"#,
        );
        let cols = ColumnMap { date: 3, build: 1, kb: 2 };
        assert!(extract_rows(first_table(&html), &cols).is_empty());
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let html = Html::parse_fragment(
            "<table><tr><th>Release date</th><th>OS build</th><th>KB article</th></tr></table>",
        );
        assert!(extract_rows(first_table(&html), &COLS).is_empty());
    }
}
