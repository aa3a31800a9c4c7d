// src/windows/patch_tuesday.rs

//! End-of-life inference for OS update rows.
//!
//! The release-health tables never state when a build stops being current.
//! Monthly cumulative updates ship on the second Tuesday of each month, so a
//! row is current until the following month's second Tuesday.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::warn;

use super::rows::ExtractedRow;
use super::UpdateRow;
use crate::timeline::parse_calendar_date;

/// The second Tuesday of `year`-`month`.
pub fn second_tuesday(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let to_tuesday = (7 + Weekday::Tue.num_days_from_monday()
        - first.weekday().num_days_from_monday())
        % 7;
    first.checked_add_days(Days::new(u64::from(to_tuesday) + 7))
}

/// Canonical patch Tuesday of the month after `date`'s month; `None` past the
/// end of the representable calendar.
pub fn next_patch_tuesday(date: NaiveDate) -> Option<NaiveDate> {
    // day 28 + 4 always lands in the next month
    let day28 = date.with_day(28).unwrap_or(date);
    let next_month = day28.checked_add_days(Days::new(4))?;
    let mut day = next_month.with_day(1).unwrap_or(next_month);
    while !(day.weekday() == Weekday::Tue && day.day() >= 8) {
        day = day.succ_opt()?;
    }
    Some(day)
}

pub fn is_patch_tuesday(date: NaiveDate) -> bool {
    second_tuesday(date.year(), date.month()) == Some(date)
}

/// Turn an extracted row into an `UpdateRow`, or drop it if its date won't parse.
pub fn infer(row: ExtractedRow) -> Option<UpdateRow> {
    let Some(date) = parse_calendar_date(&row.date) else {
        warn!(date = %row.date, build = %row.build, "unparsable release date, skipping row");
        return None;
    };
    let Some(eol) = next_patch_tuesday(date) else {
        warn!(date = %row.date, build = %row.build, "release date out of calendar range, skipping row");
        return None;
    };
    Some(UpdateRow {
        date,
        build: row.build,
        kb: row.kb,
        eol: Some(eol),
        is_preview: !is_patch_tuesday(date),
    })
}
