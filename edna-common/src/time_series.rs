//! Time-series CSV handling
//!
//! Monitoring sheets have one row per year and one column per measure. A
//! literal `NA` marks a missing value. Two selection policies coexist and are
//! deliberately kept apart:
//!
//! * [`select_most_recent`] (AND): newest row where *every* required column has
//!   a value; used to pick the row whose values are displayed.
//! * [`find_last_year_with_values`] (OR): last year where *any* of the columns
//!   has a value; used for chart axes and legends.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::Result;

/// Sentinel for a missing measurement
pub const MISSING: &str = "NA";

/// Column holding the row's year
pub const YEAR_COLUMN: &str = "Year";

/// One CSV row keyed by header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsvRow {
    columns: BTreeMap<String, String>,
}

/// Rows of a time-series sheet
pub type TimeSeriesRow = CsvRow;

impl CsvRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures and aggregations
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: &str) {
        self.columns.insert(column.to_string(), value.to_string());
    }

    /// Raw cell, including `NA`
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Cell that is present, non-empty and not `NA`
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column)
            .filter(|v| !v.trim().is_empty() && *v != MISSING)
    }

    pub fn year(&self) -> Option<i32> {
        self.get(YEAR_COLUMN).and_then(|y| y.trim().parse().ok())
    }

    fn has_all<S: AsRef<str>>(&self, required: &[S]) -> bool {
        !required.is_empty() && required.iter().all(|f| self.value(f.as_ref()).is_some())
    }

    fn has_any<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        fields.iter().any(|f| self.value(f.as_ref()).is_some())
    }
}

/// Row picked by a selection policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub row: &'a CsvRow,
    pub year: i32,
}

/// Parse a CSV document with a header row
///
/// Blank lines are skipped and short rows keep only the cells they have.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let mut row = CsvRow::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.insert(header, value);
        }
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "Parsed CSV asset");
    Ok(rows)
}

/// Row of exactly `current_year`, if every required column has a value
pub fn select_current_year<'a, S: AsRef<str>>(
    rows: &'a [CsvRow],
    required: &[S],
    current_year: i32,
) -> Option<Selection<'a>> {
    rows.iter()
        .find(|row| row.year() == Some(current_year))
        .filter(|row| row.has_all(required))
        .map(|row| Selection {
            row,
            year: current_year,
        })
}

/// Newest row not after `current_year` where every required column has a value
///
/// Rows are visited from the most recent year downwards, whatever their order
/// in the sheet; rows sharing a year are visited last-first. Rows without a
/// parseable year are never selected.
pub fn select_most_recent<'a, S: AsRef<str>>(
    rows: &'a [CsvRow],
    required: &[S],
    current_year: i32,
) -> Option<Selection<'a>> {
    let mut candidates: Vec<(usize, i32)> = rows
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| row.year().map(|year| (idx, year)))
        .filter(|(_, year)| *year <= current_year)
        .collect();

    candidates.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    candidates
        .into_iter()
        .map(|(idx, year)| Selection {
            row: &rows[idx],
            year,
        })
        .find(|selection| selection.row.has_all(required))
}

/// Most recent year in which at least one of `fields` has a value
///
/// Rows are taken in year order, not sheet order.
pub fn find_last_year_with_values<S: AsRef<str>>(rows: &[CsvRow], fields: &[S]) -> Option<i32> {
    rows.iter()
        .filter(|row| row.has_any(fields))
        .filter_map(CsvRow::year)
        .max()
}

/// Year of the first row where `field` has a value
pub fn find_first_year_with_value(rows: &[CsvRow], field: &str) -> Option<i32> {
    rows.iter()
        .filter(|row| row.value(field).is_some())
        .find_map(CsvRow::year)
}

/// First row of a given year
pub fn row_for_year(rows: &[CsvRow], year: i32) -> Option<&CsvRow> {
    rows.iter().find(|row| row.year() == Some(year))
}

/// Add one summed column per group to every row
///
/// A group whose members are all `NA` sums to `NA`; otherwise the numeric
/// members are added and written with six decimals.
pub fn sum_key_groups(rows: &[CsvRow], groups: &[(&str, &[&str])]) -> Vec<CsvRow> {
    rows.iter()
        .map(|row| {
            let mut summed = row.clone();
            for (target, members) in groups {
                summed.insert(target, &sum_group(row, members));
            }
            summed
        })
        .collect()
}

fn sum_group(row: &CsvRow, members: &[&str]) -> String {
    let values: Vec<Option<&str>> = members.iter().map(|m| row.get(m)).collect();

    if values.iter().all(|v| *v == Some(MISSING)) {
        return MISSING.to_string();
    }

    let numbers: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| *v != MISSING)
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();

    if numbers.is_empty() {
        MISSING.to_string()
    } else {
        format!("{:.6}", numbers.iter().sum::<f64>())
    }
}

/// Latest integrity index reading of a sheet
pub fn integrity_reading<'a>(rows: &'a [CsvRow], column: &str) -> Option<&'a str> {
    let year = find_last_year_with_values(rows, &[column])?;
    row_for_year(rows, year).and_then(|row| row.value(column))
}
