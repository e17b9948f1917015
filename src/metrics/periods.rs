//! Date-window filtering and grouped summaries

use crate::error::{Result, RocError};
use crate::preparation::{PreparedRow, PreparedTable};
use crate::text_output::render_table;
use crate::value::{Timestamp, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// An inclusive `[start, end]` window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Period {
    pub fn contains(&self, ts: &Timestamp) -> bool {
        self.start <= *ts && *ts <= self.end
    }
}

impl FromStr for Period {
    type Err = RocError;

    /// Parse `START,END`, e.g. `2023-05-01 00:00:00+00:00,2023-06-30 23:59:59+00:00`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RocError::Period(s.to_string());
        let (start, end) = s.split_once(',').ok_or_else(invalid)?;
        let start = Timestamp::parse(start).ok_or_else(invalid)?;
        let end = Timestamp::parse(end).ok_or_else(invalid)?;
        if start > end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }
}

/// Events inside each window, concatenated in window order
///
/// An event inside two overlapping windows appears twice.
pub fn filter_periods<'t>(table: &'t PreparedTable, periods: &[Period]) -> Vec<&'t PreparedRow> {
    periods
        .iter()
        .flat_map(|period| {
            table
                .rows()
                .iter()
                .filter(move |row| period.contains(row.timestamp()))
        })
        .collect()
}

/// Per-activity span and event count
#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub activity: String,
    pub total_duration_hours: f64,
    pub frequency: usize,
}

/// Per-case span and event count
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSummary {
    pub case_id: String,
    pub total_duration_hours: f64,
    pub activity_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    first: Timestamp,
    last: Timestamp,
    count: usize,
}

impl Window {
    fn new(ts: Timestamp) -> Self {
        Self {
            first: ts,
            last: ts,
            count: 0,
        }
    }

    fn hours(&self) -> f64 {
        self.last.hours_since(&self.first)
    }
}

/// Group rows by a key, tracking the timestamp span and a count per group
///
/// Groups come out in key order; a null key is skipped.
fn group_windows<'r>(
    rows: &[&'r PreparedRow],
    key: impl Fn(&'r PreparedRow) -> &'r Value,
    counts: impl Fn(&'r PreparedRow) -> bool,
) -> BTreeMap<&'r Value, Window> {
    let mut groups: BTreeMap<&Value, Window> = BTreeMap::new();
    for &row in rows {
        let k = key(row);
        if k.is_null() {
            continue;
        }
        let ts = *row.timestamp();
        let window = groups.entry(k).or_insert_with(|| Window::new(ts));
        window.first = window.first.min(ts);
        window.last = window.last.max(ts);
        if counts(row) {
            window.count += 1;
        }
    }
    groups
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Activities by event count, most frequent first
pub fn activity_summary(rows: &[&PreparedRow], activity: usize) -> Vec<ActivitySummary> {
    let mut summary: Vec<ActivitySummary> = group_windows(rows, |r| r.get(activity), |_| true)
        .into_iter()
        .map(|(name, w)| ActivitySummary {
            activity: name.to_string(),
            total_duration_hours: w.hours(),
            frequency: w.count,
        })
        .collect();
    summary.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    summary
}

/// The `head` longest-running cases
///
/// `activity_count` counts events with a non-empty activity.
pub fn case_summary(
    rows: &[&PreparedRow],
    case_column: usize,
    activity: usize,
    head: usize,
) -> Vec<CaseSummary> {
    let mut summary: Vec<CaseSummary> = group_windows(
        rows,
        |r| r.get(case_column),
        |r| !r.get(activity).is_null(),
    )
    .into_iter()
    .map(|(case, w)| CaseSummary {
        case_id: case.to_string(),
        total_duration_hours: w.hours(),
        activity_count: w.count,
    })
    .collect();
    summary.sort_by(|a, b| descending(a.total_duration_hours, b.total_duration_hours));
    summary.truncate(head);
    summary
}

pub fn format_activity_summary(summary: &[ActivitySummary]) -> String {
    let header = ["activity", "total_duration_hours", "frequency"].map(String::from);
    let body: Vec<Vec<String>> = summary
        .iter()
        .map(|s| {
            vec![
                s.activity.clone(),
                format!("{:.6}", s.total_duration_hours),
                s.frequency.to_string(),
            ]
        })
        .collect();
    render_table(&header, &body)
}

pub fn format_case_summary(summary: &[CaseSummary]) -> String {
    let header = ["case", "total_duration_hours", "activity_count"].map(String::from);
    let body: Vec<Vec<String>> = summary
        .iter()
        .map(|s| {
            vec![
                s.case_id.clone(),
                format!("{:.6}", s.total_duration_hours),
                s.activity_count.to_string(),
            ]
        })
        .collect();
    render_table(&header, &body)
}
