//! Daily averages and their day-over-day rate of change

use super::{CaseSpan, MetricKind};
use crate::plot::{PlotRequest, SeriesMap};
use crate::text_output::{format_optional, render_table};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One calendar day of a metric
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub average_hours: f64,
    pub case_count: usize,
    pub total_hours: f64,
    /// Change in `average_hours` since the previous day present (hours/day)
    pub roc: Option<f64>,
}

/// Group case spans by date, ascending
///
/// Days with no cases are simply absent, so `roc` is measured between
/// consecutive days that appear in the series.
pub fn daily_series(spans: &[CaseSpan]) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for span in spans {
        let day = days.entry(span.date).or_insert((0.0, 0));
        day.0 += span.hours;
        day.1 += 1;
    }

    let mut previous: Option<f64> = None;
    days.into_iter()
        .map(|(date, (total_hours, case_count))| {
            let average_hours = total_hours / case_count as f64;
            let roc = previous.map(|p| average_hours - p);
            previous = Some(average_hours);
            DailyPoint {
                date,
                average_hours,
                case_count,
                total_hours,
                roc,
            }
        })
        .collect()
}

/// Text table of a daily series
pub fn format_daily(kind: MetricKind, points: &[DailyPoint]) -> String {
    let header = [
        "date".to_string(),
        format!("average_{}_hours", kind.label().to_lowercase()),
        "case_count".to_string(),
        "total_hours".to_string(),
        "roc".to_string(),
    ];
    let body: Vec<Vec<String>> = points
        .iter()
        .map(|p| {
            vec![
                p.date.to_string(),
                format!("{:.6}", p.average_hours),
                p.case_count.to_string(),
                format!("{:.6}", p.total_hours),
                format_optional(p.roc),
            ]
        })
        .collect();
    render_table(&header, &body)
}

/// Dual-axis chart: average hours on the left, ROC on the right
pub fn daily_plot(kind: MetricKind, points: &[DailyPoint]) -> PlotRequest {
    let x = |p: &DailyPoint| {
        p.date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp() as f64)
    };

    let mut average = SeriesMap::new();
    average.insert(
        format!("Avg {} Time", kind.label()),
        points.iter().filter_map(|p| Some((x(p)?, p.average_hours))).collect(),
    );

    let mut roc = SeriesMap::new();
    let roc_points: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| Some((x(p)?, p.roc?)))
        .collect();
    if !roc_points.is_empty() {
        roc.insert("ROC".to_string(), roc_points);
    }

    PlotRequest::new(
        format!("Average {} Time and Rate of Change (ROC)", kind.label()),
        "Date",
        format!("Average {} Time (hours)", kind.label()),
    )
    .with_time_axis(true)
    .with_series(average)
    .with_secondary("ROC (hours/day)", roc)
}
