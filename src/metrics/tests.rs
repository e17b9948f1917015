// Tests for the aggregate time reports
//
// Fixture: three cases over three days plus one event whose timestamp does
// not parse and is dropped.

use super::*;
use crate::config::ParseFailurePolicy;
use crate::error::RocError;
use crate::event_log::EventLog;
use crate::preparation::{prepare, PreparedTable};
use approx::assert_relative_eq;
use chrono::NaiveDate;

const LOG: &str = "\
case:concept:name,concept:name,time:timestamp
1,A,2023-05-01 08:00:00+00:00
1,B,2023-05-01 10:00:00+00:00
1,A,2023-05-01 11:00:00+00:00
2,A,2023-05-01 09:00:00+00:00
2,B,2023-05-02 09:00:00+00:00
3,A,2023-05-03 12:00:00+00:00
3,B,2023-05-03 18:00:00+00:00
4,A,not a time
";

const CASE: &str = "case:concept:name";
const ACTIVITY: &str = "concept:name";

fn table() -> PreparedTable {
    let log = EventLog::from_csv_str(LOG).unwrap();
    prepare(&log, CASE, ParseFailurePolicy::Drop).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 5, d).unwrap()
}

fn period(s: &str) -> Period {
    s.parse().unwrap()
}

#[test]
fn test_unparseable_timestamps_are_dropped() {
    let table = table();
    assert_eq!(table.len(), 7);
    assert_eq!(table.dropped_rows(), 1);
}

#[test]
fn test_cycle_time_dated_by_start() {
    let spans = case_spans(&table(), MetricKind::Cycle, ACTIVITY).unwrap();
    let hours: Vec<f64> = spans.iter().map(|s| s.hours).collect();
    assert_eq!(hours, vec![3.0, 24.0, 6.0]);
    assert_eq!(spans[1].case_id, "2");
    assert_eq!(spans[1].date, day(1));

    let daily = daily_series(&spans);
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].date, day(1));
    assert_relative_eq!(daily[0].average_hours, 13.5);
    assert_eq!(daily[0].case_count, 2);
    assert_relative_eq!(daily[0].total_hours, 27.0);
    assert_eq!(daily[0].roc, None);
    assert_relative_eq!(daily[1].roc.unwrap(), -7.5);
}

#[test]
fn test_throughput_time_dated_by_end() {
    let spans = case_spans(&table(), MetricKind::Throughput, ACTIVITY).unwrap();
    let daily = daily_series(&spans);
    let dates: Vec<NaiveDate> = daily.iter().map(|p| p.date).collect();
    assert_eq!(dates, vec![day(1), day(2), day(3)]);
    let rocs: Vec<Option<f64>> = daily.iter().map(|p| p.roc).collect();
    assert_eq!(rocs, vec![None, Some(21.0), Some(-18.0)]);
}

#[test]
fn test_service_time_sums_activity_windows() {
    let spans = case_spans(&table(), MetricKind::Service, ACTIVITY).unwrap();
    let hours: Vec<f64> = spans.iter().map(|s| s.hours).collect();
    // case 1: A spans 08:00..11:00, B is a single event
    assert_eq!(hours, vec![3.0, 0.0, 0.0]);

    let daily = daily_series(&spans);
    assert_relative_eq!(daily[0].average_hours, 1.5);
    assert_relative_eq!(daily[1].roc.unwrap(), -1.5);
}

#[test]
fn test_service_time_needs_activity_column() {
    assert!(matches!(
        case_spans(&table(), MetricKind::Service, "activity"),
        Err(RocError::ColumnNotFound(_))
    ));
    // other metrics ignore it
    assert!(case_spans(&table(), MetricKind::Cycle, "activity").is_ok());
}

#[test]
fn test_period_parsing() {
    let p = period("2023-05-01 00:00:00+00:00,2023-05-01 23:59:59+00:00");
    assert!(p.start < p.end);

    for bad in ["2023-05-01", "garbage,2023-05-01", "2023-05-02,2023-05-01"] {
        assert!(matches!(bad.parse::<Period>(), Err(RocError::Period(_))));
    }
}

#[test]
fn test_period_bounds_are_inclusive() {
    let table = table();
    let p = period("2023-05-01 08:00:00+00:00,2023-05-01 11:00:00+00:00");
    let rows = filter_periods(&table, &[p]);
    assert_eq!(rows.len(), 4);
}

#[test]
fn test_overlapping_periods_duplicate_events() {
    let table = table();
    let p = period("2023-05-01 00:00:00+00:00,2023-05-01 23:59:59+00:00");
    assert_eq!(filter_periods(&table, &[p, p]).len(), 8);

    let later = period("2023-05-03 00:00:00+00:00,2023-05-03 23:59:59+00:00");
    let rows = filter_periods(&table, &[later, p]);
    // window order, not log order
    assert_eq!(rows[0].case_id(), "3");
    assert_eq!(rows.len(), 6);
}

#[test]
fn test_activity_summary_by_frequency() {
    let table = table();
    let activity = table.resolve_column(ACTIVITY).unwrap();
    let rows = filter_periods(
        &table,
        &[period("2023-05-01 00:00:00+00:00,2023-05-01 23:59:59+00:00")],
    );

    let summary = activity_summary(&rows, activity);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].activity, "A");
    assert_eq!(summary[0].frequency, 3);
    assert_relative_eq!(summary[0].total_duration_hours, 3.0);
    assert_eq!(summary[1].activity, "B");
    assert_eq!(summary[1].frequency, 1);
    assert_relative_eq!(summary[1].total_duration_hours, 0.0);
}

#[test]
fn test_case_summary_longest_first_and_truncated() {
    let table = table();
    let case = table.resolve_column(CASE).unwrap();
    let activity = table.resolve_column(ACTIVITY).unwrap();
    let all: Vec<_> = table.rows().iter().collect();

    let summary = case_summary(&all, case, activity, 5);
    let ids: Vec<&str> = summary.iter().map(|s| s.case_id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3", "1"]);
    assert_eq!(summary[0].activity_count, 2);
    assert_eq!(summary[2].activity_count, 3);

    assert_eq!(case_summary(&all, case, activity, 1).len(), 1);
}

#[test]
fn test_summary_tables() {
    let summary = vec![ActivitySummary {
        activity: "A".to_string(),
        total_duration_hours: 3.0,
        frequency: 3,
    }];
    let text = format_activity_summary(&summary);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "activity  total_duration_hours  frequency");
    assert_eq!(lines[2], "A         3.000000              3");
}

#[test]
fn test_daily_table_and_plot() {
    let spans = case_spans(&table(), MetricKind::Cycle, ACTIVITY).unwrap();
    let daily = daily_series(&spans);

    let text = format_daily(MetricKind::Cycle, &daily);
    assert!(text.lines().next().unwrap().contains("average_cycle_hours"));
    assert!(text.contains("2023-05-03"));

    let plot = daily_plot(MetricKind::Cycle, &daily);
    assert_eq!(plot.title, "Average Cycle Time and Rate of Change (ROC)");
    assert_eq!(plot.y_label, "Average Cycle Time (hours)");
    assert!(plot.x_is_time);
    assert_eq!(plot.series["Avg Cycle Time"].len(), 2);
    let secondary = plot.secondary.unwrap();
    assert_eq!(secondary.label, "ROC (hours/day)");
    assert_eq!(secondary.series["ROC"], vec![(1_683_072_000.0, -7.5)]);
}
