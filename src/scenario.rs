//! Scenario dispatch
//!
//! The case-id selection picks one of three scenarios once, up front:
//! no ids runs every trace, two or more run the selected traces in the
//! order given, exactly one runs the strict single-trace path. Each
//! scenario ends in two plot requests: ROC over delta_x and delta_y over
//! delta_x ("velocity").

use crate::error::{Result, RocError};
use crate::plot::{PlotRequest, Plotter, SeriesMap};
use crate::roc::{RocCalculator, RocRow};
use tracing::{debug, info};

/// Message reported when the selection matches no scenario
pub const INVALID_SELECTION_MESSAGE: &str =
    "Invalid input combination! Please specify valid case IDs or none at all.";

/// Which traces a run covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    All,
    Selected(Vec<String>),
    Single(String),
}

impl Scenario {
    /// Pick the scenario for a case-id selection
    ///
    /// `None` and an empty list both mean every trace. A blank id is an
    /// invalid selection.
    pub fn from_case_ids(case_ids: Option<&[String]>) -> Result<Self> {
        let ids = case_ids.unwrap_or_default();
        if let Some(blank) = ids.iter().find(|id| id.trim().is_empty()) {
            return Err(RocError::InvalidSelection(format!(
                "blank case id {:?}",
                blank
            )));
        }
        Ok(match ids {
            [] => Scenario::All,
            [one] => Scenario::Single(one.clone()),
            many => Scenario::Selected(many.to_vec()),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::All => "all",
            Scenario::Selected(_) => "selected",
            Scenario::Single(_) => "single",
        }
    }

    /// Compute the ROC rows this scenario covers
    pub fn compute(&self, calculator: &mut RocCalculator<'_>) -> Result<Vec<RocRow>> {
        match self {
            Scenario::All => calculator.all_traces(),
            Scenario::Selected(ids) => calculator.selected_traces(ids),
            Scenario::Single(id) => calculator.single_trace(id),
        }
    }

    pub fn roc_title(&self, delta_x: &str) -> String {
        match self {
            Scenario::All => format!("ROC over {} for all Cases", delta_x),
            Scenario::Selected(ids) => {
                format!("ROC over {} for Selected Cases: {}", delta_x, ids.join(", "))
            }
            Scenario::Single(id) => format!("ROC over {} for Case {}", delta_x, id),
        }
    }

    pub fn velocity_title(&self, delta_x: &str) -> String {
        match self {
            Scenario::All => format!("Velocity over {} for all Cases", delta_x),
            Scenario::Selected(_) => format!("Velocity over {} for Selected Cases", delta_x),
            Scenario::Single(id) => format!("Velocity over {} for Case {}", delta_x, id),
        }
    }
}

/// Group rows into one plot series per case, skipping points without a y
///
/// Cases whose every point lacks a y value get no series at all.
pub fn series_by_case(rows: &[RocRow], y: impl Fn(&RocRow) -> Option<f64>) -> SeriesMap {
    let mut series = SeriesMap::new();
    for row in rows {
        let (Some(px), Some(py)) = (row.delta_x.plot_coordinate(), y(row)) else {
            continue;
        };
        series
            .entry(format!("Case {}", row.case_id))
            .or_default()
            .push((px, py));
    }
    series
}

/// Run a scenario: compute its rows, then hand both views to the plotter
pub fn run_scenario(
    scenario: &Scenario,
    calculator: &mut RocCalculator<'_>,
    plotter: &mut dyn Plotter,
) -> Result<Vec<RocRow>> {
    info!(scenario = scenario.name(), "running scenario");
    let rows = scenario.compute(calculator)?;
    debug!(rows = rows.len(), "scenario computed");

    let delta_x = calculator.delta_x_name().to_string();
    let time_axis = calculator.is_time_aware();

    let roc = PlotRequest::new(scenario.roc_title(&delta_x), delta_x.as_str(), "ROC")
        .with_time_axis(time_axis)
        .with_series(series_by_case(&rows, |r| r.roc));
    plotter.render(&roc)?;

    let velocity = PlotRequest::new(scenario.velocity_title(&delta_x), delta_x.as_str(), "Velocity")
        .with_time_axis(time_axis)
        .with_series(series_by_case(&rows, |r| r.delta_y.as_f64()));
    plotter.render(&velocity)?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseFailurePolicy;
    use crate::discard_log::MemoryDiscardSink;
    use crate::event_log::EventLog;
    use crate::plot::RecordingPlotter;
    use crate::preparation::{prepare, PreparedTable};

    const LOG: &str = "\
case,activity,time,cost
C1,A,2023-05-01 10:00:00,0
C1,B,2023-05-01 11:00:00,60
C2,A,2023-05-02 09:00:00,5
C2,B,2023-05-02 10:00:00,15
C3,A,2023-05-03 09:00:00,1
";

    fn table() -> PreparedTable {
        let log = EventLog::from_csv_str(LOG).unwrap();
        prepare(&log, "case", ParseFailurePolicy::Reject).unwrap()
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selection_routing() {
        let empty: Vec<String> = ids(&[]);
        assert_eq!(Scenario::from_case_ids(Some(empty.as_slice())).unwrap(), Scenario::All);
        assert_eq!(Scenario::from_case_ids(None).unwrap(), Scenario::All);

        let two = ids(&["C1", "C2"]);
        assert_eq!(
            Scenario::from_case_ids(Some(two.as_slice())).unwrap(),
            Scenario::Selected(ids(&["C1", "C2"]))
        );

        let one = ids(&["C1"]);
        assert_eq!(
            Scenario::from_case_ids(Some(one.as_slice())).unwrap(),
            Scenario::Single("C1".to_string())
        );
    }

    #[test]
    fn test_selected_keeps_supplied_order() {
        let selection = ids(&["C2", "C1"]);
        assert_eq!(
            Scenario::from_case_ids(Some(selection.as_slice())).unwrap(),
            Scenario::Selected(ids(&["C2", "C1"]))
        );
    }

    #[test]
    fn test_blank_case_id_is_invalid() {
        let selection = ids(&["C1", "  "]);
        assert!(matches!(
            Scenario::from_case_ids(Some(selection.as_slice())),
            Err(RocError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_titles() {
        let selected = Scenario::Selected(ids(&["C1", "C2"]));
        assert_eq!(
            selected.roc_title("elapsed_minutes"),
            "ROC over elapsed_minutes for Selected Cases: C1, C2"
        );
        assert_eq!(
            selected.velocity_title("elapsed_minutes"),
            "Velocity over elapsed_minutes for Selected Cases"
        );
        assert_eq!(Scenario::All.roc_title("time"), "ROC over time for all Cases");
        assert_eq!(
            Scenario::Single("C1".into()).velocity_title("time"),
            "Velocity over time for Case C1"
        );
    }

    #[test]
    fn test_all_scenario_issues_two_plots() {
        let table = table();
        let mut sink = MemoryDiscardSink::new();
        let mut calc = RocCalculator::new(&table, "cost", "time", &mut sink, false).unwrap();
        let mut plotter = RecordingPlotter::new();

        let rows = run_scenario(&Scenario::All, &mut calc, &mut plotter).unwrap();
        assert_eq!(rows.len(), 5);

        let requests = plotter.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].y_label, "ROC");
        assert_eq!(requests[1].y_label, "Velocity");
        assert!(requests[0].x_is_time);

        // C3 has a single event, so its only ROC is null and it gets no line
        let roc_series: Vec<&str> = requests[0].series.keys().map(String::as_str).collect();
        assert_eq!(roc_series, vec!["Case C1", "Case C2"]);
        assert_eq!(requests[0].series["Case C1"].len(), 1);

        let velocity_series: Vec<&str> = requests[1].series.keys().map(String::as_str).collect();
        assert_eq!(velocity_series, vec!["Case C1", "Case C2", "Case C3"]);
        assert_eq!(requests[1].series["Case C2"].len(), 2);
    }

    #[test]
    fn test_single_scenario_missing_case_fails_before_plotting() {
        let table = table();
        let mut sink = MemoryDiscardSink::new();
        let mut calc = RocCalculator::new(&table, "cost", "time", &mut sink, false).unwrap();
        let mut plotter = RecordingPlotter::new();

        let result = run_scenario(&Scenario::Single("C9".into()), &mut calc, &mut plotter);
        assert!(matches!(result, Err(RocError::CaseNotFound(_))));
        assert!(plotter.requests().is_empty());
    }

    #[test]
    fn test_selected_scenario_restricts_rows() {
        let table = table();
        let mut sink = MemoryDiscardSink::new();
        let mut calc = RocCalculator::new(&table, "cost", "time", &mut sink, false).unwrap();
        let mut plotter = RecordingPlotter::new();

        let scenario = Scenario::Selected(ids(&["C2", "C1"]));
        let rows = run_scenario(&scenario, &mut calc, &mut plotter).unwrap();
        let cases: Vec<&str> = rows.iter().map(|r| r.case_id.as_str()).collect();
        assert_eq!(cases, vec!["C2", "C2", "C1", "C1"]);
        assert_eq!(
            plotter.requests()[0].title,
            "ROC over time for Selected Cases: C2, C1"
        );
    }
}
