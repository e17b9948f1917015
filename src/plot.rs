//! Plotting collaborator interface
//!
//! The pipeline hands finished series to a [`Plotter`]; how they are drawn
//! is up to the implementation. [`crate::html_output::HtmlPlotter`] writes
//! self-contained HTML pages, [`RecordingPlotter`] keeps requests in memory.

use crate::error::Result;
use indexmap::IndexMap;

/// Ordered (x, y) points keyed by series name, drawn one line per entry
pub type SeriesMap = IndexMap<String, Vec<(f64, f64)>>;

/// Series drawn against a second, right-hand y axis
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryAxis {
    pub label: String,
    pub series: SeriesMap,
}

/// A single chart: title, axis labels, and line-plus-marker series
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// x coordinates are Unix seconds and are labelled as dates
    pub x_is_time: bool,
    pub series: SeriesMap,
    pub secondary: Option<SecondaryAxis>,
}

impl PlotRequest {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_is_time: false,
            series: SeriesMap::new(),
            secondary: None,
        }
    }

    pub fn with_time_axis(mut self, x_is_time: bool) -> Self {
        self.x_is_time = x_is_time;
        self
    }

    pub fn with_series(mut self, series: SeriesMap) -> Self {
        self.series = series;
        self
    }

    pub fn with_secondary(mut self, label: impl Into<String>, series: SeriesMap) -> Self {
        self.secondary = Some(SecondaryAxis {
            label: label.into(),
            series,
        });
        self
    }

    /// Total number of points across primary and secondary series
    pub fn point_count(&self) -> usize {
        let primary: usize = self.series.values().map(Vec::len).sum();
        let secondary: usize = self
            .secondary
            .as_ref()
            .map(|s| s.series.values().map(Vec::len).sum())
            .unwrap_or(0);
        primary + secondary
    }
}

/// Renders plot requests
pub trait Plotter {
    fn render(&mut self, request: &PlotRequest) -> Result<()>;
}

/// Plotter that only records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingPlotter {
    requests: Vec<PlotRequest>,
}

impl RecordingPlotter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[PlotRequest] {
        &self.requests
    }
}

impl Plotter for RecordingPlotter {
    fn render(&mut self, request: &PlotRequest) -> Result<()> {
        self.requests.push(request.clone());
        Ok(())
    }
}

/// Plotter that draws nothing (`--no-plot`)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlotter;

impl Plotter for NullPlotter {
    fn render(&mut self, _request: &PlotRequest) -> Result<()> {
        Ok(())
    }
}
