//! HTML chart pages
//!
//! Each plot request becomes one self-contained HTML file with embedded CSS
//! and an inline SVG line-plus-marker chart: one line per series, hover
//! tooltips on every marker, and an optional dashed secondary axis.

use crate::error::Result;
use crate::plot::{PlotRequest, Plotter, SeriesMap};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 80.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 70.0;
const TICKS: usize = 5;

const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Writes one HTML page per plot request into a directory
#[derive(Debug)]
pub struct HtmlPlotter {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
    used_names: HashSet<String>,
}

impl HtmlPlotter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: Vec::new(),
            used_names: HashSet::new(),
        }
    }

    /// Pages written so far, in render order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for a title, unique within this plotter
    fn file_name(&mut self, title: &str) -> String {
        let base = slug(title);
        let mut name = format!("{}.html", base);
        let mut n = 2;
        while !self.used_names.insert(name.clone()) {
            name = format!("{}_{}.html", base, n);
            n += 1;
        }
        name
    }
}

impl Plotter for HtmlPlotter {
    fn render(&mut self, request: &PlotRequest) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        let name = self.file_name(&request.title);
        let path = self.output_dir.join(name);
        fs::write(&path, to_html(request))?;
        info!(path = %path.display(), points = request.point_count(), "wrote plot");
        self.written.push(path);
        Ok(())
    }
}

/// Append `line` and a newline
fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Escape HTML special characters
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Lowercase alphanumeric file stem, runs of other characters collapsed to `_`
fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed: String = out.trim_matches('_').chars().take(80).collect();
    if trimmed.is_empty() {
        "plot".to_string()
    } else {
        trimmed
    }
}

/// Generate embedded CSS styles
fn generate_styles() -> &'static str {
    r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1 {
            color: #333;
            font-size: 1.3em;
        }
        .chart {
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }
        .axis line, .axis path {
            stroke: #999;
        }
        .axis text {
            font-size: 11px;
            fill: #555;
        }
        .grid line {
            stroke: #eee;
        }
        .series circle:hover {
            r: 6;
        }
        .legend {
            list-style: none;
            padding: 0;
        }
        .legend li {
            display: inline-block;
            margin-right: 16px;
            font-size: 0.9em;
        }
        .swatch {
            display: inline-block;
            width: 12px;
            height: 12px;
            margin-right: 4px;
            vertical-align: middle;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
        }
        "#
}

/// Linear mapping from a data range onto a pixel range
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
    from: f64,
    to: f64,
}

impl Scale {
    fn fit(values: impl Iterator<Item = f64>, from: f64, to: f64) -> Self {
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in values.filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if !min.is_finite() {
            (min, max) = (0.0, 1.0);
        } else if min == max {
            let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
            (min, max) = (min - pad, max + pad);
        }
        Self { min, max, from, to }
    }

    fn map(&self, v: f64) -> f64 {
        self.from + (v - self.min) / (self.max - self.min) * (self.to - self.from)
    }

    fn ticks(&self) -> Vec<f64> {
        (0..=TICKS)
            .map(|i| self.min + (self.max - self.min) * i as f64 / TICKS as f64)
            .collect()
    }
}

fn format_tick(v: f64, is_time: bool) -> String {
    if is_time {
        return DateTime::<Utc>::from_timestamp(v.round() as i64, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| format!("{}", v));
    }
    if v.abs() >= 1e5 || (v != 0.0 && v.abs() < 1e-3) {
        format!("{:.3e}", v)
    } else {
        format!("{:.3}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn all_points(series: &SeriesMap) -> impl Iterator<Item = &(f64, f64)> {
    series.values().flatten()
}

/// Draw a set of series as polylines with markers
fn push_series(
    svg: &mut String,
    series: &SeriesMap,
    x: &Scale,
    y: &Scale,
    color_offset: usize,
    dashed: bool,
    x_is_time: bool,
) {
    for (i, (name, points)) in series.iter().enumerate() {
        let color = PALETTE[(i + color_offset) % PALETTE.len()];
        let coords: Vec<String> = points
            .iter()
            .map(|(px, py)| format!("{:.2},{:.2}", x.map(*px), y.map(*py)))
            .collect();
        let dash = if dashed { r#" stroke-dasharray="6,4""# } else { "" };

        svg.push_str("    <g class=\"series\">\n");
        push_line(
            svg,
            &format!(
                r#"      <polyline fill="none" stroke="{}" stroke-width="2"{} points="{}"/>"#,
                color,
                dash,
                coords.join(" "),
            ),
        );
        for (px, py) in points {
            push_line(
                svg,
                &format!(
                    r#"      <circle cx="{:.2}" cy="{:.2}" r="4" fill="{}"><title>{}: ({}, {})</title></circle>"#,
                    x.map(*px),
                    y.map(*py),
                    color,
                    escape_html(name),
                    escape_html(&format_tick(*px, x_is_time)),
                    py,
                ),
            );
        }
        svg.push_str("    </g>\n");
    }
}

fn render_svg(request: &PlotRequest) -> String {
    let plot_left = MARGIN_LEFT;
    let plot_right = WIDTH - MARGIN_RIGHT;
    let plot_top = MARGIN_TOP;
    let plot_bottom = HEIGHT - MARGIN_BOTTOM;

    let secondary = request.secondary.as_ref();
    let xs = all_points(&request.series)
        .chain(secondary.into_iter().flat_map(|s| all_points(&s.series)))
        .map(|p| p.0);
    let x = Scale::fit(xs, plot_left, plot_right);
    let y = Scale::fit(all_points(&request.series).map(|p| p.1), plot_bottom, plot_top);

    let mut svg = String::new();
    push_line(
        &mut svg,
        &format!(
            r#"  <svg class="chart" xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            WIDTH, HEIGHT, WIDTH, HEIGHT,
        ),
    );

    // Grid and left axis
    svg.push_str("    <g class=\"grid\">\n");
    for t in y.ticks() {
        let py = y.map(t);
        push_line(
            &mut svg,
            &format!(
                r#"      <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
                plot_left, py, plot_right, py,
            ),
        );
    }
    svg.push_str("    </g>\n");

    svg.push_str("    <g class=\"axis\">\n");
    push_line(
        &mut svg,
        &format!(
            r#"      <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
            plot_left, plot_bottom, plot_right, plot_bottom,
        ),
    );
    push_line(
        &mut svg,
        &format!(
            r#"      <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
            plot_left, plot_top, plot_left, plot_bottom,
        ),
    );
    for t in x.ticks() {
        push_line(
            &mut svg,
            &format!(
                r#"      <text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
                x.map(t),
                plot_bottom + 18.0,
                escape_html(&format_tick(t, request.x_is_time)),
            ),
        );
    }
    for t in y.ticks() {
        push_line(
            &mut svg,
            &format!(
                r#"      <text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
                plot_left - 6.0,
                y.map(t) + 4.0,
                escape_html(&format_tick(t, false)),
            ),
        );
    }
    push_line(
        &mut svg,
        &format!(
            r#"      <text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            (plot_left + plot_right) / 2.0,
            HEIGHT - 20.0,
            escape_html(&request.x_label),
        ),
    );
    push_line(
        &mut svg,
        &format!(
            r#"      <text transform="translate(18,{:.2}) rotate(-90)" text-anchor="middle">{}</text>"#,
            (plot_top + plot_bottom) / 2.0,
            escape_html(&request.y_label),
        ),
    );
    svg.push_str("    </g>\n");

    push_series(&mut svg, &request.series, &x, &y, 0, false, request.x_is_time);

    if let Some(secondary) = secondary {
        let y2 = Scale::fit(all_points(&secondary.series).map(|p| p.1), plot_bottom, plot_top);
        svg.push_str("    <g class=\"axis secondary\">\n");
        push_line(
            &mut svg,
            &format!(
                r#"      <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
                plot_right, plot_top, plot_right, plot_bottom,
            ),
        );
        for t in y2.ticks() {
            push_line(
                &mut svg,
                &format!(
                    r#"      <text x="{:.2}" y="{:.2}" text-anchor="start">{}</text>"#,
                    plot_right + 6.0,
                    y2.map(t) + 4.0,
                    escape_html(&format_tick(t, false)),
                ),
            );
        }
        push_line(
            &mut svg,
            &format!(
                r#"      <text transform="translate({:.2},{:.2}) rotate(90)" text-anchor="middle">{}</text>"#,
                WIDTH - 18.0,
                (plot_top + plot_bottom) / 2.0,
                escape_html(&secondary.label),
            ),
        );
        svg.push_str("    </g>\n");
        push_series(
            &mut svg,
            &secondary.series,
            &x,
            &y2,
            request.series.len(),
            true,
            request.x_is_time,
        );
    }

    svg.push_str("  </svg>\n");
    svg
}

fn render_legend(request: &PlotRequest) -> String {
    let mut html = String::from("  <ul class=\"legend\">\n");
    let secondary = request.secondary.iter().flat_map(|s| s.series.keys());
    for (i, name) in request.series.keys().chain(secondary).enumerate() {
        push_line(
            &mut html,
            &format!(
                r#"    <li><span class="swatch" style="background:{}"></span>{}</li>"#,
                PALETTE[i % PALETTE.len()],
                escape_html(name),
            ),
        );
    }
    html.push_str("  </ul>\n");
    html
}

/// Generate complete HTML document for one chart
pub fn to_html(request: &PlotRequest) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n");

    html.push_str("<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    push_line(&mut html, &format!("    <title>{}</title>", escape_html(&request.title)));
    html.push_str("    <style>");
    html.push_str(generate_styles());
    html.push_str("</style>\n");
    html.push_str("</head>\n");

    html.push_str("<body>\n");
    push_line(&mut html, &format!("  <h1>{}</h1>", escape_html(&request.title)));
    html.push_str(&render_svg(request));
    html.push_str(&render_legend(request));

    html.push_str("  <div class=\"footer\">\n");
    html.push_str("    Generated by procroc\n");
    html.push_str("  </div>\n");

    html.push_str("</body>\n");
    html.push_str("</html>\n");

    html
}
