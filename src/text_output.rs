//! Human-readable tables (default `--format text`)

use crate::roc::RocRow;

/// Render a header and rows as left-aligned columns separated by two spaces
pub fn render_table(header: &[String], body: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for cells in body {
        push_line(&mut out, cells, &widths);
    }
    out
}

/// Render ROC rows as an aligned text table; undefined ROC shows as `-`
pub fn format_table(case_column: &str, delta_x: &str, delta_y: &str, rows: &[RocRow]) -> String {
    let header = [case_column, delta_x, delta_y, "ROC"].map(String::from);
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.case_id.clone(),
                r.delta_x.to_string(),
                r.delta_y.to_string(),
                format_optional(r.roc),
            ]
        })
        .collect();

    let mut out = render_table(&header, &body);
    out.push_str(&format!("{} rows\n", rows.len()));
    out
}

/// Six-decimal float, or `-` when undefined
pub fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.6}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
