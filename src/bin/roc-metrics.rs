use anyhow::{Context, Result};
use clap::Parser;
use procroc::cli::MetricsCli;
use procroc::config::RocConfig;
use procroc::event_log::EventLog;
use procroc::html_output::HtmlPlotter;
use procroc::metrics::{
    activity_summary, case_spans, case_summary, daily_plot, daily_series, filter_periods,
    format_activity_summary, format_case_summary, format_daily, Period,
};
use procroc::plot::Plotter;
use procroc::preparation::{prepare, PreparedRow, PreparedTable};
use procroc::text_output::render_table;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber: TRACE with --debug, otherwise RUST_LOG if set
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }
}

/// First `head` filtered events, all columns
fn format_events(table: &PreparedTable, rows: &[&PreparedRow], head: usize) -> String {
    let header: Vec<String> = table.columns().iter().map(|c| c.name.clone()).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .take(head)
        .map(|row| row.cells().iter().map(|v| v.to_string()).collect())
        .collect();
    render_table(&header, &body)
}

/// Filtered events plus activity and case summaries for one set of periods
fn print_period_report(
    args: &MetricsCli,
    table: &PreparedTable,
    periods: &[Period],
    label: &str,
) -> Result<()> {
    if periods.is_empty() {
        return Ok(());
    }
    let case = table.resolve_column(&args.case_id_column)?;
    let activity = table.resolve_column(&args.activity_column)?;
    let rows = filter_periods(table, periods);

    println!("Filtered Event Log for {} Periods:", label);
    print!("{}", format_events(table, &rows, args.head));
    println!();

    println!("Activity Analysis During {} Periods:", label);
    print!("{}", format_activity_summary(&activity_summary(&rows, activity)));
    println!();

    println!("Case Analysis During {} Periods:", label);
    print!(
        "{}",
        format_case_summary(&case_summary(&rows, case, activity, args.head))
    );
    println!();
    Ok(())
}

fn main() -> Result<()> {
    let args = MetricsCli::parse();

    init_tracing(args.debug);

    let config = RocConfig::lenient();
    let log = EventLog::from_path(&args.log_file)
        .with_context(|| format!("failed to read event log {}", args.log_file.display()))?;
    let table = prepare(&log, &args.case_id_column, config.on_parse_failure)?;

    let spans = case_spans(&table, args.metric, &args.activity_column)?;
    let daily = daily_series(&spans);

    println!("Daily {} Time:", args.metric.label());
    print!("{}", format_daily(args.metric, &daily));
    println!();

    print_period_report(&args, &table, &args.anomalous, "Anomalous")?;
    print_period_report(&args, &table, &args.normal, "Normal")?;

    if !args.no_plot {
        let mut plotter = HtmlPlotter::new(&args.plot_dir);
        plotter.render(&daily_plot(args.metric, &daily))?;
    }

    Ok(())
}
