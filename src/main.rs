use anyhow::{Context, Result};
use clap::Parser;
use procroc::cli::{Cli, OutputFormat};
use procroc::csv_output::CsvOutput;
use procroc::discard_log::CsvDiscardLog;
use procroc::error::RocError;
use procroc::event_log::EventLog;
use procroc::html_output::HtmlPlotter;
use procroc::json_output::JsonOutput;
use procroc::plot::{NullPlotter, Plotter};
use procroc::preparation::prepare;
use procroc::roc::{RocCalculator, RocRow};
use procroc::scenario::{run_scenario, Scenario, INVALID_SELECTION_MESSAGE};
use procroc::text_output::format_table;
use tracing::debug;
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

/// Print ROC rows to stdout in the requested format
fn print_rows(
    format: OutputFormat,
    case_column: &str,
    delta_x: &str,
    delta_y: &str,
    rows: Vec<RocRow>,
) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", format_table(case_column, delta_x, delta_y, &rows)),
        OutputFormat::Csv => {
            let mut output = CsvOutput::new(case_column, delta_x, delta_y);
            output.extend(rows);
            print!("{}", output.to_csv());
        }
        OutputFormat::Json => {
            let mut output = JsonOutput::new(case_column, delta_x, delta_y);
            output.extend(rows);
            println!("{}", output.to_json()?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let scenario = match Scenario::from_case_ids(args.case_ids.as_deref()) {
        Ok(scenario) => scenario,
        Err(RocError::InvalidSelection(reason)) => {
            debug!(%reason, "rejecting case selection");
            println!("{}", INVALID_SELECTION_MESSAGE);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let config = args.resolve_config().context("failed to load configuration")?;

    let log = EventLog::from_path(&args.log_file)
        .with_context(|| format!("failed to read event log {}", args.log_file.display()))?;
    let table = prepare(&log, &args.case_id_column, config.on_parse_failure)?;

    let mut sink = CsvDiscardLog::new(&config.discard_log);
    let mut calculator = RocCalculator::new(
        &table,
        &args.delta_y,
        &args.delta_x,
        &mut sink,
        config.log_discards,
    )?;

    let mut plotter: Box<dyn Plotter> = if config.render_plots {
        Box::new(HtmlPlotter::new(&config.plot_dir))
    } else {
        Box::new(NullPlotter)
    };

    let rows = run_scenario(&scenario, &mut calculator, plotter.as_mut())?;

    print_rows(
        args.format,
        &args.case_id_column,
        calculator.delta_x_name(),
        calculator.delta_y_name(),
        rows,
    )
}
