use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use polars::prelude::*;
use tracing::{debug, info, warn};

use firefly_filter::TableFilterService;
use firefly_filter::config::Config;
use firefly_filter::filter::{CONDITION_HELP, ColumnDef, FilterSet, FilterStatus};

/// Parse, validate and apply per-column table filters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Declare a filterable column. Repeat per column. Ignored when --csv is given.
    #[arg(long = "column", value_name = "NAME")]
    columns: Vec<String>,
    /// CSV file (with header) providing the columns and the rows to filter
    #[arg(long = "csv", value_name = "PATH")]
    csv: Option<PathBuf>,
    /// Filter text of one column. Repeat per column. Syntax: NAME=TEXT
    /// Examples: --filter 'mag=> 12; < 20'
    ///           --filter 'band=IN J,H'
    #[arg(long = "filter", value_name = "NAME=TEXT")]
    filters: Vec<String>,
    /// Restore a filter in wire form, e.g. 'mag > 12' or '#bcdid IN (1,2)'
    #[arg(long = "restore", value_name = "FILTER")]
    restore: Vec<String>,
    /// Mark a column as not visible
    #[arg(long = "hide", value_name = "NAME")]
    hide: Vec<String>,
    /// Include system filters in the output
    #[arg(long = "include-sys")]
    include_sys: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn)  => Some(tracing::Level::WARN),
        Some(LogLevel::Info)  => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => None,
    };
    firefly_filter::logging::init_with(None, level)?;

    let config = match Config::from_path(args.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) if args.config.is_none() => {
            warn!("Falling back to built-in config: {e}");
            Config::embedded()?
        }
        Err(e) => return Err(e.into()),
    };

    let frame = args.csv.as_ref().map(read_csv).transpose()?;
    let mut defs: Vec<ColumnDef> = match &frame {
        Some(df) => df.get_column_names().iter().map(|n| ColumnDef::new(n.as_str())).collect(),
        None => args.columns.iter().map(ColumnDef::new).collect(),
    };
    for def in defs.iter_mut().filter(|d| args.hide.contains(&d.name)) {
        def.visible = false;
    }

    let mut filters = FilterSet::new(&defs);
    filters.set_filters(&args.restore);
    for assignment in &args.filters {
        let (name, text) = assignment
            .split_once('=')
            .ok_or_else(|| eyre!("Expected NAME=TEXT, got '{assignment}'"))?;
        if filters.set_column_text(name.trim(), text).is_none() {
            return Err(eyre!("Unknown column '{}'", name.trim()));
        }
    }

    if config.filters.clear_hidden_on_submit && filters.clear_hidden_filters() {
        info!("Cleared filters on hidden columns");
    }
    if config.filters.show_filters {
        print_filter_row(&filters);
    }

    let Some(wire) = filters.get_filters(args.include_sys) else {
        for column in filters.columns() {
            if let FilterStatus::Invalid(err) = column.status() {
                eprintln!("{}: '{}' ({err})", column.name(), column.raw_text());
            }
        }
        eprintln!("{CONDITION_HELP}");
        return Err(eyre!("Invalid filter on: {}", filters.invalid_columns().join(", ")));
    };
    debug!(?wire, "submitting filters");
    println!("{}", serde_json::to_string_pretty(&wire)?);

    if let Some(df) = frame {
        let filtered = TableFilterService::filter_dataframe(&df, &wire)?;
        println!("{filtered}");
    }
    Ok(())
}

fn read_csv(path: &PathBuf) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.clone()))?
        .finish()?;
    Ok(df)
}

// One line per filterable column, the way the filter row shows it.
fn print_filter_row(filters: &FilterSet) {
    for column in filters.columns() {
        let state = match column.status() {
            FilterStatus::Empty => "-",
            FilterStatus::Parsed => "ok",
            FilterStatus::Invalid(_) => "invalid",
        };
        let hidden = if column.is_visible() { "" } else { " (hidden)" };
        eprintln!("{}{hidden}: [{state}] {}", column.name(), column.raw_text());
    }
}
