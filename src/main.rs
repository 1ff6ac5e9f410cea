//! positions-rollup CLI
//!
//! ```bash
//! positions-rollup process positions.xlsx --exclusions exclusions.xlsx --output rollup.xlsx
//! positions-rollup combine downloads/ --exclusions exclusions.xlsx --output rollup.xlsx --timestamp
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use positions_rollup::core::{
    open_table_sink, open_table_source, CleanRules, Combiner, ExclusionSource, ExclusionWorkbook,
    PipelineSpec, Processor, SheetLayout,
};
use positions_rollup::error::Warning;
use positions_rollup::models::{Config, RunReport, Table};
use positions_rollup::utils::timestamped_path;

#[derive(Parser)]
#[command(name = "positions-rollup")]
#[command(about = "Filter, total and sort brokerage positions tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one positions file through the pipeline
    Process {
        /// Input .xlsx or .csv file
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Combine a folder of broker downloads, then run the pipeline
    Combine {
        /// Folder scanned recursively for .xlsx and .csv files
        folder: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

#[derive(Args)]
struct PipelineArgs {
    /// Exclusion workbook (.xlsx or .csv) listing symbols to drop and columns to total
    #[arg(short, long)]
    exclusions: PathBuf,

    /// Output file; the extension picks xlsx or csv
    #[arg(short, long)]
    output: PathBuf,

    /// Column matched against the exclusion list
    #[arg(short, long)]
    key: Option<String>,

    /// Column to total (repeatable; replaces the exclusion workbook's list)
    #[arg(long = "sum")]
    sum: Vec<String>,

    /// Sort column, primary first (repeatable)
    #[arg(long = "sort")]
    sort: Vec<String>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worksheet to read from xlsx inputs
    #[arg(long)]
    sheet: Option<String>,

    /// Append _YYYY-MM-DD_HH-MM-SS to the output file name
    #[arg(short, long)]
    timestamp: bool,
}

impl PipelineArgs {
    /// Config file values with command-line flags layered on top.
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(key) = &self.key {
            config.key_column = key.clone();
        }
        if !self.sum.is_empty() {
            config.sum_columns = self.sum.clone();
        }
        if !self.sort.is_empty() {
            config.sort_columns = self.sort.clone();
        }
        if self.sheet.is_some() {
            config.sheet = self.sheet.clone();
        }

        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process { input, pipeline } => {
            let config = pipeline.config()?;
            let table = open_table_source(&input, config.sheet.as_deref())?
                .load()
                .with_context(|| format!("failed to load {}", input.display()))?;
            tracing::info!("loaded {} rows from {}", table.row_count(), input.display());

            run_pipeline(table, Vec::new(), &pipeline, &config)
        }
        Commands::Combine { folder, pipeline } => {
            let config = pipeline.config()?;
            let combiner = Combiner::new(CleanRules {
                account_column: config.account_column.clone(),
                disclaimer_prefixes: config.disclaimer_prefixes.clone(),
                numeric_columns: config.numeric_columns(),
                sheet: config.sheet.clone(),
            });
            let outcome = combiner
                .combine_folder(&folder)
                .with_context(|| format!("failed to combine {}", folder.display()))?;

            run_pipeline(outcome.table, outcome.warnings, &pipeline, &config)
        }
    }
}

/// `warnings` are those raised before the pipeline; they lead the run report.
fn run_pipeline(
    mut table: Table,
    mut warnings: Vec<Warning>,
    args: &PipelineArgs,
    config: &Config,
) -> Result<()> {
    let workbook = ExclusionWorkbook::new(
        &args.exclusions,
        &config.exclusion_symbol_column,
        &config.exclusion_sum_column,
    );
    let exclusions = workbook
        .load_exclusions()
        .with_context(|| format!("failed to load exclusions from {}", args.exclusions.display()))?;

    let sum_columns = if config.sum_columns.is_empty() {
        let (columns, sum_warnings) = workbook.load_sum_spec_with_warnings()?;
        warnings.extend(sum_warnings);
        columns
    } else {
        config.sum_columns.clone()
    };

    let processor = Processor::new(PipelineSpec {
        key_column: config.key_column.clone(),
        exclusions,
        sum_columns,
        sort_columns: config.sort_columns.clone(),
    });
    let mut report = processor.run(&mut table)?;
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    log_report(&report);

    let output = if args.timestamp {
        timestamped_path(&args.output)
    } else {
        args.output.clone()
    };
    save(&table, &output, config)
}

fn save(table: &Table, output: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create output directory {}", parent.display()))?;
    }

    let layout = SheetLayout {
        currency_columns: config.currency_columns.clone(),
        percentage_columns: config.percentage_columns.clone(),
    };
    open_table_sink(output, layout)?
        .save(table)
        .with_context(|| format!("failed to save {}", output.display()))?;

    println!("{}", output.display());
    Ok(())
}

fn log_report(report: &RunReport) {
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }
    for (column, total) in &report.totals {
        tracing::info!("total {}: {:.2}", column, total);
    }
    tracing::info!(
        "{} rows in, {} excluded, {} rows out ({:.2}s)",
        report.rows_before,
        report.removed_rows,
        report.rows_after(),
        report.elapsed_secs
    );
}
