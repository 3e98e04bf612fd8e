mod logging;
mod settings;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fixtura_eval::{EvalError, EvaluateOptions, evaluate_dir};
use fixtura_generate::{
    Compression, GenerationEngine, GenerationError, LocaleKey, OutputFormat,
};
use thiserror::Error;

use logging::init_logging;
use settings::{
    GenerateOverrides, SettingsError, load_settings, parse_compression, parse_format,
    parse_locale, resolve_generate_options,
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "fixtura", version, about = "Synthetic registry and order dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the registry and order datasets.
    Generate(GenerateArgs),
    /// Check generated Parquet datasets against their invariants.
    ///
    /// CSV runs (`generate --format csv`) cannot be checked.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of registry records (default 10000).
    #[arg(long)]
    registries: Option<u64>,
    /// Number of orders (default 5000).
    #[arg(long)]
    orders: Option<u64>,
    /// Base output directory (default ./data/).
    #[arg(long)]
    out: Option<PathBuf>,
    /// RNG seed; drawn at random and reported when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Fake data locale: pt_BR or en_US.
    #[arg(long, value_parser = parse_locale)]
    locale: Option<LocaleKey>,
    /// Output format: parquet or csv.
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,
    /// Parquet compression: none, snappy, lz4 or zstd.
    #[arg(long, value_parser = parse_compression)]
    compression: Option<Compression>,
    /// Date the age and history windows are anchored to (YYYY-MM-DD).
    #[arg(long, value_name = "YYYY-MM-DD")]
    reference_date: Option<NaiveDate>,
    /// TOML settings file applied below command-line flags.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write generation_report.json next to the datasets.
    #[arg(long, default_value_t = false)]
    report: bool,
    /// Append JSON log lines to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Log JSON lines to stderr.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Base directory holding cadastros/ and pedidos/ in Parquet format.
    #[arg(long, default_value = "./data/")]
    data: PathBuf,
    /// Expected registry row count.
    #[arg(long)]
    registries: Option<u64>,
    /// Expected order row count.
    #[arg(long)]
    orders: Option<u64>,
    /// Reference date of the run; read from generation_report.json when omitted.
    #[arg(long, value_name = "YYYY-MM-DD")]
    reference_date: Option<NaiveDate>,
    /// Violations listed in report.md.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
    /// Exit with an error when any violation is found.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let file = args.config.as_deref().map(load_settings).transpose()?;

    let log_file = args
        .log_file
        .clone()
        .or_else(|| file.as_ref().and_then(|file| file.logging.file.clone()));
    let log_json = args.log_json
        || file
            .as_ref()
            .and_then(|file| file.logging.json)
            .unwrap_or(false);
    init_logging(log_file.as_deref(), log_json)?;

    let flags = GenerateOverrides {
        registries: args.registries,
        orders: args.orders,
        out: args.out,
        seed: args.seed,
        locale: args.locale,
        format: args.format,
        compression: args.compression,
        reference_date: args.reference_date,
        max_attempts_national_id: None,
        report: args.report.then_some(true),
    };
    let options = resolve_generate_options(file.as_ref(), &flags);

    let result = GenerationEngine::new(options).run()?;

    println!(
        "registry data written to {}",
        result.registry_path.display()
    );
    println!("order data written to {}", result.orders_path.display());
    println!(
        "seed {} reference date {}",
        result.report.seed, result.report.reference_date
    );
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), CliError> {
    init_logging(None, false)?;

    let options = EvaluateOptions {
        strict: args.strict,
        max_examples: args.max_examples,
        expected_registries: args.registries,
        expected_orders: args.orders,
        reference_date: args.reference_date,
        out_dir: None,
    };

    match evaluate_dir(&args.data, &options) {
        Ok(result) => {
            println!(
                "{} violation(s); {} warning(s)",
                result.violations.len(),
                result.metrics.warnings.len()
            );
            if let Some(path) = result.report_path {
                println!("report written to {}", path.display());
            }
            Ok(())
        }
        Err(err) => {
            if let EvalError::Violations(count) = &err {
                println!(
                    "{count} violation(s); see {}",
                    args.data.join("report.md").display()
                );
            }
            Err(err.into())
        }
    }
}
