//! CLI argument definitions for the cohort loader.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cohort-loader",
    version,
    about = "Consolidate research datasets into a normalized SQLite database",
    long_about = "Load template-shaped CSV files of variable dictionaries and\n\
                  measurements into a normalized SQLite database.\n\n\
                  Loads are idempotent: rows already present are skipped.\n\
                  Dictionary loads ask for confirmation before each staged\n\
                  insert; measurement loads report counts and proceed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database file and its schema, without loading anything.
    InitDb(DbArgs),

    /// Load a variable-dictionary CSV file.
    LoadDictionary(DictionaryArgs),

    /// Load a measurement CSV file.
    LoadMeasurements(MeasurementArgs),
}

#[derive(Args)]
pub struct DbArgs {
    /// Path of the SQLite database.
    #[arg(long = "db", value_name = "PATH", default_value = "cohort.db")]
    pub db: PathBuf,
}

#[derive(Args)]
pub struct DictionaryArgs {
    /// Path to the CSV file to load.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Path of the SQLite database.
    #[arg(long = "db", value_name = "PATH", default_value = "cohort.db")]
    pub db: PathBuf,

    /// Answer yes to every confirmation prompt.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Print the load summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct MeasurementArgs {
    /// Path to the CSV file to load.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Path of the SQLite database.
    #[arg(long = "db", value_name = "PATH", default_value = "cohort.db")]
    pub db: PathBuf,

    /// Print the load summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
