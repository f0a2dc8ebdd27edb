//! CLI argument definitions for the `rios` converter.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use rios_cli::documents::DocumentFormat;

#[derive(Parser)]
#[command(
    name = "rios",
    version,
    about = "Convert REDCap data dictionaries to RIOS documents and back",
    long_about = "Convert REDCap data dictionaries (CSV) to RIOS Instrument, Form and\n\
                  CalculationSet documents, and RIOS documents back to a REDCap\n\
                  data dictionary. Documents are read and written as JSON or YAML."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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
    /// Convert a REDCap data dictionary into RIOS documents.
    ToRios(ToRiosArgs),

    /// Convert RIOS documents into a REDCap data dictionary.
    FromRios(FromRiosArgs),
}

#[derive(Args)]
pub struct ToRiosArgs {
    /// REDCap data dictionary (CSV).
    #[arg(long = "infile", value_name = "CSV")]
    pub infile: PathBuf,

    /// Output prefix; files are named <PREFIX>_i, <PREFIX>_f and <PREFIX>_c.
    #[arg(long = "outfile-prefix", value_name = "PREFIX")]
    pub outfile_prefix: PathBuf,

    /// Instrument id (URN).
    #[arg(long = "id")]
    pub id: String,

    /// Instrument title.
    #[arg(long = "title")]
    pub title: String,

    /// Instrument description.
    #[arg(long = "description")]
    pub description: Option<String>,

    /// Instrument version (default: 1.0).
    #[arg(long = "instrument-version", value_name = "VERSION")]
    pub instrument_version: Option<String>,

    /// Locale of all text (default: en).
    #[arg(long = "localization", value_name = "LOCALE")]
    pub localization: Option<String>,

    /// Document format to write.
    #[arg(long = "format", value_enum, default_value = "yaml")]
    pub format: FormatArg,

    /// Report fatal errors in the summary instead of failing.
    #[arg(long = "suppress")]
    pub suppress: bool,
}

#[derive(Args)]
pub struct FromRiosArgs {
    /// RIOS Instrument document.
    #[arg(short = 'i', long = "instrument", value_name = "FILE")]
    pub instrument: PathBuf,

    /// RIOS Form document.
    #[arg(short = 'f', long = "form", value_name = "FILE")]
    pub form: PathBuf,

    /// RIOS CalculationSet document.
    #[arg(short = 'c', long = "calculationset", value_name = "FILE")]
    pub calculations: Option<PathBuf>,

    /// REDCap data dictionary to write (CSV).
    #[arg(short = 'o', long = "outfile", value_name = "CSV")]
    pub outfile: PathBuf,

    /// Locale used to pick text (default: en).
    #[arg(long = "localization", value_name = "LOCALE")]
    pub localization: Option<String>,

    /// Format of input files whose extension is not .json, .yaml or .yml.
    #[arg(long = "format", value_enum, default_value = "yaml")]
    pub format: FormatArg,

    /// Report fatal errors in the summary instead of failing.
    #[arg(long = "suppress")]
    pub suppress: bool,
}

/// CLI document format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for DocumentFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Yaml => Self::Yaml,
        }
    }
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
