//! CLI argument definitions for the selection board.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use sbs_cli::logging::{LogConfig, LogFormat};
use sbs_model::RowStatus;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "selection-board",
    version,
    about = "Selection board for campaign applicant sheets",
    long_about = "Review campaign applicants from a CSV or Excel export.\n\n\
                  Selecting one row retires every other row with the same contact;\n\
                  releasing it puts them back. Row state is kept in a JSON snapshot\n\
                  next to the spreadsheet."
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

    /// Allow applicant names, contacts and URLs in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file (default: the per-user config directory).
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show which columns were picked for contact, name, category, channel and URL.
    Mapping(TableArgs),

    /// Print a view's rows with their status and assignment.
    Show(ShowArgs),

    /// Print status counts for a view.
    Stats(ViewArgs),

    /// Request a status for one row and save the snapshot.
    Set(SetArgs),

    /// Cycle one row's status and save the snapshot.
    Toggle(RowArgs),

    /// Write a view to CSV.
    Export(ExportArgs),

    /// Open a view's URLs in the browser, in batches.
    OpenUrls(OpenUrlsArgs),

    /// Read commands from stdin and apply them, auto-saving as you go.
    Review(ReviewArgs),

    /// Print the effective settings.
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct TableArgs {
    /// Applicant spreadsheet (.csv, .xlsx, .xls, .ods).
    #[arg(value_name = "TABLE")]
    pub table: PathBuf,

    /// Snapshot file to load before running and to save into.
    #[arg(long = "state", value_name = "FILE")]
    pub state: Option<PathBuf>,
}

/// Filter flags layered over the view's current criteria.
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Only rows whose category contains this text ("all" for every category).
    #[arg(long = "category", value_name = "NAME")]
    pub category: Option<String>,

    /// Only rows that applied for a single category.
    #[arg(long = "single-category")]
    pub single_category: bool,

    /// Free-text search over name, contact and the other columns.
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// Enabled statuses (repeatable). Default: all.
    #[arg(long = "status", value_name = "STATUS")]
    pub status: Vec<RowStatus>,

    /// Enabled channels (repeatable). Default: the whole catalog.
    #[arg(long = "channel", value_name = "CHANNEL", conflicts_with = "no_channels")]
    pub channel: Vec<String>,

    /// Disable every channel.
    #[arg(long = "no-channels")]
    pub no_channels: bool,
}

#[derive(Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub table: TableArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// View to use (default: the main view). Category tabs are named after their category.
    #[arg(long = "view", value_name = "NAME")]
    pub view: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Print at most this many rows.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

/// Row and assignment flags shared by `set` and `toggle`.
#[derive(Args)]
pub struct RowArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Row number as printed by `show`.
    #[arg(long = "row", value_name = "N")]
    pub row: usize,

    /// View whose criteria decide the assigned product and channel.
    #[arg(long = "view", value_name = "NAME")]
    pub view: Option<String>,

    /// Product to record on selection (default: the view's category).
    #[arg(long = "category", value_name = "NAME")]
    pub category: Option<String>,

    /// Channel to record on selection (default: the view's only channel).
    #[arg(long = "channel", value_name = "CHANNEL")]
    pub channel: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub row: RowArgs,

    /// Requested status (name or code). Completed cannot be requested.
    #[arg(long = "status", value_name = "STATUS")]
    pub status: RowStatus,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output CSV file.
    #[arg(long = "out", value_name = "FILE")]
    pub out: PathBuf,
}

#[derive(Args)]
pub struct OpenUrlsArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Only rows with this status.
    #[arg(long = "only-status", value_name = "STATUS")]
    pub only_status: Option<RowStatus>,

    /// URLs per batch (default from settings).
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Pause between batches in milliseconds (default from settings).
    #[arg(long = "delay-ms", value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Print the URLs instead of opening them.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// View to act in (default: the main view).
    #[arg(long = "view", value_name = "NAME")]
    pub view: Option<String>,

    /// Turn auto-save off for this session.
    #[arg(long = "no-autosave")]
    pub no_autosave: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the default settings to the settings file if it does not exist.
    #[arg(long = "init")]
    pub init: bool,
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

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// `--log-level` wins over `-v/-q`; either one turns off `RUST_LOG`.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.verbosity.is_present() || self.log_level.is_some();
        LogConfig {
            level_filter: self
                .log_level
                .map_or_else(|| self.verbosity.tracing_level_filter(), LevelFilter::from),
            use_env_filter: !explicit,
            with_ansi: match self.color.color {
                ColorChoice::Always => true,
                ColorChoice::Never => false,
                ColorChoice::Auto => {
                    self.log_file.is_none() && std::io::stderr().is_terminal()
                }
            },
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            log_data: self.log_data,
            ..LogConfig::default()
        }
    }
}
