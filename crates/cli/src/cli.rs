//! CLI definitions for loglens

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use loglens_engine::export::ExportFormat;
use loglens_engine::parser::fields::parse_timestamp;
use loglens_engine::SearchFilter;

#[derive(Parser)]
#[command(name = "loglens")]
#[command(about = "Normalize, search and summarize log files")]
#[command(
    long_about = "loglens - Normalize, search and summarize log files.

Accepts JSON arrays, newline-delimited JSON and plain text. Nested fields
are flattened to dot-paths (http.status_code) and timestamp, level and
message are detected from well-known field names.

QUICK START:
    loglens search app.ndjson -q timeout           Literal, case-insensitive search
    loglens search app.log -f level=ERROR          Quick filter
    loglens stats app.ndjson --from 2024-01-01     Analytics for a time window
    loglens export app.ndjson --format csv         Filtered set as CSV"
)]
#[command(version)]
pub struct Cli {
    /// Configuration file (replaces /etc/loglens/loglens.toml and config/loglens.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print matching records
    #[command(long_about = "Print the records that pass the time range, quick filters and query.

Columns come from --preset when given, else from every field seen in the file.

EXAMPLES:
    loglens search app.ndjson -q 'time(out|d out)' --regex
    loglens search app.ndjson -f http.status_code=404 -f 'path~/api'
    loglens search app.ndjson -f 'level!=DEBUG' --limit 20
    loglens search app.ndjson -q db --highlight")]
    Search {
        /// Log file (.json, .log, .txt, .ndjson)
        file: PathBuf,

        #[command(flatten)]
        search: SearchArgs,

        /// Maximum records to print (defaults to search.limit)
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Show the columns of a saved preset
        #[arg(long)]
        preset: Option<String>,

        /// Wrap query matches in <mark> (output is HTML-escaped)
        #[arg(long)]
        highlight: bool,
    },

    /// Summary, distributions and time series for the matching records
    Stats {
        file: PathBuf,

        #[command(flatten)]
        search: SearchArgs,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the matching records to stdout or a file
    Export {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportFormatArg::Json)]
        format: ExportFormatArg,

        /// Destination file; the format's extension is added when missing
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// List the columns discovered in a file
    Columns { file: PathBuf },

    /// Classify, unescape and pretty-print a JSON or XML payload
    Format {
        /// Force XML formatting
        #[arg(long, conflicts_with = "json")]
        xml: bool,

        /// Force JSON formatting
        #[arg(long)]
        json: bool,

        text: String,
    },

    /// Manage column presets
    #[command(subcommand)]
    Preset(PresetCommands),

    /// Manage bookmarked record ids
    #[command(subcommand)]
    Bookmark(BookmarkCommands),
}

#[derive(Subcommand)]
pub enum PresetCommands {
    /// Save (or replace) a named column list
    Save {
        name: String,
        #[arg(required = true)]
        columns: Vec<String>,
    },
    /// List saved presets
    List,
}

#[derive(Subcommand)]
pub enum BookmarkCommands {
    /// Bookmark a record id, or remove an existing bookmark
    Toggle { id: String },
    /// List bookmarked ids
    List,
}

/// Flags shared by every command that filters records.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchArgs {
    /// Query text matched against every field
    #[arg(long, short)]
    pub query: Option<String>,

    /// Treat the query as a regular expression
    #[arg(long)]
    pub regex: bool,

    #[arg(long)]
    pub case_sensitive: bool,

    /// FIELD=VALUE, FIELD~VALUE (contains) or FIELD!=VALUE; repeatable
    #[arg(long = "filter", short = 'f', value_name = "FILTER")]
    pub filters: Vec<SearchFilter>,

    /// Inclusive lower time bound
    #[arg(long, value_parser = parse_time)]
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper time bound
    #[arg(long, value_parser = parse_time)]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    Json,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Csv => ExportFormat::Csv,
        }
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("unrecognised timestamp `{}`", raw))
}
