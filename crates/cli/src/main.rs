mod cli;
mod config;
mod output;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use loglens_engine::content::{format_json, format_xml, pretty_print, unescape};
use loglens_engine::export::{export, ExportFormat};
use loglens_engine::store::{Bookmarks, ColumnPresets, JsonFileStore};
use loglens_engine::{detect_content_type, is_supported_file, LogRecord, LogSession, TimeRange};

use crate::cli::{BookmarkCommands, Cli, Commands, PresetCommands, SearchArgs};
use crate::config::{LogFormat, LoglensConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Phase 1: Basic tracing so we can log during config loading
    // Uses set_default (thread-local) so it can be replaced by Phase 2's global subscriber
    let basic_tracing = init_tracing_basic();

    let config = LoglensConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;

    config.validate()
        .context("Configuration validation failed")?;

    // Phase 2: Re-initialize tracing with config (format, level)
    drop(basic_tracing);
    init_tracing_from_config(&config);

    debug!(command = command_name(&cli.command), "configuration loaded");
    run(cli.command, &config)
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Search { .. } => "search",
        Commands::Stats { .. } => "stats",
        Commands::Export { .. } => "export",
        Commands::Columns { .. } => "columns",
        Commands::Format { .. } => "format",
        Commands::Preset(_) => "preset",
        Commands::Bookmark(_) => "bookmark",
    }
}

fn run(command: Commands, config: &LoglensConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Search { file, search, limit, preset, highlight } => {
            let session = open_session(&file, &search, config)?;
            let columns = match preset {
                Some(name) => preset_columns(config, &name)?,
                None => session.columns().to_vec(),
            };

            let visible = session.filtered();
            let limit = limit.unwrap_or(config.search.limit);
            let shown: Vec<&LogRecord> = visible.iter().copied().take(limit).collect();
            let query = highlight.then(|| session.query());

            write!(out, "{}", output::records_table(&shown, &columns, query))?;
            info!(matched = visible.len(), shown = shown.len(), total = session.records().len(), "search complete");
        }

        Commands::Stats { file, search, json } => {
            let session = open_session(&file, &search, config)?;
            let load = session.normalizer().metrics().snapshot();
            info!(
                records = load.total_records(),
                fallbacks = load.ndjson_fallbacks,
                defaulted_timestamps = load.defaulted_timestamps,
                "load metrics"
            );

            let report = session.analytics();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                write!(out, "{}", output::report_text(&report, &load)?)?;
            }
        }

        Commands::Export { file, format, output, search } => {
            let session = open_session(&file, &search, config)?;
            let visible = session.filtered();
            let format: ExportFormat = format.into();
            let body = export(&visible, format).context("Export failed")?;

            match output {
                Some(path) => {
                    let path = export_path(path, format);
                    fs::write(&path, body)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(records = visible.len(), path = %path.display(), "exported");
                }
                None => {
                    writeln!(out, "{}", body)?;
                    info!(records = visible.len(), format = format.extension(), "exported");
                }
            }
        }

        Commands::Columns { file } => {
            let session = open_session(&file, &SearchArgs::default(), config)?;
            for column in session.columns() {
                writeln!(out, "{}", column)?;
            }
        }

        Commands::Format { xml, json, text } => {
            info!(content_type = detect_content_type(&text).as_str(), "formatting payload");
            let formatted = if xml {
                format_xml(&unescape(&text))
            } else if json {
                format_json(&unescape(&text))
            } else {
                pretty_print(&text)
            };
            writeln!(out, "{}", formatted)?;
        }

        Commands::Preset(PresetCommands::Save { name, columns }) => {
            let mut store = JsonFileStore::new(&config.store.path);
            let mut presets = ColumnPresets::load(&store).context("Failed to read presets")?;
            presets.set(name.clone(), columns);
            presets.save(&mut store).context("Failed to save presets")?;
            info!(preset = %name, path = %config.store.path, "preset saved");
        }

        Commands::Preset(PresetCommands::List) => {
            let store = JsonFileStore::new(&config.store.path);
            let presets = ColumnPresets::load(&store).context("Failed to read presets")?;
            for (name, columns) in presets.iter() {
                writeln!(out, "{}\t{}", name, columns.join(","))?;
            }
        }

        Commands::Bookmark(BookmarkCommands::Toggle { id }) => {
            let mut store = JsonFileStore::new(&config.store.path);
            let mut bookmarks = Bookmarks::load(&store).context("Failed to read bookmarks")?;
            let added = bookmarks.toggle(&id);
            bookmarks.save(&mut store).context("Failed to save bookmarks")?;
            writeln!(out, "{} {}", if added { "bookmarked" } else { "removed" }, id)?;
        }

        Commands::Bookmark(BookmarkCommands::List) => {
            let store = JsonFileStore::new(&config.store.path);
            let bookmarks = Bookmarks::load(&store).context("Failed to read bookmarks")?;
            for id in bookmarks.iter() {
                writeln!(out, "{}", id)?;
            }
        }
    }

    Ok(())
}

/// Read, gate and normalize `file`, then apply the search flags on top of
/// the configured defaults.
fn open_session(file: &Path, search: &SearchArgs, config: &LoglensConfig) -> Result<LogSession> {
    let name = file.to_string_lossy();
    if !is_supported_file(&name) {
        anyhow::bail!("Unsupported file type: {} (expected .json, .log, .txt or .ndjson)", name);
    }

    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut session = LogSession::new();
    session.load(&content, &name)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    session.set_regex(search.regex || config.search.use_regex);
    session.set_case_sensitive(search.case_sensitive || config.search.case_sensitive);
    if let Some(query) = &search.query {
        session.set_query(query.clone());
    }
    for filter in &search.filters {
        session.add_filter(filter.clone());
    }
    session.set_time_range(TimeRange::new(search.from, search.to));

    if let Some(error) = session.search_error() {
        warn!(error = %error, "query ignored");
    }
    Ok(session)
}

fn export_path(path: PathBuf, format: ExportFormat) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(format.extension())
    }
}

fn preset_columns(config: &LoglensConfig, name: &str) -> Result<Vec<String>> {
    let store = JsonFileStore::new(&config.store.path);
    let presets = ColumnPresets::load(&store).context("Failed to read presets")?;
    presets
        .get(name)
        .map(<[String]>::to_vec)
        .with_context(|| format!("No column preset named '{}'", name))
}

/// Phase 1: thread-local subscriber used while configuration loads.
fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Phase 2: global subscriber from configuration. Logs go to stderr so
/// stdout only carries command output.
fn init_tracing_from_config(config: &LoglensConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Prefer RUST_LOG env var, fall back to config level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_target(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_path_adds_missing_extension() {
        assert_eq!(export_path(PathBuf::from("out/visible"), ExportFormat::Csv), PathBuf::from("out/visible.csv"));
        assert_eq!(export_path(PathBuf::from("dump.txt"), ExportFormat::Json), PathBuf::from("dump.txt"));
    }
}
