//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Notifications and notices go to stderr so stdout stays parseable.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use fuelsync_core::{Notification, NotificationLevel, NotificationSink};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Whether stderr notices should be colored.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since detail views don't use the
/// `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Metric")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render a statistics record. Tables list one field per row, with nested
/// maps flattened to `field.key`; plain prints `field=value` lines.
pub fn render_stats<S: Serialize>(format: &OutputFormat, stats: &S) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => render_json(stats, false),
        OutputFormat::JsonCompact => render_json(stats, true),
        OutputFormat::Yaml => render_yaml(stats),
        OutputFormat::Table | OutputFormat::Plain => {
            let value = serde_json::to_value(stats).map_err(|e| CliError::Render(e.to_string()))?;
            let mut rows = Vec::new();
            flatten_fields("", &value, &mut rows);
            if matches!(format, OutputFormat::Plain) {
                Ok(rows
                    .iter()
                    .map(|r| format!("{}={}", r.key, r.value))
                    .collect::<Vec<_>>()
                    .join("\n"))
            } else {
                Ok(render_table(&rows))
            }
        }
    }
}

fn flatten_fields(prefix: &str, value: &serde_json::Value, rows: &mut Vec<FieldRow>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_fields(&key, inner, rows);
            }
        }
        serde_json::Value::String(s) => rows.push(FieldRow {
            key: prefix.into(),
            value: s.clone(),
        }),
        other => rows.push(FieldRow {
            key: prefix.into(),
            value: other.to_string(),
        }),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

// ── Notices ──────────────────────────────────────────────────────────

/// Writes notifications and notices to stderr as `tag title: message`.
///
/// Error-level notifications are only logged: the command's own error
/// (or its offline notice) already tells the user what went wrong.
#[derive(Debug, Clone, Copy)]
pub struct StderrSink {
    color: bool,
    quiet: bool,
}

impl StderrSink {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }

    /// Print one line unless quiet.
    pub fn emit(&self, level: NotificationLevel, title: &str, message: &str) {
        if self.quiet {
            return;
        }
        let tag = match level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warn",
            NotificationLevel::Error => "error",
        };
        let tag = if self.color {
            match level {
                NotificationLevel::Success => tag.green().bold().to_string(),
                NotificationLevel::Info => tag.cyan().bold().to_string(),
                NotificationLevel::Warning => tag.yellow().bold().to_string(),
                NotificationLevel::Error => tag.red().bold().to_string(),
            }
        } else {
            tag.to_owned()
        };
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{tag} {title}: {message}");
    }
}

impl NotificationSink for StderrSink {
    fn notify(&self, n: Notification) {
        if n.level == NotificationLevel::Error {
            tracing::debug!(title = %n.title, error = ?n.error, "{}", n.message);
            return;
        }
        self.emit(n.level, &n.title, &n.message);
    }
}
