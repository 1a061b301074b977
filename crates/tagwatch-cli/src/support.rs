use serde::Serialize;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives, e.g. `TAGWATCH_LOG=tagwatch_compare=debug`.
pub const LOG_FILTER_ENV: &str = "TAGWATCH_LOG";
/// Set to `1`/`true` for JSON log lines.
pub const LOG_JSON_ENV: &str = "TAGWATCH_LOG_JSON";

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

/// Logs go to stderr; stdout is reserved for command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if env_bool(LOG_JSON_ENV, false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub fn read_json_or_exit(path: &Path, label: &str) -> Value {
    let bytes = fs::read(path).unwrap_or_else(|err| {
        eprintln!("error: failed to read {label} file {}: {err}", path.display());
        std::process::exit(2);
    });
    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        eprintln!("error: failed to parse {label} json {}: {err}", path.display());
        std::process::exit(2);
    })
}

pub fn render_json_or_exit<T: Serialize>(value: &T, label: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        eprintln!("error: failed to render {label} json: {err}");
        std::process::exit(2);
    })
}

pub fn write_json_or_exit<T: Serialize>(path: &Path, value: &T, label: &str) {
    let rendered = render_json_or_exit(value, label);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).unwrap_or_else(|err| {
            eprintln!("error: failed to create {}: {err}", parent.display());
            std::process::exit(2);
        });
    }
    fs::write(path, format!("{rendered}\n")).unwrap_or_else(|err| {
        eprintln!("error: failed to write {label} {}: {err}", path.display());
        std::process::exit(2);
    });
}

/// Render a value list the way reports show it: strings unquoted, comma-joined.
pub fn display_values(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(display_scalar).collect::<Vec<_>>().join(", "),
        other => display_scalar(other),
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
