use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use comparcar_core::config::{DEFAULT_CONFIG_FILE, FALLBACK_CONFIG_FILE};
use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let lines = [
        "effective config (source precedence: env > file > default):".to_string(),
        render_line(
            "database.url",
            &config.database.url,
            source("database.url", &["COMPARCAR_DATABASE_URL"]),
        ),
        render_line(
            "database.max_connections",
            &config.database.max_connections.to_string(),
            source("database.max_connections", &["COMPARCAR_DATABASE_MAX_CONNECTIONS"]),
        ),
        render_line(
            "database.timeout_secs",
            &config.database.timeout_secs.to_string(),
            source("database.timeout_secs", &["COMPARCAR_DATABASE_TIMEOUT_SECS"]),
        ),
        render_line(
            "server.bind_address",
            &config.server.bind_address,
            source("server.bind_address", &["COMPARCAR_SERVER_BIND_ADDRESS"]),
        ),
        render_line(
            "server.port",
            &config.server.port.to_string(),
            source("server.port", &["COMPARCAR_SERVER_PORT"]),
        ),
        render_line(
            "server.cors_allowed_origin",
            &config.server.cors_allowed_origin,
            source("server.cors_allowed_origin", &["COMPARCAR_SERVER_CORS_ALLOWED_ORIGIN"]),
        ),
        render_line(
            "server.graceful_shutdown_secs",
            &config.server.graceful_shutdown_secs.to_string(),
            source("server.graceful_shutdown_secs", &["COMPARCAR_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["COMPARCAR_LOGGING_LEVEL", "COMPARCAR_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            config.logging.format.as_str(),
            source("logging.format", &["COMPARCAR_LOGGING_FORMAT", "COMPARCAR_LOG_FORMAT"]),
        ),
    ];

    CommandResult::success("config", lines.join("\n"))
}

/// Same lookup order as `AppConfig::load` without an explicit path.
fn detect_config_path() -> Option<PathBuf> {
    [DEFAULT_CONFIG_FILE, FALLBACK_CONFIG_FILE]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
