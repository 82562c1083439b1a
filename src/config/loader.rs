//! Configuration file loading with precedence handling.

use crate::cache::{
    DEFAULT_CHUNK_CAPACITY, DEFAULT_CHUNK_SIZE, DEFAULT_EVICTION_BUFFER, DEFAULT_ROW_CAPACITY,
};
use crate::state::DEFAULT_HIGHLIGHT_DURATION;
use crate::view_state::{DEFAULT_OVERSCAN_ROWS, DEFAULT_WINDOW_SIZE};
use crate::viewer::ViewerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HEXVIEW_CONFIG";
/// Environment variable fixing bytes per row.
pub const BYTES_PER_ROW_ENV: &str = "HEXVIEW_BYTES_PER_ROW";
/// Environment variable showing or hiding the ASCII column.
pub const SHOW_ASCII_ENV: &str = "HEXVIEW_SHOW_ASCII";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/hexview/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Bytes per cached chunk.
    #[serde(default)]
    pub chunk_size: Option<u64>,

    /// Minimum bytes loaded around the visible rows.
    #[serde(default)]
    pub window_size: Option<u64>,

    /// Maximum resident chunks.
    #[serde(default)]
    pub cache_capacity: Option<usize>,

    /// Chunks kept around a requested range before proactive eviction.
    #[serde(default)]
    pub eviction_buffer: Option<u64>,

    /// Maximum cached rows.
    #[serde(default)]
    pub row_cache_capacity: Option<usize>,

    /// Rows loaded above and below the visible rows.
    #[serde(default)]
    pub overscan_rows: Option<u64>,

    /// Show the ASCII column.
    #[serde(default)]
    pub show_ascii: Option<bool>,

    /// Fixed bytes per row.
    #[serde(default)]
    pub bytes_per_row: Option<u32>,

    /// Lifetime of the navigation highlight in milliseconds.
    #[serde(default)]
    pub highlight_duration_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Bytes per cached chunk.
    pub chunk_size: u64,
    /// Minimum bytes loaded around the visible rows.
    pub window_size: u64,
    /// Maximum resident chunks.
    pub cache_capacity: usize,
    /// Chunks kept around a requested range before proactive eviction.
    pub eviction_buffer: u64,
    /// Maximum cached rows.
    pub row_cache_capacity: usize,
    /// Rows loaded above and below the visible rows.
    pub overscan_rows: u64,
    /// Show the ASCII column.
    pub show_ascii: bool,
    /// Fixed bytes per row, `None` to fit the width.
    pub bytes_per_row: Option<u32>,
    /// Lifetime of the navigation highlight in milliseconds.
    pub highlight_duration_ms: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            cache_capacity: DEFAULT_CHUNK_CAPACITY,
            eviction_buffer: DEFAULT_EVICTION_BUFFER,
            row_cache_capacity: DEFAULT_ROW_CAPACITY,
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            show_ascii: true,
            bytes_per_row: None,
            highlight_duration_ms: DEFAULT_HIGHLIGHT_DURATION.as_millis() as u64,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Engine settings for these values.
    ///
    /// Zero sizes fall back to the defaults, and a zero bytes-per-row means
    /// "fit the width".
    pub fn viewer_config(&self) -> ViewerConfig {
        let defaults = ViewerConfig::default();
        let or_default = |value: u64, default: u64| if value == 0 { default } else { value };
        let or_default_usize = |value: usize, default: usize| if value == 0 { default } else { value };

        ViewerConfig {
            chunk_size: or_default(self.chunk_size, defaults.chunk_size),
            window_size: or_default(self.window_size, defaults.window_size),
            cache_capacity: or_default_usize(self.cache_capacity, defaults.cache_capacity),
            eviction_buffer: self.eviction_buffer,
            row_cache_capacity: or_default_usize(
                self.row_cache_capacity,
                defaults.row_cache_capacity,
            ),
            overscan_rows: self.overscan_rows,
            show_ascii: self.show_ascii,
            bytes_per_row_override: self.bytes_per_row.filter(|&n| n > 0),
            highlight_duration: match self.highlight_duration_ms {
                0 => defaults.highlight_duration,
                ms => Duration::from_millis(ms),
            },
            font: defaults.font,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/hexview/hexview.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("hexview").join("hexview.log")
    } else {
        PathBuf::from("hexview.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/hexview/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hexview").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `HEXVIEW_CONFIG` environment variable
/// 3. Default path `~/.config/hexview/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        chunk_size: config.chunk_size.unwrap_or(defaults.chunk_size),
        window_size: config.window_size.unwrap_or(defaults.window_size),
        cache_capacity: config.cache_capacity.unwrap_or(defaults.cache_capacity),
        eviction_buffer: config.eviction_buffer.unwrap_or(defaults.eviction_buffer),
        row_cache_capacity: config
            .row_cache_capacity
            .unwrap_or(defaults.row_cache_capacity),
        overscan_rows: config.overscan_rows.unwrap_or(defaults.overscan_rows),
        show_ascii: config.show_ascii.unwrap_or(defaults.show_ascii),
        bytes_per_row: config.bytes_per_row.or(defaults.bytes_per_row),
        highlight_duration_ms: config
            .highlight_duration_ms
            .unwrap_or(defaults.highlight_duration_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `HEXVIEW_BYTES_PER_ROW`: fixed bytes per row (`0` fits the width)
/// - `HEXVIEW_SHOW_ASCII`: `true`/`false`/`1`/`0`
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(BYTES_PER_ROW_ENV) {
        match raw.trim().parse::<u32>() {
            Ok(0) => config.bytes_per_row = None,
            Ok(n) => config.bytes_per_row = Some(n),
            Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", BYTES_PER_ROW_ENV),
        }
    }

    if let Ok(raw) = std::env::var(SHOW_ASCII_ENV) {
        match parse_bool(&raw) {
            Some(show) => config.show_ascii = show,
            None => warn!(value = %raw, "Ignoring {}", SHOW_ASCII_ENV),
        }
    }

    config
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    bytes_per_row_override: Option<u32>,
    no_ascii: bool,
    chunk_size_override: Option<u64>,
) -> ResolvedConfig {
    if let Some(bytes_per_row) = bytes_per_row_override {
        config.bytes_per_row = Some(bytes_per_row);
    }

    if no_ascii {
        config.show_ascii = false;
    }

    if let Some(chunk_size) = chunk_size_override {
        config.chunk_size = chunk_size;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
