//! # Configuration
//!
//! Settings resolve through one override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `<config dir>/listly/config.toml`. If missing on first
//! run, a commented-out default is generated so users can discover all
//! options.
//!
//! The key-binding file has one extra source: a path remembered in the
//! store with `listly kmap set`. It ranks below the CLI flag and the
//! environment but above the config file.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListlyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
    pub keymap_file: Option<String>,
    pub log_level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const APP_DIR: &str = "listly";
pub const LOG_FILE: &str = "listly.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

pub const ENV_DATA_DIR: &str = "LISTLY_DATA_DIR";
pub const ENV_KEYMAP: &str = "LISTLY_KEYMAP";
pub const ENV_LOG: &str = "LISTLY_LOG";

/// `<config dir>/listly`, home of the database and the log.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_dir: PathBuf,
    pub keymap_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl ResolvedConfig {
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub keymap: Option<PathBuf>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `<config dir>/listly/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Load the config file, generating a commented default when absent.
pub fn load_config() -> Result<ListlyConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine config directory, using default config");
            Ok(ListlyConfig::default())
        }
    }
}

/// If the file doesn't exist, generates a commented-out default and
/// returns `ListlyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<ListlyConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(ListlyConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ListlyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# listly configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# data_dir = "/home/me/.local/share/listly"   # Or set LISTLY_DATA_DIR
# keymap_file = "/home/me/listly-keys.toml"   # Or LISTLY_KEYMAP, --keymap, `listly kmap set`
# log_level = "info"                          # "error", "warn", "info", "debug", "trace", "off"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve against the process environment.
pub fn resolve(
    config: &ListlyConfig,
    cli: &CliOverrides,
    stored_keymap: Option<&Path>,
) -> ResolvedConfig {
    resolve_with_env(config, cli, stored_keymap, |key| std::env::var(key).ok())
}

pub fn resolve_with_env(
    config: &ListlyConfig,
    cli: &CliOverrides,
    stored_keymap: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Data dir: CLI → env → config → default
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| env(ENV_DATA_DIR).map(PathBuf::from))
        .or_else(|| config.general.data_dir.as_ref().map(PathBuf::from))
        .or_else(default_data_dir)
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR));

    // Key bindings: CLI → env → stored → config
    let keymap_file = cli
        .keymap
        .clone()
        .or_else(|| env(ENV_KEYMAP).map(PathBuf::from))
        .or_else(|| stored_keymap.map(Path::to_path_buf))
        .or_else(|| config.general.keymap_file.as_ref().map(PathBuf::from));

    // Log level: env → config → default
    let log_level = env(ENV_LOG)
        .or_else(|| config.general.log_level.clone())
        .map(|s| parse_level(&s))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        data_dir,
        keymap_file,
        log_level,
    }
}

fn parse_level(s: &str) -> LevelFilter {
    LevelFilter::from_str(s).unwrap_or_else(|_| {
        warn!("Unknown log level {:?}, using {}", s, DEFAULT_LOG_LEVEL);
        DEFAULT_LOG_LEVEL
    })
}
