//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.minutes-chat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::session::InFlightPolicy;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MinutesConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub meeting_id: Option<String>,
    pub in_flight: Option<InFlightPolicy>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_LOG_FILE: &str = "minutes-chat.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub meeting_id: Option<String>,
    pub in_flight: InFlightPolicy,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    /// A configured level that did not parse, reported once logging is up.
    pub rejected_log_level: Option<String>,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub meeting_id: Option<String>,
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

/// Returns the path to `~/.minutes-chat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".minutes-chat").join("config.toml"))
}

/// Where the file layer of the config came from.
///
/// Loading happens before the logger exists, so the outcome is returned and
/// logged by the caller once logging is up.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Generated(PathBuf),
    GenerateFailed { path: PathBuf, error: std::io::Error },
    NoHomeDir,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Generated(path) => {
                info!("No config file found, generated default at {}", path.display())
            }
            ConfigSource::GenerateFailed { path, error } => warn!(
                "No config file found, could not write default to {}: {}",
                path.display(),
                error
            ),
            ConfigSource::NoHomeDir => {
                warn!("Could not determine home directory, using default config")
            }
        }
    }
}

/// Load config from `explicit` if given, else `~/.minutes-chat/config.toml`.
///
/// A missing default file is generated (commented out) and yields
/// `MinutesConfig::default()`. A missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<(MinutesConfig, ConfigSource), ConfigError> {
    match explicit {
        Some(path) => load_from(path, false),
        None => match config_path() {
            Some(path) => load_from(&path, true),
            None => Ok((MinutesConfig::default(), ConfigSource::NoHomeDir)),
        },
    }
}

fn load_from(
    path: &Path,
    generate_if_missing: bool,
) -> Result<(MinutesConfig, ConfigSource), ConfigError> {
    if generate_if_missing && !path.exists() {
        let source = match generate_default_config(path) {
            Ok(()) => ConfigSource::Generated(path.to_path_buf()),
            Err(error) => ConfigSource::GenerateFailed {
                path: path.to_path_buf(),
                error,
            },
        };
        return Ok((MinutesConfig::default(), source));
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    debug!("Config: {:?}", config);
    Ok((config, ConfigSource::File(path.to_path_buf())))
}

pub fn parse_config(contents: &str) -> Result<MinutesConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

const DEFAULT_CONFIG: &str = r#"# minutes-chat configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:5000"   # Or set MINUTES_BASE_URL

# [chat]
# meeting_id = "1"                     # Or set MINUTES_MEETING_ID / --meeting
# in_flight = "single"                 # "single" or "overlap"

# [logging]
# level = "debug"                      # Or set MINUTES_LOG_LEVEL
# file = "minutes-chat.log"
"#;

/// Writes the commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &MinutesConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &MinutesConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env("MINUTES_BASE_URL"))
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Meeting: CLI → env → config → none
    let meeting_id = cli
        .meeting_id
        .clone()
        .or_else(|| env("MINUTES_MEETING_ID"))
        .or_else(|| config.chat.meeting_id.clone())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    // Log level: env → config → default
    let mut rejected_log_level = None;
    let log_level = env("MINUTES_LOG_LEVEL")
        .or_else(|| config.logging.level.clone())
        .and_then(|level| match level.parse::<LevelFilter>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                rejected_log_level = Some(level);
                None
            }
        })
        .unwrap_or(DEFAULT_LOG_LEVEL);

    let log_file = config
        .logging
        .file
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    ResolvedConfig {
        base_url,
        meeting_id,
        in_flight: config.chat.in_flight.unwrap_or_default(),
        log_level,
        log_file,
        rejected_log_level,
    }
}

impl ResolvedConfig {
    /// Logs settings that fell back to defaults during resolution.
    pub fn log_fallbacks(&self) {
        if let Some(level) = &self.rejected_log_level {
            warn!("Unknown log level '{}', using {}", level, self.log_level);
        }
    }
}
