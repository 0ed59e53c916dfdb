//! Configuration management.
//!
//! Settings are read from a TOML file and can be overridden with
//! `PROQUEST_RESULTS_<SECTION>__<KEY>` environment variables.
//!
//! # Configuration File Format
//!
//! ```toml
//! [parse]
//! stopfiles = [".DS_Store"]
//! keep_raw = false
//! parallel = false
//!
//! [output]
//! source_directory = "search_results"
//! savefile = "results.csv"
//! remove_duplicates = true
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PROQUEST_RESULTS";

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "proquest-results.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document parsing and directory scanning
    #[serde(default)]
    pub parse: ParseOptions,

    /// Export settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Options handed to documents and result sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// File names skipped when scanning a directory (exact, case-sensitive)
    #[serde(default = "default_stopfiles")]
    pub stopfiles: Vec<String>,

    /// Keep the raw document text after parsing
    ///
    /// Only standalone documents keep it; a result set drops it after extraction.
    #[serde(default)]
    pub keep_raw: bool,

    /// Parse independent documents on a worker pool
    #[serde(default)]
    pub parallel: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            stopfiles: default_stopfiles(),
            keep_raw: false,
            parallel: false,
        }
    }
}

impl ParseOptions {
    /// Replace the block-listed file names
    pub fn stopfiles<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopfiles = names.into_iter().map(Into::into).collect();
        self
    }

    /// Keep the raw document text in memory
    pub fn keep_raw(mut self, keep: bool) -> Self {
        self.keep_raw = keep;
        self
    }

    /// Parse documents in parallel
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether a file name is block-listed
    pub fn is_stopfile(&self, name: &OsStr) -> bool {
        self.stopfiles.iter().any(|s| OsStr::new(s) == name)
    }
}

fn default_stopfiles() -> Vec<String> {
    vec![".DS_Store".to_string()]
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory scanned when no inputs are given
    #[serde(default = "default_source_directory")]
    pub source_directory: PathBuf,

    /// Save-file template, a timestamp is appended to its stem
    #[serde(default = "default_savefile")]
    pub savefile: PathBuf,

    /// Drop exact duplicate rows before writing
    #[serde(default = "default_true")]
    pub remove_duplicates: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            source_directory: default_source_directory(),
            savefile: default_savefile(),
            remove_duplicates: true,
        }
    }
}

fn default_source_directory() -> PathBuf {
    PathBuf::from("search_results")
}

fn default_savefile() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_true() -> bool {
    true
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Serialize the configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from environment overrides and defaults
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(environment())
        .build()?
        .try_deserialize()
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("parse.stopfiles")
}

/// Find a configuration file in the default locations
///
/// Looks for `proquest-results.toml` in the working directory, then for
/// `proquest-results/config.toml` in the platform config directory.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("proquest-results").join("config.toml"))
        .filter(|path| path.is_file())
}
