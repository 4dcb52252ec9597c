//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides; command-line
//! flags are applied on top by the binary.

use crate::report::{GradeQuery, ReportFormat};
use crate::sort::SortConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub sort: SortConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Type the identifier column is parsed into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    /// Unsigned integer roll numbers
    #[default]
    Numeric,
    /// Free-form registration codes
    Text,
}

/// Input file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// Optional enrollment/grade file
    pub courses: Option<PathBuf>,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default)]
    pub id_kind: IdKind,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("students.csv")
}

fn default_delimiter() -> char {
    ','
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            courses: None,
            delimiter: default_delimiter(),
            id_kind: IdKind::default(),
        }
    }
}

impl InputConfig {
    /// Delimiter as the single byte the importer splits on
    ///
    /// Only meaningful after [`Config::validate`] has accepted the config.
    pub fn delimiter_byte(&self) -> u8 {
        let mut buf = [0u8; 4];
        self.delimiter.encode_utf8(&mut buf).as_bytes()[0]
    }
}

/// Report configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,

    /// Queries run when none are given on the command line
    #[serde(default)]
    pub queries: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Standard config locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("gradebook").join("config.toml")),
            Some(PathBuf::from("./gradebook.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let loaded = Self::search(&Self::default_paths());
        loaded.log();
        loaded.config
    }

    /// Load the first of `paths` that exists and parses
    ///
    /// Files that exist but fail to load are collected in
    /// [`ConfigSearch::skipped`] rather than logged, so a caller that has not
    /// installed a subscriber yet can report them later. With no usable file
    /// the result is the environment-only config.
    pub fn search(paths: &[PathBuf]) -> ConfigSearch {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return ConfigSearch {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        ConfigSearch {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Input overrides
        if let Some(path) = lookup("GRADEBOOK_INPUT") {
            self.input.path = PathBuf::from(path);
        }
        if let Some(path) = lookup("GRADEBOOK_COURSES") {
            self.input.courses = Some(PathBuf::from(path));
        }

        // Sort overrides
        if let Some(workers) = lookup("GRADEBOOK_WORKERS") {
            match workers.parse() {
                Ok(w) => self.sort.workers = w,
                Err(_) => tracing::warn!("Ignoring invalid GRADEBOOK_WORKERS={:?}", workers),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("GRADEBOOK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GRADEBOOK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Check values that deserialize fine but cannot be run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sort.workers == 0 {
            return Err(ConfigError::Invalid(
                "sort.workers must be at least 1".to_string(),
            ));
        }

        let delimiter = self.input.delimiter;
        if !delimiter.is_ascii() || delimiter == '\n' || delimiter == '\r' {
            return Err(ConfigError::Invalid(format!(
                "input.delimiter must be a single ASCII character other than a line break, got {:?}",
                delimiter
            )));
        }

        for query in &self.report.queries {
            query
                .parse::<GradeQuery>()
                .map_err(|e| ConfigError::Invalid(format!("report.queries: {}", e)))?;
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                other
            ))),
        }
    }
}

/// Outcome of [`Config::search`]
#[derive(Debug)]
pub struct ConfigSearch {
    pub config: Config,
    /// File the config was read from; `None` for environment-only
    pub source: Option<PathBuf>,
    /// Files that exist but could not be loaded, in search order
    pub skipped: Vec<ConfigError>,
}

impl ConfigSearch {
    /// Report the search through `tracing`
    pub fn log(&self) {
        for e in &self.skipped {
            tracing::warn!("Skipped config file: {}", e);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parse a delimiter given on the command line
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("Delimiter must be exactly one character, got {:?}", s)),
    }
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Gradebook Configuration
#
# Environment variables override these settings:
# - GRADEBOOK_INPUT
# - GRADEBOOK_COURSES
# - GRADEBOOK_WORKERS
# - GRADEBOOK_LOG_LEVEL
# - GRADEBOOK_LOG_FORMAT
#
# Command-line flags override both.

[input]
# Student file: name, identifier, category, year
path = "students.csv"

# Optional course file: identifier, course[, grade]
# courses = "courses.csv"

# Single-character field delimiter (no quoting)
delimiter = ","

# Identifier type: numeric or text
id_kind = "numeric"

[sort]
# Worker threads per sort
workers = 2

[report]
# Listing format: table, json or csv
format = "table"

# Queries to run when none are given on the command line (COURSE:GRADE)
queries = []

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
