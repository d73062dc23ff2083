//! Configuration for flakestat.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::{FlakestatError, FlakestatResult};

/// Main configuration for flakestat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Chart output settings.
    #[serde(default)]
    pub figures: FiguresConfig,

    /// Experiment result settings.
    #[serde(default)]
    pub results: ResultsConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root, relative to the working directory unless absolute.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// File extension of cache entries.
    #[serde(default = "default_cache_extension")]
    pub extension: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            extension: default_cache_extension(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("__cache__")
}

fn default_cache_extension() -> String {
    "msgpack".to_string()
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiguresConfig {
    /// Directory charts are written to.
    #[serde(default = "default_figures_dir")]
    pub dir: PathBuf,

    /// Chart width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Font size for axis descriptions and legends.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

impl Default for FiguresConfig {
    fn default() -> Self {
        Self {
            dir: default_figures_dir(),
            width: default_width(),
            height: default_height(),
            font_size: default_font_size(),
        }
    }
}

fn default_figures_dir() -> PathBuf {
    PathBuf::from("figures")
}

fn default_width() -> u32 {
    600
}

fn default_height() -> u32 {
    400
}

fn default_font_size() -> u32 {
    15
}

/// Experiment result settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Pattern result files must match (anchored at the start of the name).
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    /// Column holding the TP/FP/FN/TN label of each row.
    #[serde(default = "default_label_column")]
    pub label_column: String,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            file_pattern: default_file_pattern(),
            label_column: default_label_column(),
        }
    }
}

fn default_file_pattern() -> String {
    r"results.*\.csv$".to_string()
}

fn default_label_column() -> String {
    "reporting".to_string()
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> FlakestatResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot: log settings, the result file pattern and
    /// chart dimensions.
    pub fn validate(&self) -> FlakestatResult<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        const FORMATS: [&str; 2] = ["text", "json"];

        if !LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(FlakestatError::config(format!(
                "unknown log_level '{}' (expected one of {})",
                self.general.log_level,
                LEVELS.join(", ")
            )));
        }
        if !FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(FlakestatError::config(format!(
                "unknown log_format '{}' (expected text or json)",
                self.general.log_format
            )));
        }
        if self.cache.extension.is_empty() || self.cache.extension.contains(['/', '\\', '.']) {
            return Err(FlakestatError::config(format!(
                "invalid cache extension '{}'",
                self.cache.extension
            )));
        }
        if self.figures.width == 0 || self.figures.height == 0 {
            return Err(FlakestatError::config("figure width and height must be positive"));
        }
        Regex::new(&self.results.file_pattern)?;
        Ok(())
    }

    /// Saves configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> FlakestatResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Creates default configuration.
    pub fn default_config() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            figures: FiguresConfig::default(),
            results: ResultsConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
