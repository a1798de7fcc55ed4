//! Configuration
//!
//! Resolution order, later wins:
//! - Runtime defaults
//! - The first config file found (`cdn-usage-charts.toml`,
//!   `.cdn-usage-charts.toml`, then `<config dir>/cdn-usage-charts/config.toml`)
//! - Environment variables
//! - Command line flags (applied by `main`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::ranking::DEFAULT_TOP_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Usage store location and table names
    pub database: DatabaseConfig,

    /// Chart output configuration
    pub charts: ChartsConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub usage_table: String,
    pub totals_table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub top_limit: usize,
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data.db"),
            usage_table: "data".to_string(),
            totals_table: "totals".to_string(),
        }
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            top_limit: DEFAULT_TOP_LIMIT,
            output_dir: PathBuf::from("."),
            width: 1400,
            height: 900,
            title_prefix: "cdnjs".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from("logs"),
        }
    }
}

impl ChartsConfig {
    pub fn ranking_title(&self) -> String {
        format!("{} Top {} Resources", self.title_prefix, self.top_limit)
    }

    pub fn totals_title(&self) -> String {
        format!("{} Requests and Bandwidth", self.title_prefix)
    }

    pub fn ranking_output(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_top_{}_resources.png",
            file_stem(&self.title_prefix),
            self.top_limit
        ))
    }

    pub fn totals_output(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_requests_and_bandwidth.png",
            file_stem(&self.title_prefix)
        ))
    }
}

fn file_stem(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("cdn-usage-charts.toml"),
            PathBuf::from(".cdn-usage-charts.toml"),
            dirs::config_dir()
                .map(|d| d.join("cdn-usage-charts").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("CDN_USAGE_DB_PATH") {
            self.database.path = PathBuf::from(val);
        }

        // Chart overrides
        if let Ok(val) = env::var("CDN_USAGE_TOP_LIMIT") {
            self.charts.top_limit = val.parse().context("Invalid CDN_USAGE_TOP_LIMIT")?;
        }
        if let Ok(val) = env::var("CDN_USAGE_OUTPUT_DIR") {
            self.charts.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = env::var("CDN_USAGE_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.charts.top_limit == 0 {
            return Err(anyhow::anyhow!("Top limit must be greater than 0"));
        }

        if self.charts.top_limit > 20 {
            warn!(
                top_limit = self.charts.top_limit,
                "Large top limit, the ranking chart legend may be unreadable"
            );
        }

        if self.charts.width < 200 || self.charts.height < 200 {
            return Err(anyhow::anyhow!(
                "Chart size must be at least 200x200, got {}x{}",
                self.charts.width,
                self.charts.height
            ));
        }

        for (name, table) in [
            ("usage_table", &self.database.usage_table),
            ("totals_table", &self.database.totals_table),
        ] {
            if !is_identifier(table) {
                return Err(anyhow::anyhow!(
                    "database.{} must be a plain SQL identifier, got {:?}",
                    name,
                    table
                ));
            }
        }

        if !matches!(self.logging.output.as_str(), "console" | "file" | "both") {
            return Err(anyhow::anyhow!(
                "Log output must be one of console, file, both; got {:?}",
                self.logging.output
            ));
        }

        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Install the resolved configuration for the rest of the process. A second
/// call keeps the first configuration.
pub fn init_config(config: Config) -> &'static Config {
    CONFIG.get_or_init(|| config)
}
