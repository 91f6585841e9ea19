//! Configuration management for jobmesh.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The configuration is built once at
//! startup and handed to the orchestrator, ranker and adapters by value;
//! nothing reads the environment after that.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Smallest enrichment budget that still leaves room for the fallback shape.
const MIN_ENRICHMENT_BYTES: usize = 256;

/// Main application configuration.
///
/// This is loaded from `~/.config/jobmesh/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General application settings
    pub general: GeneralConfig,
    /// Aggregation pipeline settings
    pub aggregation: AggregationConfig,
    /// Relevance ranking settings
    pub ranking: RankingConfig,
    /// Enrichment storage settings
    pub enrichment: EnrichmentConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Source adapter settings
    pub sources: SourcesConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `JOBMESH_DATABASE_PATH`: Override the SQLite database path
    /// - `JOBMESH_BIND_ADDR`: Override the HTTP bind address
    /// - `JOBMESH_BROWSER_ENABLED`: Enable/disable the browser tier (true/false)
    /// - `JOBMESH_HEADLESS`: Override browser headless mode (true/false)
    /// - `JOBMESH_SOURCE_DEFINITIONS_DIR`: Override the source definitions directory
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup function.
    ///
    /// Split out from [`AppConfig::load_with_env`] so the override rules can be
    /// exercised without touching the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("JOBMESH_DATABASE_PATH") {
            tracing::debug!("Override general.database_path from env: {}", val);
            self.general.database_path = PathBuf::from(val);
        }

        if let Some(val) = lookup("JOBMESH_BIND_ADDR") {
            tracing::debug!("Override general.bind_addr from env: {}", val);
            self.general.bind_addr = val;
        }

        if let Some(val) = lookup("JOBMESH_BROWSER_ENABLED") {
            if let Ok(enabled) = val.parse() {
                self.browser.enabled = enabled;
                tracing::debug!("Override browser.enabled from env: {}", enabled);
            }
        }

        if let Some(val) = lookup("JOBMESH_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Some(val) = lookup("JOBMESH_SOURCE_DEFINITIONS_DIR") {
            tracing::debug!("Override sources.definitions_dir from env: {}", val);
            self.sources.definitions_dir = Some(PathBuf::from(val));
        }
    }

    /// Check values that would make the pipeline misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.aggregation.result_cap == 0 {
            return Err(invalid(
                "aggregation.result_cap",
                "must be greater than zero",
            ));
        }
        if self.aggregation.browser_tier_threshold == 0 {
            return Err(invalid(
                "aggregation.browser_tier_threshold",
                "must be greater than zero",
            ));
        }
        if self.aggregation.description_max_chars == 0 {
            return Err(invalid(
                "aggregation.description_max_chars",
                "must be greater than zero",
            ));
        }
        if self.ranking.per_field_limit == 0 {
            return Err(invalid(
                "ranking.per_field_limit",
                "must be greater than zero",
            ));
        }
        if self.ranking.max_per_page == 0 {
            return Err(invalid("ranking.max_per_page", "must be greater than zero"));
        }
        if self.enrichment.max_bytes < MIN_ENRICHMENT_BYTES {
            return Err(invalid(
                "enrichment.max_bytes",
                &format!("must be at least {MIN_ENRICHMENT_BYTES} bytes"),
            ));
        }
        if self.browser.max_cards == 0 {
            return Err(invalid("browser.max_cards", "must be greater than zero"));
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| invalid("config_path", "no parent directory"))?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/jobmesh/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "jobmesh", "jobmesh")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/jobmesh`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "jobmesh", "jobmesh")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// SQLite database file (`:memory:` for an ephemeral store)
    pub database_path: PathBuf,
    /// HTTP bind address for the server shell
    pub bind_addr: String,
    /// Caller-side deadline for a single HTTP request
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("jobmesh.db"),
            bind_addr: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 60,
        }
    }
}

/// Aggregation pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// REST yields below this count trigger the browser tier
    pub browser_tier_threshold: usize,
    /// Maximum number of listings returned per aggregation
    pub result_cap: usize,
    /// Upper bound on a single adapter call
    pub adapter_timeout_secs: u64,
    /// Listing descriptions are truncated to this many characters
    pub description_max_chars: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            browser_tier_threshold: 10,
            result_cap: 30,
            adapter_timeout_secs: 45,
            description_max_chars: 2000,
        }
    }
}

/// Relevance ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Maximum hits fetched per searchable field
    pub per_field_limit: usize,
    /// Upper bound on the page size a caller may request
    pub max_per_page: usize,
    /// Score contributions
    pub weights: RankingWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            per_field_limit: 200,
            max_per_page: 100,
            weights: RankingWeights::default(),
        }
    }
}

/// Score contributions used by the relevance ranker.
///
/// These are hand-tuned and kept configurable rather than fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Whole query appears in the title
    pub exact_title: f64,
    /// Whole query appears in the company name
    pub exact_company: f64,
    /// Whole query appears in the description
    pub exact_description: f64,
    /// Title field matched the field query
    pub field_title: f64,
    /// Company field matched the field query
    pub field_company: f64,
    /// Description field matched the field query
    pub field_description: f64,
    /// Location field matched the field query
    pub field_location: f64,
    /// Three or more fields matched
    pub multi_field_three: f64,
    /// Exactly two fields matched
    pub multi_field_two: f64,
    /// Per query token found in the title
    pub token_title: f64,
    /// Per query token found in the company name
    pub token_company: f64,
    /// Per query token found in the description
    pub token_description: f64,
    /// Title starts with the query
    pub title_prefix: f64,
    /// Listing younger than one day
    pub recency_day: f64,
    /// Listing younger than three days
    pub recency_three_days: f64,
    /// Listing younger than a week
    pub recency_week: f64,
    /// Listing younger than two weeks
    pub recency_two_weeks: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            exact_title: 100.0,
            exact_company: 50.0,
            exact_description: 30.0,
            field_title: 60.0,
            field_company: 40.0,
            field_description: 20.0,
            field_location: 15.0,
            multi_field_three: 50.0,
            multi_field_two: 25.0,
            token_title: 10.0,
            token_company: 6.0,
            token_description: 3.0,
            title_prefix: 40.0,
            recency_day: 30.0,
            recency_three_days: 20.0,
            recency_week: 10.0,
            recency_two_weeks: 5.0,
        }
    }
}

/// Enrichment storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Hard byte budget for a serialized enrichment payload
    pub max_bytes: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { max_bytes: 50_000 }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Launch a browser for the browser tier at all
    pub enabled: bool,
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// How long to wait for a results container to render
    pub results_wait_ms: u64,
    /// Incremental scroll steps used to trigger lazy loading
    pub scroll_steps: u32,
    /// Pause between scroll steps
    pub scroll_delay_ms: u64,
    /// Result cards extracted per page
    pub max_cards: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            results_wait_ms: 10_000,
            scroll_steps: 3,
            scroll_delay_ms: 400,
            max_cards: 15,
        }
    }
}

/// Source adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directory holding source definition TOML files
    pub definitions_dir: Option<PathBuf>,
    /// Timeout for REST adapter requests in seconds
    pub http_timeout_secs: u64,
    /// User agent string for REST adapters
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            definitions_dir: None,
            http_timeout_secs: 15,
            user_agent: "jobmesh/0.1.0 (+https://github.com/jobmesh/jobmesh)".to_string(),
        }
    }
}
