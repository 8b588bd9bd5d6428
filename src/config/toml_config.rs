use crate::config::{
    validate_provider, DEFAULT_BIND_ADDRESS, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_DETAIL_PREFIX,
    DEFAULT_LISTING_URL, DEFAULT_OUTPUT_PATH, DEFAULT_RETRY_ATTEMPTS, DEFAULT_TIMEOUT_SECONDS,
    DEFAULT_USER_AGENT,
};
use crate::core::calendar::{DEFAULT_PRODUCT_ID, DEFAULT_TIME_ZONE};
use crate::core::window::DEFAULT_WINDOW_DAYS;
use crate::core::ConfigProvider;
use crate::domain::model::ListingMode;
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File-based settings. Every section and key is optional and falls back to
/// the same defaults as the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub feed: FeedConfig,
    pub server: ServerConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub listing_url: String,
    pub detail_prefix: String,
    pub mode: ListingMode,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub concurrent_requests: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            detail_prefix: DEFAULT_DETAIL_PREFIX.to_string(),
            mode: ListingMode::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub window_days: u32,
    pub time_zone: String,
    pub product_id: String,
    /// When set, the calendar is rebuilt from this JSON feed.
    pub remote_feed_url: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            remote_feed_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FeedError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FeedError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn listing_url(&self) -> &str {
        &self.source.listing_url
    }

    fn detail_prefix(&self) -> &str {
        &self.source.detail_prefix
    }

    fn listing_mode(&self) -> ListingMode {
        self.source.mode
    }

    fn user_agent(&self) -> &str {
        &self.source.user_agent
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts
    }

    fn concurrent_requests(&self) -> usize {
        self.source.concurrent_requests
    }

    fn window_days(&self) -> u32 {
        self.feed.window_days
    }

    fn time_zone(&self) -> &str {
        &self.feed.time_zone
    }

    fn product_id(&self) -> &str {
        &self.feed.product_id
    }

    fn feed_url(&self) -> Option<&str> {
        self.feed.remote_feed_url.as_deref()
    }

    fn bind_address(&self) -> &str {
        &self.server.bind
    }

    fn output_path(&self) -> &str {
        &self.export.output_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;
        tracing::debug!("✅ TOML configuration validation passed");
        Ok(())
    }
}
