pub mod toml_config;

use crate::core::calendar::{DEFAULT_PRODUCT_ID, DEFAULT_TIME_ZONE};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::*;

pub const DEFAULT_LISTING_URL: &str =
    "https://www.shannonfuneralhome.com/obituaries/obituary-listings?page=1";
pub const DEFAULT_DETAIL_PREFIX: &str = "/obituary/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Checks shared by every configuration source.
pub(crate) fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_url("listing_url", config.listing_url())?;
    validate_detail_prefix("detail_prefix", config.detail_prefix())?;
    validate_non_empty_string("user_agent", config.user_agent())?;
    validate_range("timeout_seconds", config.timeout_seconds(), 1, 120)?;
    validate_range("retry_attempts", config.retry_attempts(), 0, 5)?;
    validate_range("concurrent_requests", config.concurrent_requests(), 1, 32)?;
    validate_range("window_days", config.window_days(), 1, 365)?;
    validate_time_zone("time_zone", config.time_zone())?;
    validate_non_empty_string("product_id", config.product_id())?;
    if let Some(feed_url) = config.feed_url() {
        validate_url("feed_url", feed_url)?;
    }
    validate_socket_addr("bind", config.bind_address())?;
    validate_path("output_path", config.output_path())?;
    Ok(())
}

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use crate::core::window::DEFAULT_WINDOW_DAYS;
    use crate::domain::model::ListingMode;
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "obit-feed")]
    #[command(about = "Republish a funeral home's upcoming services as JSON and iCalendar feeds")]
    pub struct CliConfig {
        /// Read settings from a TOML file instead of the flags below
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long, env = "OBIT_LISTING_URL", default_value = DEFAULT_LISTING_URL)]
        pub listing_url: String,

        /// Path prefix that marks a link as an obituary detail page
        #[arg(long, default_value = DEFAULT_DETAIL_PREFIX)]
        pub detail_prefix: String,

        #[arg(long, value_enum, default_value_t = ListingMode::Links)]
        pub listing_mode: ListingMode,

        #[arg(long, default_value = DEFAULT_USER_AGENT)]
        pub user_agent: String,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
        pub timeout_seconds: u64,

        #[arg(long, default_value_t = DEFAULT_RETRY_ATTEMPTS)]
        pub retry_attempts: u32,

        #[arg(long, default_value_t = DEFAULT_CONCURRENT_REQUESTS)]
        pub concurrent_requests: usize,

        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        pub window_days: u32,

        #[arg(long, default_value = DEFAULT_TIME_ZONE)]
        pub time_zone: String,

        #[arg(long, default_value = DEFAULT_PRODUCT_ID, allow_hyphen_values = true)]
        pub product_id: String,

        /// Build the calendar from this published JSON feed instead of in-process
        #[arg(long, env = "OBIT_FEED_URL")]
        pub feed_url: Option<String>,

        #[arg(long, env = "OBIT_BIND", default_value = DEFAULT_BIND_ADDRESS)]
        pub bind: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
        pub output_path: String,

        /// Write obits.json and calendar.ics to the output path and exit
        #[arg(long)]
        pub export: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log as JSON lines")]
        pub log_json: bool,
    }

    impl ConfigProvider for CliConfig {
        fn listing_url(&self) -> &str {
            &self.listing_url
        }

        fn detail_prefix(&self) -> &str {
            &self.detail_prefix
        }

        fn listing_mode(&self) -> ListingMode {
            self.listing_mode
        }

        fn user_agent(&self) -> &str {
            &self.user_agent
        }

        fn timeout_seconds(&self) -> u64 {
            self.timeout_seconds
        }

        fn retry_attempts(&self) -> u32 {
            self.retry_attempts
        }

        fn concurrent_requests(&self) -> usize {
            self.concurrent_requests
        }

        fn window_days(&self) -> u32 {
            self.window_days
        }

        fn time_zone(&self) -> &str {
            &self.time_zone
        }

        fn product_id(&self) -> &str {
            &self.product_id
        }

        fn feed_url(&self) -> Option<&str> {
            self.feed_url.as_deref()
        }

        fn bind_address(&self) -> &str {
            &self.bind
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)?;
            tracing::debug!("✅ CLI configuration validation passed");
            Ok(())
        }
    }

}
