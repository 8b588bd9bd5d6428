pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::HttpFetcher, storage::LocalStorage};
pub use config::toml_config::TomlConfig;
pub use core::{etl::EtlEngine, pipeline::IngestionPipeline};
pub use domain::model::{DetailReference, FeedEntry, ListingMode, RecognizedDate, ServiceEvent};
pub use utils::error::{FeedError, Result};
