use crate::domain::model::{FeedResult, ListingMode, ServiceEvent};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Fetches a page body. Non-success statuses and timeouts are errors.
pub trait PageFetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn listing_url(&self) -> &str;
    fn detail_prefix(&self) -> &str;
    fn listing_mode(&self) -> ListingMode;
    fn user_agent(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn retry_attempts(&self) -> u32;
    fn concurrent_requests(&self) -> usize;
    fn window_days(&self) -> u32;
    fn time_zone(&self) -> &str;
    fn product_id(&self) -> &str;
    fn feed_url(&self) -> Option<&str>;
    fn bind_address(&self) -> &str;
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Collects candidate events from the listing source, before windowing.
    async fn extract(&self) -> Result<Vec<ServiceEvent>>;
    async fn transform(&self, candidates: Vec<ServiceEvent>, now: NaiveDateTime)
        -> Result<FeedResult>;
    async fn load(&self, result: FeedResult) -> Result<String>;
}
