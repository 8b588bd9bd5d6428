use crate::adapters::http::HttpFetcher;
use crate::core::calendar::{self, CalendarOptions};
use crate::core::discovery;
use crate::core::extractor;
use crate::core::window::RelevanceWindow;
use crate::core::{ConfigProvider, FeedResult, PageFetcher, Pipeline, ServiceEvent, Storage};
use crate::domain::model::{DetailReference, ListingMode};
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use url::Url;

pub const JSON_FILENAME: &str = "obits.json";
pub const ICS_FILENAME: &str = "calendar.ics";

pub struct IngestionPipeline<S: Storage, C: ConfigProvider, F: PageFetcher = HttpFetcher> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) fetcher: F,
}

impl<S: Storage, C: ConfigProvider> IngestionPipeline<S, C, HttpFetcher> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config)?;
        Ok(Self::with_fetcher(storage, config, fetcher))
    }
}

impl<S: Storage, C: ConfigProvider, F: PageFetcher> IngestionPipeline<S, C, F> {
    pub fn with_fetcher(storage: S, config: C, fetcher: F) -> Self {
        Self {
            storage,
            config,
            fetcher,
        }
    }

    /// Fetches every reference, at most `concurrent_requests` at a time.
    /// Output keeps discovery order; failed or empty pages are dropped.
    async fn extract_details(
        &self,
        listing_url: &Url,
        references: Vec<DetailReference>,
    ) -> Vec<ServiceEvent> {
        let concurrency = self.config.concurrent_requests().max(1);
        let outcomes: Vec<Option<ServiceEvent>> = stream::iter(references)
            .map(|reference| self.extract_reference(listing_url, reference))
            .buffered(concurrency)
            .collect()
            .await;

        outcomes.into_iter().flatten().collect()
    }

    /// Per-reference failures are logged here and never propagate.
    async fn extract_reference(
        &self,
        listing_url: &Url,
        reference: DetailReference,
    ) -> Option<ServiceEvent> {
        let url = match reference.resolve(listing_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("⚠️ Skipping {}: {}", reference.as_str(), e);
                return None;
            }
        };
        match extractor::fetch_event(&self.fetcher, &url).await {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("⚠️ Skipping {}: {}", url, e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: PageFetcher> Pipeline for IngestionPipeline<S, C, F> {
    async fn extract(&self) -> Result<Vec<ServiceEvent>> {
        let listing_url = Url::parse(self.config.listing_url())?;
        tracing::debug!("Fetching listing page: {}", listing_url);

        // Without the listing there is nothing to fall back to.
        let html = self.fetcher.fetch_text(listing_url.as_str()).await?;

        let candidates = match self.config.listing_mode() {
            ListingMode::Cards => discovery::discover_cards(&html, &listing_url),
            ListingMode::Links => {
                let references = discovery::discover_references(&html, self.config.detail_prefix());
                tracing::info!("🔗 Discovered {} detail pages", references.len());
                self.extract_details(&listing_url, references).await
            }
        };

        tracing::info!("📥 Extracted {} candidate services", candidates.len());
        Ok(candidates)
    }

    async fn transform(
        &self,
        candidates: Vec<ServiceEvent>,
        now: NaiveDateTime,
    ) -> Result<FeedResult> {
        let window = RelevanceWindow::days(self.config.window_days());
        let total = candidates.len();
        let events: Vec<ServiceEvent> = candidates
            .into_iter()
            .filter(|event| window.contains(now, event.date_time))
            .collect();
        tracing::info!(
            "📅 {} of {} services fall within the next {} days",
            events.len(),
            total,
            self.config.window_days()
        );

        let options = CalendarOptions::new(self.config.time_zone(), self.config.product_id());
        let json_output = serde_json::to_string(&events)?;
        let ics_output = calendar::render_calendar(&events, &options);

        Ok(FeedResult {
            events,
            json_output,
            ics_output,
        })
    }

    async fn load(&self, result: FeedResult) -> Result<String> {
        tracing::debug!(
            "Writing {} services to {}",
            result.events.len(),
            self.config.output_path()
        );
        self.storage
            .write_file(JSON_FILENAME, result.json_output.as_bytes())
            .await?;
        self.storage
            .write_file(ICS_FILENAME, result.ics_output.as_bytes())
            .await?;
        Ok(self.config.output_path().to_string())
    }
}
