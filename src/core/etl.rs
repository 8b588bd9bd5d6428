use crate::core::{FeedResult, Pipeline};
use crate::utils::error::Result;
use chrono::{Local, NaiveDateTime};
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract and transform against the local wall clock, read once.
    pub async fn collect(&self) -> Result<FeedResult> {
        self.collect_at(Local::now().naive_local()).await
    }

    pub async fn collect_at(&self, now: NaiveDateTime) -> Result<FeedResult> {
        let started = Instant::now();

        let candidates = self.pipeline.extract().await?;
        let result = self.pipeline.transform(candidates, now).await?;

        tracing::info!(
            "✅ Collected {} upcoming services in {:?}",
            result.events.len(),
            started.elapsed()
        );
        Ok(result)
    }

    /// Collects and then writes the feeds through the pipeline's storage.
    pub async fn run(&self) -> Result<String> {
        let result = self.collect().await?;
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("📁 Feeds saved to: {}", output_path);
        Ok(output_path)
    }
}
