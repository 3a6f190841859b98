//! The scrape, extract, summarize pipeline behind every endpoint.

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::analysis::build_prompt;
use crate::cache::{Freshness, IpoCache, ListingsSnapshot};
use crate::error::{DeskError, DeskResult};
use crate::llm::Summarizer;
use crate::model::{AnalysisKey, AnalysisRecord, IpoKind, IpoListing, IpoListings};
use crate::render::{Renderer, WaitFor};
use crate::scrape::{aggregate_sections, extract_listings, MAINBOARD_HEADING, MAINBOARD_HEADING_TAG};
use ipo_common::logging::generate_trace_id;
use ipo_common::Config;

/// Where and how to scrape.
#[derive(Debug, Clone)]
pub struct DeskSettings {
    pub dashboard_url: String,
    pub site_base_url: String,
    pub detail_container_id: String,
    pub render_timeout: Duration,
}

impl DeskSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dashboard_url: config.scraper.dashboard_url(),
            site_base_url: config.scraper.base_url.clone(),
            detail_container_id: config.scraper.detail_container_id.clone(),
            render_timeout: Duration::from_secs(config.scraper.render_timeout_secs),
        }
    }
}

impl Default for DeskSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Owns the cache and the two external collaborators.
pub struct IpoDesk {
    renderer: Arc<dyn Renderer>,
    summarizer: Arc<dyn Summarizer>,
    cache: IpoCache,
    settings: DeskSettings,
}

impl IpoDesk {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        summarizer: Arc<dyn Summarizer>,
        cache: IpoCache,
        settings: DeskSettings,
    ) -> Self {
        Self {
            renderer,
            summarizer,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &IpoCache {
        &self.cache
    }

    /// Current lists, re-scraping first when the cache is stale.
    pub async fn listings(&self) -> ListingsSnapshot {
        if self.cache.freshness(Utc::now()).await == Freshness::Stale {
            tracing::info!("IPO cache stale, scraping dashboard");
            let listings = self.scrape_dashboard().await;
            self.cache.store_listings(listings, Utc::now()).await;
        }
        self.cache.snapshot().await
    }

    /// Drop everything cached, then scrape the dashboard again.
    pub async fn refresh(&self) -> IpoListings {
        self.cache.clear().await;
        let listings = self.scrape_dashboard().await;
        self.cache.store_listings(listings.clone(), Utc::now()).await;
        tracing::info!(total = listings.total(), "IPO data refreshed");
        listings
    }

    /// Render and parse the dashboard. Render failures yield empty lists.
    pub async fn scrape_dashboard(&self) -> IpoListings {
        let url = &self.settings.dashboard_url;
        let wait = WaitFor::text_in_tag(MAINBOARD_HEADING_TAG, MAINBOARD_HEADING);
        let started = Instant::now();

        let html = match self
            .renderer
            .render(url, &wait, self.settings.render_timeout)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Dashboard scrape failed");
                return IpoListings::default();
            }
        };

        let listings = extract_listings(&html, &self.settings.site_base_url);

        tracing::info!(
            current = listings.current.len(),
            upcoming = listings.upcoming.len(),
            first_current = first_name(&listings.current),
            first_upcoming = first_name(&listings.upcoming),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dashboard scraped"
        );

        listings
    }

    /// Analysis for the IPO at `index` in the `kind` list, memoized.
    pub async fn analyze(&self, kind: IpoKind, index: usize) -> DeskResult<AnalysisRecord> {
        let snapshot = self.listings().await;
        let ipo = snapshot
            .listings
            .of(kind)
            .get(index)
            .cloned()
            .ok_or(DeskError::IndexOutOfRange { kind })?;

        let key = AnalysisKey::new(kind, index, ipo.name.clone());
        if let Some(record) = self.cache.analysis(&key).await {
            tracing::debug!(key = %key, "Analysis cache hit");
            return Ok(record);
        }

        let span = tracing::info_span!(
            "analyze",
            trace_id = %generate_trace_id(),
            kind = %kind,
            index,
            name = %ipo.name
        );

        async {
            let record = self.run_pipeline(kind, ipo).await?;
            Ok::<_, DeskError>(self.cache.remember_analysis(key, record).await)
        }
        .instrument(span)
        .await
    }

    async fn run_pipeline(&self, kind: IpoKind, ipo: IpoListing) -> DeskResult<AnalysisRecord> {
        let started = Instant::now();
        let wait = WaitFor::element_id(&self.settings.detail_container_id);

        let html = self
            .renderer
            .render(&ipo.url, &wait, self.settings.render_timeout)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::warn!(url = %ipo.url, "Detail page not ready; no report yet?");
                    DeskError::DetailUnavailable
                } else {
                    DeskError::Render(e)
                }
            })?;

        let aggregated = aggregate_sections(&html, &self.settings.detail_container_id)
            .filter(|text| !text.is_empty())
            .ok_or(DeskError::DetailUnparsable)?;

        tracing::debug!(chars = aggregated.len(), "Detail page aggregated");

        let analysis = self
            .summarizer
            .summarize(&build_prompt(&aggregated))
            .await
            .map_err(|e| {
                tracing::error!(summarizer = self.summarizer.name(), error = %e, "Summarizer failed");
                DeskError::from(e)
            })?;

        let record = AnalysisRecord::new(ipo, kind, analysis);
        tracing::info!(
            sections = record.sections.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(record)
    }
}

fn first_name(list: &[IpoListing]) -> &str {
    list.first().map_or("-", |ipo| ipo.name.as_str())
}
