//! In-memory listing and analysis cache.
//!
//! Lists carry a single timestamp and a freshness window. Analyses are
//! memoized per [`AnalysisKey`] and only dropped by a full [`IpoCache::clear`].

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::model::{AnalysisKey, AnalysisRecord, IpoListings};

const MAX_WINDOW_SECS: i64 = 10 * 365 * 24 * 3600;

/// Whether the cached lists can be served as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

#[derive(Debug, Default)]
struct CacheState {
    listings: IpoListings,
    last_updated: Option<DateTime<Utc>>,
    analyses: HashMap<AnalysisKey, AnalysisRecord>,
}

/// Cached lists and when they were scraped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingsSnapshot {
    pub listings: IpoListings,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Process cache. Lock guards are never held across awaits on I/O.
#[derive(Debug)]
pub struct IpoCache {
    state: RwLock<CacheState>,
    window: Duration,
}

impl IpoCache {
    pub fn new(window: Duration) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            window,
        }
    }

    /// Create with a window in seconds, capped at ten years.
    pub fn with_ttl_secs(ttl_secs: u64) -> Self {
        let secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX).min(MAX_WINDOW_SECS);
        Self::new(Duration::seconds(secs))
    }

    /// Stale when never filled or older than the window.
    pub async fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        let state = self.state.read().await;
        match state.last_updated {
            Some(at) if now - at <= self.window => Freshness::Fresh,
            _ => Freshness::Stale,
        }
    }

    pub async fn snapshot(&self) -> ListingsSnapshot {
        let state = self.state.read().await;
        ListingsSnapshot {
            listings: state.listings.clone(),
            last_updated: state.last_updated,
        }
    }

    /// Replace both lists and the timestamp, even when the lists are empty.
    pub async fn store_listings(&self, listings: IpoListings, at: DateTime<Utc>) {
        let mut state = self.state.write().await;
        state.listings = listings;
        state.last_updated = Some(at);
    }

    /// Drop lists, timestamp, and every memoized analysis.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let dropped = state.analyses.len();
        *state = CacheState::default();
        tracing::debug!(dropped_analyses = dropped, "Cache cleared");
    }

    pub async fn analysis(&self, key: &AnalysisKey) -> Option<AnalysisRecord> {
        self.state.read().await.analyses.get(key).cloned()
    }

    /// Store `record` unless the key already holds one; returns the stored record.
    pub async fn remember_analysis(&self, key: AnalysisKey, record: AnalysisRecord) -> AnalysisRecord {
        let mut state = self.state.write().await;
        state.analyses.entry(key).or_insert(record).clone()
    }

    pub async fn analysis_count(&self) -> usize {
        self.state.read().await.analyses.len()
    }
}

impl Default for IpoCache {
    fn default() -> Self {
        Self::with_ttl_secs(3600)
    }
}
