// =============================================================================
// Central Application State — Bullion Lens
// =============================================================================
//
// Holds the store, the analysis settings and the in-memory snapshot cache.
// Handlers share it through `Arc<AppState>`.
//
// Thread safety:
//   - parking_lot::RwLock guards the published snapshot (never held across
//     an await point).
//   - tokio::sync::Mutex serialises refreshes so only one caller runs the
//     pipeline at a time. Callers that find a refresh in flight return the
//     stale snapshot when one exists; otherwise they wait and reuse the
//     outcome (success or failure) instead of refreshing again.
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::analysis::{run_pipeline, AnalysisSettings, AnalysisSnapshot};
use crate::error::PipelineError;
use crate::market_data::SeriesStore;
use crate::runtime_config::RuntimeConfig;

// =============================================================================
// AnalysisCache
// =============================================================================

struct Published {
    snapshot: Arc<AnalysisSnapshot>,
    refreshed_at: Instant,
}

/// Time-bounded holder for the latest snapshot with single-flight refresh.
pub struct AnalysisCache {
    published: RwLock<Option<Published>>,
    refresh_gate: tokio::sync::Mutex<()>,
    last_failure: RwLock<Option<Instant>>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            published: RwLock::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
            last_failure: RwLock::new(None),
            ttl,
        }
    }

    /// The published snapshot regardless of age.
    pub fn current(&self) -> Option<Arc<AnalysisSnapshot>> {
        self.published.read().as_ref().map(|p| p.snapshot.clone())
    }

    /// When the published snapshot was built, if any.
    pub fn last_refreshed(&self) -> Option<Instant> {
        self.published.read().as_ref().map(|p| p.refreshed_at)
    }

    fn fresh(&self) -> Option<Arc<AnalysisSnapshot>> {
        let guard = self.published.read();
        guard
            .as_ref()
            .filter(|p| p.refreshed_at.elapsed() <= self.ttl)
            .map(|p| p.snapshot.clone())
    }

    /// Return a fresh snapshot, running `refresh` if the cached one is
    /// missing or stale. When the refresh fails the previous snapshot (if
    /// any) is returned unchanged.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Option<Arc<AnalysisSnapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AnalysisSnapshot, PipelineError>>,
    {
        if let Some(snapshot) = self.fresh() {
            return Some(snapshot);
        }

        let arrived = Instant::now();
        let _gate = match self.refresh_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                if let Some(stale) = self.current() {
                    debug!("refresh in flight, serving stale snapshot");
                    return Some(stale);
                }
                self.refresh_gate.lock().await
            }
        };
        // Another caller may have refreshed while we waited.
        if let Some(snapshot) = self.fresh() {
            return Some(snapshot);
        }
        // A refresh that failed while we waited stands for this call too.
        if self.last_failure.read().is_some_and(|failed| failed >= arrived) {
            return self.current();
        }

        match refresh().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.published.write() = Some(Published {
                    snapshot: snapshot.clone(),
                    refreshed_at: Instant::now(),
                });
                *self.last_failure.write() = None;
                info!("analysis snapshot refreshed");
                Some(snapshot)
            }
            Err(e) => {
                *self.last_failure.write() = Some(Instant::now());
                let stale = self.current();
                warn!(
                    error = %e,
                    serving_stale = stale.is_some(),
                    "analysis refresh failed"
                );
                stale
            }
        }
    }
}

// =============================================================================
// AppState
// =============================================================================

pub struct AppState {
    pub store: SeriesStore,
    pub settings: AnalysisSettings,
    pub analysis: AnalysisCache,
    /// Instant when the server was started. Used for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SeriesStore, config: &RuntimeConfig) -> Self {
        Self {
            store,
            settings: AnalysisSettings::from(config),
            analysis: AnalysisCache::new(config.snapshot_ttl()),
            start_time: Instant::now(),
        }
    }

    /// Latest snapshot, refreshing through the pipeline when stale.
    pub async fn snapshot(&self) -> Option<Arc<AnalysisSnapshot>> {
        self.analysis
            .get_or_refresh(|| run_pipeline(&self.store, &self.settings))
            .await
    }
}
