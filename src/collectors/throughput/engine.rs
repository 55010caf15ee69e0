//! Throughput sampling engine
//!
//! Runs one sample cycle per trigger: enumerate adapters, select the primary
//! one, read its counters and fold them into the shared `SampleState`. Every
//! failure along the way degrades to a zero reading; nothing propagates to the
//! caller.

use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::collectors::adapters::{AdapterCatalog, AdapterDescriptor, AdapterId};
use crate::collectors::throughput::sampler::{CounterReading, RateSampler, SampleState, ThroughputRate};
use crate::collectors::throughput::selector::AdapterSelector;

/// Outcome of one sample cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleReport {
    pub rate: ThroughputRate,
    /// Adapter whose counters were read this cycle; `None` when the cycle had no reading
    pub adapter: Option<AdapterId>,
}

/// Periodic throughput sampler for the primary adapter
pub struct ThroughputEngine {
    catalog: Arc<dyn AdapterCatalog>,
    selector: AdapterSelector,
    sampler: RateSampler,
    /// At most one cycle reads or writes the state at a time
    state: Mutex<SampleState>,
}

impl ThroughputEngine {
    /// Creates an engine with the default selector and sampler
    pub fn new(catalog: Arc<dyn AdapterCatalog>) -> Self {
        Self::with_components(catalog, AdapterSelector::default(), RateSampler::default())
    }

    pub fn with_components(
        catalog: Arc<dyn AdapterCatalog>,
        selector: AdapterSelector,
        sampler: RateSampler,
    ) -> Self {
        Self {
            catalog,
            selector,
            sampler,
            state: Mutex::new(SampleState::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<dyn AdapterCatalog> {
        &self.catalog
    }

    pub fn selector(&self) -> &AdapterSelector {
        &self.selector
    }

    /// Runs one sample cycle, waiting for any cycle already in flight
    pub async fn sample_once(&self) -> ThroughputRate {
        self.sample_once_detailed().await.rate
    }

    /// Like `sample_once`, also naming the adapter that was read
    pub async fn sample_once_detailed(&self) -> SampleReport {
        let mut state = self.state.lock().await;
        self.run_cycle(&mut state).await
    }

    /// Runs one sample cycle unless another is in flight, in which case the
    /// tick is skipped and `None` returned
    pub async fn try_sample_once(&self) -> Option<ThroughputRate> {
        self.try_sample_once_detailed().await.map(|report| report.rate)
    }

    pub async fn try_sample_once_detailed(&self) -> Option<SampleReport> {
        let Ok(mut state) = self.state.try_lock() else {
            debug!("Sample cycle already in flight, skipping tick");
            return None;
        };
        Some(self.run_cycle(&mut state).await)
    }

    /// Enumerates adapters and returns the one the selector would pick
    pub async fn primary_adapter(&self) -> Option<AdapterDescriptor> {
        match self.catalog.list_adapters().await {
            Ok(adapters) => self.selector.select(&adapters).cloned(),
            Err(e) => {
                warn!("Adapter enumeration failed: {}", e);
                None
            }
        }
    }

    async fn run_cycle(&self, state: &mut SampleState) -> SampleReport {
        let reading = self.read_primary().await;
        let rate = self.sampler.sample(reading.as_ref(), Instant::now(), state);
        let adapter = reading.map(|r| r.adapter);

        debug!(
            "Sample cycle on {}: down={} B/s, up={} B/s",
            adapter.as_ref().map(|id| id.as_str()).unwrap_or("<no adapter>"),
            rate.down,
            rate.up
        );
        SampleReport { rate, adapter }
    }

    /// Selects the primary adapter and reads its counters; any failure is
    /// logged and reported as "no adapter"
    async fn read_primary(&self) -> Option<CounterReading> {
        let adapter = self.primary_adapter().await?;

        match self.catalog.read_counters(&adapter).await {
            Ok(counters) => Some(CounterReading::new(adapter.id, counters)),
            Err(e) => {
                warn!("Failed to read counters of primary adapter '{}': {}", adapter.id, e);
                None
            }
        }
    }

    /// Copy of the current sample state
    pub async fn snapshot(&self) -> SampleState {
        self.state.lock().await.clone()
    }
}

impl std::fmt::Debug for ThroughputEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThroughputEngine")
            .field("selector", &self.selector)
            .field("sampler", &self.sampler)
            .finish_non_exhaustive()
    }
}
