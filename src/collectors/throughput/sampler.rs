//! Rate sampling from cumulative byte counters
//!
//! Converts two consecutive counter readings of the selected adapter into a
//! bytes-per-second rate. The sampler owns no state of its own: everything it
//! remembers between ticks lives in `SampleState`, which the engine keeps
//! behind a single lock.

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::collectors::adapters::{AdapterId, ByteCounters};
use crate::collectors::throughput::smoother::Smoother;

/// Lower bound on the elapsed time used as a divisor
pub const MIN_ELAPSED_SECS: f64 = 0.1;

/// Intervals shorter than this reuse the previous result
pub const DEFAULT_DEBOUNCE_SECS: f64 = 0.8;

/// Download/upload throughput in bytes per second
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputRate {
    pub down: u64,
    pub up: u64,
}

impl ThroughputRate {
    pub const ZERO: ThroughputRate = ThroughputRate { down: 0, up: 0 };

    pub fn new(down: u64, up: u64) -> Self {
        Self { down, up }
    }

    pub fn is_zero(&self) -> bool {
        self.down == 0 && self.up == 0
    }
}

impl From<ThroughputRate> for (u64, u64) {
    fn from(rate: ThroughputRate) -> Self {
        (rate.down, rate.up)
    }
}

/// Counters read from the selected adapter during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct CounterReading {
    pub adapter: AdapterId,
    pub counters: ByteCounters,
}

impl CounterReading {
    pub fn new(adapter: AdapterId, counters: ByteCounters) -> Self {
        Self { adapter, counters }
    }
}

/// Memory carried between sampling ticks
///
/// The previous counters are only meaningful once `last_sample_time` is set.
#[derive(Debug, Clone, Default)]
pub struct SampleState {
    pub(crate) active_adapter: Option<AdapterId>,
    pub(crate) previous_bytes_received: u64,
    pub(crate) previous_bytes_sent: u64,
    pub(crate) last_sample_time: Option<Instant>,
    pub(crate) ema_down: f64,
    pub(crate) ema_up: f64,
    pub(crate) ema_initialized: bool,
    pub(crate) last_returned: ThroughputRate,
}

impl SampleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter the current baseline belongs to
    pub fn active_adapter(&self) -> Option<&AdapterId> {
        self.active_adapter.as_ref()
    }

    /// Whether a counter baseline has been recorded
    pub fn has_baseline(&self) -> bool {
        self.last_sample_time.is_some()
    }

    /// Whether the moving average has seen a real data point since the last reset
    pub fn is_smoothing_primed(&self) -> bool {
        self.ema_initialized
    }

    /// Value returned by the most recent sample
    pub fn last_returned(&self) -> ThroughputRate {
        self.last_returned
    }

    fn reset_baseline(&mut self, reading: &CounterReading, now: Instant) {
        self.active_adapter = Some(reading.adapter.clone());
        self.previous_bytes_received = reading.counters.received;
        self.previous_bytes_sent = reading.counters.sent;
        self.last_sample_time = Some(now);
        self.ema_down = 0.0;
        self.ema_up = 0.0;
        self.ema_initialized = false;
        self.last_returned = ThroughputRate::ZERO;
    }
}

/// Computes smoothed rates from successive counter readings
#[derive(Debug, Clone)]
pub struct RateSampler {
    smoother: Smoother,
    debounce_secs: f64,
}

impl Default for RateSampler {
    fn default() -> Self {
        Self::new(Smoother::default(), DEFAULT_DEBOUNCE_SECS)
    }
}

impl RateSampler {
    pub fn new(smoother: Smoother, debounce_secs: f64) -> Self {
        Self {
            smoother,
            debounce_secs: debounce_secs.max(0.0),
        }
    }

    pub fn smoother(&self) -> &Smoother {
        &self.smoother
    }

    pub fn debounce_secs(&self) -> f64 {
        self.debounce_secs
    }

    /// Folds one reading into `state` and returns the rate to report
    ///
    /// - no reading: zero, baseline untouched
    /// - first reading or a different adapter: new baseline, zero
    /// - interval under the debounce threshold: previous result again
    /// - otherwise: clamped deltas over elapsed time, smoothed and rounded
    ///   half to even
    pub fn sample(
        &self,
        reading: Option<&CounterReading>,
        now: Instant,
        state: &mut SampleState,
    ) -> ThroughputRate {
        // The baseline timestamp is kept: stamping it without counters would inflate the next rate
        let Some(reading) = reading else {
            trace!("No adapter reading this tick, reporting zero");
            state.last_returned = ThroughputRate::ZERO;
            return ThroughputRate::ZERO;
        };

        let baseline = state
            .last_sample_time
            .filter(|_| state.active_adapter.as_ref() == Some(&reading.adapter));

        let Some(last_sample_time) = baseline else {
            match &state.active_adapter {
                Some(previous) if state.last_sample_time.is_some() => info!(
                    "Primary adapter changed from '{}' to '{}', re-establishing baseline",
                    previous, reading.adapter
                ),
                _ => info!("Establishing counter baseline on '{}'", reading.adapter),
            }
            state.reset_baseline(reading, now);
            return ThroughputRate::ZERO;
        };

        let elapsed_secs = now
            .saturating_duration_since(last_sample_time)
            .as_secs_f64()
            .max(MIN_ELAPSED_SECS);

        // Counter wraparound or a driver reload must never yield a negative rate
        let delta_received = reading
            .counters
            .received
            .saturating_sub(state.previous_bytes_received);
        let delta_sent = reading.counters.sent.saturating_sub(state.previous_bytes_sent);

        if reading.counters.received < state.previous_bytes_received
            || reading.counters.sent < state.previous_bytes_sent
        {
            debug!(
                "Counter rollback on '{}' (rx {} -> {}, tx {} -> {}), clamping delta to zero",
                reading.adapter,
                state.previous_bytes_received,
                reading.counters.received,
                state.previous_bytes_sent,
                reading.counters.sent
            );
        }

        state.previous_bytes_received = reading.counters.received;
        state.previous_bytes_sent = reading.counters.sent;
        state.last_sample_time = Some(now);

        if elapsed_secs < self.debounce_secs {
            trace!(
                "Interval {:.3}s below debounce threshold {:.3}s, repeating {:?}",
                elapsed_secs, self.debounce_secs, state.last_returned
            );
            return state.last_returned;
        }

        let instant = (
            delta_received as f64 / elapsed_secs,
            delta_sent as f64 / elapsed_secs,
        );
        let (down, up) = self.smoother.smooth(instant, state);
        let rate = ThroughputRate::new(down.round_ties_even() as u64, up.round_ties_even() as u64);

        trace!(
            "'{}': +{} rx / +{} tx bytes over {:.3}s -> instant ({:.1}, {:.1}) B/s, smoothed {:?}",
            reading.adapter, delta_received, delta_sent, elapsed_secs, instant.0, instant.1, rate
        );

        state.last_returned = rate;
        rate
    }
}
