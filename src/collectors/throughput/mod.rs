//! Throughput sampling
//!
//! Turns the cumulative byte counters of the host's primary adapter into one
//! stable download/upload figure per tick.
//!
//! ## Module Organization
//!
//! - `selector`: picks the primary adapter from an enumeration
//! - `sampler`: `SampleState` and the delta-rate computation
//! - `smoother`: exponential moving average over instantaneous rates
//! - `formatting`: decimal unit formatting for display
//! - `engine`: `ThroughputEngine`, one serialized sample cycle per trigger
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use netspeed_watcher::collectors::adapters::SystemCatalog;
//! use netspeed_watcher::collectors::throughput::{format_speed, ThroughputEngine, UnitMode};
//!
//! # async fn run() {
//! let engine = ThroughputEngine::new(Arc::new(SystemCatalog::new()));
//! let rate = engine.sample_once().await;
//! println!("down {}", format_speed(rate.down, UnitMode::Auto));
//! # }
//! ```

pub mod engine;
pub mod formatting;
pub mod sampler;
pub mod selector;
pub mod smoother;

pub use engine::{SampleReport, ThroughputEngine};
pub use formatting::{SpeedUnit, UnitMode, format_compact, format_speed, tooltip_text, tray_label};
pub use sampler::{CounterReading, RateSampler, SampleState, ThroughputRate};
pub use selector::{AdapterSelector, DEFAULT_DENYLIST};
pub use smoother::Smoother;

#[cfg(test)]
pub mod tests;
