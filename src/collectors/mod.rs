//! Data collection from the host network stack
//!
//! ## Module Organization
//!
//! - `adapters`: adapter descriptors, byte counters and the `AdapterCatalog` seam
//! - `platform`: OS-specific probes for link type, link state and default routes
//! - `throughput`: adapter selection, rate sampling, smoothing and formatting

pub mod adapters;
pub mod platform;
pub mod throughput;

pub use adapters::{AdapterCatalog, SystemCatalog};
pub use throughput::ThroughputEngine;
