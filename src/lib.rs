//! Network throughput sampling for status-area and terminal displays
//!
//! Picks the adapter that carries the host's internet traffic, samples its
//! byte counters on a fixed cadence and reports one smoothed download/upload
//! figure per tick, formatted for tooltips, tray labels and dashboards.

pub mod cli;
pub mod collectors;
pub mod config;
