//! Test module organization for throughput sampling
//!
//! Unit tests for the pure pieces live next to them; these modules cover the
//! stateful sampler and the engine cycle.
