//! Exponential smoothing of instantaneous rates
//!
//! A single-pole low-pass filter: `ema = alpha * instant + (1 - alpha) * ema`.
//! With the default alpha of 0.5 a spike is halved every tick while a
//! sustained change is tracked within two to three ticks.

use crate::collectors::throughput::sampler::SampleState;

/// Default smoothing coefficient
pub const DEFAULT_ALPHA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    alpha: f64,
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl Smoother {
    /// Creates a smoother; `alpha` is clamped into (0, 1]
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() {
            alpha.clamp(f64::MIN_POSITIVE, 1.0)
        } else {
            DEFAULT_ALPHA
        };
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Blends `(down, up)` into the moving average kept in `state`
    ///
    /// The first call after a reset returns the input unchanged so the average
    /// is not dragged towards zero.
    pub fn smooth(&self, instant: (f64, f64), state: &mut SampleState) -> (f64, f64) {
        let (down, up) = instant;

        if state.ema_initialized {
            state.ema_down = self.alpha * down + (1.0 - self.alpha) * state.ema_down;
            state.ema_up = self.alpha * up + (1.0 - self.alpha) * state.ema_up;
        } else {
            state.ema_down = down;
            state.ema_up = up;
            state.ema_initialized = true;
        }

        (state.ema_down, state.ema_up)
    }
}
