// Copyright (c) Microsoft Corporation.

use std::cmp::min;
use std::time::Duration;

use crate::constants::{DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_BACKOFF, DEFAULT_JITTER_FACTOR, DEFAULT_MAX_BACKOFF};
use crate::rnd::Rnd;

#[derive(Debug, Clone)]
pub(crate) struct BackoffOptions {
    pub initial: Duration,
    pub max: Duration,
    pub factor: f64,
    pub jitter_factor: f64,
    pub rnd: Rnd,
}

impl Default for BackoffOptions {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_BACKOFF,
            max: DEFAULT_MAX_BACKOFF,
            factor: DEFAULT_BACKOFF_FACTOR,
            jitter_factor: DEFAULT_JITTER_FACTOR,
            rnd: Rnd::default(),
        }
    }
}

impl BackoffOptions {
    /// Starts a new schedule of base delays. Every `wait` call owns its own schedule.
    pub fn delays(&self) -> BackoffState {
        BackoffState {
            current: self.initial,
            max: self.max,
            factor: self.factor,
        }
    }

    /// Adds `[0, jitter_factor)` of `base` on top of `base`.
    pub fn apply_jitter(&self, base: Duration) -> Duration {
        if base.is_zero() || self.jitter_factor <= 0.0 {
            return base;
        }

        let extra = self.jitter_factor * self.rnd.next_f64();
        secs_to_duration_saturating(base.as_secs_f64() * (1.0 + extra))
    }
}

/// Clamps the factor so that delays never shrink.
pub(crate) fn sanitize_factor(factor: f64) -> f64 {
    if factor.is_finite() { factor.max(1.0) } else { 1.0 }
}

pub(crate) fn sanitize_jitter(jitter_factor: f64) -> f64 {
    if jitter_factor.is_finite() {
        jitter_factor.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Infinite sequence of base delays: `min(initial * factor^n, max)`.
#[derive(Debug)]
pub(crate) struct BackoffState {
    current: Duration,
    max: Duration,
    factor: f64,
}

impl Iterator for BackoffState {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        let delay = min(self.current, self.max);

        // once capped, the schedule stays at the cap
        if delay < self.max {
            self.current = secs_to_duration_saturating(self.current.as_secs_f64() * self.factor);
        }

        Some(delay)
    }
}

fn secs_to_duration_saturating(secs: f64) -> Duration {
    if secs <= 0.0 {
        return Duration::ZERO;
    }

    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
