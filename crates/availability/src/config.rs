// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_BACKOFF, DEFAULT_JITTER_FACTOR, DEFAULT_MAX_BACKOFF};

/// Serializable backoff settings for a [`Waiter`][crate::Waiter].
///
/// Missing fields take their defaults, unknown fields are rejected. Durations accept both
/// the ISO 8601 (`"PT2S"`) and the friendly (`"2s"`, `"1m 30s"`) formats. Apply the settings
/// with [`Waiter::config`][crate::Waiter::config].
///
/// # Examples
///
/// ```
/// use availability::WaitConfig;
///
/// let config: WaitConfig = serde_json::from_str(r#"{ "initial_backoff": "500ms", "max_backoff": "PT10S" }"#)?;
///
/// assert_eq!(config.max_backoff.as_secs(), 10);
/// assert!((config.backoff_factor - 2.0).abs() < f64::EPSILON);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitConfig {
    /// Delay before the second attempt. Negative values count as zero.
    pub initial_backoff: SignedDuration,

    /// Upper bound for a single base delay. Negative values count as zero.
    pub max_backoff: SignedDuration,

    /// Multiplier applied to the base delay after every transient outcome.
    pub backoff_factor: f64,

    /// Share of the base delay added on top of it as random jitter.
    pub jitter_factor: f64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_backoff: to_signed(DEFAULT_INITIAL_BACKOFF),
            max_backoff: to_signed(DEFAULT_MAX_BACKOFF),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl WaitConfig {
    pub(crate) fn initial_backoff(&self) -> Duration {
        to_unsigned(self.initial_backoff)
    }

    pub(crate) fn max_backoff(&self) -> Duration {
        to_unsigned(self.max_backoff)
    }
}

fn to_signed(duration: Duration) -> SignedDuration {
    SignedDuration::try_from(duration).unwrap_or(SignedDuration::MAX)
}

fn to_unsigned(duration: SignedDuration) -> Duration {
    Duration::try_from(duration).unwrap_or(Duration::ZERO)
}
