// Copyright (c) Microsoft Corporation.

use std::time::Duration;

/// Delay before the second attempt.
///
/// Freshly created resources usually become readable within a second or two, so the
/// first retry comes quickly.
pub(crate) const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound for a single base delay.
pub(crate) const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Multiplier applied to the base delay after every transient outcome.
pub(crate) const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Share of the base delay that may be added on top of it as random jitter.
///
/// With `0.5` the actual sleep for base delay `b` lies in `[b, 1.5 * b]`.
pub(crate) const DEFAULT_JITTER_FACTOR: f64 = 0.5;

/// Name reported by telemetry when the waiter has not been named.
pub(crate) const DEFAULT_WAITER_NAME: &str = "default";
