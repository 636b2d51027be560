// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt::Display;
use std::time::{Duration, Instant};

use recoverable::{Recovery, RecoveryInfo, RecoveryKind};
use tick::{Clock, FutureExt};

use crate::args::{OnRetry, OnRetryArgs};
use crate::backoff::{BackoffOptions, sanitize_factor, sanitize_jitter};
use crate::telemetry::Telemetry;
use crate::{Deadline, WaitError, WaitErrorKind};

/// Waits for a remote resource to become readable after it was created or updated.
///
/// Eventually consistent APIs often answer "not found" for a short while after a resource
/// was written. A `Waiter` repeats a single lookup until the resource is observed, a
/// non-retryable error occurs, or the caller's [`Deadline`] passes. Between attempts it
/// sleeps with exponential backoff and jitter:
///
/// - the base delay starts at [`initial_backoff`][Self::initial_backoff] (1s) and is
///   multiplied by [`backoff_factor`][Self::backoff_factor] (2.0) after every transient
///   outcome, up to [`max_backoff`][Self::max_backoff] (30s);
/// - the actual sleep adds up to [`jitter_factor`][Self::jitter_factor] (0.5) of the base
///   delay on top of it, and never extends past the deadline.
///
/// Whether an error is transient is decided by its [`RecoveryInfo`]: [`RecoveryKind::Retry`]
/// retries, everything else ends the wait, except [`RecoveryKind::Unavailable`] when
/// [`handle_unavailable`][Self::handle_unavailable] is set. A delay attached to the recovery
/// information replaces the jittered backoff delay for that attempt.
///
/// The waiter keeps no state between calls. Cloning is cheap and concurrent calls share
/// nothing mutable.
///
/// # Examples
///
/// ```
/// use std::io;
/// use std::time::Duration;
///
/// use availability::{Deadline, FetchError, Waiter};
/// # use tick::ClockControl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let clock = ClockControl::default().auto_advance_timers(true).to_clock();
/// let waiter = Waiter::new(&clock).max_backoff(Duration::from_secs(10));
///
/// let mut calls = 0;
/// let name = waiter
///     .wait(Deadline::after(Duration::from_secs(120)), 42, |id| {
///         calls += 1;
///         let visible = calls >= 3;
///         async move {
///             if visible {
///                 Ok(format!("group-{id}"))
///             } else {
///                 Err(FetchError::<io::Error>::not_found_yet(io::Error::other("404 not found")))
///             }
///         }
///     })
///     .await?;
///
/// assert_eq!(name, "group-42");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Waiter {
    clock: Clock,
    backoff: BackoffOptions,
    handle_unavailable: bool,
    on_retry: Option<OnRetry>,
    telemetry: Telemetry,
}

impl Waiter {
    /// Creates a waiter with the default backoff settings.
    ///
    /// All timing, including the deadline, is measured on `clock`.
    #[must_use]
    pub fn new(clock: impl AsRef<Clock>) -> Self {
        Self {
            clock: clock.as_ref().clone(),
            backoff: BackoffOptions::default(),
            handle_unavailable: false,
            on_retry: None,
            telemetry: Telemetry::default(),
        }
    }

    /// Sets the name reported in log events.
    ///
    /// **Default**: `"default"`
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        let logs_enabled = self.telemetry.logs_enabled;
        self.telemetry = Telemetry::new(name.into());
        self.telemetry.logs_enabled = logs_enabled;
        self
    }

    /// Sets the base delay before the second attempt.
    ///
    /// **Default**: 1 second
    #[must_use]
    pub fn initial_backoff(mut self, delay: Duration) -> Self {
        self.backoff.initial = delay;
        self
    }

    /// Sets the upper bound for a single base delay.
    ///
    /// A value below [`initial_backoff`][Self::initial_backoff] caps every delay, the first
    /// one included.
    ///
    /// **Default**: 30 seconds
    #[must_use]
    pub fn max_backoff(mut self, delay: Duration) -> Self {
        self.backoff.max = delay;
        self
    }

    /// Sets the multiplier applied to the base delay after every transient outcome.
    ///
    /// Values below `1.0` and non-finite values are treated as `1.0`, so delays never shrink.
    ///
    /// **Default**: 2.0
    #[must_use]
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff.factor = sanitize_factor(factor);
        self
    }

    /// Sets the share of the base delay that may be added on top of it as random jitter.
    ///
    /// The sleep for base delay `b` is drawn from `[b, b + jitter_factor * b)`. The value is
    /// clamped to `[0, 1]`; non-finite values disable jitter.
    ///
    /// **Default**: 0.5
    #[must_use]
    pub fn jitter_factor(mut self, jitter_factor: f64) -> Self {
        self.backoff.jitter_factor = sanitize_jitter(jitter_factor);
        self
    }

    /// Treats [`RecoveryKind::Unavailable`] as transient.
    ///
    /// By default an unavailable service ends the wait immediately, since it says nothing
    /// about whether the resource exists.
    ///
    /// **Default**: `false`
    #[must_use]
    pub fn handle_unavailable(mut self, enable: bool) -> Self {
        self.handle_unavailable = enable;
        self
    }

    /// Registers a callback invoked after every transient outcome, before sleeping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tick::Clock;
    /// # use availability::{OnRetryArgs, Waiter};
    /// # fn example(clock: &Clock) {
    /// let waiter = Waiter::new(clock).on_retry(|args: OnRetryArgs| {
    ///     println!("attempt {} not visible yet, retrying in {:?}", args.attempt(), args.retry_delay());
    /// });
    /// # }
    /// ```
    #[must_use]
    pub fn on_retry(mut self, on_retry: impl Fn(OnRetryArgs) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(OnRetry::new(on_retry));
        self
    }

    /// Emits `tracing` events for retries and failures.
    ///
    /// Events are `availability.retry` and `availability.terminal` at `DEBUG` and
    /// `availability.deadline_exceeded` at `WARN`.
    #[cfg(any(feature = "logs", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "logs")))]
    #[must_use]
    pub fn enable_logs(mut self) -> Self {
        self.telemetry.logs_enabled = true;
        self
    }

    /// Applies deserialized backoff settings.
    #[cfg(any(feature = "serde", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[must_use]
    pub fn config(self, config: &crate::WaitConfig) -> Self {
        self.initial_backoff(config.initial_backoff())
            .max_backoff(config.max_backoff())
            .backoff_factor(config.backoff_factor)
            .jitter_factor(config.jitter_factor)
    }

    #[cfg(test)]
    #[must_use]
    pub(crate) fn rnd(mut self, rnd: crate::rnd::Rnd) -> Self {
        self.backoff.rnd = rnd;
        self
    }

    /// Repeats `fetch` until the resource identified by `id` is observed.
    ///
    /// `fetch` performs exactly one lookup per call; it receives a clone of `id`. Errors are
    /// classified through their [`Recovery`] implementation. Use [`wait_with`][Self::wait_with]
    /// for error types that do not implement it.
    ///
    /// The deadline is checked before every attempt and also bounds an attempt in flight:
    /// once it passes, the pending fetch is dropped.
    ///
    /// # Errors
    ///
    /// - [`WaitErrorKind::Terminal`] when the fetch returns a non-retryable error.
    /// - [`WaitErrorKind::DeadlineExceeded`] when the deadline passes first; it carries the
    ///   error of the last completed attempt, if any.
    pub async fn wait<K, V, E, F, Fut>(&self, deadline: impl Into<Deadline>, id: K, fetch: F) -> Result<V, WaitError<E>>
    where
        K: Clone + Display,
        E: Recovery,
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.wait_with(deadline, id, |error: &E| error.recovery(), fetch).await
    }

    /// Like [`wait`][Self::wait], with an explicit error classifier.
    ///
    /// Pass [`classify_status_text`][crate::classify_status_text] to treat every error whose
    /// text contains `"404"` or `"410"` as "not visible yet".
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::time::Duration;
    /// # use availability::{Deadline, Waiter, classify_status_text};
    /// # use tick::ClockControl;
    /// # async fn example() {
    /// # let clock = ClockControl::default().auto_advance_timers(true).to_clock();
    /// let waiter = Waiter::new(&clock);
    ///
    /// let error = waiter
    ///     .wait_with(
    ///         Deadline::after(Duration::from_secs(60)),
    ///         "abc",
    ///         |error: &String| classify_status_text(error),
    ///         |_| async { Err::<(), _>("403 forbidden".to_string()) },
    ///     )
    ///     .await
    ///     .unwrap_err();
    ///
    /// assert!(error.is_terminal());
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`wait`][Self::wait].
    pub async fn wait_with<K, V, E, C, F, Fut>(
        &self,
        deadline: impl Into<Deadline>,
        id: K,
        classify: C,
        mut fetch: F,
    ) -> Result<V, WaitError<E>>
    where
        K: Clone + Display,
        C: Fn(&E) -> RecoveryInfo,
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let deadline = Into::<Deadline>::into(deadline).resolve(&self.clock);
        let mut delays = self.backoff.delays();
        let mut attempts: u32 = 0;
        let mut last_error: Option<E> = None;

        loop {
            let remaining = self.remaining(deadline);
            if remaining == Some(Duration::ZERO) {
                return Err(self.deadline_exceeded(&id, last_error, attempts));
            }

            let attempt = attempts;
            attempts = attempts.saturating_add(1);

            let fetched = fetch(id.clone());
            let outcome = match remaining {
                Some(budget) => match fetched.timeout(&self.clock, budget).await {
                    Ok(outcome) => outcome,
                    Err(_) => return Err(self.deadline_exceeded(&id, last_error, attempts)),
                },
                None => fetched.await,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let recovery = classify(&error);
            if !self.is_transient(&recovery) {
                self.telemetry.terminal(&id, attempt);
                return Err(WaitError::new(WaitErrorKind::Terminal(error), &id, attempts));
            }

            // the schedule advances even when the recovery info dictates the delay
            let base_delay = delays.next().unwrap_or(self.backoff.max);
            let mut retry_delay = recovery.get_delay().unwrap_or_else(|| self.backoff.apply_jitter(base_delay));
            if let Some(remaining) = self.remaining(deadline) {
                retry_delay = retry_delay.min(remaining);
            }

            self.invoke_on_retry(attempt, base_delay, retry_delay, recovery);
            self.telemetry.retry(&id, attempt, retry_delay);

            last_error = Some(error);
            self.clock.delay(retry_delay).await;
        }
    }

    fn remaining(&self, deadline: Option<Instant>) -> Option<Duration> {
        deadline.map(|deadline| deadline.saturating_duration_since(self.clock.instant()))
    }

    fn is_transient(&self, recovery: &RecoveryInfo) -> bool {
        match recovery.kind() {
            RecoveryKind::Retry => true,
            RecoveryKind::Unavailable => self.handle_unavailable,
            _ => false,
        }
    }

    fn invoke_on_retry(&self, attempt: u32, base_delay: Duration, retry_delay: Duration, recovery: RecoveryInfo) {
        if let Some(on_retry) = &self.on_retry {
            on_retry.call(OnRetryArgs {
                attempt,
                base_delay,
                retry_delay,
                recovery,
            });
        }
    }

    fn deadline_exceeded<K: Display, E>(&self, id: &K, last_error: Option<E>, attempts: u32) -> WaitError<E> {
        self.telemetry.deadline_exceeded(id, attempts);
        WaitError::new(WaitErrorKind::DeadlineExceeded(last_error), id, attempts)
    }
}
