// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use recoverable::RecoveryInfo;

/// Arguments for the [`on_retry`][crate::Waiter::on_retry] callback.
///
/// Describes the transient outcome that was just observed and the sleep that follows it.
#[derive(Debug)]
pub struct OnRetryArgs {
    pub(crate) attempt: u32,
    pub(crate) base_delay: Duration,
    pub(crate) retry_delay: Duration,
    pub(crate) recovery: RecoveryInfo,
}

impl OnRetryArgs {
    /// Zero-based index of the attempt that produced the transient outcome.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Base delay taken from the backoff schedule, before jitter.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// The delay the waiter actually sleeps before the next attempt.
    ///
    /// This is the jittered base delay, or the delay requested by the error's recovery
    /// information, truncated to the time left before the deadline.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Returns the recovery information that triggered this retry.
    #[must_use]
    pub fn recovery(&self) -> &RecoveryInfo {
        &self.recovery
    }
}

crate::fn_wrapper::define_fn_wrapper!(OnRetry(Fn(args: OnRetryArgs)));

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn on_retry_args() {
        let args = OnRetryArgs {
            attempt: 2,
            base_delay: Duration::from_secs(4),
            retry_delay: Duration::from_secs(5),
            recovery: RecoveryInfo::retry(),
        };

        assert_eq!(args.attempt(), 2);
        assert_eq!(args.base_delay(), Duration::from_secs(4));
        assert_eq!(args.retry_delay(), Duration::from_secs(5));
        assert_eq!(*args.recovery(), RecoveryInfo::retry());
    }

    #[test]
    fn on_retry_forwards_args() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let on_retry = OnRetry::new({
            let seen = Arc::clone(&seen);
            move |args: OnRetryArgs| seen.lock().unwrap().push(args.attempt())
        });

        for attempt in 0..3 {
            on_retry.call(OnRetryArgs {
                attempt,
                base_delay: Duration::ZERO,
                retry_delay: Duration::ZERO,
                recovery: RecoveryInfo::retry(),
            });
        }

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }
}
