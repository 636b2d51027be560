// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, Instant};

use tick::Clock;

/// Bounds how long a [`Waiter`][crate::Waiter] keeps retrying.
///
/// The waiter never picks a budget on its own; the caller decides, typically from the
/// timeout configured for the surrounding create or update operation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use availability::Deadline;
///
/// // Relative to the moment `wait` starts.
/// let deadline = Deadline::after(Duration::from_secs(120));
///
/// // Durations convert directly.
/// let same: Deadline = Duration::from_secs(120).into();
/// assert_eq!(deadline, same);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(DeadlineKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeadlineKind {
    After(Duration),
    At(Instant),
    Never,
}

impl Deadline {
    /// Budget measured from the start of the `wait` call.
    ///
    /// A budget too large to be represented as an [`Instant`] behaves like [`Deadline::never`].
    #[must_use]
    pub const fn after(budget: Duration) -> Self {
        Self(DeadlineKind::After(budget))
    }

    /// Absolute deadline on the waiter's clock.
    ///
    /// Obtain the instant from the same [`Clock`] the waiter was created with, e.g.
    /// `clock.instant() + timeout`. A deadline that has already passed makes `wait` return
    /// without fetching.
    #[must_use]
    pub const fn at(instant: Instant) -> Self {
        Self(DeadlineKind::At(instant))
    }

    /// No deadline.
    ///
    /// The wait then ends on success, on a terminal error, or when the caller drops the
    /// future returned by `wait`.
    #[must_use]
    pub const fn never() -> Self {
        Self(DeadlineKind::Never)
    }

    pub(crate) fn resolve(self, clock: &Clock) -> Option<Instant> {
        match self.0 {
            DeadlineKind::After(budget) => clock.instant().checked_add(budget),
            DeadlineKind::At(instant) => Some(instant),
            DeadlineKind::Never => None,
        }
    }
}

impl From<Duration> for Deadline {
    fn from(budget: Duration) -> Self {
        Self::after(budget)
    }
}
