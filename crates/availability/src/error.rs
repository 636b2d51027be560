// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

/// Error returned by [`Waiter::wait`][crate::Waiter::wait] when the resource could not be observed.
///
/// Carries the cause ([`WaitErrorKind`]), the identifier of the resource as rendered by
/// its [`Display`] implementation, and the number of fetch attempts that were started.
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// # use availability::{Deadline, FetchError, WaitErrorKind, Waiter};
/// # use tick::ClockControl;
/// # async fn example() {
/// # let clock = ClockControl::default().auto_advance_timers(true).to_clock();
/// let waiter = Waiter::new(&clock);
///
/// let error = waiter
///     .wait(Deadline::after(Duration::from_secs(5)), 7, |_| async {
///         Err::<(), _>(FetchError::<String>::fatal("403 forbidden"))
///     })
///     .await
///     .unwrap_err();
///
/// assert!(error.is_terminal());
/// assert_eq!(error.attempts(), 1);
/// assert_eq!(
///     error.to_string(),
///     "error waiting for resource with ID '7' to become available: 403 forbidden"
/// );
/// # }
/// ```
pub struct WaitError<E> {
    kind: WaitErrorKind<E>,
    resource_id: String,
    attempts: u32,
}

/// Why a wait ended without observing the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitErrorKind<E> {
    /// The fetch returned an error that retrying cannot resolve.
    Terminal(E),

    /// The deadline passed before the resource became visible.
    ///
    /// Holds the error of the last completed attempt, or `None` when no attempt completed
    /// before the deadline.
    DeadlineExceeded(Option<E>),
}

impl<E> WaitError<E> {
    pub(crate) fn new(kind: WaitErrorKind<E>, resource_id: impl Display, attempts: u32) -> Self {
        Self {
            kind,
            resource_id: resource_id.to_string(),
            attempts,
        }
    }

    /// Returns the cause of the failure.
    #[must_use]
    pub fn kind(&self) -> &WaitErrorKind<E> {
        &self.kind
    }

    /// Consumes the error and returns its cause.
    #[must_use]
    pub fn into_kind(self) -> WaitErrorKind<E> {
        self.kind
    }

    /// Returns `true` when the fetch reported a non-retryable error.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, WaitErrorKind::Terminal(_))
    }

    /// Returns `true` when the deadline elapsed.
    #[must_use]
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self.kind, WaitErrorKind::DeadlineExceeded(_))
    }

    /// Returns the error reported by the fetch, if any.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match &self.kind {
            WaitErrorKind::Terminal(error) => Some(error),
            WaitErrorKind::DeadlineExceeded(error) => error.as_ref(),
        }
    }

    /// Consumes the error and returns the error reported by the fetch, if any.
    #[must_use]
    pub fn into_error(self) -> Option<E> {
        match self.kind {
            WaitErrorKind::Terminal(error) => Some(error),
            WaitErrorKind::DeadlineExceeded(error) => error,
        }
    }

    /// The identifier of the resource, as rendered by its `Display` implementation.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Number of fetch attempts started, including one cut off by the deadline.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl<E: Debug> Debug for WaitError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitError")
            .field("kind", &self.kind)
            .field("resource_id", &self.resource_id)
            .field("attempts", &self.attempts)
            .finish()
    }
}

impl<E: Display> Display for WaitError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let id = &self.resource_id;

        match &self.kind {
            WaitErrorKind::Terminal(error) => {
                write!(f, "error waiting for resource with ID '{id}' to become available: {error}")
            }
            WaitErrorKind::DeadlineExceeded(Some(error)) => write!(
                f,
                "timed out waiting for resource with ID '{id}' to become available after {} attempts: {error}",
                self.attempts
            ),
            WaitErrorKind::DeadlineExceeded(None) => write!(
                f,
                "timed out waiting for resource with ID '{id}' to become available after {} attempts",
                self.attempts
            ),
        }
    }
}

impl<E: Error + 'static> Error for WaitError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.error().map(|error| error as &(dyn Error + 'static))
    }
}
