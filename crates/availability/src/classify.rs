// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use recoverable::{Recovery, RecoveryInfo, RecoveryKind};

/// Status codes whose presence in an error text means "not materialized yet".
const NOT_FOUND_YET_MARKERS: [&str; 2] = ["404", "410"];

/// Classifies an error by its text, for API clients that only report failures as strings.
///
/// The error is transient (`RecoveryInfo::retry()`) if its [`Display`] output contains
/// `"404"` or `"410"` anywhere, and terminal (`RecoveryInfo::never()`) otherwise. The match
/// is a plain substring search: `"code 14040"` is transient too. Prefer a [`Recovery`]
/// implementation or [`FetchError`] when the client exposes structured status codes.
///
/// # Examples
///
/// ```
/// use availability::{RecoveryKind, classify_status_text};
///
/// assert_eq!(classify_status_text("404 not found").kind(), RecoveryKind::Retry);
/// assert_eq!(classify_status_text("HTTP 410 Gone").kind(), RecoveryKind::Retry);
/// assert_eq!(classify_status_text("403 forbidden").kind(), RecoveryKind::Never);
/// ```
#[must_use]
pub fn classify_status_text<E: Display + ?Sized>(error: &E) -> RecoveryInfo {
    let text = error.to_string();

    if NOT_FOUND_YET_MARKERS.iter().any(|marker| text.contains(marker)) {
        RecoveryInfo::retry()
    } else {
        RecoveryInfo::never()
    }
}

/// Outcome of a failed lookup, classified at the source.
///
/// Fetch implementations that know the status of the response should return this type
/// (or their own type implementing [`Recovery`]) instead of relying on text matching.
///
/// # Examples
///
/// ```
/// use availability::{FetchError, Recovery, RecoveryKind};
///
/// let error: FetchError<String> = FetchError::not_found_yet("computer group 42 is not visible yet");
/// assert_eq!(error.recovery().kind(), RecoveryKind::Retry);
///
/// let error = FetchError::from_status_text("500 internal error");
/// assert!(!error.is_not_found_yet());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError<E> {
    /// The resource is not visible yet; retrying may succeed.
    NotFoundYet(E),

    /// Retrying will not help.
    Fatal(E),
}

impl<E> FetchError<E> {
    /// Creates a transient error.
    pub fn not_found_yet(error: impl Into<E>) -> Self {
        Self::NotFoundYet(error.into())
    }

    /// Creates a terminal error.
    pub fn fatal(error: impl Into<E>) -> Self {
        Self::Fatal(error.into())
    }

    /// Classifies an unstructured error with [`classify_status_text`].
    pub fn from_status_text(error: E) -> Self
    where
        E: Display,
    {
        if classify_status_text(&error).kind() == RecoveryKind::Retry {
            Self::NotFoundYet(error)
        } else {
            Self::Fatal(error)
        }
    }

    /// Returns `true` for [`FetchError::NotFoundYet`].
    #[must_use]
    pub fn is_not_found_yet(&self) -> bool {
        matches!(self, Self::NotFoundYet(_))
    }

    /// Returns the wrapped error.
    #[must_use]
    pub fn get_ref(&self) -> &E {
        match self {
            Self::NotFoundYet(error) | Self::Fatal(error) => error,
        }
    }

    /// Consumes the classification and returns the wrapped error.
    #[must_use]
    pub fn into_inner(self) -> E {
        match self {
            Self::NotFoundYet(error) | Self::Fatal(error) => error,
        }
    }
}

impl<E> Recovery for FetchError<E> {
    fn recovery(&self) -> RecoveryInfo {
        match self {
            Self::NotFoundYet(_) => RecoveryInfo::retry(),
            Self::Fatal(_) => RecoveryInfo::never(),
        }
    }
}

impl<E: Display> Display for FetchError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.get_ref(), f)
    }
}

impl<E: Error + 'static> Error for FetchError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.get_ref().source()
    }
}
