// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Waits for eventually consistent remote resources to become readable.
//!
//! Many management APIs acknowledge a create or update before the new state is visible to
//! readers. For a short while, reading the resource back answers "not found". This crate
//! provides [`Waiter`], which repeats a single lookup under exponential backoff with jitter
//! until the resource is observed, a non-retryable error occurs, or a caller-supplied
//! [`Deadline`] passes.
//!
//! # Quick Start
//!
//! ```
//! use std::io;
//! use std::time::Duration;
//!
//! use availability::{Deadline, FetchError, Waiter};
//! use tick::Clock;
//!
//! # async fn fetch_group(id: u64) -> Result<String, FetchError<io::Error>> { Ok(format!("group-{id}")) }
//! # async fn example(clock: &Clock) -> Result<(), Box<dyn std::error::Error>> {
//! let waiter = Waiter::new(clock);
//!
//! // fetch_group returns FetchError::NotFoundYet while the group is not visible yet
//! let group = waiter
//!     .wait(Deadline::after(Duration::from_secs(120)), 42, fetch_group)
//!     .await?;
//! # let _ = group;
//! # Ok(())
//! # }
//! ```
//!
//! # Classifying Errors
//!
//! The waiter retries an error only if it is classified as transient:
//!
//! - [`Waiter::wait`] asks the error itself through the [`Recovery`] trait.
//!   [`FetchError`] is a ready-made implementation for lookups that know their status.
//! - [`Waiter::wait_with`] takes an explicit classifier. [`classify_status_text`] treats every
//!   error whose text contains `"404"` or `"410"` as "not visible yet", for clients that
//!   report failures only as strings.
//!
//! # Time
//!
//! All timing goes through [`tick::Clock`], so tests can drive backoff and deadlines with
//! `tick::ClockControl` instead of sleeping.
//!
//! # Features
//!
//! - `logs`: emits `tracing` events for retries and failures once enabled with
//!   [`Waiter::enable_logs`].
//! - `serde`: adds [`WaitConfig`] for loading backoff settings from configuration files.

#[doc(inline)]
pub use recoverable::{Recovery, RecoveryInfo, RecoveryKind};

mod args;
mod backoff;
mod classify;
mod constants;
mod deadline;
mod error;
mod fn_wrapper;
mod rnd;
mod telemetry;
mod waiter;

#[cfg(any(feature = "serde", test))]
mod config;

pub use args::OnRetryArgs;
pub use classify::{FetchError, classify_status_text};
#[cfg(any(feature = "serde", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub use config::WaitConfig;
pub use deadline::Deadline;
pub use error::{WaitError, WaitErrorKind};
pub use waiter::Waiter;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
pub(crate) mod testing;
