// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(dead_code, reason = "This is a test module")]
#![allow(missing_docs, reason = "This is a test module")]

//! Integration tests for the waiter using only public API.

use std::error::Error as _;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use availability::{Deadline, FetchError, OnRetryArgs, Recovery, RecoveryInfo, WaitErrorKind, Waiter, classify_status_text};
use tick::{Clock, ClockControl};

#[ohno::error]
#[display("lookup of {resource} failed with status {status}")]
struct ApiError {
    resource: String,
    status: u16,
}

impl Recovery for ApiError {
    fn recovery(&self) -> RecoveryInfo {
        match self.status {
            404 | 410 => RecoveryInfo::retry(),
            429 => RecoveryInfo::retry().delay(Duration::from_secs(5)),
            503 => RecoveryInfo::unavailable(),
            _ => RecoveryInfo::never(),
        }
    }
}

fn clock() -> Clock {
    ClockControl::default().auto_advance_timers(true).to_clock()
}

fn by_status(error: &String) -> RecoveryInfo {
    classify_status_text(error)
}

#[tokio::test]
async fn group_becomes_visible_on_third_attempt() {
    let clock = clock();
    let stopwatch = clock.stopwatch();
    let waiter = Waiter::new(&clock).jitter_factor(0.0);
    let mut calls = 0;

    let group = waiter
        .wait_with(Deadline::after(Duration::from_secs(60)), 42, by_status, |id: i64| {
            calls += 1;
            let attempt = calls;
            async move {
                match attempt {
                    1 | 2 => Err(format!("GET /computergroups/id/{id}: 404 not found")),
                    _ => Ok("g1"),
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(group, "g1");
    assert_eq!(calls, 3);
    assert_eq!(stopwatch.elapsed(), Duration::from_secs(3));
}

#[tokio::test]
async fn forbidden_fails_without_sleeping() {
    let clock = clock();
    let stopwatch = clock.stopwatch();
    let waiter = Waiter::new(&clock);
    let mut calls = 0;

    let error = waiter
        .wait_with(Deadline::after(Duration::from_secs(60)), "abc", by_status, |_| {
            calls += 1;
            async { Err::<(), _>("403 forbidden".to_string()) }
        })
        .await
        .unwrap_err();

    assert_eq!(calls, 1);
    assert_eq!(stopwatch.elapsed(), Duration::ZERO);
    assert_eq!(error.resource_id(), "abc");
    assert_eq!(
        error.to_string(),
        "error waiting for resource with ID 'abc' to become available: 403 forbidden"
    );
    assert_eq!(error.into_kind(), WaitErrorKind::Terminal("403 forbidden".to_string()));
}

#[tokio::test]
async fn real_jitter_stays_within_bounds() {
    let clock = clock();
    let delays = Arc::new(Mutex::new(Vec::new()));
    let waiter = Waiter::new(&clock).on_retry({
        let delays = Arc::clone(&delays);
        move |args: OnRetryArgs| delays.lock().unwrap().push((args.base_delay(), args.retry_delay()))
    });
    let mut calls = 0;

    waiter
        .wait_with(Deadline::never(), 1, by_status, |_| {
            calls += 1;
            let visible = calls > 12;
            async move { if visible { Ok(()) } else { Err("410 gone".to_string()) } }
        })
        .await
        .unwrap();

    let delays = delays.lock().unwrap();
    assert_eq!(delays.len(), 12);
    for (base, retry) in delays.iter() {
        assert!(retry >= base, "{retry:?} < {base:?}");
        assert!(*retry <= base.mul_f64(1.5), "{retry:?} > 1.5 * {base:?}");
    }
}

#[tokio::test]
async fn structured_errors_drive_classification() {
    let clock = clock();
    let stopwatch = clock.stopwatch();
    let waiter = Waiter::new(&clock).jitter_factor(0.0);
    let mut statuses = vec![404_u16, 429, 410].into_iter();

    let value = waiter
        .wait(Duration::from_secs(60), 7, |id: u32| {
            let status = statuses.next();
            async move {
                match status {
                    Some(status) => Err(ApiError::new(format!("policy {id}"), status)),
                    None => Ok(id * 2),
                }
            }
        })
        .await
        .unwrap();

    // 1s backoff, 5s requested by the 429, then 4s backoff
    assert_eq!(value, 14);
    assert_eq!(stopwatch.elapsed(), Duration::from_secs(10));
}

#[tokio::test]
async fn unavailable_service_ends_wait_unless_handled() {
    let clock = clock();

    let error = Waiter::new(&clock)
        .wait(Duration::from_secs(60), 7, |_| async {
            Err::<(), _>(ApiError::new("policy 7", 503_u16))
        })
        .await
        .unwrap_err();
    assert!(error.is_terminal());
    assert_eq!(error.attempts(), 1);

    let mut calls = 0;
    let result = Waiter::new(&clock)
        .handle_unavailable(true)
        .wait(Duration::from_secs(60), 7, |_| {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt < 3 {
                    Err(ApiError::new("policy 7", 503_u16))
                } else {
                    Ok(())
                }
            }
        })
        .await;
    assert!(result.is_ok());
    assert_eq!(calls, 3);
}

#[tokio::test]
async fn deadline_error_exposes_last_failure() {
    let clock = clock();
    let waiter = Waiter::new(&clock).jitter_factor(0.0);

    let error = waiter
        .wait(Deadline::after(Duration::from_secs(4)), "script-1", |id: &str| {
            let error = FetchError::<io::Error>::not_found_yet(io::Error::other(format!("{id}: 404")));
            async move { Err::<(), _>(error) }
        })
        .await
        .unwrap_err();

    // attempts at 0s, 1s and 3s
    assert!(error.is_deadline_exceeded());
    assert_eq!(error.attempts(), 3);
    assert_eq!(error.source().unwrap().to_string(), "script-1: 404");
    assert!(error.into_error().unwrap().is_not_found_yet());
}

#[tokio::test]
async fn wait_error_converts_to_app_error() {
    async fn lookup(clock: &Clock) -> Result<(), ohno::AppError> {
        Waiter::new(clock)
            .wait(Duration::from_secs(1), 9, |_| async {
                Err::<(), _>(ApiError::new("webhook 9", 500_u16))
            })
            .await?;

        Ok(())
    }

    let error = lookup(&clock()).await.unwrap_err();

    assert!(error.to_string().contains("resource with ID '9'"));
}

#[tokio::test]
async fn waiter_is_reusable_across_calls() {
    let clock = clock();
    let waiter = Waiter::new(&clock).jitter_factor(0.0);

    for id in 0..3_u8 {
        let mut calls = 0;
        let stopwatch = clock.stopwatch();

        waiter
            .wait_with(Duration::from_secs(60), id, by_status, |_| {
                calls += 1;
                let visible = calls == 2;
                async move { if visible { Ok(()) } else { Err("404".to_string()) } }
            })
            .await
            .unwrap();

        // every call starts a fresh schedule
        assert_eq!(stopwatch.elapsed(), Duration::from_secs(1));
    }
}

#[test]
fn wait_future_is_send() {
    fn assert_send<T: Send>(_: &T) {}

    let clock = Clock::new_frozen();
    let waiter = Waiter::new(&clock);
    let future = waiter.wait(Duration::from_secs(1), 1, |_| async { Ok::<_, FetchError<io::Error>>(()) });

    assert_send(&future);
}
