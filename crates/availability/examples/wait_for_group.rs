// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Waits for a freshly created computer group to become readable.
//!
//! The simulated API answers 404 for the first few lookups, the way an eventually
//! consistent backend does right after a create. Run with
//! `cargo run --example wait_for_group --features logs` to see the retry events.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use availability::{Deadline, OnRetryArgs, Recovery, RecoveryInfo, Waiter};
use ohno::AppError;
use tick::Clock;
use tracing::level_filters::LevelFilter;

#[ohno::error]
#[display("GET /computergroups/id/{id} returned {status}")]
struct ApiError {
    id: u64,
    status: u16,
}

impl Recovery for ApiError {
    fn recovery(&self) -> RecoveryInfo {
        match self.status {
            404 | 410 => RecoveryInfo::retry(),
            _ => RecoveryInfo::never(),
        }
    }
}

#[derive(Debug)]
struct ComputerGroup {
    id: u64,
    name: String,
}

/// Pretends to be the remote API. The group shows up on the fourth lookup.
struct FakeApi {
    lookups: AtomicU32,
}

impl FakeApi {
    async fn get_group(&self, id: u64) -> Result<ComputerGroup, ApiError> {
        if self.lookups.fetch_add(1, Ordering::Relaxed) < 3 {
            return Err(ApiError::new(id, 404_u16));
        }

        Ok(ComputerGroup {
            id,
            name: "Managed laptops".to_string(),
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt().with_max_level(LevelFilter::DEBUG).init();

    let clock = Clock::new_tokio();
    let api = FakeApi { lookups: AtomicU32::new(0) };

    let waiter = Waiter::new(&clock)
        .name("computer_groups")
        .initial_backoff(Duration::from_millis(100))
        .max_backoff(Duration::from_secs(2))
        .enable_logs()
        .on_retry(|args: OnRetryArgs| {
            println!("attempt {} saw no group yet, next lookup in {:?}", args.attempt(), args.retry_delay());
        });

    let group = waiter
        .wait(Deadline::after(Duration::from_secs(30)), 42, |id| api.get_group(id))
        .await?;

    println!("group {} is available: {}", group.id, group.name);

    Ok(())
}
