// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Loads backoff settings from JSON and waits for a script with them.
//!
//! The lookup reports failures as plain strings, so the status-text classifier decides
//! which of them mean "not visible yet".

use std::time::Duration;

use availability::{Deadline, WaitConfig, Waiter, classify_status_text};
use ohno::AppError;
use tick::Clock;

const SETTINGS: &str = r#"{
    "initial_backoff": "200ms",
    "max_backoff": "PT5S",
    "backoff_factor": 3.0
}"#;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    let config: WaitConfig = serde_json::from_str(SETTINGS)?;
    println!("loaded {config:?}");

    let clock = Clock::new_tokio();
    let waiter = Waiter::new(&clock).config(&config);

    let mut lookups = 0;
    let script = waiter
        .wait_with(
            Deadline::after(Duration::from_secs(10)),
            "cleanup.sh",
            |error: &String| classify_status_text(error),
            |name| {
                lookups += 1;
                let visible = lookups > 2;
                async move {
                    if visible {
                        Ok(format!("#!/bin/sh\n# {name}"))
                    } else {
                        Err(format!("script '{name}': 410 gone"))
                    }
                }
            },
        )
        .await
        .map_err(|error| AppError::new(error.to_string()))?;

    println!("script is available after {lookups} lookups:\n{script}");

    Ok(())
}
