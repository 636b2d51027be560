// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::fmt::Display;
use std::time::Duration;

use crate::constants::DEFAULT_WAITER_NAME;

/// Log events emitted by a [`Waiter`][crate::Waiter].
///
/// Nothing is reported unless the `logs` feature is enabled and the waiter opted in with
/// `enable_logs`.
#[derive(Debug, Clone)]
pub(crate) struct Telemetry {
    #[cfg(any(feature = "logs", test))]
    pub(crate) name: Cow<'static, str>,
    pub(crate) logs_enabled: bool,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(Cow::Borrowed(DEFAULT_WAITER_NAME))
    }
}

impl Telemetry {
    #[cfg_attr(not(any(feature = "logs", test)), expect(unused_variables, reason = "unused when logs feature not used"))]
    pub(crate) fn new(name: Cow<'static, str>) -> Self {
        Self {
            #[cfg(any(feature = "logs", test))]
            name,
            logs_enabled: false,
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub(crate) fn retry(&self, resource_id: &impl Display, attempt: u32, retry_delay: Duration) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "availability.retry",
                tracing::Level::DEBUG,
                waiter.name = %self.name,
                resource.id = %resource_id,
                attempt.index = attempt,
                retry.delay = retry_delay.as_secs_f32(),
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub(crate) fn terminal(&self, resource_id: &impl Display, attempt: u32) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "availability.terminal",
                tracing::Level::DEBUG,
                waiter.name = %self.name,
                resource.id = %resource_id,
                attempt.index = attempt,
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    pub(crate) fn deadline_exceeded(&self, resource_id: &impl Display, attempts: u32) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "availability.deadline_exceeded",
                tracing::Level::WARN,
                waiter.name = %self.name,
                resource.id = %resource_id,
                attempts = attempts,
            );
        }
    }
}
