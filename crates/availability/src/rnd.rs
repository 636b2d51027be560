// Copyright (c) Microsoft Corporation.

/// Source of the jitter applied to backoff delays.
///
/// Not cryptographically secure. Jitter only needs to spread concurrent callers
/// apart, so `fastrand` is enough.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) enum Rnd {
    #[default]
    Fastrand,

    #[cfg(test)]
    Fixed(f64),
}

impl Rnd {
    #[cfg(test)]
    pub fn new_fixed(value: f64) -> Self {
        Self::Fixed(value)
    }

    /// Returns a value in `[0, 1)`.
    pub fn next_f64(self) -> f64 {
        match self {
            Self::Fastrand => fastrand::f64(),
            #[cfg(test)]
            Self::Fixed(value) => value,
        }
    }
}
