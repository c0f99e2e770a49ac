//! Action rate — how many periodic actions fire per second.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Keeps `Instant + interval` from overflowing.
const MAX_INTERVAL: Duration = Duration::from_secs(4_294_967_295);

/// A finite, strictly positive number of actions per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ActionRate(f64);

impl ActionRate {
    /// Ten actions per second.
    pub const DEFAULT: Self = Self(10.0);

    /// Validate and wrap a rate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRate`] when `per_second` is zero,
    /// negative, or not finite.
    pub fn new(per_second: f64) -> Result<Self, ValidationError> {
        if per_second.is_finite() && per_second > 0.0 {
            Ok(Self(per_second))
        } else {
            Err(ValidationError::InvalidRate(per_second))
        }
    }

    #[must_use]
    pub fn per_second(self) -> f64 {
        self.0
    }

    /// Time between two consecutive actions. Saturates for vanishingly
    /// small rates.
    #[must_use]
    pub fn interval(self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.0)
            .map_or(MAX_INTERVAL, |interval| interval.min(MAX_INTERVAL))
    }
}

impl Default for ActionRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for ActionRate {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActionRate> for f64 {
    fn from(rate: ActionRate) -> Self {
        rate.0
    }
}

impl fmt::Display for ActionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", self.0)
    }
}
