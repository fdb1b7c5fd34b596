//! Time control: base time plus per-move increment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base time and increment for both clocks of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    pub base: Duration,
    pub increment: Duration,
}

impl TimeControl {
    pub fn new(base: Duration, increment: Duration) -> Self {
        Self { base, increment }
    }

    pub fn from_secs(base_secs: u32, increment_secs: u32) -> Self {
        Self {
            base: Duration::from_secs(base_secs.into()),
            increment: Duration::from_secs(increment_secs.into()),
        }
    }

    pub fn base_ms(&self) -> f64 {
        self.base.as_secs_f64() * 1000.0
    }

    pub fn increment_ms(&self) -> f64 {
        self.increment.as_secs_f64() * 1000.0
    }

    pub fn base_secs(&self) -> u64 {
        self.base.as_secs()
    }

    pub fn increment_secs(&self) -> u64 {
        self.increment.as_secs()
    }
}

/// Round a millisecond clock reading to whole seconds for display.
///
/// Rounds rather than truncates so a clock banked at 59_999.6 ms shows 60.
pub fn display_seconds(remaining_ms: f64) -> u64 {
    if remaining_ms <= 0.0 {
        0
    } else {
        (remaining_ms / 1000.0).round() as u64
    }
}
