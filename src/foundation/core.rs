use std::time::Duration;

use crate::foundation::error::{TimelineError, TimelineResult};

/// Handle to an element owned by a [`Surface`](crate::Surface).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u32);

/// Handle to a recurring timer started through a [`Timer`](crate::Timer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Handle to a GET issued through a [`Transport`](crate::Transport).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// Conversion between simulated years of age and timer ticks.
///
/// The reference cadence shows one year of a life over 2000 ms, sampled every 250 ms, which gives
/// 8 ticks per year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TickRate {
    /// Interval between two ticks, in milliseconds. Must be non-zero.
    pub tick_ms: u32,
    /// Wall time used to play one simulated year, in milliseconds. Must be non-zero.
    pub ms_per_year: u32,
}

impl TickRate {
    pub const DEFAULT_TICK_MS: u32 = 250;
    pub const DEFAULT_MS_PER_YEAR: u32 = 2000;

    /// Create a validated tick rate.
    pub fn new(tick_ms: u32, ms_per_year: u32) -> TimelineResult<Self> {
        if tick_ms == 0 {
            return Err(TimelineError::validation("tick_ms must be > 0"));
        }
        if ms_per_year == 0 {
            return Err(TimelineError::validation("ms_per_year must be > 0"));
        }
        Ok(Self {
            tick_ms,
            ms_per_year,
        })
    }

    /// Number of ticks that make up one simulated year.
    pub fn ticks_per_year(self) -> f64 {
        f64::from(self.ms_per_year) / f64::from(self.tick_ms)
    }

    /// Interval at which the playback timer fires.
    pub fn tick_interval(self) -> Duration {
        Duration::from_millis(u64::from(self.tick_ms))
    }

    /// Convert a span of years to whole ticks, rounding to the nearest tick.
    ///
    /// Negative or non-finite spans map to zero ticks.
    pub fn years_to_ticks(self, years: f64) -> u64 {
        if !years.is_finite() || years <= 0.0 {
            return 0;
        }
        (years * self.ticks_per_year()).round() as u64
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self {
            tick_ms: Self::DEFAULT_TICK_MS,
            ms_per_year: Self::DEFAULT_MS_PER_YEAR,
        }
    }
}
