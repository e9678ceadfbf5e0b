//! Operating-hours arithmetic
//!
//! Opening and closing are minutes of the day and the window may wrap past
//! midnight (`open > close`). `open == close` is 24-hour operation.

use carrel_config::FacilityConfig;
use carrel_util::{ClockReading, MinuteOfDay, SECONDS_PER_DAY};

/// Time left until the room closes.
///
/// Variant order matters: every `Seconds(_)` compares less than
/// `Unbounded`, which is greater than any legal session length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UntilClose {
    Seconds(i64),
    /// 24-hour operation: closing never limits anything
    Unbounded,
}

impl UntilClose {
    pub fn seconds(&self) -> Option<i64> {
        match self {
            UntilClose::Seconds(s) => Some(*s),
            UntilClose::Unbounded => None,
        }
    }

    /// Whether `secs` from now already reaches closing
    pub fn is_reached_by(&self, secs: i64) -> bool {
        match self {
            UntilClose::Seconds(limit) => secs >= *limit,
            UntilClose::Unbounded => false,
        }
    }
}

/// The [open, close) window of the facility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    pub open: MinuteOfDay,
    pub close: MinuteOfDay,
}

impl OperatingWindow {
    pub fn new(open: MinuteOfDay, close: MinuteOfDay) -> Self {
        Self { open, close }
    }

    pub fn is_24h(&self) -> bool {
        self.open == self.close
    }

    /// Check if the given reading falls within operating hours
    pub fn contains(&self, now: &ClockReading) -> bool {
        let t = now.second_of_day();
        let open = self.open.as_seconds();
        let close = self.close.as_seconds();

        if open == close {
            true
        } else if open < close {
            open <= t && t < close
        } else {
            // Window crosses midnight (e.g., 22:00 - 08:00)
            !(close <= t && t < open)
        }
    }

    /// Seconds from `now` until the next closing
    pub fn seconds_until_close(&self, now: &ClockReading) -> UntilClose {
        if self.is_24h() {
            return UntilClose::Unbounded;
        }

        let t = now.second_of_day();
        let open = self.open.as_seconds();
        let close = self.close.as_seconds();

        let secs = if open < close || t < open {
            // Same-day window, or the post-midnight part of an overnight one
            close - t
        } else {
            // Evening part of an overnight window: closing is tomorrow
            close + SECONDS_PER_DAY - t
        };
        UntilClose::Seconds(secs)
    }
}

impl From<&FacilityConfig> for OperatingWindow {
    fn from(cfg: &FacilityConfig) -> Self {
        Self::new(cfg.open(), cfg.close())
    }
}

pub fn is_operating(now: &ClockReading, cfg: &FacilityConfig) -> bool {
    OperatingWindow::from(cfg).contains(now)
}

pub fn seconds_until_close(now: &ClockReading, cfg: &FacilityConfig) -> UntilClose {
    OperatingWindow::from(cfg).seconds_until_close(now)
}
