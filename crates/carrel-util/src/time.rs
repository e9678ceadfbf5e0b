//! Time primitives for carrel
//!
//! Seat expiries are absolute instants (epoch seconds). Opening and closing
//! times are minutes of the local day. A [`ClockReading`] pairs the two views
//! of "now" so that one snapshot can be threaded through every computation
//! of a single operation.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `CARREL_MOCK_TIME` environment variable can be set
//! to shift the system clock. This is useful for trying out overnight
//! operating windows without waiting for midnight.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 23:30:00`)
//!
//! Example:
//! ```bash
//! CARREL_MOCK_TIME="2025-12-25 23:30:00" cargo run -p carrel
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "CARREL_MOCK_TIME";

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const MINUTES_PER_DAY: u32 = 1_440;

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive_dt) = NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S")
            else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    expected_format = "%Y-%m-%d %H:%M:%S",
                    "Invalid mock time format"
                );
                return None;
            };
            let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    "Failed to convert mock time to local timezone"
                );
                return None;
            };
            let offset = mock_dt.signed_duration_since(Local::now());
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();
    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// An absolute instant, in seconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AbsoluteTime(i64);

impl AbsoluteTime {
    pub fn from_epoch_seconds(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_epoch_seconds(&self) -> i64 {
        self.0
    }

    /// Signed number of seconds from `earlier` to `self`
    pub fn seconds_since(&self, earlier: AbsoluteTime) -> i64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<i64> for AbsoluteTime {
    type Output = AbsoluteTime;

    fn add(self, rhs: i64) -> Self::Output {
        AbsoluteTime(self.0 + rhs)
    }
}

impl std::ops::Sub<i64> for AbsoluteTime {
    type Output = AbsoluteTime;

    fn sub(self, rhs: i64) -> Self::Output {
        AbsoluteTime(self.0 - rhs)
    }
}

impl std::ops::Sub for AbsoluteTime {
    type Output = i64;

    fn sub(self, rhs: AbsoluteTime) -> Self::Output {
        self.seconds_since(rhs)
    }
}

impl fmt::Display for AbsoluteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Local.timestamp_opt(self.0, 0).single() {
            Some(dt) => write!(f, "{}", format_datetime_full(&dt)),
            None => write!(f, "@{}", self.0),
        }
    }
}

/// A minute of the local day, in `[0, 1440)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);
    pub const LAST: MinuteOfDay = MinuteOfDay(1_439);

    pub fn new(minute: u32) -> Option<Self> {
        if minute < MINUTES_PER_DAY {
            Some(Self(minute as u16))
        } else {
            None
        }
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Self::new(hour * 60 + minute)
        } else {
            None
        }
    }

    pub fn hour(&self) -> u32 {
        self.0 as u32 / 60
    }

    pub fn minute(&self) -> u32 {
        self.0 as u32 % 60
    }

    pub fn as_minutes(&self) -> u32 {
        self.0 as u32
    }

    /// Returns seconds since midnight
    pub fn as_seconds(&self) -> i64 {
        self.0 as i64 * 60
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// One reading of the clock: the absolute instant plus its position in the
/// local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockReading {
    instant: AbsoluteTime,
    second_of_day: u32,
}

impl ClockReading {
    pub fn new(instant: AbsoluteTime, second_of_day: u32) -> Self {
        Self {
            instant,
            second_of_day: second_of_day % SECONDS_PER_DAY as u32,
        }
    }

    /// Reading at epoch second `epoch` whose local wall clock shows `hour:minute:second`
    pub fn at_hms(epoch: i64, hour: u32, minute: u32, second: u32) -> Self {
        Self::new(
            AbsoluteTime::from_epoch_seconds(epoch),
            hour * 3_600 + minute * 60 + second,
        )
    }

    pub fn from_datetime(dt: &DateTime<Local>) -> Self {
        Self::new(
            AbsoluteTime::from_epoch_seconds(dt.timestamp()),
            dt.num_seconds_from_midnight(),
        )
    }

    pub fn instant(&self) -> AbsoluteTime {
        self.instant
    }

    pub fn second_of_day(&self) -> i64 {
        self.second_of_day as i64
    }

    pub fn minute_of_day(&self) -> MinuteOfDay {
        MinuteOfDay((self.second_of_day / 60) as u16)
    }

    /// The reading `secs` seconds later (or earlier, if negative)
    pub fn advanced_by(&self, secs: i64) -> Self {
        let sod = (self.second_of_day as i64 + secs).rem_euclid(SECONDS_PER_DAY);
        Self {
            instant: self.instant + secs,
            second_of_day: sod as u32,
        }
    }
}

/// Supplies the current time
pub trait ClockSource {
    fn now(&self) -> ClockReading;
}

impl<T: ClockSource + ?Sized> ClockSource for &T {
    fn now(&self) -> ClockReading {
        (**self).now()
    }
}

/// The local system clock (honours `CARREL_MOCK_TIME` in debug builds)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> ClockReading {
        ClockReading::from_datetime(&now())
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    reading: Cell<ClockReading>,
}

impl ManualClock {
    pub fn new(reading: ClockReading) -> Self {
        Self {
            reading: Cell::new(reading),
        }
    }

    pub fn set(&self, reading: ClockReading) {
        self.reading.set(reading);
    }

    pub fn advance(&self, secs: i64) {
        self.reading.set(self.reading.get().advanced_by(secs));
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> ClockReading {
        self.reading.get()
    }
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Helper to format a number of seconds in human-readable form
pub fn format_duration(secs: i64) -> String {
    let total_secs = secs.max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
