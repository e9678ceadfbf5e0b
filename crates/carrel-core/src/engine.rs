//! Seat time engine
//!
//! Derives expiry instants from the facility configuration, decides whether
//! a seat may be renewed, and projects instants onto the wall clock for
//! display. Every method takes the caller's [`ClockReading`] so one reading
//! serves a whole operation.

use carrel_config::FacilityConfig;
use carrel_util::{AbsoluteTime, ClockReading, OccupantName, SeatId, SECONDS_PER_DAY};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::{OperatingWindow, Seat, UntilClose};

/// Renewal would not gain any time before closing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not renewable before closing")]
pub struct NotRenewable;

/// An instant shown as a local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClockProjection {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Days after the reading's day; 0 for today, including borrows back
    /// past midnight
    pub days_ahead: u32,
}

impl WallClockProjection {
    /// Project the instant `offset_secs` after `now`.
    ///
    /// Overflow carries into the next unit and past midnight counts up
    /// `days_ahead`; a negative offset borrows back into the current day.
    pub fn from_offset(now: &ClockReading, offset_secs: i64) -> Self {
        let total = now.second_of_day() + offset_secs;
        let day = total.div_euclid(SECONDS_PER_DAY);
        let sod = total.rem_euclid(SECONDS_PER_DAY);

        Self {
            hour: (sod / 3_600) as u8,
            minute: ((sod % 3_600) / 60) as u8,
            second: (sod % 60) as u8,
            days_ahead: day.max(0) as u32,
        }
    }
}

impl fmt::Display for WallClockProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.days_ahead {
            0 => {}
            1 => write!(f, "next day ")?,
            n => write!(f, "in {} days ", n)?,
        }
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// An expiry pulled back by reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clamp {
    pub seat: SeatId,
    pub occupant: OccupantName,
    pub previous_expiry: AbsoluteTime,
    pub expiry: AbsoluteTime,
}

/// Expiry arithmetic for one facility configuration
#[derive(Debug, Clone, Copy)]
pub struct SeatTimeEngine<'a> {
    config: &'a FacilityConfig,
}

impl<'a> SeatTimeEngine<'a> {
    pub fn new(config: &'a FacilityConfig) -> Self {
        Self { config }
    }

    pub fn window(&self) -> OperatingWindow {
        OperatingWindow::from(self.config)
    }

    pub fn until_close(&self, now: &ClockReading) -> UntilClose {
        self.window().seconds_until_close(now)
    }

    /// Expiry for a seat assigned at `now`: a full session, cut at closing
    pub fn assign(&self, now: &ClockReading) -> AbsoluteTime {
        let session = self.config.max_session_seconds();
        let granted = match self.until_close(now) {
            UntilClose::Seconds(left) => session.min(left),
            UntilClose::Unbounded => session,
        };
        now.instant() + granted
    }

    /// Expiry after renewing at `now`.
    ///
    /// Adds a full session on top of the current expiry, so time left over
    /// is kept; the result never passes closing.
    pub fn renew(&self, current_expiry: AbsoluteTime, now: &ClockReading) -> AbsoluteTime {
        let session = self.config.max_session_seconds();
        let extended = current_expiry - now.instant() + session;

        match self.until_close(now) {
            UntilClose::Seconds(left) if extended > left => now.instant() + left,
            _ => current_expiry + session,
        }
    }

    /// Renewal needs time left before closing and the expiry within the lead
    pub fn is_renewable(&self, expiry: AbsoluteTime, now: &ClockReading) -> bool {
        let remaining = expiry - now.instant();
        !self.until_close(now).is_reached_by(remaining)
            && remaining <= self.config.max_renew_lead_seconds()
    }

    /// New expiry for a seat whose current one runs past closing
    pub fn clamp_to_close(&self, expiry: AbsoluteTime, now: &ClockReading) -> Option<AbsoluteTime> {
        match self.until_close(now) {
            UntilClose::Seconds(left) if expiry - now.instant() > left => {
                Some(now.instant() + left)
            }
            _ => None,
        }
    }

    /// Pull every occupied seat's expiry back to the current closing time
    /// where it overshoots. Nothing changes in 24-hour mode.
    pub fn reconcile_on_close_change(&self, seats: &mut [Seat], now: &ClockReading) -> Vec<Clamp> {
        let mut clamps = Vec::new();

        for seat in seats.iter_mut() {
            let Some(expiry) = seat.expiry() else {
                continue;
            };
            let Some(clamped) = self.clamp_to_close(expiry, now) else {
                continue;
            };
            if let Some(occupant) = seat.set_expiry(clamped) {
                debug!(seat = %seat.id(), from = %expiry, to = %clamped, "Expiry clamped");
                clamps.push(Clamp {
                    seat: seat.id(),
                    occupant,
                    previous_expiry: expiry,
                    expiry: clamped,
                });
            }
        }

        clamps
    }

    /// Wall-clock time at which `expiry` falls
    pub fn project_remaining(&self, expiry: AbsoluteTime, now: &ClockReading) -> WallClockProjection {
        WallClockProjection::from_offset(now, expiry - now.instant())
    }

    /// Wall-clock time from which renewal opens, or `NotRenewable` if the
    /// expiry already reaches closing
    pub fn project_renew_deadline(
        &self,
        expiry: AbsoluteTime,
        now: &ClockReading,
    ) -> Result<WallClockProjection, NotRenewable> {
        let remaining = expiry - now.instant();
        if self.until_close(now).is_reached_by(remaining) {
            return Err(NotRenewable);
        }
        Ok(WallClockProjection::from_offset(
            now,
            remaining - self.config.max_renew_lead_seconds(),
        ))
    }
}
