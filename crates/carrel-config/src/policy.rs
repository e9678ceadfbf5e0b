//! Validated configuration structures

use crate::schema::RawConfig;
use crate::validation::parse_time;
use crate::ConfigResult;
use carrel_util::{CarrelError, MinuteOfDay, Result, DEFAULT_MAX_NAME_LENGTH};
use tracing::info;

/// Upper bound for the session length: one full day
pub const MAX_SESSION_MINUTES: u32 = 1_440;

pub const DEFAULT_SEAT_COUNT: usize = 10;
pub const DEFAULT_MAX_SESSION_MINUTES: u32 = 240;
pub const DEFAULT_RENEW_LEAD_MINUTES: u32 = 30;

/// Startup policy for one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPolicy {
    pub seat_count: usize,
    pub max_name_length: usize,
    pub facility: FacilityConfig,
}

impl RoomPolicy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        let defaults = FacilityConfig::default();

        let open = match &raw.hours.open {
            Some(s) => parse_time(s)?,
            None => defaults.open(),
        };
        let close = match &raw.hours.close {
            Some(s) => parse_time(s)?,
            None => defaults.close(),
        };

        let facility = FacilityConfig::new(
            raw.session
                .max_minutes
                .unwrap_or(DEFAULT_MAX_SESSION_MINUTES),
            raw.session
                .renew_lead_minutes
                .unwrap_or(DEFAULT_RENEW_LEAD_MINUTES),
            open,
            close,
        )?;

        Ok(Self {
            seat_count: raw.room.seats.unwrap_or(DEFAULT_SEAT_COUNT),
            max_name_length: raw.room.max_name_length.unwrap_or(DEFAULT_MAX_NAME_LENGTH),
            facility,
        })
    }
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self {
            seat_count: DEFAULT_SEAT_COUNT,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            facility: FacilityConfig::default(),
        }
    }
}

/// Operating parameters of the facility.
///
/// Fields are private so that every change goes through a setter that keeps
/// `max_renew_lead_minutes <= max_session_minutes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityConfig {
    max_session_minutes: u32,
    max_renew_lead_minutes: u32,
    open: MinuteOfDay,
    close: MinuteOfDay,
}

impl FacilityConfig {
    pub fn new(
        max_session_minutes: u32,
        max_renew_lead_minutes: u32,
        open: MinuteOfDay,
        close: MinuteOfDay,
    ) -> Result<Self> {
        check_session_minutes(max_session_minutes)?;
        check_renew_lead(max_renew_lead_minutes, max_session_minutes)?;
        Ok(Self {
            max_session_minutes,
            max_renew_lead_minutes,
            open,
            close,
        })
    }

    pub fn max_session_minutes(&self) -> u32 {
        self.max_session_minutes
    }

    pub fn max_session_seconds(&self) -> i64 {
        self.max_session_minutes as i64 * 60
    }

    pub fn max_renew_lead_minutes(&self) -> u32 {
        self.max_renew_lead_minutes
    }

    pub fn max_renew_lead_seconds(&self) -> i64 {
        self.max_renew_lead_minutes as i64 * 60
    }

    pub fn open(&self) -> MinuteOfDay {
        self.open
    }

    pub fn close(&self) -> MinuteOfDay {
        self.close
    }

    /// Opening and closing at the same minute means the room never closes
    pub fn is_24h(&self) -> bool {
        self.open == self.close
    }

    /// Change the maximum session length.
    ///
    /// A session shorter than the current renewal lead pulls the lead down
    /// with it; the new lead is returned in that case.
    pub fn set_max_session_minutes(&mut self, minutes: u32) -> Result<Option<u32>> {
        check_session_minutes(minutes)?;
        self.max_session_minutes = minutes;
        info!(minutes, "Maximum session length changed");

        if self.max_renew_lead_minutes > minutes {
            self.max_renew_lead_minutes = minutes;
            info!(minutes, "Renewal lead lowered to match session length");
            return Ok(Some(minutes));
        }
        Ok(None)
    }

    /// Change the renewal lead. Rejected (and left unchanged) if it would
    /// exceed the maximum session length.
    pub fn set_max_renew_lead_minutes(&mut self, minutes: u32) -> Result<()> {
        check_renew_lead(minutes, self.max_session_minutes)?;
        self.max_renew_lead_minutes = minutes;
        info!(minutes, "Renewal lead changed");
        Ok(())
    }

    pub fn set_open_minute(&mut self, minute: u32) -> Result<()> {
        self.open = check_minute_of_day(minute, "opening")?;
        info!(open = %self.open, "Opening time changed");
        Ok(())
    }

    pub fn set_close_minute(&mut self, minute: u32) -> Result<()> {
        self.close = check_minute_of_day(minute, "closing")?;
        info!(close = %self.close, "Closing time changed");
        Ok(())
    }
}

impl Default for FacilityConfig {
    /// 4-hour sessions, renewable in the last 30 minutes, open around the clock
    fn default() -> Self {
        Self {
            max_session_minutes: DEFAULT_MAX_SESSION_MINUTES,
            max_renew_lead_minutes: DEFAULT_RENEW_LEAD_MINUTES,
            open: MinuteOfDay::LAST,
            close: MinuteOfDay::LAST,
        }
    }
}

fn check_session_minutes(minutes: u32) -> Result<()> {
    if minutes == 0 || minutes > MAX_SESSION_MINUTES {
        return Err(CarrelError::config(
            "maximum session length must be between 1 minute and 24 hours",
        ));
    }
    Ok(())
}

fn check_renew_lead(lead: u32, session: u32) -> Result<()> {
    if lead > session {
        return Err(CarrelError::config(
            "renewal lead cannot exceed the maximum session length",
        ));
    }
    Ok(())
}

fn check_minute_of_day(minute: u32, what: &str) -> Result<MinuteOfDay> {
    MinuteOfDay::new(minute).ok_or_else(|| {
        CarrelError::config(format!("{} time must be between 00:00 and 23:59", what))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> MinuteOfDay {
        MinuteOfDay::from_hm(h, m).unwrap()
    }

    #[test]
    fn defaults_run_around_the_clock() {
        let cfg = FacilityConfig::default();
        assert_eq!(cfg.max_session_minutes(), 240);
        assert_eq!(cfg.max_renew_lead_minutes(), 30);
        assert!(cfg.is_24h());
        assert_eq!(cfg.max_session_seconds(), 14_400);
        assert_eq!(cfg.max_renew_lead_seconds(), 1_800);
    }

    #[test]
    fn new_rejects_lead_longer_than_session() {
        let err = FacilityConfig::new(60, 61, hm(8, 0), hm(22, 0)).unwrap_err();
        assert!(matches!(err, CarrelError::ConfigInvariantViolation(_)));
        assert!(FacilityConfig::new(60, 60, hm(8, 0), hm(22, 0)).is_ok());
    }

    #[test]
    fn session_length_bounds() {
        let mut cfg = FacilityConfig::default();
        assert!(cfg.set_max_session_minutes(0).is_err());
        assert!(cfg.set_max_session_minutes(1_441).is_err());
        assert_eq!(cfg.max_session_minutes(), 240);

        assert_eq!(cfg.set_max_session_minutes(1_440).unwrap(), None);
        assert_eq!(cfg.max_session_minutes(), 1_440);
    }

    #[test]
    fn shortening_session_pulls_lead_down() {
        let mut cfg = FacilityConfig::default();
        assert_eq!(cfg.set_max_session_minutes(20).unwrap(), Some(20));
        assert_eq!(cfg.max_renew_lead_minutes(), 20);
        assert!(cfg.max_renew_lead_minutes() <= cfg.max_session_minutes());
    }

    #[test]
    fn lead_edit_restores_previous_value_on_violation() {
        let mut cfg = FacilityConfig::default();
        let err = cfg.set_max_renew_lead_minutes(241).unwrap_err();
        assert!(matches!(err, CarrelError::ConfigInvariantViolation(_)));
        assert_eq!(cfg.max_renew_lead_minutes(), 30);

        cfg.set_max_renew_lead_minutes(0).unwrap();
        assert_eq!(cfg.max_renew_lead_minutes(), 0);
        cfg.set_max_renew_lead_minutes(240).unwrap();
        assert_eq!(cfg.max_renew_lead_minutes(), 240);
    }

    #[test]
    fn lead_never_exceeds_session_across_edits() {
        let mut cfg = FacilityConfig::default();
        for (session, lead) in [(100, 90), (50, 40), (300, 300), (10, 5), (1, 0)] {
            let _ = cfg.set_max_session_minutes(session);
            let _ = cfg.set_max_renew_lead_minutes(lead);
            assert!(cfg.max_renew_lead_minutes() <= cfg.max_session_minutes());
        }
    }

    #[test]
    fn opening_and_closing_bounds() {
        let mut cfg = FacilityConfig::default();
        assert!(cfg.set_open_minute(1_440).is_err());
        assert_eq!(cfg.open(), MinuteOfDay::LAST);

        cfg.set_open_minute(8 * 60).unwrap();
        cfg.set_close_minute(22 * 60).unwrap();
        assert_eq!(cfg.open(), hm(8, 0));
        assert_eq!(cfg.close(), hm(22, 0));
        assert!(!cfg.is_24h());

        cfg.set_close_minute(8 * 60).unwrap();
        assert!(cfg.is_24h());
    }
}
