//! Reading room facade
//!
//! Owns the seat table and the facility configuration, and turns every
//! change into [`CoreEvent`]s. Callers run [`ReadingRoom::refresh`] with a
//! fresh reading before showing or changing anything, so expired seats and
//! closed-hours evictions are applied first.

use carrel_config::{FacilityConfig, RoomPolicy};
use carrel_util::{AbsoluteTime, CarrelError, ClockReading, OccupantName, Result, SeatId};
use tracing::{debug, info};

use crate::{
    CoreEvent, NotRenewable, OperatingWindow, ReleaseReason, Seat, SeatRegistry, SeatState,
    SeatTimeEngine, Toggled, WallClockProjection,
};

/// What an occupant is shown about their seat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatSummary {
    pub seat: SeatId,
    pub occupant: OccupantName,
    pub expiry: AbsoluteTime,
    pub remaining_secs: i64,
    pub ends_at: WallClockProjection,
    /// Wall-clock time from which renewal opens; `None` if the expiry
    /// already reaches closing
    pub renew_from: Option<WallClockProjection>,
    pub renewable_now: bool,
}

/// One row of a seat listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatListing {
    pub seat: SeatId,
    pub state: SeatState,
    /// Only filled in for the admin view
    pub occupant: Option<OccupantName>,
}

#[derive(Debug)]
pub struct ReadingRoom {
    registry: SeatRegistry,
    config: FacilityConfig,
    max_name_length: usize,
}

impl ReadingRoom {
    pub fn new(policy: RoomPolicy) -> Self {
        info!(
            seats = policy.seat_count,
            open = %policy.facility.open(),
            close = %policy.facility.close(),
            "Reading room created"
        );
        Self {
            registry: SeatRegistry::new(policy.seat_count),
            config: policy.facility,
            max_name_length: policy.max_name_length,
        }
    }

    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    pub fn registry(&self) -> &SeatRegistry {
        &self.registry
    }

    pub fn seats(&self) -> &[Seat] {
        self.registry.seats()
    }

    pub fn seat_count(&self) -> usize {
        self.registry.len()
    }

    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    fn engine(&self) -> SeatTimeEngine<'_> {
        SeatTimeEngine::new(&self.config)
    }

    pub fn is_operating(&self, now: &ClockReading) -> bool {
        OperatingWindow::from(&self.config).contains(now)
    }

    /// Release expired seats, then, outside operating hours, every seat
    /// that is not disabled. Nothing is evicted for closing in 24-hour mode.
    pub fn refresh(&mut self, now: &ClockReading) -> Vec<CoreEvent> {
        let mut events: Vec<CoreEvent> = self
            .registry
            .sweep_expired(now)
            .into_iter()
            .map(|(seat, occupant)| CoreEvent::SeatReleased {
                seat,
                occupant,
                reason: ReleaseReason::Expired,
            })
            .collect();

        if !self.config.is_24h() && !self.is_operating(now) {
            debug!(now = %now.minute_of_day(), "Outside operating hours");
            events.extend(
                self.registry
                    .mass_reset(true)
                    .into_iter()
                    .map(|(seat, occupant)| CoreEvent::SeatReleased {
                        seat,
                        occupant,
                        reason: ReleaseReason::Closed,
                    }),
            );
        }

        log_events(&events);
        events
    }

    /// Validate a name typed at the prompt
    pub fn parse_name(&self, raw: &str) -> Result<OccupantName> {
        OccupantName::parse(raw, self.max_name_length)
    }

    /// The seat held by `name`, if any
    pub fn lookup(&self, name: &OccupantName) -> Option<SeatId> {
        self.registry.find_by_occupant(name.as_str()).map(Seat::id)
    }

    /// Whether a new patron could be seated at `now`
    pub fn ensure_vacancy(&self, now: &ClockReading) -> Result<()> {
        if !self.is_operating(now) {
            return Err(CarrelError::OutsideOperatingHours);
        }
        if self.registry.is_full() {
            return Err(CarrelError::RoomFull);
        }
        Ok(())
    }

    /// Seat a new patron
    pub fn check_in(
        &mut self,
        seat: SeatId,
        occupant: OccupantName,
        now: &ClockReading,
    ) -> Result<CoreEvent> {
        self.ensure_vacancy(now)?;
        let expiry = self
            .registry
            .assign_seat(seat, occupant.clone(), now, &self.config)?;
        Ok(CoreEvent::SeatAssigned {
            seat,
            occupant,
            expiry,
        })
    }

    /// Renew a seat, after applying expiries and closing at `now`
    pub fn renew(&mut self, seat: SeatId, now: &ClockReading) -> Result<CoreEvent> {
        self.refresh(now);
        let current = self.registry.get(seat)?;
        let occupant = current
            .occupant()
            .cloned()
            .ok_or(CarrelError::NotOccupied(seat))?;
        let previous_expiry = current.expiry().ok_or(CarrelError::NotOccupied(seat))?;

        let expiry = self.registry.renew_seat(seat, now, &self.config)?;
        Ok(CoreEvent::SeatRenewed {
            seat,
            occupant,
            previous_expiry,
            expiry,
        })
    }

    pub fn check_out(&mut self, seat: SeatId) -> Result<CoreEvent> {
        let occupant = self.registry.checkout(seat)?;
        Ok(CoreEvent::SeatReleased {
            seat,
            occupant,
            reason: ReleaseReason::CheckedOut,
        })
    }

    /// Times shown to an occupant for their seat
    pub fn seat_summary(&self, seat: SeatId, now: &ClockReading) -> Result<SeatSummary> {
        let current = self.registry.get(seat)?;
        let (occupant, expiry) = match (current.occupant(), current.expiry()) {
            (Some(occupant), Some(expiry)) => (occupant.clone(), expiry),
            _ => return Err(CarrelError::NotOccupied(seat)),
        };

        let engine = self.engine();
        let renew_from = match engine.project_renew_deadline(expiry, now) {
            Ok(projection) => Some(projection),
            Err(NotRenewable) => None,
        };

        Ok(SeatSummary {
            seat,
            occupant,
            expiry,
            remaining_secs: expiry - now.instant(),
            ends_at: engine.project_remaining(expiry, now),
            renew_from,
            renewable_now: engine.is_renewable(expiry, now),
        })
    }

    /// Seat listing for patrons: occupants are hidden
    pub fn user_view(&self) -> Vec<SeatListing> {
        self.listing(false)
    }

    /// Seat listing for the admin, with occupant names
    pub fn admin_view(&self) -> Vec<SeatListing> {
        self.listing(true)
    }

    fn listing(&self, with_names: bool) -> Vec<SeatListing> {
        self.registry
            .seats()
            .iter()
            .map(|s| SeatListing {
                seat: s.id(),
                state: s.state(),
                occupant: if with_names { s.occupant().cloned() } else { None },
            })
            .collect()
    }

    /// Free every seat that is not disabled
    pub fn reset_seats(&mut self) -> Vec<CoreEvent> {
        let events: Vec<CoreEvent> = self
            .registry
            .mass_reset(true)
            .into_iter()
            .map(|(seat, occupant)| CoreEvent::SeatReleased {
                seat,
                occupant,
                reason: ReleaseReason::Reset,
            })
            .collect();
        log_events(&events);
        events
    }

    /// Change the maximum session length. Returns the lowered renewal lead
    /// if the new session is shorter than it.
    pub fn set_max_session(&mut self, minutes: u32) -> Result<Option<u32>> {
        self.config.set_max_session_minutes(minutes)
    }

    pub fn set_renew_lead(&mut self, minutes: u32) -> Result<()> {
        self.config.set_max_renew_lead_minutes(minutes)
    }

    /// Change the opening time and clamp expiries to the resulting closing
    pub fn set_opening(&mut self, minute: u32, now: &ClockReading) -> Result<Vec<CoreEvent>> {
        self.config.set_open_minute(minute)?;
        Ok(self.reconcile(now))
    }

    /// Change the closing time and clamp expiries past it
    pub fn set_closing(&mut self, minute: u32, now: &ClockReading) -> Result<Vec<CoreEvent>> {
        self.config.set_close_minute(minute)?;
        Ok(self.reconcile(now))
    }

    fn reconcile(&mut self, now: &ClockReading) -> Vec<CoreEvent> {
        let events: Vec<CoreEvent> = self
            .registry
            .reconcile_on_close_change(now, &self.config)
            .into_iter()
            .map(|clamp| CoreEvent::ExpiryClamped {
                seat: clamp.seat,
                occupant: clamp.occupant,
                previous_expiry: clamp.previous_expiry,
                expiry: clamp.expiry,
            })
            .collect();
        log_events(&events);
        events
    }

    /// Disable a seat (evicting its occupant) or enable a disabled one
    pub fn toggle_seat(&mut self, seat: SeatId) -> Result<Vec<CoreEvent>> {
        let events = match self.registry.toggle_availability(seat)? {
            Toggled::Disabled { evicted } => {
                let mut events = Vec::new();
                if let Some(occupant) = evicted {
                    events.push(CoreEvent::SeatReleased {
                        seat,
                        occupant,
                        reason: ReleaseReason::Disabled,
                    });
                }
                events.push(CoreEvent::SeatDisabled { seat });
                events
            }
            Toggled::Enabled => vec![CoreEvent::SeatEnabled { seat }],
        };
        Ok(events)
    }
}

fn log_events(events: &[CoreEvent]) {
    for event in events {
        match event {
            CoreEvent::SeatReleased {
                seat,
                occupant,
                reason,
            } => {
                info!(seat = %seat, occupant = %occupant, reason = ?reason, "Seat released");
            }
            CoreEvent::ExpiryClamped {
                seat,
                previous_expiry,
                expiry,
                ..
            } => {
                info!(seat = %seat, from = %previous_expiry, to = %expiry, "Expiry clamped to closing");
            }
            other => debug!(event = ?other, "Core event"),
        }
    }
}
