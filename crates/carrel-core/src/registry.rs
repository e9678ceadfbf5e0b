//! Seat table and seat state machine
//!
//! Each seat is `Free`, `Occupied` (with an occupant and an expiry) or
//! `Disabled`. The occupant and expiry live inside the `Occupied` variant so
//! a free or disabled seat can never carry stale occupant data.

use carrel_config::FacilityConfig;
use carrel_util::{AbsoluteTime, CarrelError, ClockReading, OccupantName, Result, SeatId};
use tracing::{debug, info};

use crate::{Clamp, SeatTimeEngine};

/// State of a single seat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatStatus {
    Free,
    Occupied {
        occupant: OccupantName,
        expiry: AbsoluteTime,
    },
    Disabled,
}

/// Data-free tag for [`SeatStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Free,
    Occupied,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    id: SeatId,
    status: SeatStatus,
}

impl Seat {
    pub fn new(id: SeatId) -> Self {
        Self {
            id,
            status: SeatStatus::Free,
        }
    }

    pub fn id(&self) -> SeatId {
        self.id
    }

    pub fn status(&self) -> &SeatStatus {
        &self.status
    }

    pub fn state(&self) -> SeatState {
        match self.status {
            SeatStatus::Free => SeatState::Free,
            SeatStatus::Occupied { .. } => SeatState::Occupied,
            SeatStatus::Disabled => SeatState::Disabled,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.status, SeatStatus::Free)
    }

    pub fn is_occupied(&self) -> bool {
        matches!(self.status, SeatStatus::Occupied { .. })
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.status, SeatStatus::Disabled)
    }

    pub fn occupant(&self) -> Option<&OccupantName> {
        match &self.status {
            SeatStatus::Occupied { occupant, .. } => Some(occupant),
            _ => None,
        }
    }

    pub fn expiry(&self) -> Option<AbsoluteTime> {
        match self.status {
            SeatStatus::Occupied { expiry, .. } => Some(expiry),
            _ => None,
        }
    }

    /// Move an occupied seat to a new expiry, returning its occupant.
    /// Free and disabled seats are left alone.
    pub(crate) fn set_expiry(&mut self, new_expiry: AbsoluteTime) -> Option<OccupantName> {
        match &mut self.status {
            SeatStatus::Occupied { occupant, expiry } => {
                *expiry = new_expiry;
                Some(occupant.clone())
            }
            _ => None,
        }
    }

    /// Free the seat, returning whoever held it
    fn release(&mut self) -> Option<OccupantName> {
        match std::mem::replace(&mut self.status, SeatStatus::Free) {
            SeatStatus::Occupied { occupant, .. } => Some(occupant),
            other => {
                self.status = other;
                None
            }
        }
    }
}

/// Result of toggling a seat's availability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    /// The seat is now disabled; the evicted occupant, if any
    Disabled { evicted: Option<OccupantName> },
    /// The seat is free again
    Enabled,
}

/// The fixed set of seats in the room
#[derive(Debug, Clone)]
pub struct SeatRegistry {
    seats: Vec<Seat>,
}

impl SeatRegistry {
    /// A room of `count` seats, all free
    pub fn new(count: usize) -> Self {
        Self {
            seats: (0..count).map(|i| Seat::new(SeatId::from_index(i))).collect(),
        }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn get(&self, id: SeatId) -> Result<&Seat> {
        self.seats
            .get(id.index())
            .ok_or(CarrelError::UnknownSeat(id.number()))
    }

    fn get_mut(&mut self, id: SeatId) -> Result<&mut Seat> {
        self.seats
            .get_mut(id.index())
            .ok_or(CarrelError::UnknownSeat(id.number()))
    }

    /// The seat held by `name`, if any. Names match exactly.
    pub fn find_by_occupant(&self, name: &str) -> Option<&Seat> {
        self.seats
            .iter()
            .find(|s| s.occupant().is_some_and(|o| o.as_str() == name))
    }

    /// No seat is free. Disabled seats count as unavailable.
    pub fn is_full(&self) -> bool {
        !self.seats.iter().any(Seat::is_free)
    }

    pub fn available_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.is_free())
    }

    pub fn occupied_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_occupied()).count()
    }

    /// Give a free seat to `occupant` until the computed expiry
    pub fn assign_seat(
        &mut self,
        id: SeatId,
        occupant: OccupantName,
        now: &ClockReading,
        config: &FacilityConfig,
    ) -> Result<AbsoluteTime> {
        if self.find_by_occupant(occupant.as_str()).is_some() {
            return Err(CarrelError::invalid_input(format!(
                "{} already holds a seat",
                occupant
            )));
        }

        let seat = self.get_mut(id)?;
        if !seat.is_free() {
            return Err(CarrelError::SeatUnavailable(id));
        }

        let expiry = SeatTimeEngine::new(config).assign(now);
        info!(seat = %id, occupant = %occupant, expiry = %expiry, "Seat assigned");
        seat.status = SeatStatus::Occupied { occupant, expiry };
        Ok(expiry)
    }

    /// Extend an occupied seat if it is inside the renewal window.
    ///
    /// A seat whose expiry has passed is released instead and reported as
    /// not occupied.
    pub fn renew_seat(
        &mut self,
        id: SeatId,
        now: &ClockReading,
        config: &FacilityConfig,
    ) -> Result<AbsoluteTime> {
        let engine = SeatTimeEngine::new(config);
        let seat = self.get_mut(id)?;
        let expiry = seat.expiry().ok_or(CarrelError::NotOccupied(id))?;

        if expiry <= now.instant() {
            if let Some(occupant) = seat.release() {
                debug!(seat = %id, occupant = %occupant, "Seat expired before renewal");
            }
            return Err(CarrelError::NotOccupied(id));
        }

        if !engine.is_renewable(expiry, now) {
            return Err(CarrelError::NotRenewable(id));
        }

        let renewed = engine.renew(expiry, now);
        seat.set_expiry(renewed);
        info!(seat = %id, from = %expiry, to = %renewed, "Seat renewed");
        Ok(renewed)
    }

    /// Release an occupied seat
    pub fn checkout(&mut self, id: SeatId) -> Result<OccupantName> {
        let seat = self.get_mut(id)?;
        let occupant = seat.release().ok_or(CarrelError::NotOccupied(id))?;
        info!(seat = %id, occupant = %occupant, "Seat checked out");
        Ok(occupant)
    }

    /// Disable a seat (evicting its occupant) or re-enable a disabled one
    pub fn toggle_availability(&mut self, id: SeatId) -> Result<Toggled> {
        let seat = self.get_mut(id)?;
        let toggled = if seat.is_disabled() {
            seat.status = SeatStatus::Free;
            Toggled::Enabled
        } else {
            let evicted = seat.release();
            seat.status = SeatStatus::Disabled;
            Toggled::Disabled { evicted }
        };
        info!(seat = %id, result = ?toggled, "Seat availability toggled");
        Ok(toggled)
    }

    /// Free every seat whose expiry is at or before `now`
    pub fn sweep_expired(&mut self, now: &ClockReading) -> Vec<(SeatId, OccupantName)> {
        let mut released = Vec::new();
        for seat in &mut self.seats {
            if seat.expiry().is_some_and(|e| e <= now.instant())
                && let Some(occupant) = seat.release()
            {
                debug!(seat = %seat.id(), occupant = %occupant, "Seat expired");
                released.push((seat.id(), occupant));
            }
        }
        released
    }

    /// Free every seat.
    ///
    /// With `keep_disabled`, disabled seats stay disabled; otherwise they
    /// are re-enabled too. Returns the evicted occupants.
    pub fn mass_reset(&mut self, keep_disabled: bool) -> Vec<(SeatId, OccupantName)> {
        let mut evicted = Vec::new();
        for seat in &mut self.seats {
            if let Some(occupant) = seat.release() {
                evicted.push((seat.id(), occupant));
            } else if seat.is_disabled() && !keep_disabled {
                seat.status = SeatStatus::Free;
            }
        }
        info!(evicted = evicted.len(), keep_disabled, "Seats reset");
        evicted
    }

    /// Pull expiries past the current closing time back to it
    pub fn reconcile_on_close_change(
        &mut self,
        now: &ClockReading,
        config: &FacilityConfig,
    ) -> Vec<Clamp> {
        SeatTimeEngine::new(config).reconcile_on_close_change(&mut self.seats, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrel_util::MinuteOfDay;

    const T: i64 = 1_700_000_000;

    fn name(s: &str) -> OccupantName {
        OccupantName::parse(s, 19).unwrap()
    }

    fn seat(n: usize) -> SeatId {
        SeatId::from_number(n).unwrap()
    }

    fn at(h: u32, m: u32) -> ClockReading {
        ClockReading::at_hms(T, h, m, 0)
    }

    fn day_hours() -> FacilityConfig {
        FacilityConfig::new(
            240,
            30,
            MinuteOfDay::from_hm(9, 0).unwrap(),
            MinuteOfDay::from_hm(18, 0).unwrap(),
        )
        .unwrap()
    }

    fn assert_consistent(reg: &SeatRegistry) {
        for s in reg.seats() {
            assert_eq!(s.is_occupied(), s.occupant().is_some());
            assert_eq!(s.is_occupied(), s.expiry().is_some());
        }
    }

    #[test]
    fn test_new_registry_is_all_free() {
        let reg = SeatRegistry::new(3);
        assert_eq!(reg.len(), 3);
        assert!(!reg.is_full());
        assert_eq!(reg.available_seats().count(), 3);
        assert_eq!(reg.get(seat(3)).unwrap().state(), SeatState::Free);
        assert!(matches!(reg.get(seat(4)), Err(CarrelError::UnknownSeat(4))));
    }

    #[test]
    fn test_assign_and_lookup() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(3);
        let now = at(10, 0);

        let expiry = reg.assign_seat(seat(2), name("alice"), &now, &cfg).unwrap();
        assert_eq!(expiry, now.instant() + 14_400);

        let found = reg.find_by_occupant("alice").unwrap();
        assert_eq!(found.id(), seat(2));
        assert_eq!(found.expiry(), Some(expiry));
        assert!(reg.find_by_occupant("Alice").is_none());
        assert_eq!(reg.occupied_count(), 1);
        assert_consistent(&reg);
    }

    #[test]
    fn test_assign_rejects_taken_seat_and_duplicate_name() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(3);
        let now = at(10, 0);
        reg.assign_seat(seat(1), name("alice"), &now, &cfg).unwrap();

        assert_eq!(
            reg.assign_seat(seat(1), name("bob"), &now, &cfg),
            Err(CarrelError::SeatUnavailable(seat(1)))
        );
        assert!(matches!(
            reg.assign_seat(seat(2), name("alice"), &now, &cfg),
            Err(CarrelError::InvalidInput(_))
        ));
        assert!(reg.get(seat(2)).unwrap().is_free());
    }

    #[test]
    fn test_disabled_and_occupied_means_full() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(2);
        reg.toggle_availability(seat(1)).unwrap();
        reg.assign_seat(seat(2), name("bob"), &at(10, 0), &cfg).unwrap();
        assert!(reg.is_full());
        assert_eq!(reg.available_seats().count(), 0);
    }

    #[test]
    fn test_assign_to_disabled_seat_fails() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(2);
        reg.toggle_availability(seat(1)).unwrap();
        assert_eq!(
            reg.assign_seat(seat(1), name("bob"), &at(10, 0), &cfg),
            Err(CarrelError::SeatUnavailable(seat(1)))
        );
    }

    #[test]
    fn test_checkout_then_reassign() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(1);
        let now = at(10, 0);
        reg.assign_seat(seat(1), name("alice"), &now, &cfg).unwrap();
        assert!(reg.is_full());

        assert_eq!(reg.checkout(seat(1)).unwrap(), name("alice"));
        assert!(reg.get(seat(1)).unwrap().is_free());
        assert_eq!(reg.checkout(seat(1)), Err(CarrelError::NotOccupied(seat(1))));

        reg.assign_seat(seat(1), name("bob"), &now, &cfg).unwrap();
        assert_eq!(reg.get(seat(1)).unwrap().occupant(), Some(&name("bob")));
        assert_consistent(&reg);
    }

    #[test]
    fn test_renew_only_inside_lead() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(1);
        let start = at(10, 0);
        let expiry = reg.assign_seat(seat(1), name("alice"), &start, &cfg).unwrap();

        assert_eq!(
            reg.renew_seat(seat(1), &start.advanced_by(400), &cfg),
            Err(CarrelError::NotRenewable(seat(1)))
        );

        let renewed = reg
            .renew_seat(seat(1), &start.advanced_by(13_400), &cfg)
            .unwrap();
        assert_eq!(renewed, expiry + 14_400);
        assert_eq!(reg.get(seat(1)).unwrap().expiry(), Some(renewed));
    }

    #[test]
    fn test_renew_after_expiry_releases_seat() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(1);
        let start = at(10, 0);
        reg.assign_seat(seat(1), name("alice"), &start, &cfg).unwrap();

        // an hour after the 14:00 expiry, with no sweep in between
        assert_eq!(
            reg.renew_seat(seat(1), &start.advanced_by(5 * 3_600), &cfg),
            Err(CarrelError::NotOccupied(seat(1)))
        );
        assert!(reg.get(seat(1)).unwrap().is_free());
        assert!(reg.find_by_occupant("alice").is_none());
        assert_consistent(&reg);
    }

    #[test]
    fn test_renew_free_seat_fails() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(1);
        assert_eq!(
            reg.renew_seat(seat(1), &at(10, 0), &cfg),
            Err(CarrelError::NotOccupied(seat(1)))
        );
    }

    #[test]
    fn test_toggle_evicts_and_restores() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(1);
        reg.assign_seat(seat(1), name("alice"), &at(10, 0), &cfg).unwrap();

        assert_eq!(
            reg.toggle_availability(seat(1)).unwrap(),
            Toggled::Disabled {
                evicted: Some(name("alice"))
            }
        );
        assert!(reg.get(seat(1)).unwrap().is_disabled());
        assert!(reg.find_by_occupant("alice").is_none());

        assert_eq!(reg.toggle_availability(seat(1)).unwrap(), Toggled::Enabled);
        assert!(reg.get(seat(1)).unwrap().is_free());
        assert_consistent(&reg);
    }

    #[test]
    fn test_sweep_frees_expired_seats_only() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(3);
        let start = at(10, 0);
        reg.assign_seat(seat(1), name("alice"), &start, &cfg).unwrap();
        reg.assign_seat(seat(2), name("bob"), &start.advanced_by(60), &cfg)
            .unwrap();
        reg.toggle_availability(seat(3)).unwrap();

        // exactly at alice's expiry
        let released = reg.sweep_expired(&start.advanced_by(14_400));
        assert_eq!(released, vec![(seat(1), name("alice"))]);
        assert!(reg.get(seat(1)).unwrap().is_free());
        assert!(reg.get(seat(2)).unwrap().is_occupied());
        assert!(reg.get(seat(3)).unwrap().is_disabled());
        assert_consistent(&reg);
    }

    #[test]
    fn test_mass_reset() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(3);
        reg.assign_seat(seat(1), name("alice"), &at(10, 0), &cfg).unwrap();
        reg.toggle_availability(seat(2)).unwrap();

        let evicted = reg.mass_reset(true);
        assert_eq!(evicted, vec![(seat(1), name("alice"))]);
        assert!(reg.get(seat(2)).unwrap().is_disabled());

        reg.mass_reset(false);
        assert!(reg.seats().iter().all(Seat::is_free));
    }

    #[test]
    fn test_reconcile_clamps_past_new_close() {
        let mut cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(3);
        let now = at(15, 0);
        reg.assign_seat(seat(1), name("alice"), &now, &cfg).unwrap();
        reg.assign_seat(seat(2), name("bob"), &now.advanced_by(-12_600), &cfg)
            .unwrap();

        cfg = day_hours();
        let clamps = reg.reconcile_on_close_change(&now, &cfg);

        // alice ran to 19:00, clamped to 18:00; bob ends at 15:30, untouched
        assert_eq!(clamps.len(), 1);
        assert_eq!(clamps[0].seat, seat(1));
        assert_eq!(clamps[0].expiry, now.instant() + 3 * 3_600);
        assert_eq!(reg.get(seat(1)).unwrap().expiry(), Some(now.instant() + 3 * 3_600));
        assert_eq!(reg.get(seat(2)).unwrap().expiry(), Some(now.instant() + 1_800));
    }

    #[test]
    fn test_reconcile_is_noop_in_24h_mode() {
        let cfg = FacilityConfig::default();
        let mut reg = SeatRegistry::new(1);
        let now = at(15, 0);
        let expiry = reg.assign_seat(seat(1), name("alice"), &now, &cfg).unwrap();
        assert!(reg.reconcile_on_close_change(&now, &cfg).is_empty());
        assert_eq!(reg.get(seat(1)).unwrap().expiry(), Some(expiry));
    }
}
