//! Core events emitted by the reading room

use carrel_util::{AbsoluteTime, OccupantName, SeatId};

/// Why an occupant lost their seat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The occupant checked out
    CheckedOut,
    /// The expiry passed
    Expired,
    /// An admin disabled the seat
    Disabled,
    /// An admin reset all seats
    Reset,
    /// The room is outside its operating hours
    Closed,
}

/// Events emitted by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    SeatAssigned {
        seat: SeatId,
        occupant: OccupantName,
        expiry: AbsoluteTime,
    },

    SeatRenewed {
        seat: SeatId,
        occupant: OccupantName,
        previous_expiry: AbsoluteTime,
        expiry: AbsoluteTime,
    },

    SeatReleased {
        seat: SeatId,
        occupant: OccupantName,
        reason: ReleaseReason,
    },

    /// An hours change pulled an expiry back to the new closing time
    ExpiryClamped {
        seat: SeatId,
        occupant: OccupantName,
        previous_expiry: AbsoluteTime,
        expiry: AbsoluteTime,
    },

    SeatDisabled {
        seat: SeatId,
    },

    SeatEnabled {
        seat: SeatId,
    },
}
