//! Error types for carrel

use thiserror::Error;

use crate::SeatId;

/// Core error type for seat and configuration operations.
///
/// Every variant is recoverable: the console reports it and returns to the
/// prompt it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CarrelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Seat {0} is not available")]
    SeatUnavailable(SeatId),

    #[error("Seat {0} is not occupied")]
    NotOccupied(SeatId),

    #[error("No such seat: {0}")]
    UnknownSeat(usize),

    #[error("The room is full")]
    RoomFull,

    #[error("Seat {0} cannot be renewed now")]
    NotRenewable(SeatId),

    #[error("Outside operating hours")]
    OutsideOperatingHours,

    #[error("Configuration rejected: {0}")]
    ConfigInvariantViolation(String),
}

impl CarrelError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigInvariantViolation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, CarrelError>;
