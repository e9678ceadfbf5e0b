//! Strongly-typed identifiers for carrel

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CarrelError, Result};

/// Longest occupant name accepted by default (a 20-byte buffer minus its terminator)
pub const DEFAULT_MAX_NAME_LENGTH: usize = 19;

/// Token typed at the name prompt to enter admin mode
pub const ADMIN_TOKEN: &str = "0";

/// Identifier of one seat in the room.
///
/// Internally a zero-based index into the seat table; displayed to people
/// as a one-based seat number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeatId(usize);

impl SeatId {
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Build from the number printed on the seat (1-based).
    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).map(Self)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    pub fn number(&self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Name of a patron holding a seat
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupantName(String);

impl OccupantName {
    /// Validate a name token read from the console.
    ///
    /// Names are a single whitespace-free token of at most `max_len`
    /// characters. The admin token is reserved.
    pub fn parse(raw: &str, max_len: usize) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(CarrelError::invalid_input("name cannot be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(CarrelError::invalid_input("name must be a single word"));
        }
        if name.chars().count() > max_len {
            return Err(CarrelError::invalid_input(format!(
                "name must be at most {} characters",
                max_len
            )));
        }
        if name == ADMIN_TOKEN {
            return Err(CarrelError::invalid_input("'0' is reserved for admin mode"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccupantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
