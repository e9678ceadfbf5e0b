//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Seat table settings
    #[serde(default)]
    pub room: RawRoom,

    /// Operating hours
    #[serde(default)]
    pub hours: RawHours,

    /// Session limits
    #[serde(default)]
    pub session: RawSession,
}

/// Room-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRoom {
    /// Number of seats (default: 10)
    pub seats: Option<usize>,

    /// Longest accepted occupant name, in characters (default: 19)
    pub max_name_length: Option<usize>,
}

/// Opening and closing times, "HH:MM". Equal values mean 24-hour operation.
/// A missing value defaults to 23:59.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawHours {
    pub open: Option<String>,
    pub close: Option<String>,
}

/// Session limits, in minutes
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSession {
    /// Maximum session length (default: 240)
    pub max_minutes: Option<u32>,

    /// How long before expiry renewal opens (default: 30)
    pub renew_lead_minutes: Option<u32>,
}
