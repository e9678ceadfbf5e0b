//! Configuration validation

use crate::policy::{DEFAULT_MAX_SESSION_MINUTES, DEFAULT_RENEW_LEAD_MINUTES, MAX_SESSION_MINUTES};
use crate::schema::RawConfig;
use carrel_util::{CarrelError, MinuteOfDay, Result};
use thiserror::Error;

/// Largest seat table accepted from a config file
pub const MAX_SEATS: usize = 999;

/// Longest name limit accepted from a config file
pub const MAX_NAME_LENGTH_LIMIT: usize = 64;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("room.seats must be between 1 and {max}, got {value}")]
    SeatCount { value: usize, max: usize },

    #[error("room.max_name_length must be between 1 and {max}, got {value}")]
    NameLength { value: usize, max: usize },

    #[error("Invalid time format '{value}': {message}")]
    InvalidTimeFormat { value: String, message: String },

    #[error("session.max_minutes must be between 1 and {max}, got {value}")]
    SessionLength { value: u32, max: u32 },

    #[error("session.renew_lead_minutes ({lead}) exceeds session.max_minutes ({session})")]
    LeadExceedsSession { lead: u32, session: u32 },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(seats) = config.room.seats
        && !(1..=MAX_SEATS).contains(&seats)
    {
        errors.push(ValidationError::SeatCount {
            value: seats,
            max: MAX_SEATS,
        });
    }

    if let Some(len) = config.room.max_name_length
        && !(1..=MAX_NAME_LENGTH_LIMIT).contains(&len)
    {
        errors.push(ValidationError::NameLength {
            value: len,
            max: MAX_NAME_LENGTH_LIMIT,
        });
    }

    for value in [&config.hours.open, &config.hours.close].into_iter().flatten() {
        if let Err(e) = parse_time(value) {
            errors.push(ValidationError::InvalidTimeFormat {
                value: value.clone(),
                message: e.to_string(),
            });
        }
    }

    let session = config
        .session
        .max_minutes
        .unwrap_or(DEFAULT_MAX_SESSION_MINUTES);
    let lead = config
        .session
        .renew_lead_minutes
        .unwrap_or(DEFAULT_RENEW_LEAD_MINUTES);

    if session == 0 || session > MAX_SESSION_MINUTES {
        errors.push(ValidationError::SessionLength {
            value: session,
            max: MAX_SESSION_MINUTES,
        });
    } else if lead > session {
        errors.push(ValidationError::LeadExceedsSession { lead, session });
    }

    errors
}

/// Parse HH:MM time format
pub fn parse_time(s: &str) -> Result<MinuteOfDay> {
    let (hour, minute) = s
        .split_once(':')
        .ok_or_else(|| CarrelError::invalid_input("Expected HH:MM format"))?;

    let hour: u32 = hour
        .trim()
        .parse()
        .map_err(|_| CarrelError::invalid_input("Invalid hour"))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .map_err(|_| CarrelError::invalid_input("Invalid minute"))?;

    if hour >= 24 {
        return Err(CarrelError::invalid_input("Hour must be 0-23"));
    }
    if minute >= 60 {
        return Err(CarrelError::invalid_input("Minute must be 0-59"));
    }

    MinuteOfDay::from_hm(hour, minute).ok_or_else(|| CarrelError::invalid_input("Invalid time"))
}
