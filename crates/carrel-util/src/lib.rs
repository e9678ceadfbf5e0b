//! Shared utilities for carrel
//!
//! This crate provides:
//! - ID types (SeatId, OccupantName)
//! - Time primitives (absolute instants, minute-of-day, clock sources)
//! - Error types
//! - Pure parsers for console input

mod error;
mod ids;
mod input;
mod time;

pub use error::*;
pub use ids::*;
pub use input::*;
pub use time::*;
