//! Seat state machine and operating-hours arithmetic for carrel
//!
//! This crate is the heart of carrel, containing:
//! - Operating window checks, including windows that wrap past midnight
//! - Expiry computation for assignment and renewal, bounded by closing time
//! - Seat state machine (Free -> Occupied -> Free, Free <-> Disabled)
//! - Reconciliation of existing expiries when the hours change

mod engine;
mod events;
mod registry;
mod room;
mod window;

pub use engine::*;
pub use events::*;
pub use registry::*;
pub use room::*;
pub use window::*;
