//! carrel - study-room seat manager
//!
//! The console front end. Patrons type their name to claim, renew or give
//! back a seat; `0` opens the admin menu.

mod console;

pub use console::*;
