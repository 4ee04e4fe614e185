//! Shared utilities for famlink
//!
//! This crate provides:
//! - Wall-clock and day-of-week types used by rules and policies
//! - Duration parsing (`H:MM`) and formatting helpers
//! - A `now()` wrapper with mock-time support for testing

mod duration;
mod time;

pub use duration::*;
pub use time::*;
