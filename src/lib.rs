//! Pump scanner for MEXC spot markets.
//!
//! Polls the full ticker snapshot at a fixed cadence, restricts to
//! high-leverage futures symbols under a price ceiling, and alerts on
//! Telegram when an RSI-confirmed move clears the percent threshold over a
//! 5- or 15-minute window.

pub mod config;
pub mod cooldown;
pub mod exchange;
pub mod indicators;
pub mod logging;
pub mod notify;
pub mod scanner;
pub mod signal;
pub mod universe;
