//! Indicators the CSV loader computes when a file does not carry them.
//!
//! Each function maps a close series to one value per input bar; `None`
//! marks the warm-up bars that have no value yet.

pub mod ema;
pub mod rsi;

pub use ema::calculate_ema;
pub use rsi::calculate_rsi;

pub const FAST_AVG_PERIOD: usize = 20;
pub const OSCILLATOR_PERIOD: usize = 14;
