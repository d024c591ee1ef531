//! Trade simulation core.

pub mod bar;
pub mod config;
pub mod config_validation;
pub mod signal;
pub mod reentry;
pub mod position;
pub mod simulator;
pub mod cost;
pub mod risk;
pub mod backtest;
pub mod metrics;
pub mod error;
