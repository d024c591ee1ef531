//! tradesim: intraday strategy backtester.
//!
//! Hexagonal architecture: the trade simulation core lives in [`domain`],
//! collaborator traits in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
