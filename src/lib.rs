//! Senseo bridge firmware library.
//!
//! Exposes the pure-logic modules for integration testing and fuzzing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pins;

// The ESP-IDF halves of these are guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;

// Host critical-section impl for the embassy channel in unit tests.
#[cfg(test)]
use critical_section as _;
