//! `price-forecast` library crate.
//!
//! The binary (`pf`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fingerprint, simulator and cache are reusable from other front-ends
//!
//! Identical input rows always produce the identical forecast: the simulation
//! is seeded from a content fingerprint, and results are cached write-once.

pub mod app;
pub mod best;
pub mod cache;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fingerprint;
pub mod io;
pub mod math;
pub mod progress;
pub mod report;
pub mod sim;
