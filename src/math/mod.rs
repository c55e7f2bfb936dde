//! Mathematical utilities: rolling statistics and least-squares trend fits.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
