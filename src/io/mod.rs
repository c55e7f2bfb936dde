//! Input/output helpers.
//!
//! - CSV ingest (`ingest`)
//! - result and dataset exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
