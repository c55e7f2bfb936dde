//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - named-field input rows and the sorted `PriceSeries` built from them
//! - simulation outputs (`DailyForecast`, `BestEntry`, `ForecastResult`)
//! - run configuration (`ForecastConfig`) and its enums

pub mod columns;
pub mod series;
pub mod types;

pub use series::*;
pub use types::*;
