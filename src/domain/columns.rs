//! Column names of the market dataset.
//!
//! `CANONICAL` is the one place the column order is defined. Fingerprints, the
//! day selector and dataset exports all serialize rows in exactly this order,
//! regardless of the order the columns had in the source file.

pub const DATE: &str = "time";
pub const PRICE: &str = "Avg.Price (Rs./Kg)";
pub const MAX_PRICE: &str = "MaxPrice (Rs./Kg)";
pub const QTY_ARRIVED: &str = "Total Qty Arrived (Kgs)";
pub const QTY_SOLD: &str = "Qty Sold (Kgs)";

/// Accepted alternatives for the date column (ingest only).
pub const DATE_ALIASES: [&str; 2] = [DATE, "date"];
/// Accepted alternatives for the price column (ingest only).
pub const PRICE_ALIASES: [&str; 2] = [PRICE, "price"];

/// Header names that may carry the value of canonical column `column`.
pub fn aliases_for(column: &str) -> &'static [&'static str] {
    match column {
        DATE => &DATE_ALIASES,
        PRICE => &PRICE_ALIASES,
        _ => &[],
    }
}

pub const CANONICAL: [&str; 39] = [
    "time",
    "year",
    "month",
    "week_of_year",
    "day_of_week",
    "is_market_open",
    "is_flood_crisis",
    "is_lockdown",
    "Avg.Price (Rs./Kg)",
    "MaxPrice (Rs./Kg)",
    "Daily_Spread",
    "Total Qty Arrived (Kgs)",
    "Qty Sold (Kgs)",
    "Smooth_Qty_Arrived",
    "Auctioneer",
    "temperature_2m_mean (\u{b0}C)",
    "temperature_2m_max (\u{b0}C)",
    "temperature_2m_min (\u{b0}C)",
    "Temp_Diff",
    "precipitation_sum (mm)",
    "relative_humidity_2m_mean (%)",
    "soil_moisture_0_to_7cm_mean (m\u{b3}/m\u{b3})",
    "et0_fao_evapotranspiration (mm)",
    "Precip_7D",
    "RH_7D",
    "Lag1",
    "Lag7",
    "Lag14",
    "Lag30",
    "Lag_MaxPrice_1",
    "Lag_Spread_1",
    "MA7",
    "MA14",
    "MA30",
    "Lag_Qty_Sold_1",
    "Lag_Total_Qty_Arrived_1",
    "Precip_30D_Sum",
    "Precip_Lag_60",
    "Soil_Moisture_Lag_14",
];
