//! Synthetic market datasets for demos and tests.
//!
//! Each [`Scenario`] is a preset market personality (trend, volatility, price
//! path shape, supply and weather profile). Generation is seeded, so the same
//! scenario, length and seed always produce byte-identical rows.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use clap::ValueEnum;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::columns::{self, CANONICAL};
use crate::domain::{Record, round_to};
use crate::error::AppError;

/// Prices never leave this band around the scenario's base price.
const BASE_BAND: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    StableUptrend,
    HighVolatility,
    StrongDowntrend,
    RecoveryRally,
    BubbleCrash,
    PostCrashStable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePattern {
    Linear,
    /// Trend plus a random-sign half-volatility kick every day.
    Choppy,
    /// Trend ramps from 30% to 170% of its average pace.
    Accelerating,
    /// Rise for the first 72% of days, correction afterwards.
    Bubble,
    /// Shallow dip for the first 20% of days, steady rise afterwards.
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherProfile {
    pub temp_mean: f64,
    pub temp_range: f64,
    pub precip_base: f64,
    pub precip_var: f64,
    pub humidity: f64,
    pub humidity_var: f64,
    pub soil: f64,
    pub et0: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherOverride {
    pub precip_base: f64,
    pub humidity: f64,
    pub soil: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioParams {
    /// `(year, month, day)` of the first row.
    pub start: (i32, u32, u32),
    pub base_price: f64,
    /// Fractional move over the whole period (0.03 = +3%).
    pub trend_total: f64,
    /// Daily noise as a fraction of price.
    pub volatility: f64,
    pub pattern: PricePattern,
    pub supply_base: f64,
    pub supply_var: f64,
    /// Arrivals change per day (kg).
    pub supply_trend: f64,
    /// `(day index, fractional shock)`.
    pub events: &'static [(usize, f64)],
    /// Maximum single-day move as a fraction of price.
    pub clamp_daily: f64,
    /// Inclusive day-index window flagged `is_flood_crisis`.
    pub flood_days: Option<(usize, usize)>,
    pub weather: Option<WeatherOverride>,
}

impl Scenario {
    pub const ALL: [Scenario; 6] = [
        Scenario::StableUptrend,
        Scenario::HighVolatility,
        Scenario::StrongDowntrend,
        Scenario::RecoveryRally,
        Scenario::BubbleCrash,
        Scenario::PostCrashStable,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Scenario::StableUptrend => "Stable Uptrend",
            Scenario::HighVolatility => "High Volatility Chop",
            Scenario::StrongDowntrend => "Strong Downtrend",
            Scenario::RecoveryRally => "Recovery Rally",
            Scenario::BubbleCrash => "Bubble & Crash",
            Scenario::PostCrashStable => "Post-Crash Stabilization",
        }
    }

    pub fn params(self) -> ScenarioParams {
        match self {
            Scenario::StableUptrend => ScenarioParams {
                start: (2026, 2, 8),
                base_price: 2360.0,
                trend_total: 0.03,
                volatility: 0.012,
                pattern: PricePattern::Linear,
                supply_base: 13000.0,
                supply_var: 2500.0,
                supply_trend: 50.0,
                events: &[],
                clamp_daily: 0.025,
                flood_days: None,
                weather: None,
            },
            Scenario::HighVolatility => ScenarioParams {
                start: (2026, 3, 9),
                base_price: 2420.0,
                trend_total: 0.005,
                volatility: 0.018,
                pattern: PricePattern::Choppy,
                supply_base: 12000.0,
                supply_var: 5000.0,
                supply_trend: 0.0,
                events: &[(7, 0.025), (14, -0.03), (22, 0.02)],
                clamp_daily: 0.035,
                flood_days: None,
                weather: None,
            },
            Scenario::StrongDowntrend => ScenarioParams {
                start: (2026, 4, 8),
                base_price: 2550.0,
                trend_total: -0.07,
                volatility: 0.016,
                pattern: PricePattern::Linear,
                supply_base: 18000.0,
                supply_var: 3000.0,
                supply_trend: 100.0,
                events: &[],
                clamp_daily: 0.03,
                flood_days: None,
                weather: Some(WeatherOverride {
                    precip_base: 160.0,
                    humidity: 80.0,
                    soil: 0.36,
                }),
            },
            Scenario::RecoveryRally => ScenarioParams {
                start: (2026, 5, 8),
                base_price: 2330.0,
                trend_total: 0.08,
                volatility: 0.018,
                pattern: PricePattern::Accelerating,
                supply_base: 8000.0,
                supply_var: 2000.0,
                supply_trend: -60.0,
                events: &[(3, -0.012), (18, 0.015)],
                clamp_daily: 0.035,
                flood_days: Some((12, 18)),
                weather: Some(WeatherOverride {
                    precip_base: 240.0,
                    humidity: 86.0,
                    soil: 0.42,
                }),
            },
            Scenario::BubbleCrash => ScenarioParams {
                start: (2026, 6, 7),
                base_price: 2620.0,
                trend_total: 0.02,
                volatility: 0.025,
                pattern: PricePattern::Bubble,
                supply_base: 9000.0,
                supply_var: 3500.0,
                supply_trend: 0.0,
                events: &[(20, -0.03), (21, -0.025), (25, 0.015)],
                clamp_daily: 0.04,
                flood_days: None,
                weather: Some(WeatherOverride {
                    precip_base: 280.0,
                    humidity: 90.0,
                    soil: 0.46,
                }),
            },
            Scenario::PostCrashStable => ScenarioParams {
                start: (2026, 7, 7),
                base_price: 2490.0,
                trend_total: 0.015,
                volatility: 0.018,
                pattern: PricePattern::Recovery,
                supply_base: 13000.0,
                supply_var: 2500.0,
                supply_trend: 30.0,
                events: &[],
                clamp_daily: 0.03,
                flood_days: None,
                weather: Some(WeatherOverride {
                    precip_base: 180.0,
                    humidity: 87.0,
                    soil: 0.43,
                }),
            },
        }
    }
}

/// Monthly weather climatology; months without a profile use the monsoon peak.
pub fn weather_profile(month: u32) -> WeatherProfile {
    let (temp_mean, temp_range, precip_base, precip_var, humidity, soil, et0, humidity_var) = match month {
        2 => (26.0, 5.5, 8.0, 12.0, 68.0, 0.27, 20.5, 8.0),
        3 => (28.5, 5.0, 25.0, 35.0, 72.0, 0.29, 22.0, 10.0),
        4 => (29.5, 5.0, 80.0, 60.0, 76.0, 0.33, 19.0, 8.0),
        5 => (30.0, 4.5, 180.0, 100.0, 82.0, 0.38, 15.5, 6.0),
        7 => (28.0, 3.5, 220.0, 100.0, 90.0, 0.45, 11.0, 4.0),
        8 => (28.5, 4.0, 140.0, 80.0, 85.0, 0.40, 13.0, 6.0),
        _ => (29.0, 4.0, 250.0, 120.0, 88.0, 0.43, 12.0, 5.0),
    };
    WeatherProfile {
        temp_mean,
        temp_range,
        precip_base,
        precip_var,
        humidity,
        humidity_var,
        soil,
        et0,
    }
}

#[derive(Debug, Clone, Copy)]
struct Weather {
    temp_mean: f64,
    temp_max: f64,
    temp_min: f64,
    precip: f64,
    humidity: f64,
    soil: f64,
    et0: f64,
}

/// Generate `days` rows for `scenario` with all canonical columns populated.
pub fn generate_scenario(scenario: Scenario, days: usize, seed: u64) -> Result<Vec<Record>, AppError> {
    generate(&scenario.params(), days, seed)
}

pub fn generate(params: &ScenarioParams, days: usize, seed: u64) -> Result<Vec<Record>, AppError> {
    if days == 0 {
        return Err(AppError::new(2, "Sample length must be > 0."));
    }
    let (y, m, d) = params.start;
    let start = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::new(2, format!("Invalid scenario start date {y}-{m}-{d}.")))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let prices = generate_prices(params, days, &mut rng, &normal);
    let dates: Vec<NaiveDate> = (0..days).map(|i| start + Duration::days(i as i64)).collect();
    let weather: Vec<Weather> = dates
        .iter()
        .map(|dt| sample_weather(dt.month(), params.weather, &mut rng, &normal))
        .collect();

    let mut rows = Vec::with_capacity(days);
    for i in 0..days {
        let dt = dates[i];
        let price = prices[i];
        let w = weather[i];
        let sunday = dt.weekday() == Weekday::Sun;

        let spread = daily_spread(price, params.volatility, &mut rng);
        let max_price = round_to(price + spread, 3);

        let (qty_arrived, qty_sold) = if sunday {
            (0.0, 0.0)
        } else {
            let arrived = round_to(
                (params.supply_base + params.supply_trend * i as f64 + normal.sample(&mut rng) * params.supply_var)
                    .max(0.0),
                1,
            );
            (arrived, round_to(arrived * rng.gen_range(0.78..0.96), 1))
        };
        let auctioneer = if sunday { 0 } else { *[1, 2, 2, 3].choose(&mut rng).unwrap_or(&2) };

        let lag = |k: usize| if i >= k { prices[i - k] } else { prices[0] };
        let (lag_max_1, lag_spread_1) = if i >= 1 {
            let s = daily_spread(prices[i - 1], params.volatility, &mut rng);
            (round_to(prices[i - 1] + s, 3), s)
        } else {
            (max_price, spread)
        };

        let (lag_qty_sold, lag_qty_arrived) = if i == 0 {
            (qty_sold, qty_arrived)
        } else if dates[i - 1].weekday() == Weekday::Sun {
            (0.0, 0.0)
        } else {
            let arrived = round_to(
                (params.supply_base
                    + params.supply_trend * (i - 1) as f64
                    + normal.sample(&mut rng) * params.supply_var * 0.3)
                    .max(0.0),
                1,
            );
            (round_to(arrived * rng.gen_range(0.80..0.95), 1), arrived)
        };

        let week = &weather[i.saturating_sub(6)..=i];
        let precip_7d: f64 = week.iter().map(|w| w.precip).sum();
        let rh_7d = week.iter().map(|w| w.humidity).sum::<f64>() / week.len() as f64;
        let precip_30d: f64 = weather[i.saturating_sub(29)..=i].iter().map(|w| w.precip).sum();
        let precip_lag_60 = w.precip * rng.gen_range(0.3..1.5);
        let soil_lag_14 = w.soil + normal.sample(&mut rng) * 0.015;

        let flood = params
            .flood_days
            .is_some_and(|(from, to)| (from..=to).contains(&i));

        let values: [String; 39] = [
            dt.format("%d/%m/%Y").to_string(),
            dt.year().to_string(),
            dt.month().to_string(),
            dt.iso_week().week().to_string(),
            dt.weekday().num_days_from_sunday().to_string(),
            u8::from(!sunday).to_string(),
            u8::from(flood).to_string(),
            "0".to_string(),
            format!("{price:.3}"),
            format!("{max_price:.3}"),
            format!("{spread:.3}"),
            format!("{qty_arrived:.1}"),
            format!("{qty_sold:.1}"),
            format!("{:.4}", params.supply_base + params.supply_trend * i as f64 * 0.5),
            auctioneer.to_string(),
            format!("{:.1}", w.temp_mean),
            format!("{:.1}", w.temp_max),
            format!("{:.1}", w.temp_min),
            format!("{:.1}", w.temp_max - w.temp_min),
            format!("{:.1}", w.precip),
            format!("{:.1}", w.humidity),
            format!("{:.3}", w.soil),
            format!("{:.1}", w.et0),
            format!("{precip_7d:.1}"),
            format!("{rh_7d:.1}"),
            format!("{:.3}", lag(1)),
            format!("{:.3}", lag(7)),
            format!("{:.3}", lag(14)),
            format!("{:.3}", lag(30)),
            format!("{lag_max_1:.3}"),
            format!("{lag_spread_1:.3}"),
            format!("{:.6}", moving_average(&prices, i, 7)),
            format!("{:.6}", moving_average(&prices, i, 14)),
            format!("{:.6}", moving_average(&prices, i, 30)),
            format!("{lag_qty_sold:.1}"),
            format!("{lag_qty_arrived:.1}"),
            format!("{precip_30d:.1}"),
            format!("{precip_lag_60:.1}"),
            format!("{soil_lag_14:.3}"),
        ];

        rows.push(CANONICAL.iter().copied().zip(values).collect::<Record>());
    }

    Ok(rows)
}

fn generate_prices(params: &ScenarioParams, n: usize, rng: &mut StdRng, normal: &Normal<f64>) -> Vec<f64> {
    let mut prices: Vec<f64> = Vec::with_capacity(n);
    let mut price = params.base_price;
    let nf = n as f64;
    let daily_trend = params.trend_total / nf;
    let lo = params.base_price * (1.0 - BASE_BAND);
    let hi = params.base_price * (1.0 + BASE_BAND);

    for i in 0..n {
        let t = match params.pattern {
            PricePattern::Linear => daily_trend,
            PricePattern::Choppy => {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                daily_trend + sign * params.volatility * 0.5
            }
            PricePattern::Accelerating => daily_trend * (0.3 + 1.4 * (i as f64 / nf)),
            PricePattern::Bubble => {
                if i < (nf * 0.72) as usize {
                    params.trend_total.abs() / (nf * 0.72) * 1.1
                } else {
                    -params.trend_total.abs() / (nf * 0.28) * 0.8
                }
            }
            PricePattern::Recovery => {
                if i < (nf * 0.2) as usize {
                    -daily_trend.abs() * 0.5
                } else {
                    daily_trend.abs() * 1.25
                }
            }
        };

        // Large moves cluster.
        let last_move = match prices.as_slice() {
            [.., a, b] => (b - a).abs(),
            _ => 0.0,
        };
        let vol_mult = if last_move / price > params.volatility * 1.5 { 1.6 } else { 1.0 };
        let noise = normal.sample(rng) * params.volatility * price * vol_mult;

        let shock = params
            .events
            .iter()
            .find(|(day, _)| *day == i)
            .map_or(0.0, |(_, s)| s * price);

        let max_change = price * params.clamp_daily;
        let change = (t * price + noise + shock).clamp(-max_change, max_change);

        price = round_to((price + change).clamp(lo, hi), 3);
        prices.push(price);
    }

    prices
}

fn sample_weather(
    month: u32,
    over: Option<WeatherOverride>,
    rng: &mut StdRng,
    normal: &Normal<f64>,
) -> Weather {
    let mut p = weather_profile(month);
    if let Some(o) = over {
        p.precip_base = o.precip_base;
        p.humidity = o.humidity;
        p.soil = o.soil;
    }

    let temp_mean = p.temp_mean + normal.sample(rng) * 1.2;
    let temp_max = temp_mean + rng.gen_range(2.5..p.temp_range);
    let temp_min = temp_mean - rng.gen_range(2.0..p.temp_range - 0.5);

    let wet_chance = (0.15 + 0.55 * (p.precip_base / 300.0)).min(1.0);
    let precip = if rng.gen_bool(wet_chance) {
        p.precip_base / 5.0 + normal.sample(rng) * p.precip_var / 4.0
    } else {
        0.5 + normal.sample(rng) * 1.5
    };

    Weather {
        temp_mean: round_to(temp_mean, 1),
        temp_max: round_to(temp_max, 1),
        temp_min: round_to(temp_min, 1),
        precip: round_to(precip.max(0.0), 1),
        humidity: round_to((p.humidity + normal.sample(rng) * p.humidity_var).clamp(40.0, 98.0), 1),
        soil: round_to((p.soil + normal.sample(rng) * 0.025).clamp(0.18, 0.55), 3),
        et0: round_to((p.et0 + normal.sample(rng) * 2.5).max(5.0), 1),
    }
}

/// Max-over-average spread for a trading day.
fn daily_spread(price: f64, volatility: f64, rng: &mut StdRng) -> f64 {
    round_to(price * (rng.gen_range(0.08..0.22) + volatility * 2.0), 3)
}

fn moving_average(prices: &[f64], i: usize, window: usize) -> f64 {
    let window = &prices[(i + 1).saturating_sub(window)..=i];
    window.iter().sum::<f64>() / window.len() as f64
}

/// Price of the first row, the last row and the percentage change between them.
pub fn price_change(rows: &[Record]) -> Option<(f64, f64, f64)> {
    let first = rows.first()?.get_f64(columns::PRICE)?;
    let last = rows.last()?.get_f64(columns::PRICE)?;
    Some((first, last, (last - first) / first * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceSeries;

    #[test]
    fn same_seed_same_rows() {
        let a = generate_scenario(Scenario::HighVolatility, 30, 42).unwrap();
        let b = generate_scenario(Scenario::HighVolatility, 30, 42).unwrap();
        let c = generate_scenario(Scenario::HighVolatility, 30, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn every_scenario_fills_all_columns_and_respects_clamps() {
        for scenario in Scenario::ALL {
            let params = scenario.params();
            let rows = generate_scenario(scenario, 30, 7).unwrap();
            assert_eq!(rows.len(), 30);

            let mut prev: Option<&Record> = None;
            for row in &rows {
                assert_eq!(row.columns().count(), CANONICAL.len());
                let p = row.get_f64(columns::PRICE).unwrap();
                assert!(p >= params.base_price * 0.85 - 1e-2 && p <= params.base_price * 1.15 + 1e-2);
                if let Some(prev) = prev {
                    let q = prev.get_f64(columns::PRICE).unwrap();
                    assert!((p - q).abs() <= q * params.clamp_daily + 1e-2, "{scenario:?}: {q} -> {p}");
                    assert_eq!(row.get("Lag1"), prev.get(columns::PRICE));
                }
                prev = Some(row);
            }
        }
    }

    #[test]
    fn generated_rows_form_a_full_series() {
        let rows = generate_scenario(Scenario::StableUptrend, 30, 42).unwrap();
        let series = PriceSeries::from_records(&rows).unwrap();
        assert_eq!(series.len(), 30);
        assert_eq!(
            series.first().unwrap().date,
            NaiveDate::from_ymd_opt(2026, 2, 8).unwrap()
        );
        // Sundays carry no arrivals.
        for obs in series.observations() {
            if obs.date.weekday() == Weekday::Sun {
                assert_eq!(obs.qty_arrived, Some(0.0));
            }
        }
    }

    #[test]
    fn flood_window_is_flagged() {
        let rows = generate_scenario(Scenario::RecoveryRally, 30, 1).unwrap();
        let flagged: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.get("is_flood_crisis") == Some("1"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(flagged, (12..=18).collect::<Vec<_>>());
    }
}
