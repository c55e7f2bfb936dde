//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the simulation code stays clean and testable
//! - output changes are localized

use crate::domain::{DailyForecast, ForecastResult, ForecastSource};
use crate::fingerprint::DaySelection;

/// Header block: source, fingerprint, window, best entry and stats.
pub fn format_run_summary(result: &ForecastResult, source: ForecastSource) -> String {
    let mut out = String::new();

    out.push_str("=== pf - 30-day price forecast ===\n");
    out.push_str(&format!("Source: {}\n", source.display_name()));
    out.push_str(&format!("Fingerprint: {}\n", result.fingerprint));
    out.push_str(&format!("Seed: {:#018x}\n", result.seed));
    out.push_str(&format!(
        "Last observed: {} at INR {:.2}\n",
        result.window.last_observed, result.window.last_price
    ));
    out.push_str(&format!(
        "Window: {} .. {} ({} days)\n",
        result.window.start, result.window.end, result.window.days
    ));

    let f = &result.features;
    out.push_str(&format!(
        "Signals: slope14={:+.3}/day momentum={:+.5} volatility={:.5} supply={:+.5}\n",
        f.slope14, f.momentum, f.volatility, f.supply_pressure
    ));

    let s = &result.stats;
    out.push_str(&format!(
        "Signals per day: STRONG BUY={} BUY={} ACCUMULATE={} WAIT={} | High Risk={}\n",
        s.recommendations.strong_buy,
        s.recommendations.buy,
        s.recommendations.accumulate,
        s.recommendations.wait,
        s.risk.high
    ));
    out.push_str(&format!(
        "Price: min={:.2} max={:.2} mean={:.2} | mean confidence={:.1}%\n",
        s.min_price, s.max_price, s.mean_price, s.mean_confidence
    ));

    let b = &result.best_entry;
    out.push_str(&format!(
        "\nBest entry ({:?}{}): {} at INR {:.2}, confidence {:.1}%\n",
        b.strategy,
        if b.synthetic { ", synthetic" } else { "" },
        b.date,
        b.price,
        b.confidence
    ));

    out.push('\n');
    for line in &result.narrative {
        out.push_str(&format!("- {line}\n"));
    }

    out
}

/// Per-day table.
pub fn format_days(days: &[DailyForecast]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>3} {:<10} {:>10} {:>8} {:>8} {:<10} {:<10} {:>5} {:>9} {:>9}\n",
            "day", "date", "price", "chg%", "cum%", "risk", "signal", "conf", "usd", "sar"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<3} {:-<10} {:-<10} {:-<8} {:-<8} {:-<10} {:-<10} {:-<5} {:-<9} {:-<9}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for d in days {
        let (usd, sar) = d
            .prices
            .map(|p| (format!("{:.2}", p.usd), format!("{:.2}", p.sar)))
            .unwrap_or_default();
        out.push_str(
            format!(
                "{:>3} {:<10} {:>10.2} {:>+8.2} {:>+8.2} {:<10} {:<10} {:>5.1} {:>9} {:>9}\n",
                d.day,
                d.display_date.clone().unwrap_or_else(|| d.date.to_string()),
                d.price,
                d.change_pct,
                d.cumulative_pct,
                d.risk.display_name(),
                d.recommendation.display_name(),
                d.confidence,
                usd,
                sar,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Deterministic-day breakdown (digest, prefix, modulus).
pub fn format_day_selection(sel: &DaySelection) -> String {
    let mut out = String::new();
    out.push_str(&format!("SHA-256: {}\n", sel.digest));
    out.push_str(&format!(
        "Prefix: {} -> int: {} % {} + 1 = {}\n",
        sel.prefix, sel.hash_int, sel.days_in_month, sel.day_of_month
    ));
    out.push_str(&format!(
        "Best purchase day next month: {}\n",
        sel.date.format("%d-%m-%Y")
    ));
    out
}

/// One line of `pf batch` output.
#[derive(Debug, Clone)]
pub struct BatchLine {
    pub file: String,
    pub outcome: Result<BatchSummary, String>,
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub fingerprint: String,
    pub source: ForecastSource,
    pub best_date: String,
    pub best_price: f64,
    pub final_price: f64,
}

/// Per-file batch table; failures print their message in place of the numbers.
pub fn format_batch(lines: &[BatchLine]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:<16} {:<7} {:<10} {:>10} {:>10}\n",
            "file", "fingerprint", "source", "best", "best_inr", "day30_inr"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<28} {:-<16} {:-<7} {:-<10} {:-<10} {:-<10}\n", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for line in lines {
        let row = match &line.outcome {
            Ok(s) => format!(
                "{:<28} {:<16} {:<7} {:<10} {:>10.2} {:>10.2}",
                truncate(&line.file, 28),
                truncate(&s.fingerprint, 16),
                s.source.display_name(),
                s.best_date,
                s.best_price,
                s.final_price,
            ),
            Err(msg) => format!("{:<28} error: {msg}", truncate(&line.file, 28)),
        };
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}
