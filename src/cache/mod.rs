//! Write-once forecast cache.
//!
//! Entries map a [`CacheKey`] to a serialized [`ForecastResult`]. Once an entry
//! exists it is never replaced, so every later request for the same key sees
//! the first stored result. Cache operations never fail the caller: unreadable
//! or corrupt entries read as absent and failed writes report `false`.
//!
//! The best-entry strategy is part of every key, so results computed under one
//! strategy are never served to a request configured for the other.

use chrono::Datelike;
use tracing::{info, warn};

use crate::domain::{BestEntryStrategy, CacheKeyMode, ForecastResult, PriceSeries};
use crate::fingerprint::Fingerprint;

pub mod store;

pub use store::*;

const MONTH_ABBREV: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Content(Fingerprint, BestEntryStrategy),
    /// Detected date-range token, e.g. `feb-mar-2026`.
    DateRange(String, BestEntryStrategy),
}

impl CacheKey {
    pub fn mode(&self) -> CacheKeyMode {
        match self {
            CacheKey::Content(..) => CacheKeyMode::Content,
            CacheKey::DateRange(..) => CacheKeyMode::Range,
        }
    }

    pub fn strategy(&self) -> BestEntryStrategy {
        match self {
            CacheKey::Content(_, strategy) | CacheKey::DateRange(_, strategy) => *strategy,
        }
    }

    /// Store key: `fp-<hex>-<strategy>` or `range-<token>-<strategy>`.
    pub fn storage_key(&self) -> String {
        match self {
            CacheKey::Content(fp, strategy) => format!("fp-{}-{}", fp.to_hex(), strategy.slug()),
            CacheKey::DateRange(token, strategy) => format!("range-{token}-{}", strategy.slug()),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// `<first-month>-<last-month>-<year of last>`; a single-month series yields
/// `<month>-<year>`.
pub fn range_token(series: &PriceSeries) -> Option<String> {
    let first = series.first()?.date;
    let last = series.last()?.date;
    let m0 = MONTH_ABBREV[first.month0() as usize];
    let m1 = MONTH_ABBREV[last.month0() as usize];
    if first.year() == last.year() && first.month() == last.month() {
        Some(format!("{m1}-{}", last.year()))
    } else {
        Some(format!("{m0}-{m1}-{}", last.year()))
    }
}

/// Lowercase `token` and accept it only if it is non-empty `[a-z0-9-]`.
pub fn normalize_range_token(token: &str) -> Option<String> {
    let token = token.trim().to_ascii_lowercase();
    let valid = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    valid.then_some(token)
}

pub struct ForecastCache<S: KeyValueStore> {
    store: S,
    mode: CacheKeyMode,
}

impl<S: KeyValueStore> ForecastCache<S> {
    pub fn new(store: S, mode: CacheKeyMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> CacheKeyMode {
        self.mode
    }

    pub fn store_ref(&self) -> &S {
        &self.store
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<ForecastResult> {
        if key.mode() != self.mode {
            warn!(%key, mode = ?self.mode, "cache key does not match configured mode; treating as miss");
            return None;
        }

        let raw = match self.store.get(&key.storage_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key, error = %e, "cache read failed; treating as miss");
                return None;
            }
        };

        match serde_json::from_str::<ForecastResult>(&raw) {
            Ok(result) if result.best_entry.strategy != key.strategy() => {
                warn!(%key, found = ?result.best_entry.strategy, "cache entry has another best-entry strategy; treating as miss");
                None
            }
            Ok(result) => {
                info!(%key, "cache hit");
                Some(result)
            }
            Err(e) => {
                warn!(%key, error = %e, "corrupt cache entry; treating as miss");
                None
            }
        }
    }

    /// Write-once store. Returns `true` only when this call created the entry.
    pub fn store(&mut self, key: &CacheKey, result: &ForecastResult) -> bool {
        if key.mode() != self.mode {
            warn!(%key, mode = ?self.mode, "cache key does not match configured mode; not stored");
            return false;
        }

        let payload = match serde_json::to_string(result) {
            Ok(p) => p,
            Err(e) => {
                warn!(%key, error = %e, "failed to serialize forecast for cache");
                return false;
            }
        };

        match self.store.set(&key.storage_key(), &payload) {
            Ok(SetOutcome::Written) => {
                info!(%key, "cached forecast");
                true
            }
            Ok(SetOutcome::AlreadyPresent) => false,
            Err(e) => {
                warn!(%key, error = %e, "cache write failed");
                false
            }
        }
    }

    /// Pre-author a date-range entry from an existing result.
    ///
    /// The entry is keyed under the result's own best-entry strategy. Bypasses
    /// the mode check so a content-keyed deployment can still seed range
    /// entries; the write-once rule still applies. Tokens are lowercased and
    /// must consist of ASCII letters, digits and `-`.
    pub fn import(&mut self, token: &str, result: &ForecastResult) -> bool {
        let Some(token) = normalize_range_token(token) else {
            warn!(%token, "range token must be non-empty [a-z0-9-]; not imported");
            return false;
        };
        let key = CacheKey::DateRange(token, result.best_entry.strategy);
        let payload = match serde_json::to_string(result) {
            Ok(p) => p,
            Err(e) => {
                warn!(%key, error = %e, "failed to serialize imported forecast");
                return false;
            }
        };
        match self.store.set(&key.storage_key(), &payload) {
            Ok(SetOutcome::Written) => {
                info!(%key, "imported forecast");
                true
            }
            Ok(SetOutcome::AlreadyPresent) => false,
            Err(e) => {
                warn!(%key, error = %e, "cache import failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BestEntryStrategy, Record};
    use crate::fingerprint::fingerprint;
    use chrono::{Duration, NaiveDate};

    fn rows(start: NaiveDate, n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let d = start + Duration::days(i as i64);
                [
                    ("time", d.format("%d/%m/%Y").to_string()),
                    ("Avg.Price (Rs./Kg)", format!("{:.2}", 2400.0 + (i % 5) as f64 * 3.0)),
                ]
                .into_iter()
                .collect()
            })
            .collect()
    }

    fn forecast(rows: &[Record]) -> (Fingerprint, ForecastResult) {
        let fp = fingerprint(rows).unwrap();
        let series = PriceSeries::from_records(rows).unwrap();
        let result = crate::sim::simulate(&series, &fp, BestEntryStrategy::MinPrice).unwrap();
        (fp, result)
    }

    #[test]
    fn range_tokens() {
        let r = rows(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 40);
        let s = PriceSeries::from_records(&r).unwrap();
        assert_eq!(range_token(&s).as_deref(), Some("feb-mar-2026"));

        let r = rows(NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(), 35);
        let s = PriceSeries::from_records(&r).unwrap();
        assert_eq!(range_token(&s).as_deref(), Some("dec-jan-2026"));

        let r = rows(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 31);
        let s = PriceSeries::from_records(&r).unwrap();
        assert_eq!(range_token(&s).as_deref(), Some("jan-2026"));
    }

    #[test]
    fn first_write_wins() {
        let (fp, result) = forecast(&rows(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 40));
        let mut cache = ForecastCache::new(MemoryStore::new(), CacheKeyMode::Content);
        let key = CacheKey::Content(fp, BestEntryStrategy::MinPrice);

        assert_eq!(cache.lookup(&key), None);
        assert!(cache.store(&key, &result));

        let mut other = result.clone();
        other.narrative.push("tampered".to_string());
        assert!(!cache.store(&key, &other));
        assert_eq!(cache.lookup(&key), Some(result));
    }

    #[test]
    fn wrong_mode_is_refused() {
        let (fp, result) = forecast(&rows(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 40));
        let mut cache = ForecastCache::new(MemoryStore::new(), CacheKeyMode::Range);
        let key = CacheKey::Content(fp, BestEntryStrategy::MinPrice);
        assert!(!cache.store(&key, &result));
        assert_eq!(cache.lookup(&key), None);
        assert!(cache.store_ref().is_empty());
    }

    #[test]
    fn corrupt_entry_reads_as_absent() {
        let mut store = MemoryStore::new();
        store.set("range-feb-mar-2026-hashed-day", "{not json").unwrap();
        let cache = ForecastCache::new(store, CacheKeyMode::Range);
        let key = CacheKey::DateRange("feb-mar-2026".to_string(), BestEntryStrategy::HashedDay);
        assert_eq!(cache.lookup(&key), None);
    }

    #[test]
    fn import_seeds_range_entry() {
        let (_, result) = forecast(&rows(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 40));
        let mut cache = ForecastCache::new(MemoryStore::new(), CacheKeyMode::Range);
        assert!(cache.import(" FEB-MAR-2026 ", &result));
        assert!(!cache.import("feb-mar-2026", &result));
        let key = CacheKey::DateRange("feb-mar-2026".to_string(), BestEntryStrategy::MinPrice);
        assert_eq!(key.storage_key(), "range-feb-mar-2026-min-price");
        assert_eq!(cache.lookup(&key), Some(result));

        let other = CacheKey::DateRange("feb-mar-2026".to_string(), BestEntryStrategy::HashedDay);
        assert_eq!(cache.lookup(&other), None);
    }

    #[test]
    fn import_rejects_ambiguous_tokens() {
        let (_, result) = forecast(&rows(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 40));
        let mut cache = ForecastCache::new(MemoryStore::new(), CacheKeyMode::Range);
        assert!(!cache.import("feb mar 2026", &result));
        assert!(!cache.import("feb_mar_2026", &result));
        assert!(!cache.import("../feb", &result));
        assert!(!cache.import("   ", &result));
        assert!(cache.store_ref().is_empty());
        assert!(cache.import("feb-mar-2026", &result));
    }

    #[test]
    fn entry_under_the_wrong_strategy_reads_as_absent() {
        let (fp, result) = forecast(&rows(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(), 40));
        let payload = serde_json::to_string(&result).unwrap();
        let hashed = CacheKey::Content(fp, BestEntryStrategy::HashedDay);

        let mut store = MemoryStore::new();
        store.set(&hashed.storage_key(), &payload).unwrap();
        let cache = ForecastCache::new(store, CacheKeyMode::Content);
        assert_eq!(cache.lookup(&hashed), None);
        assert_eq!(cache.lookup(&CacheKey::Content(fp, BestEntryStrategy::MinPrice)), None);
    }
}
