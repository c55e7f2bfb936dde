//! Content fingerprints over the canonical row serialization.
//!
//! Serialization: for every row, the raw cell text of each column in
//! `columns::CANONICAL` order, joined by `,`; rows joined by `|`. Date and
//! price cells are read through their ingest aliases, so a `date,price` file
//! hashes the same as its canonical-header equivalent. A missing cell
//! serializes as the empty string, so a dropped column still changes the
//! digest. Columns outside the canonical list never contribute.
//!
//! Three independent consumers sit on top of that serialization:
//!
//! - [`fingerprint`]: SHA-256 over rows in supplied order (cache key)
//! - [`simulation_seed`]: PRNG seed from the first 8 digest bytes, big-endian
//! - [`day::day_digest`]: SHA-256 over the date-sorted series (day selector)

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::Record;
use crate::domain::columns::CANONICAL;
use crate::error::ForecastError;

pub mod day;

pub use day::*;

pub const FIELD_SEPARATOR: char = ',';
pub const ROW_SEPARATOR: char = '|';

/// SHA-256 digest of a canonical serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s.trim()).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Fingerprint::from_hex(&value).ok_or_else(|| format!("invalid fingerprint '{value}'"))
    }
}

/// Serialize rows in canonical column order.
pub fn canonical_serialization<'a>(rows: impl IntoIterator<Item = &'a Record>) -> String {
    let mut out = String::new();
    for (i, row) in rows.into_iter().enumerate() {
        if i > 0 {
            out.push(ROW_SEPARATOR);
        }
        for (j, col) in CANONICAL.iter().enumerate() {
            if j > 0 {
                out.push(FIELD_SEPARATOR);
            }
            out.push_str(row.get_canonical(col).unwrap_or(""));
        }
    }
    out
}

pub(crate) fn sha256(data: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Content fingerprint of rows in the order they were supplied.
///
/// Dates are treated as opaque text here; parsing problems surface later when
/// the price series is built.
pub fn fingerprint(rows: &[Record]) -> Result<Fingerprint, ForecastError> {
    if rows.is_empty() {
        return Err(ForecastError::EmptySeries);
    }
    Ok(Fingerprint(sha256(&canonical_serialization(rows))))
}

/// PRNG seed derived from a fingerprint: the first 8 bytes as a big-endian `u64`.
pub fn simulation_seed(fp: &Fingerprint) -> u64 {
    let mut head = [0u8; 8];
    head.copy_from_slice(&fp.0[..8]);
    u64::from_be_bytes(head)
}
