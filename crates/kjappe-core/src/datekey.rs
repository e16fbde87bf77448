//! Canonical and legacy storage keys for quiz dates.
//!
//! Every date is stored under one canonical key, `YYYYMMDD`. Older releases
//! wrote answers under whatever the browser's date formatting produced, so a
//! single day may exist under ISO, Norwegian, US and two-digit-year spellings
//! with or without zero padding. [`legacy_key_candidates`] enumerates those
//! spellings in the order they are probed.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::DateKeyError;

/// The canonical `YYYYMMDD` key for a date.
pub fn canonical_key(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// ISO `YYYY-MM-DD` form, as used on the wire and in share links.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a canonical `YYYYMMDD` key by fixed offsets.
pub fn parse_canonical_key(key: &str) -> Result<NaiveDate, DateKeyError> {
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateKeyError::Malformed(key.to_string()));
    }

    let field = |range: std::ops::Range<usize>| -> Result<u32, DateKeyError> {
        key[range]
            .parse()
            .map_err(|_| DateKeyError::Malformed(key.to_string()))
    };
    let year = field(0..4)? as i32;
    let month = field(4..6)?;
    let day = field(6..8)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateKeyError::InvalidDate(key.to_string()))
}

/// Parse a date given either as `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_date_input(input: &str) -> Result<NaiveDate, DateKeyError> {
    let compact: String = input.trim().chars().filter(|&c| c != '-').collect();
    parse_canonical_key(&compact)
}

/// Today's date in the local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Every historical key spelling for `date`, deduplicated in probe order.
///
/// Day variants (padded, unpadded) are crossed with month variants (padded,
/// unpadded) and each pair is rendered through every template:
/// `YYYYMMDD`, `YYYY-MM-DD`, `D/M/YYYY`, `D.M.YYYY`, `M/D/YYYY`, `D.M.YY`.
/// The first spelling to hit in the store wins, so the order is part of the
/// contract.
pub fn legacy_key_candidates(date: NaiveDate) -> Vec<String> {
    let year = date.year();
    let short_year = year.rem_euclid(100);
    let days = [format!("{:02}", date.day()), date.day().to_string()];
    let months = [format!("{:02}", date.month()), date.month().to_string()];

    let mut candidates: Vec<String> = Vec::new();
    for d in &days {
        for m in &months {
            let rendered = [
                format!("{year}{m}{d}"),
                format!("{year}-{m}-{d}"),
                format!("{d}/{m}/{year}"),
                format!("{d}.{m}.{year}"),
                format!("{m}/{d}/{year}"),
                format!("{d}.{m}.{short_year:02}"),
            ];
            for key in rendered {
                if !candidates.contains(&key) {
                    candidates.push(key);
                }
            }
        }
    }
    candidates
}

/// The canonical key for a date together with its legacy spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKeys {
    pub date: NaiveDate,
    pub canonical: String,
    /// Legacy spellings in probe order, excluding the canonical key itself.
    pub legacy: Vec<String>,
}

impl DateKeys {
    pub fn for_date(date: NaiveDate) -> Self {
        let canonical = canonical_key(date);
        let legacy = legacy_key_candidates(date)
            .into_iter()
            .filter(|k| *k != canonical)
            .collect();
        Self {
            date,
            canonical,
            legacy,
        }
    }
}
