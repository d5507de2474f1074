//! Human-readable item UIDs and the sequence counters that back them.
//!
//! A UID has the form `PREFIX-YYMM-NNNN`. The sequence part is zero-padded to
//! [`MIN_SEQUENCE_WIDTH`] digits and widens past `9999` (`LAP-2507-10000`).
//! Widened UIDs stay unique and parseable; they only lose lexicographic
//! ordering against four-digit ones.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InventoryError;
use crate::Category;

/// Minimum number of digits in the sequence part of a UID.
pub const MIN_SEQUENCE_WIDTH: usize = 4;

/// A calendar month key in `YYMM` form (two-digit year, two-digit month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: u8,
    month: u8,
}

impl YearMonth {
    /// Create a month key from a two-digit year (`0..=99`) and a month (`1..=12`).
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::InvalidYearMonth` if either part is out of range.
    pub fn new(year: u8, month: u8) -> Result<Self, InventoryError> {
        if year > 99 || !(1..=12).contains(&month) {
            return Err(InventoryError::InvalidYearMonth(format!(
                "{year:02}{month:02}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing `at`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        // rem_euclid keeps the value in 0..100 so the casts cannot truncate.
        Self {
            year: at.year().rem_euclid(100) as u8,
            month: at.month() as u8,
        }
    }

    /// The current UTC month.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Two-digit year.
    #[must_use]
    pub const fn year(&self) -> u8 {
        self.year
    }

    /// Month, `1..=12`.
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InventoryError::InvalidYearMonth(s.to_string());
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = s[..2].parse().map_err(|_| invalid())?;
        let month = s[2..].parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

/// An item UID, `PREFIX-YYMM-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uid {
    prefix: String,
    year_month: YearMonth,
    sequence: u32,
}

impl Uid {
    /// Build the UID for a freshly allocated sequence number.
    #[must_use]
    pub fn new(category: Category, year_month: YearMonth, sequence: u32) -> Self {
        Self {
            prefix: category.prefix().to_string(),
            year_month,
            sequence,
        }
    }

    /// The category prefix (`LAP`, `MON`, ...).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The month the UID was issued in.
    #[must_use]
    pub const fn year_month(&self) -> YearMonth {
        self.year_month
    }

    /// The per-(prefix, month) sequence number.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.prefix,
            self.year_month,
            self.sequence,
            width = MIN_SEQUENCE_WIDTH
        )
    }
}

impl FromStr for Uid {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InventoryError::InvalidUid(s.to_string());

        let mut parts = s.split('-');
        let (Some(prefix), Some(ym), Some(seq), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(invalid());
        }
        if seq.len() < MIN_SEQUENCE_WIDTH || !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        // Padding only fills the minimum width; wider numbers have no leading zero.
        if seq.len() > MIN_SEQUENCE_WIDTH && seq.starts_with('0') {
            return Err(invalid());
        }

        let year_month = ym.parse().map_err(|_| invalid())?;
        let sequence: u32 = seq.parse().map_err(|_| invalid())?;
        if sequence == 0 {
            return Err(invalid());
        }

        Ok(Self {
            prefix: prefix.to_string(),
            year_month,
            sequence,
        })
    }
}

impl TryFrom<String> for Uid {
    type Error = InventoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uid> for String {
    fn from(uid: Uid) -> Self {
        uid.to_string()
    }
}

/// The persisted counter for one (prefix, month) key.
///
/// Created lazily with `last_sequence_number = 0` and only ever incremented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCounter {
    /// Category prefix.
    pub category_prefix: String,

    /// Month key.
    pub year_month: YearMonth,

    /// Last number handed out. Zero means none yet.
    pub last_sequence_number: u32,
}

impl SequenceCounter {
    /// A fresh counter for the key.
    #[must_use]
    pub fn new(category: Category, year_month: YearMonth) -> Self {
        Self {
            category_prefix: category.prefix().to_string(),
            year_month,
            last_sequence_number: 0,
        }
    }

    /// Bump the counter and return the new value.
    ///
    /// Returns `None` once the counter would overflow `u32`; the counter is
    /// left untouched in that case.
    pub fn increment(&mut self) -> Option<u32> {
        let next = self.last_sequence_number.checked_add(1)?;
        self.last_sequence_number = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn july_2025() -> YearMonth {
        YearMonth::new(25, 7).unwrap()
    }

    #[test]
    fn year_month_formats_zero_padded() {
        assert_eq!(july_2025().to_string(), "2507");
        assert_eq!(YearMonth::new(3, 1).unwrap().to_string(), "0301");
    }

    #[test]
    fn year_month_from_datetime() {
        let at = Utc.with_ymd_and_hms(2025, 7, 14, 9, 30, 0).unwrap();
        assert_eq!(YearMonth::from_datetime(at), july_2025());

        let y2k = Utc.with_ymd_and_hms(2000, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(YearMonth::from_datetime(y2k).to_string(), "0012");
    }

    #[test]
    fn year_month_rejects_bad_input() {
        assert!(YearMonth::new(25, 0).is_err());
        assert!(YearMonth::new(25, 13).is_err());
        assert!("2513".parse::<YearMonth>().is_err());
        assert!("257".parse::<YearMonth>().is_err());
        assert!("ab07".parse::<YearMonth>().is_err());
    }

    #[test]
    fn uid_formats_like_lap_2507_0001() {
        let uid = Uid::new(Category::Laptop, july_2025(), 1);
        assert_eq!(uid.to_string(), "LAP-2507-0001");
    }

    #[test]
    fn uid_widens_past_four_digits() {
        let uid = Uid::new(Category::Monitor, july_2025(), 10_000);
        assert_eq!(uid.to_string(), "MON-2507-10000");
        assert_eq!("MON-2507-10000".parse::<Uid>().unwrap(), uid);
    }

    #[test]
    fn uid_parses_its_own_output() {
        let uid: Uid = "DESK-2412-0042".parse().unwrap();
        assert_eq!(uid.prefix(), "DESK");
        assert_eq!(uid.year_month().to_string(), "2412");
        assert_eq!(uid.sequence(), 42);
    }

    #[test]
    fn uid_rejects_malformed_strings() {
        for bad in [
            "",
            "LAP",
            "LAP-2507",
            "LAP-2507-01",
            "lap-2507-0001",
            "LAP-2513-0001",
            "LAP-2507-0000",
            "LAP-2507-00001",
            "MON-2507-010000",
            "LAP-2507-0001-X",
            "INV-A1B2C3D4",
        ] {
            assert!(bad.parse::<Uid>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn counter_increments_from_one() {
        let mut counter = SequenceCounter::new(Category::Printer, july_2025());
        assert_eq!(counter.increment(), Some(1));
        assert_eq!(counter.increment(), Some(2));
        assert_eq!(counter.last_sequence_number, 2);
    }

    #[test]
    fn counter_refuses_to_wrap() {
        let mut counter = SequenceCounter::new(Category::Printer, july_2025());
        counter.last_sequence_number = u32::MAX;
        assert_eq!(counter.increment(), None);
        assert_eq!(counter.last_sequence_number, u32::MAX);
    }
}
