// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::{Month, OffsetDateTime};

/// A reporting period: one calendar month.
///
/// Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportMonth {
    year: i32,
    month: Month,
}

impl ReportMonth {
    /// Creates a report month.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is outside 1900-9999.
    pub fn new(year: i32, month: Month) -> Result<Self, DomainError> {
        if !(1900..=9999).contains(&year) {
            return Err(DomainError::InvalidReportMonth(format!(
                "{year}-{:02}",
                u8::from(month)
            )));
        }
        Ok(Self { year, month })
    }

    /// Returns the calendar year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the calendar month.
    #[must_use]
    pub const fn month(&self) -> Month {
        self.month
    }
}

impl FromStr for ReportMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidReportMonth(s.to_string());

        let (year_part, month_part): (&str, &str) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(invalid());
        }
        if !year_part.chars().all(|c| c.is_ascii_digit())
            || !month_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month_number: u8 = month_part.parse().map_err(|_| invalid())?;
        let month: Month = Month::try_from(month_number).map_err(|_| invalid())?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for ReportMonth {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportMonth> for String {
    fn from(value: ReportMonth) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl PartialOrd for ReportMonth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReportMonth {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| u8::from(self.month).cmp(&u8::from(other.month)))
    }
}

/// A facility type code (e.g. `PHC`, `UPHC`, `SC`).
///
/// Facility type codes are normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FacilityType {
    code: String,
}

impl FacilityType {
    /// Creates a facility type from a code, normalizing to uppercase.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_uppercase(),
        }
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl From<String> for FacilityType {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<FacilityType> for String {
    fn from(value: FacilityType) -> Self {
        value.code
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl FromStr for FacilityType {
    type Err = DomainError;

    /// Parses a code supplied from outside, rejecting blanks and codes with
    /// characters other than ASCII letters, digits, `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: &str = s.trim();
        if code.is_empty()
            || !code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidFacilityType(s.to_string()));
        }
        Ok(Self::new(code))
    }
}

/// A healthcare facility as provided by the master data collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    /// The facility identifier.
    pub facility_id: String,
    /// The facility display name.
    pub name: String,
    /// The facility type, used for overrides and allocation rules.
    pub facility_type: FacilityType,
}

impl Facility {
    /// Creates a new facility.
    #[must_use]
    pub fn new(facility_id: &str, name: &str, facility_type: FacilityType) -> Self {
        Self {
            facility_id: facility_id.to_string(),
            name: name.to_string(),
            facility_type,
        }
    }
}

/// A health worker attached to a facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// The worker identifier.
    pub worker_id: String,
    /// The worker's name.
    pub name: String,
    /// The worker category (e.g. `MO`, `ANM`, `ASHA`), matched against allocation rules.
    pub category: String,
}

impl Worker {
    /// Creates a new worker.
    #[must_use]
    pub fn new(worker_id: &str, name: &str, category: &str) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            name: name.to_string(),
            category: category.trim().to_uppercase(),
        }
    }
}

/// Rounds a monetary amount to the nearest whole currency unit.
///
/// Non-finite or out-of-range values round to `0`.
#[must_use]
pub fn round_currency(amount: f64) -> i64 {
    amount.round().to_i64().unwrap_or(0)
}

/// Rounds a percentage to two decimal places for reporting.
#[must_use]
pub fn round_percentage(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Returns the current UTC time as an RFC 3339 string.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn utc_timestamp() -> Result<String, DomainError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| DomainError::TimestampError(e.to_string()))
}
