// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// A calculation version identifier of the form `major.minor[.patch]`.
///
/// Two versions are equal only if they are written the same way:
/// `1.0` and `1.0.0` are distinct identifiers, and `1.0` sorts first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalculationVersion {
    major: u32,
    minor: u32,
    patch: Option<u32>,
}

impl CalculationVersion {
    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: Option<u32>) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the version assumed when none has been declared.
    #[must_use]
    pub const fn initial() -> Self {
        Self::new(1, 0, Some(0))
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Returns the patch component, if written.
    #[must_use]
    pub const fn patch(&self) -> Option<u32> {
        self.patch
    }

    fn ordering_key(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }
}

impl FromStr for CalculationVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidVersionFormat(s.to_string());

        let parts: Vec<&str> = s.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }

        // Each component must be a non-empty run of ASCII digits
        let mut numbers: Vec<u32> = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            numbers.push(part.parse::<u32>().map_err(|_| invalid())?);
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers.get(2).copied(),
        })
    }
}

impl TryFrom<String> for CalculationVersion {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalculationVersion> for String {
    fn from(value: CalculationVersion) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for CalculationVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{patch}", self.major, self.minor),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl PartialOrd for CalculationVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalculationVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordering_key()
            .cmp(&other.ordering_key())
            .then_with(|| self.patch.is_some().cmp(&other.patch.is_some()))
    }
}
