// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pbi_audit::{AuditEvent, StateSnapshot};
use pbi_domain::{CalculationVersion, ConfigurationSnapshot};
use serde::{Deserialize, Serialize};

/// One declared calculation version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// The version identifier.
    pub version: CalculationVersion,
    /// RFC 3339 time the version was declared.
    pub created_at: String,
    /// The administrator who declared it.
    pub created_by: String,
    /// Free-text notes describing the change.
    pub notes: Option<String>,
    /// Whether this is the version new calculations are tagged with.
    pub is_active: bool,
}

/// All declared calculation versions.
///
/// At most one version is active. With no versions declared the active
/// version is [`CalculationVersion::initial`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionRegistry {
    /// Declared versions in declaration order.
    pub versions: Vec<VersionRecord>,
}

impl VersionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            versions: Vec::new(),
        }
    }

    /// Creates a registry from stored records.
    #[must_use]
    pub const fn from_records(versions: Vec<VersionRecord>) -> Self {
        Self { versions }
    }

    /// Checks if a version has been declared.
    #[must_use]
    pub fn has_version(&self, version: &CalculationVersion) -> bool {
        self.versions.iter().any(|record| &record.version == version)
    }

    /// Returns the version new calculations are tagged with.
    #[must_use]
    pub fn active_version(&self) -> CalculationVersion {
        self.versions
            .iter()
            .find(|record| record.is_active)
            .map_or_else(CalculationVersion::initial, |record| record.version.clone())
    }

    /// Returns declared versions, newest first.
    #[must_use]
    pub fn sorted_descending(&self) -> Vec<&VersionRecord> {
        let mut sorted: Vec<&VersionRecord> = self.versions.iter().collect();
        sorted.sort_by(|a, b| b.version.cmp(&a.version));
        sorted
    }

    /// Adds a version and makes it the only active one.
    pub(crate) fn activate(&mut self, record: VersionRecord) {
        for existing in &mut self.versions {
            existing.is_active = false;
        }
        self.versions.push(VersionRecord {
            is_active: true,
            ..record
        });
    }

    /// Converts the registry to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "active_version={},versions_count={}",
            self.active_version(),
            self.versions.len()
        ))
    }
}

/// A facility whose forced recalculation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationError {
    pub facility_id: String,
    pub message: String,
}

/// The folded result of recalculating every facility for a month.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecalculationOutcome {
    pub total_facilities: usize,
    pub recalculated_facilities: usize,
    pub errors: Vec<RecalculationError>,
}

impl RecalculationOutcome {
    /// Folds one facility's result into the outcome.
    #[must_use]
    pub fn record<E: std::fmt::Display>(mut self, facility_id: &str, result: Result<(), E>) -> Self {
        self.total_facilities += 1;
        match result {
            Ok(()) => self.recalculated_facilities += 1,
            Err(err) => self.errors.push(RecalculationError {
                facility_id: facility_id.to_string(),
                message: err.to_string(),
            }),
        }
        self
    }

    /// Whether every facility was recalculated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty() && self.recalculated_facilities == self.total_facilities
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The registry after the transition.
    pub new_registry: VersionRegistry,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
    /// The configuration captured for a newly declared version.
    pub snapshot: Option<ConfigurationSnapshot>,
}
