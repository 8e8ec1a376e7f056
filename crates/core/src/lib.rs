// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod calculation;
mod command;
mod compare;
mod error;
mod state;

#[cfg(test)]
mod tests;

use pbi_domain::{CalculationVersion, DomainError};

// Re-export public types and functions
pub use apply::{apply, validate_recalculation_request};
pub use calculation::{
    FacilityCalculation, FacilityInputs, WorkerRemuneration, calculate_facility_remuneration,
};
pub use command::Command;
pub use compare::{
    ChangeCategory, ConfigurationChange, ImpactLevel, Recommendation, VersionComparison,
    compare_snapshots,
};
pub use error::CoreError;
pub use state::{
    RecalculationError, RecalculationOutcome, TransitionResult, VersionRecord, VersionRegistry,
};

/// Validates that a version has been declared.
///
/// This is a read-only validation that does not create audit events.
///
/// # Arguments
///
/// * `registry` - The version registry to check
/// * `version` - The version to validate
///
/// # Errors
///
/// Returns an error if the version has not been declared.
pub fn validate_version_exists(
    registry: &VersionRegistry,
    version: &CalculationVersion,
) -> Result<(), DomainError> {
    if !registry.has_version(version) {
        return Err(DomainError::VersionNotFound(version.to_string()));
    }
    Ok(())
}
