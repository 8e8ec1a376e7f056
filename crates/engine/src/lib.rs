// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Orchestration for the PBI remuneration engine.
//!
//! This crate ties the pure calculation in `pbi` to storage in
//! `pbi-persistence`:
//!
//! - [`snapshot_store`] reads the live configuration as owned, versioned
//!   snapshots and declares new calculation versions,
//! - [`historical`] calculates a facility's remuneration once per month and
//!   replays the stored figures afterwards,
//! - [`version_manager`] compares versions and forces recalculation of a
//!   whole month.
//!
//! Facility master data and reported values come from a
//! [`FacilityDataSource`].

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
#![allow(clippy::multiple_crate_versions)]

pub mod data_source;
mod error;
pub mod historical;
pub mod snapshot_store;
pub mod version_manager;

#[cfg(test)]
mod tests;

// ============================================================================
// Public API
// ============================================================================

pub use data_source::{FacilityDataSource, InMemoryFacilityData};
pub use error::EngineError;
pub use historical::{
    HistoricalRemunerationCalculation, get_facility_remuneration, list_calculated_facilities,
};
pub use snapshot_store::{
    CreatedVersion, CurrentConfig, StoredCalculationDecision, create_new_calculation_version,
    get_available_versions, get_current_calculation_metadata, get_current_configuration_snapshot,
    get_current_kpi_config, get_current_remuneration_formula,
    get_current_worker_allocation_snapshot, validate_stored_calculation,
};
pub use version_manager::{
    VersionChangeRequest, compare_versions, create_new_version, force_recalculation_for_month,
    force_recalculation_for_month_with_cancel, get_version_history,
};
