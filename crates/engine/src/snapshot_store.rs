// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Configuration snapshots.
//!
//! Every accessor reads the live configuration tables and returns an owned
//! value tagged with the calculation version active at that moment. Editing
//! the configuration afterwards never changes a value already returned.
//!
//! With no version declared the active version is `1.0.0`.

use pbi::{Command, TransitionResult, VersionRecord, VersionRegistry, apply};
use pbi_audit::{Actor, Cause};
use pbi_domain::{
    CalculationMetadata, CalculationVersion, ConfigurationSnapshot, KpiSnapshot,
    RemunerationFormulaSnapshot, WorkerAllocationSnapshot, utc_timestamp,
};
use pbi_persistence::{HistoricalRemunerationRecord, Persistence};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EngineError;

/// One piece of live configuration, tagged with the active version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConfig<T> {
    pub version: CalculationVersion,
    /// RFC 3339 time the configuration was read.
    pub captured_at: String,
    pub config: T,
}

/// What to do with a stored calculation given the version active now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredCalculationDecision {
    /// The stored figures were produced by the active version.
    UseStored,
    /// The stored version is missing or unreadable; recompute.
    Recalculate,
    /// A different version produced the figures; an administrator decides.
    ManualReview,
}

/// A newly declared calculation version.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedVersion {
    pub version: CalculationVersion,
    /// The audit event recording the declaration.
    pub event_id: i64,
    /// The configuration the version froze.
    pub snapshot: ConfigurationSnapshot,
}

fn active_version(persistence: &mut Persistence) -> Result<CalculationVersion, EngineError> {
    Ok(persistence.load_version_registry()?.active_version())
}

fn tag<T>(persistence: &mut Persistence, config: T) -> Result<CurrentConfig<T>, EngineError> {
    Ok(CurrentConfig {
        version: active_version(persistence)?,
        captured_at: utc_timestamp()?,
        config,
    })
}

/// Returns the configured KPIs.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read.
pub fn get_current_kpi_config(
    persistence: &mut Persistence,
) -> Result<CurrentConfig<Vec<KpiSnapshot>>, EngineError> {
    let kpis: Vec<KpiSnapshot> = persistence.get_kpi_configs()?;
    tag(persistence, kpis)
}

/// Returns the facility remuneration formula.
///
/// An unconfigured formula reads as a zero incentive with the weighted
/// average method.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read.
pub fn get_current_remuneration_formula(
    persistence: &mut Persistence,
) -> Result<CurrentConfig<RemunerationFormulaSnapshot>, EngineError> {
    let formula: RemunerationFormulaSnapshot =
        persistence.get_remuneration_formula()?.unwrap_or_default();
    tag(persistence, formula)
}

/// Returns the allocation rules of one facility type.
///
/// A facility type with no rules yields an empty rule list.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read.
pub fn get_current_worker_allocation_snapshot(
    persistence: &mut Persistence,
    facility_type: &str,
) -> Result<CurrentConfig<WorkerAllocationSnapshot>, EngineError> {
    let rules = persistence.get_allocation_rules(facility_type)?;
    tag(
        persistence,
        WorkerAllocationSnapshot::new(facility_type, rules),
    )
}

/// Returns the version, time and user a snapshot taken now would carry.
///
/// # Errors
///
/// Returns an error if the version registry cannot be read.
pub fn get_current_calculation_metadata(
    persistence: &mut Persistence,
    admin_user: Option<&str>,
) -> Result<CalculationMetadata, EngineError> {
    Ok(CalculationMetadata {
        version: active_version(persistence)?,
        captured_at: utc_timestamp()?,
        captured_by: admin_user.map(str::to_string),
    })
}

/// Captures the whole live configuration.
///
/// # Arguments
///
/// * `persistence` - The store to read from
/// * `admin_user` - Recorded as `captured_by` when given
///
/// # Errors
///
/// Returns an error if the configuration cannot be read.
pub fn get_current_configuration_snapshot(
    persistence: &mut Persistence,
    admin_user: Option<&str>,
) -> Result<ConfigurationSnapshot, EngineError> {
    let metadata: CalculationMetadata = get_current_calculation_metadata(persistence, admin_user)?;
    let kpis: Vec<KpiSnapshot> = persistence.get_kpi_configs()?;
    let remuneration_formula: RemunerationFormulaSnapshot =
        persistence.get_remuneration_formula()?.unwrap_or_default();
    let worker_allocations = persistence.get_all_allocation_rules()?;

    debug!(
        version = %metadata.version,
        kpis = kpis.len(),
        facility_types = worker_allocations.len(),
        "Captured configuration snapshot"
    );

    Ok(ConfigurationSnapshot {
        version: metadata.version,
        captured_at: metadata.captured_at,
        captured_by: metadata.captured_by,
        kpis,
        remuneration_formula,
        worker_allocations,
    })
}

/// Declares a new calculation version frozen from the live configuration.
///
/// The version record, its snapshot and the audit event are written in one
/// transaction. The new version becomes the active one.
///
/// # Arguments
///
/// * `persistence` - The store to read from and write to
/// * `version` - The version string, `major.minor[.patch]`
/// * `admin_user` - The administrator declaring the version
/// * `notes` - Optional description of the change
///
/// # Errors
///
/// Returns an error if the version string is malformed, already declared,
/// the configuration is invalid, or the write fails.
pub fn create_new_calculation_version(
    persistence: &mut Persistence,
    version: &str,
    admin_user: &str,
    notes: Option<&str>,
) -> Result<CreatedVersion, EngineError> {
    let registry: VersionRegistry = persistence.load_version_registry()?;
    let snapshot: ConfigurationSnapshot =
        get_current_configuration_snapshot(persistence, Some(admin_user))?;

    let cause: Cause = Cause::new(
        format!("create-version-{}", version.trim()),
        notes.map_or_else(
            || String::from("Calculation version declared"),
            str::to_string,
        ),
    );
    let result: TransitionResult = apply(
        &registry,
        Command::CreateVersion {
            version: version.to_string(),
            notes: notes.map(str::to_string),
            snapshot,
        },
        Actor::admin(admin_user),
        cause,
    )?;

    let event_id: i64 = persistence.persist_transition(&result)?;
    let version: CalculationVersion = result.new_registry.active_version();
    let snapshot: ConfigurationSnapshot = persistence.get_version_snapshot(&version)?;

    info!(version = %version, admin_user, event_id, "Created calculation version");
    Ok(CreatedVersion {
        version,
        event_id,
        snapshot,
    })
}

/// Returns every declared version, newest first.
///
/// # Errors
///
/// Returns an error if the versions cannot be read.
pub fn get_available_versions(
    persistence: &mut Persistence,
) -> Result<Vec<VersionRecord>, EngineError> {
    let registry: VersionRegistry = persistence.load_version_registry()?;
    Ok(registry.sorted_descending().into_iter().cloned().collect())
}

/// Decides whether a stored calculation can be used as-is.
///
/// A record produced by `current_version` is always used. A record whose
/// version is empty or does not parse is recalculated. Any other version
/// needs manual review.
#[must_use]
pub fn validate_stored_calculation(
    record: &HistoricalRemunerationRecord,
    current_version: &CalculationVersion,
) -> StoredCalculationDecision {
    match record.calculation_version.trim().parse::<CalculationVersion>() {
        Ok(version) if &version == current_version => StoredCalculationDecision::UseStored,
        Ok(_) => StoredCalculationDecision::ManualReview,
        Err(_) => StoredCalculationDecision::Recalculate,
    }
}
