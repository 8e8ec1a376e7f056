// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calculation version administration.
//!
//! Declaring versions, comparing them, and forcing every facility's stored
//! remuneration for a month to be recalculated. Each of these leaves an
//! audit event behind.

use pbi::{
    Command, RecalculationOutcome, TransitionResult, VersionComparison, VersionRegistry, apply,
    compare_snapshots, validate_recalculation_request,
};
use pbi_audit::{Actor, AuditEvent, Cause};
use pbi_domain::{CalculationVersion, ConfigurationSnapshot, ReportMonth};
use pbi_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::data_source::FacilityDataSource;
use crate::error::EngineError;
use crate::historical::get_facility_remuneration;
use crate::snapshot_store::{CreatedVersion, create_new_calculation_version};

/// Audit actions that make up the version history.
const VERSION_HISTORY_ACTIONS: &[&str] = &["CreateVersion", "ForceRecalculation"];

/// A request to declare a new calculation version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionChangeRequest {
    /// The new version, `major.minor[.patch]`.
    pub version: String,
    pub admin_user: String,
    pub notes: Option<String>,
}

/// Declares a new calculation version from the live configuration.
///
/// # Errors
///
/// Returns an error if the admin user is missing, the version is malformed
/// or already declared, or the write fails.
pub fn create_new_version(
    persistence: &mut Persistence,
    request: &VersionChangeRequest,
) -> Result<CreatedVersion, EngineError> {
    create_new_calculation_version(
        persistence,
        &request.version,
        &request.admin_user,
        request.notes.as_deref(),
    )
}

/// Compares the snapshots frozen by two declared versions.
///
/// # Arguments
///
/// * `persistence` - The store holding the snapshots
/// * `old_version` - The baseline version
/// * `new_version` - The version compared against the baseline
///
/// # Errors
///
/// Returns an error if either version is malformed or was never declared.
pub fn compare_versions(
    persistence: &mut Persistence,
    old_version: &str,
    new_version: &str,
) -> Result<VersionComparison, EngineError> {
    let old_version: CalculationVersion = old_version.trim().parse()?;
    let new_version: CalculationVersion = new_version.trim().parse()?;

    let old: ConfigurationSnapshot = persistence.get_version_snapshot(&old_version)?;
    let new: ConfigurationSnapshot = persistence.get_version_snapshot(&new_version)?;

    let comparison: VersionComparison = compare_snapshots(&old, &new);
    info!(
        old_version = %old_version,
        new_version = %new_version,
        changes = comparison.changes.len(),
        impact = ?comparison.impact,
        "Compared calculation versions"
    );
    Ok(comparison)
}

/// Recalculates every facility that reported data for a month.
///
/// See [`force_recalculation_for_month_with_cancel`].
///
/// # Errors
///
/// Returns an error if the request is invalid or the facility list or the
/// audit event cannot be read or written. Failures of individual facilities
/// are collected in the outcome instead.
pub fn force_recalculation_for_month(
    persistence: &mut Persistence,
    data_source: &dyn FacilityDataSource,
    report_month: ReportMonth,
    admin_user: &str,
    reason: &str,
) -> Result<RecalculationOutcome, EngineError> {
    let never_cancelled: AtomicBool = AtomicBool::new(false);
    force_recalculation_for_month_with_cancel(
        persistence,
        data_source,
        report_month,
        admin_user,
        reason,
        &never_cancelled,
    )
}

/// Recalculates every facility that reported data for a month, stopping
/// early once `cancel` is set.
///
/// Facilities are recalculated one at a time. A facility that fails is
/// recorded in the outcome and the run continues. When cancelled, the
/// facility in progress completes and no further facility is started; the
/// outcome then counts every facility with data but only those that were
/// recalculated. The run is recorded as a `ForceRecalculation` audit event.
///
/// # Arguments
///
/// * `persistence` - The store to recalculate into
/// * `data_source` - Facility master data and reported values
/// * `report_month` - The month to recalculate
/// * `admin_user` - The administrator requesting the run
/// * `reason` - Why the stored figures are being replaced
/// * `cancel` - Checked before each facility
///
/// # Errors
///
/// Returns an error if the admin user or reason is blank, or if the facility
/// list or the audit event cannot be read or written.
pub fn force_recalculation_for_month_with_cancel(
    persistence: &mut Persistence,
    data_source: &dyn FacilityDataSource,
    report_month: ReportMonth,
    admin_user: &str,
    reason: &str,
    cancel: &AtomicBool,
) -> Result<RecalculationOutcome, EngineError> {
    validate_recalculation_request(admin_user, reason)?;

    let facility_ids: Vec<String> = data_source.facilities_with_data(report_month)?;
    info!(
        report_month = %report_month,
        facilities = facility_ids.len(),
        admin_user,
        "Starting forced recalculation"
    );

    let mut outcome: RecalculationOutcome = facility_ids
        .iter()
        .take_while(|_| !cancel.load(Ordering::SeqCst))
        .map(|facility_id| {
            let result: Result<(), EngineError> = get_facility_remuneration(
                persistence,
                data_source,
                facility_id,
                report_month,
                true,
            )
            .map(|_| ());
            if let Err(err) = &result {
                warn!(facility_id = %facility_id, error = %err, "Facility recalculation failed");
            }
            (facility_id, result)
        })
        .fold(
            RecalculationOutcome::default(),
            |outcome, (facility_id, result)| outcome.record(facility_id, result),
        );

    if outcome.total_facilities < facility_ids.len() {
        warn!(
            report_month = %report_month,
            started = outcome.total_facilities,
            facilities = facility_ids.len(),
            "Forced recalculation cancelled"
        );
        outcome.total_facilities = facility_ids.len();
    }

    let registry: VersionRegistry = persistence.load_version_registry()?;
    let result: TransitionResult = apply(
        &registry,
        Command::ForceRecalculation {
            report_month,
            reason: reason.to_string(),
            outcome: outcome.clone(),
        },
        Actor::admin(admin_user),
        Cause::new(
            format!("force-recalculation-{report_month}"),
            reason.to_string(),
        ),
    )?;
    let event_id: i64 = persistence.persist_transition(&result)?;

    info!(
        report_month = %report_month,
        recalculated = outcome.recalculated_facilities,
        failed = outcome.errors.len(),
        event_id,
        "Forced recalculation finished"
    );
    Ok(outcome)
}

/// Returns version declarations and forced recalculations, oldest first.
///
/// # Errors
///
/// Returns an error if the audit log cannot be read.
pub fn get_version_history(persistence: &mut Persistence) -> Result<Vec<AuditEvent>, EngineError> {
    Ok(persistence.get_audit_events_for_actions(VERSION_HISTORY_ACTIONS)?)
}
