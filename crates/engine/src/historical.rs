// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Historical remuneration.
//!
//! A facility's remuneration for a month is calculated once and stored
//! together with the configuration that produced it. Later requests replay
//! the stored rows; only a forced recalculation recomputes them against the
//! current configuration.

use pbi::{FacilityCalculation, FacilityInputs, WorkerRemuneration, calculate_facility_remuneration};
use pbi_domain::{
    AllocationType, ConfigurationSnapshot, Facility, IndicatorOutcome, ReportMonth, Worker,
    utc_timestamp,
};
use pbi_persistence::{HistoricalRemunerationRecord, NewHistoricalRemunerationRecord, Persistence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::data_source::FacilityDataSource;
use crate::error::EngineError;
use crate::snapshot_store::get_current_configuration_snapshot;

/// A facility's remuneration for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRemunerationCalculation {
    pub facility_id: String,
    pub facility_name: String,
    pub facility_type: String,
    pub report_month: ReportMonth,
    /// The version that produced the figures, exactly as stored.
    pub calculation_version: String,
    /// RFC 3339 time the figures were calculated.
    pub calculated_at: String,
    pub performance_percentage: f64,
    pub facility_incentive_amount: f64,
    pub facility_remuneration: i64,
    pub indicators: Vec<IndicatorOutcome>,
    pub workers: Vec<WorkerRemuneration>,
    /// `true` when replayed from stored rows, `false` when freshly calculated.
    pub is_historical: bool,
}

impl HistoricalRemunerationCalculation {
    /// Sum of all worker payouts.
    #[must_use]
    pub fn total_worker_remuneration(&self) -> i64 {
        self.workers.iter().map(|worker| worker.calculated_amount).sum()
    }

    fn from_calculation(calculation: FacilityCalculation, calculated_at: String) -> Self {
        Self {
            facility_id: calculation.facility_id,
            facility_name: calculation.facility_name,
            facility_type: calculation.facility_type,
            report_month: calculation.report_month,
            calculation_version: calculation.calculation_version.to_string(),
            calculated_at,
            performance_percentage: calculation.performance_percentage,
            facility_incentive_amount: calculation.facility_incentive_amount,
            facility_remuneration: calculation.facility_remuneration,
            indicators: calculation.indicators,
            workers: calculation.workers,
            is_historical: false,
        }
    }
}

/// Returns a facility's remuneration for a month.
///
/// Stored rows are replayed verbatim unless `force_recalculation` is set;
/// the configuration tables are not read in that case. Otherwise the
/// remuneration is calculated against the current configuration and the
/// stored rows for the facility and month are replaced.
///
/// # Arguments
///
/// * `persistence` - The store holding configuration and stored rows
/// * `data_source` - Facility master data and reported values
/// * `facility_id` - The facility to calculate
/// * `report_month` - The report month
/// * `force_recalculation` - Recalculate even when rows are stored
///
/// # Errors
///
/// Returns `EngineError::FacilityNotFound` if a calculation is needed and
/// the facility does not exist, or an error if reading or writing fails.
pub fn get_facility_remuneration(
    persistence: &mut Persistence,
    data_source: &dyn FacilityDataSource,
    facility_id: &str,
    report_month: ReportMonth,
    force_recalculation: bool,
) -> Result<HistoricalRemunerationCalculation, EngineError> {
    if !force_recalculation {
        let stored: Vec<HistoricalRemunerationRecord> =
            persistence.get_facility_records(facility_id, report_month)?;
        if !stored.is_empty() {
            debug!(facility_id, report_month = %report_month, "Replaying stored remuneration");
            return reconstruct(facility_id, report_month, &stored);
        }
    }

    calculate_and_store(persistence, data_source, facility_id, report_month)
}

/// Lists the facilities whose remuneration for a month is already stored,
/// in facility ID order.
///
/// These are the facilities a plain [`get_facility_remuneration`] call
/// replays rather than calculates.
///
/// # Errors
///
/// Returns an error if the stored rows cannot be read.
pub fn list_calculated_facilities(
    persistence: &mut Persistence,
    report_month: ReportMonth,
) -> Result<Vec<String>, EngineError> {
    Ok(persistence.list_calculated_facilities(report_month)?)
}

fn calculate_and_store(
    persistence: &mut Persistence,
    data_source: &dyn FacilityDataSource,
    facility_id: &str,
    report_month: ReportMonth,
) -> Result<HistoricalRemunerationCalculation, EngineError> {
    let facility: Facility = data_source
        .facility(facility_id)?
        .ok_or_else(|| EngineError::FacilityNotFound(facility_id.to_string()))?;
    let field_values: BTreeMap<String, f64> = data_source.field_values(facility_id, report_month)?;
    let workers: Vec<Worker> = data_source.workers(facility_id)?;

    let snapshot: ConfigurationSnapshot = get_current_configuration_snapshot(persistence, None)?;
    let calculation: FacilityCalculation = calculate_facility_remuneration(
        &FacilityInputs {
            facility: &facility,
            report_month,
            field_values: &field_values,
            workers: &workers,
        },
        &snapshot,
    );

    let calculated_at: String = utc_timestamp()?;
    let records: Vec<NewHistoricalRemunerationRecord> =
        build_records(&calculation, &snapshot, &calculated_at)?;
    persistence.replace_facility_records(facility_id, report_month, &records)?;

    info!(
        facility_id,
        report_month = %report_month,
        version = %calculation.calculation_version,
        performance = calculation.performance_percentage,
        facility_remuneration = calculation.facility_remuneration,
        workers = calculation.workers.len(),
        "Calculated facility remuneration"
    );

    Ok(HistoricalRemunerationCalculation::from_calculation(
        calculation,
        calculated_at,
    ))
}

/// Turns a calculation into its facility row followed by one row per worker.
fn build_records(
    calculation: &FacilityCalculation,
    snapshot: &ConfigurationSnapshot,
    calculated_at: &str,
) -> Result<Vec<NewHistoricalRemunerationRecord>, EngineError> {
    let facility_row: NewHistoricalRemunerationRecord = NewHistoricalRemunerationRecord {
        facility_id: calculation.facility_id.clone(),
        facility_name: calculation.facility_name.clone(),
        facility_type: calculation.facility_type.clone(),
        report_month: calculation.report_month.to_string(),
        worker_id: None,
        worker_name: None,
        worker_category: None,
        allocation_type: None,
        allocated_amount: calculation.facility_incentive_amount,
        performance_percentage: calculation.performance_percentage,
        calculated_amount: calculation.facility_remuneration,
        calculation_version: calculation.calculation_version.to_string(),
        calculated_at: calculated_at.to_string(),
        kpi_snapshot_json: serde_json::to_string(&snapshot.kpis)?,
        formula_snapshot_json: serde_json::to_string(&snapshot.remuneration_formula)?,
        allocation_snapshot_json: serde_json::to_string(
            &snapshot.allocations_for(&calculation.facility_type),
        )?,
        indicator_breakdown_json: Some(serde_json::to_string(&calculation.indicators)?),
    };

    let mut records: Vec<NewHistoricalRemunerationRecord> =
        Vec::with_capacity(calculation.workers.len() + 1);
    for worker in &calculation.workers {
        records.push(NewHistoricalRemunerationRecord {
            worker_id: Some(worker.worker_id.clone()),
            worker_name: Some(worker.worker_name.clone()),
            worker_category: Some(worker.worker_category.clone()),
            allocation_type: worker.allocation_type.map(|kind| kind.as_str().to_string()),
            allocated_amount: worker.allocated_amount,
            calculated_amount: worker.calculated_amount,
            indicator_breakdown_json: None,
            ..facility_row.clone()
        });
    }
    records.insert(0, facility_row);

    Ok(records)
}

/// Rebuilds a result from stored rows alone.
fn reconstruct(
    facility_id: &str,
    report_month: ReportMonth,
    stored: &[HistoricalRemunerationRecord],
) -> Result<HistoricalRemunerationCalculation, EngineError> {
    let corrupt = |reason: String| EngineError::CorruptRecord {
        facility_id: facility_id.to_string(),
        report_month: report_month.to_string(),
        reason,
    };

    let facility_row: &HistoricalRemunerationRecord = stored
        .iter()
        .find(|record| record.is_facility_row())
        .ok_or_else(|| corrupt(String::from("no facility-level row")))?;

    let indicators: Vec<IndicatorOutcome> = match &facility_row.indicator_breakdown_json {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| corrupt(format!("indicator breakdown: {e}")))?,
        None => Vec::new(),
    };

    let workers: Vec<WorkerRemuneration> = stored
        .iter()
        .filter(|record| !record.is_facility_row())
        .map(|record| {
            let allocation_type: Option<AllocationType> = record
                .allocation_type
                .as_deref()
                .map(str::parse::<AllocationType>)
                .transpose()
                .map_err(|e| corrupt(format!("allocation type: {e}")))?;
            Ok(WorkerRemuneration {
                worker_id: record.worker_id.clone().unwrap_or_default(),
                worker_name: record.worker_name.clone().unwrap_or_default(),
                worker_category: record.worker_category.clone().unwrap_or_default(),
                allocation_type,
                allocated_amount: record.allocated_amount,
                calculated_amount: record.calculated_amount,
            })
        })
        .collect::<Result<Vec<WorkerRemuneration>, EngineError>>()?;

    Ok(HistoricalRemunerationCalculation {
        facility_id: facility_row.facility_id.clone(),
        facility_name: facility_row.facility_name.clone(),
        facility_type: facility_row.facility_type.clone(),
        report_month,
        calculation_version: facility_row.calculation_version.clone(),
        calculated_at: facility_row.calculated_at.clone(),
        performance_percentage: facility_row.performance_percentage,
        facility_incentive_amount: facility_row.allocated_amount,
        facility_remuneration: facility_row.calculated_amount,
        indicators,
        workers,
        is_historical: true,
    })
}
