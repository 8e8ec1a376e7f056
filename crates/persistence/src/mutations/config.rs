// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live configuration mutations.
//!
//! These edit the tables that the next snapshot is taken from. They never
//! touch declared versions or stored remuneration.

use diesel::prelude::*;
use pbi_domain::{KpiSnapshot, RemunerationFormulaSnapshot, WorkerAllocationRule};
use tracing::info;

use crate::data_models::{NewAllocationRule, NewKpiConfig, NewRemunerationFormula};
use crate::diesel_schema::{kpi_configs, remuneration_formula, worker_allocation_rules};
use crate::error::PersistenceError;

/// The only row of the `remuneration_formula` table.
const FORMULA_ROW_ID: i64 = 1;

/// Inserts or replaces a KPI configuration.
///
/// # Errors
///
/// Returns an error if the formula cannot be serialized or the write fails.
pub fn upsert_kpi_config(
    conn: &mut SqliteConnection,
    kpi: &KpiSnapshot,
) -> Result<(), PersistenceError> {
    let formula_json: Option<String> = kpi.formula.as_ref().map(serde_json::to_string).transpose()?;
    let row: NewKpiConfig<'_> = NewKpiConfig {
        field_code: &kpi.field_code,
        weight: kpi.weight,
        target: kpi.target,
        formula_json,
    };

    diesel::insert_into(kpi_configs::table)
        .values(&row)
        .on_conflict(kpi_configs::field_code)
        .do_update()
        .set(&row)
        .execute(conn)?;

    info!(field_code = %kpi.field_code, "Saved KPI configuration");
    Ok(())
}

/// Removes a KPI configuration.
///
/// # Returns
///
/// `true` if a KPI was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_kpi_config(
    conn: &mut SqliteConnection,
    field_code: &str,
) -> Result<bool, PersistenceError> {
    let deleted: usize =
        diesel::delete(kpi_configs::table.filter(kpi_configs::field_code.eq(field_code)))
            .execute(conn)?;
    Ok(deleted > 0)
}

/// Sets the facility remuneration formula.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn set_remuneration_formula(
    conn: &mut SqliteConnection,
    formula: &RemunerationFormulaSnapshot,
) -> Result<(), PersistenceError> {
    let row: NewRemunerationFormula<'_> = NewRemunerationFormula {
        formula_id: FORMULA_ROW_ID,
        facility_incentive_amount: formula.facility_incentive_amount,
        performance_method: formula.performance_method.as_str(),
    };

    diesel::insert_into(remuneration_formula::table)
        .values(&row)
        .on_conflict(remuneration_formula::formula_id)
        .do_update()
        .set(&row)
        .execute(conn)?;

    info!(
        facility_incentive_amount = formula.facility_incentive_amount,
        performance_method = %formula.performance_method,
        "Saved remuneration formula"
    );
    Ok(())
}

/// Inserts or replaces the allocation rule of a worker category within a
/// facility type.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `facility_type` - The facility type code; stored uppercase
/// * `rule` - The allocation rule
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_allocation_rule(
    conn: &mut SqliteConnection,
    facility_type: &str,
    rule: &WorkerAllocationRule,
) -> Result<(), PersistenceError> {
    let facility_type: String = facility_type.trim().to_uppercase();
    let row: NewAllocationRule<'_> = NewAllocationRule {
        facility_type: &facility_type,
        worker_category: &rule.worker_category,
        allocation_type: rule.allocation_type.as_str(),
        allocated_amount: rule.allocated_amount,
    };

    diesel::insert_into(worker_allocation_rules::table)
        .values(&row)
        .on_conflict((
            worker_allocation_rules::facility_type,
            worker_allocation_rules::worker_category,
        ))
        .do_update()
        .set((
            worker_allocation_rules::allocation_type.eq(row.allocation_type),
            worker_allocation_rules::allocated_amount.eq(row.allocated_amount),
        ))
        .execute(conn)?;

    info!(
        facility_type = %facility_type,
        worker_category = %rule.worker_category,
        "Saved worker allocation rule"
    );
    Ok(())
}
