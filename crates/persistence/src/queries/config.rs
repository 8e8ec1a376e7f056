// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live configuration queries.

use diesel::prelude::*;
use pbi_domain::{
    AllocationType, FormulaConfig, KpiSnapshot, PerformanceMethod, RemunerationFormulaSnapshot,
    WorkerAllocationRule, WorkerAllocationSnapshot,
};
use std::collections::BTreeMap;

use crate::data_models::{AllocationRuleRow, KpiConfigRow, RemunerationFormulaRow};
use crate::diesel_schema::{kpi_configs, remuneration_formula, worker_allocation_rules};
use crate::error::PersistenceError;

fn kpi_from_row(row: KpiConfigRow) -> Result<KpiSnapshot, PersistenceError> {
    let formula: Option<FormulaConfig> = row
        .formula_json
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    Ok(KpiSnapshot {
        field_code: row.field_code,
        weight: row.weight,
        target: row.target,
        formula,
    })
}

fn rule_from_row(row: &AllocationRuleRow) -> Result<WorkerAllocationRule, PersistenceError> {
    let allocation_type: AllocationType = row.allocation_type.parse()?;
    Ok(WorkerAllocationRule::new(
        &row.worker_category,
        allocation_type,
        row.allocated_amount,
    ))
}

/// Retrieves every configured KPI, ordered by field code.
///
/// # Errors
///
/// Returns an error if the query fails or a stored formula cannot be
/// deserialized.
pub fn get_kpi_configs(conn: &mut SqliteConnection) -> Result<Vec<KpiSnapshot>, PersistenceError> {
    let rows: Vec<KpiConfigRow> = kpi_configs::table
        .order(kpi_configs::field_code.asc())
        .select(KpiConfigRow::as_select())
        .load(conn)?;

    rows.into_iter().map(kpi_from_row).collect()
}

/// Retrieves the facility remuneration formula, if one has been configured.
///
/// # Errors
///
/// Returns an error if the query fails or the stored performance method is
/// not recognized.
pub fn get_remuneration_formula(
    conn: &mut SqliteConnection,
) -> Result<Option<RemunerationFormulaSnapshot>, PersistenceError> {
    let row: Option<RemunerationFormulaRow> = remuneration_formula::table
        .select(RemunerationFormulaRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| {
        let method: PerformanceMethod = row.performance_method.parse()?;
        Ok(RemunerationFormulaSnapshot::new(
            row.facility_incentive_amount,
            method,
        ))
    })
    .transpose()
}

/// Retrieves the allocation rules of one facility type.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `facility_type` - The facility type code; matched case-insensitively
///
/// # Errors
///
/// Returns an error if the query fails or a stored allocation type is not
/// recognized.
pub fn get_allocation_rules(
    conn: &mut SqliteConnection,
    facility_type: &str,
) -> Result<Vec<WorkerAllocationRule>, PersistenceError> {
    let key: String = facility_type.trim().to_uppercase();
    let rows: Vec<AllocationRuleRow> = worker_allocation_rules::table
        .filter(worker_allocation_rules::facility_type.eq(&key))
        .order(worker_allocation_rules::worker_category.asc())
        .select(AllocationRuleRow::as_select())
        .load(conn)?;

    rows.iter().map(rule_from_row).collect()
}

/// Retrieves all allocation rules grouped by facility type.
///
/// # Errors
///
/// Returns an error if the query fails or a stored allocation type is not
/// recognized.
pub fn get_all_allocation_rules(
    conn: &mut SqliteConnection,
) -> Result<BTreeMap<String, WorkerAllocationSnapshot>, PersistenceError> {
    let rows: Vec<AllocationRuleRow> = worker_allocation_rules::table
        .order((
            worker_allocation_rules::facility_type.asc(),
            worker_allocation_rules::worker_category.asc(),
        ))
        .select(AllocationRuleRow::as_select())
        .load(conn)?;

    let mut grouped: BTreeMap<String, WorkerAllocationSnapshot> = BTreeMap::new();
    for row in &rows {
        let rule: WorkerAllocationRule = rule_from_row(row)?;
        grouped
            .entry(row.facility_type.clone())
            .or_insert_with(|| WorkerAllocationSnapshot::new(&row.facility_type, Vec::new()))
            .rules
            .push(rule);
    }

    Ok(grouped)
}
