// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{
    audit_events, calculation_versions, historical_remuneration, kpi_configs,
    remuneration_formula, worker_allocation_rules,
};

// ============================================================================
// Live configuration rows
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = kpi_configs)]
pub struct KpiConfigRow {
    pub field_code: String,
    pub weight: f64,
    pub target: f64,
    pub formula_json: Option<String>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = kpi_configs)]
#[diesel(treat_none_as_null = true)]
pub struct NewKpiConfig<'a> {
    pub field_code: &'a str,
    pub weight: f64,
    pub target: f64,
    pub formula_json: Option<String>,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = remuneration_formula)]
pub struct RemunerationFormulaRow {
    pub facility_incentive_amount: f64,
    pub performance_method: String,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = remuneration_formula)]
pub struct NewRemunerationFormula<'a> {
    pub formula_id: i64,
    pub facility_incentive_amount: f64,
    pub performance_method: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = worker_allocation_rules)]
pub struct AllocationRuleRow {
    pub facility_type: String,
    pub worker_category: String,
    pub allocation_type: String,
    pub allocated_amount: f64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = worker_allocation_rules)]
pub struct NewAllocationRule<'a> {
    pub facility_type: &'a str,
    pub worker_category: &'a str,
    pub allocation_type: &'a str,
    pub allocated_amount: f64,
}

// ============================================================================
// Versions & audit
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = calculation_versions)]
pub struct VersionRow {
    pub version: String,
    pub created_at: String,
    pub created_by: String,
    pub notes: Option<String>,
    pub is_active: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = calculation_versions)]
pub struct NewVersion<'a> {
    pub version: &'a str,
    pub snapshot_json: &'a str,
    pub created_at: &'a str,
    pub created_by: &'a str,
    pub notes: Option<&'a str>,
    pub is_active: i32,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub calculation_version: Option<String>,
    pub report_month: Option<String>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEvent<'a> {
    pub action_name: &'a str,
    pub calculation_version: Option<String>,
    pub report_month: Option<String>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
}

// ============================================================================
// Historical remuneration
// ============================================================================

/// A stored remuneration figure for one facility and month.
///
/// Facility rows have no `worker_id`; worker rows carry the worker's
/// identity and allocation. Snapshot columns hold the JSON of the
/// configuration the figure was calculated against.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = historical_remuneration)]
pub struct HistoricalRemunerationRecord {
    pub record_id: i64,
    pub facility_id: String,
    pub facility_name: String,
    pub facility_type: String,
    pub report_month: String,
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub worker_category: Option<String>,
    pub allocation_type: Option<String>,
    pub allocated_amount: f64,
    pub performance_percentage: f64,
    pub calculated_amount: i64,
    pub calculation_version: String,
    pub calculated_at: String,
    pub kpi_snapshot_json: String,
    pub formula_snapshot_json: String,
    pub allocation_snapshot_json: String,
    pub indicator_breakdown_json: Option<String>,
}

impl HistoricalRemunerationRecord {
    /// Whether this is the facility-level row rather than a worker row.
    #[must_use]
    pub const fn is_facility_row(&self) -> bool {
        self.worker_id.is_none()
    }
}

/// A remuneration figure ready to be stored.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = historical_remuneration)]
pub struct NewHistoricalRemunerationRecord {
    pub facility_id: String,
    pub facility_name: String,
    pub facility_type: String,
    pub report_month: String,
    pub worker_id: Option<String>,
    pub worker_name: Option<String>,
    pub worker_category: Option<String>,
    pub allocation_type: Option<String>,
    pub allocated_amount: f64,
    pub performance_percentage: f64,
    pub calculated_amount: i64,
    pub calculation_version: String,
    pub calculated_at: String,
    pub kpi_snapshot_json: String,
    pub formula_snapshot_json: String,
    pub allocation_snapshot_json: String,
    pub indicator_breakdown_json: Option<String>,
}
