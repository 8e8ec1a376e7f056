// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use pbi::{Command, TransitionResult, VersionRegistry, apply};
use pbi_audit::{Actor, Cause};
use pbi_domain::{
    AllocationType, CalculationVersion, ConfigurationSnapshot, FormulaConfig, KpiSnapshot,
    PerformanceMethod, RemunerationFormulaSnapshot, WorkerAllocationRule,
    WorkerAllocationSnapshot,
};
use std::collections::BTreeMap;

use crate::{NewHistoricalRemunerationRecord, Persistence};

pub fn create_test_actor() -> Actor {
    Actor::admin("admin-123")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn create_test_snapshot() -> ConfigurationSnapshot {
    let mut worker_allocations: BTreeMap<String, WorkerAllocationSnapshot> = BTreeMap::new();
    worker_allocations.insert(
        String::from("PHC"),
        WorkerAllocationSnapshot::new(
            "PHC",
            vec![
                WorkerAllocationRule::new("ANM", AllocationType::Performance, 2000.0),
                WorkerAllocationRule::new("MO", AllocationType::Individual, 5000.0),
            ],
        ),
    );

    ConfigurationSnapshot {
        version: CalculationVersion::initial(),
        captured_at: String::from("2026-01-01T00:00:00Z"),
        captured_by: None,
        kpis: vec![
            KpiSnapshot::new("anc_visits", 2.0, 50.0),
            KpiSnapshot::new("footfall", 1.0, 10000.0)
                .with_formula(FormulaConfig::percentage_range(3.0, 5.0)),
        ],
        remuneration_formula: RemunerationFormulaSnapshot::new(
            20000.0,
            PerformanceMethod::WeightedAverage,
        ),
        worker_allocations,
    }
}

/// Declares a version through the pure transition and persists it.
pub fn declare_version(persistence: &mut Persistence, version: &str) -> TransitionResult {
    let registry: VersionRegistry = persistence.load_version_registry().unwrap();
    let result: TransitionResult = apply(
        &registry,
        Command::CreateVersion {
            version: String::from(version),
            notes: Some(format!("Release {version}")),
            snapshot: create_test_snapshot(),
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    persistence.persist_transition(&result).unwrap();
    result
}

pub fn create_facility_row(
    facility_id: &str,
    report_month: &str,
    calculated_amount: i64,
) -> NewHistoricalRemunerationRecord {
    NewHistoricalRemunerationRecord {
        facility_id: facility_id.to_string(),
        facility_name: format!("{facility_id} PHC"),
        facility_type: String::from("PHC"),
        report_month: report_month.to_string(),
        worker_id: None,
        worker_name: None,
        worker_category: None,
        allocation_type: None,
        allocated_amount: 20000.0,
        performance_percentage: 82.5,
        calculated_amount,
        calculation_version: String::from("1.0.0"),
        calculated_at: String::from("2026-02-01T00:00:00Z"),
        kpi_snapshot_json: String::from("[]"),
        formula_snapshot_json: String::from("{}"),
        allocation_snapshot_json: String::from("null"),
        indicator_breakdown_json: Some(String::from("[]")),
    }
}

pub fn create_worker_row(
    facility_id: &str,
    report_month: &str,
    worker_id: &str,
    calculated_amount: i64,
) -> NewHistoricalRemunerationRecord {
    NewHistoricalRemunerationRecord {
        worker_id: Some(worker_id.to_string()),
        worker_name: Some(format!("Worker {worker_id}")),
        worker_category: Some(String::from("ANM")),
        allocation_type: Some(String::from("performance")),
        allocated_amount: 2000.0,
        indicator_breakdown_json: None,
        ..create_facility_row(facility_id, report_month, calculated_amount)
    }
}
