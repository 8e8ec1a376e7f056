// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pbi_audit::{Actor, Cause};
use pbi_domain::{
    AllocationType, CalculationVersion, ConfigurationSnapshot, FormulaConfig, KpiSnapshot,
    PerformanceMethod, RemunerationFormulaSnapshot, WorkerAllocationRule,
    WorkerAllocationSnapshot,
};
use std::collections::BTreeMap;

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin-123"), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_snapshot() -> ConfigurationSnapshot {
    let mut worker_allocations: BTreeMap<String, WorkerAllocationSnapshot> = BTreeMap::new();
    worker_allocations.insert(
        String::from("PHC"),
        WorkerAllocationSnapshot::new(
            "PHC",
            vec![
                WorkerAllocationRule::new("MO", AllocationType::Individual, 5000.0),
                WorkerAllocationRule::new("ANM", AllocationType::Performance, 2000.0),
            ],
        ),
    );

    ConfigurationSnapshot {
        version: CalculationVersion::initial(),
        captured_at: String::from("2026-01-01T00:00:00Z"),
        captured_by: None,
        kpis: vec![
            KpiSnapshot::new("anc_visits", 2.0, 50.0),
            KpiSnapshot::new("immunization", 1.0, 40.0),
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
