// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_snapshot;
use crate::{FacilityCalculation, FacilityInputs, WorkerRemuneration, calculate_facility_remuneration};
use pbi_domain::{
    AllocationType, ConfigurationSnapshot, Facility, FacilityType, PerformanceMethod, ReportMonth,
    Worker,
};
use std::collections::BTreeMap;

fn create_test_facility() -> Facility {
    Facility::new("F-001", "Rampur PHC", FacilityType::new("PHC"))
}

fn create_test_workers() -> Vec<Worker> {
    vec![
        Worker::new("W-1", "Dr. Mehta", "MO"),
        Worker::new("W-2", "Sunita", "ANM"),
        Worker::new("W-3", "Ravi", "PHARMACIST"),
    ]
}

fn create_test_values() -> BTreeMap<String, f64> {
    let mut values: BTreeMap<String, f64> = BTreeMap::new();
    values.insert(String::from("anc_visits"), 50.0);
    values.insert(String::from("immunization"), 20.0);
    values.insert(String::from("footfall"), 400.0);
    values
}

#[test]
fn test_facility_calculation_combines_indicators_and_workers() {
    let facility: Facility = create_test_facility();
    let workers: Vec<Worker> = create_test_workers();
    let values: BTreeMap<String, f64> = create_test_values();
    let report_month: ReportMonth = "2025-03".parse().unwrap();
    let inputs: FacilityInputs<'_> = FacilityInputs {
        facility: &facility,
        report_month,
        field_values: &values,
        workers: &workers,
    };

    let calculation: FacilityCalculation =
        calculate_facility_remuneration(&inputs, &create_test_snapshot());

    // anc 100% x2, immunization 50% x1, footfall 4% of catchment -> 80% x1
    assert!((calculation.performance_percentage - 82.5).abs() < 1e-9);
    assert_eq!(calculation.facility_remuneration, 16500);
    assert_eq!(calculation.indicators.len(), 3);
    assert_eq!(calculation.report_month, report_month);
    assert_eq!(calculation.calculation_version.to_string(), "1.0.0");

    let mo: &WorkerRemuneration = &calculation.workers[0];
    assert_eq!(mo.allocation_type, Some(AllocationType::Individual));
    assert!((mo.allocated_amount - 20000.0).abs() < 1e-9);
    assert_eq!(mo.calculated_amount, 20000);

    let anm: &WorkerRemuneration = &calculation.workers[1];
    assert_eq!(anm.allocation_type, Some(AllocationType::Performance));
    assert_eq!(anm.calculated_amount, 1650);

    let pharmacist: &WorkerRemuneration = &calculation.workers[2];
    assert_eq!(pharmacist.allocation_type, None);
    assert_eq!(pharmacist.calculated_amount, 0);

    assert_eq!(calculation.total_worker_remuneration(), 21650);
}

#[test]
fn test_facility_without_data_scores_zero() {
    let facility: Facility = create_test_facility();
    let workers: Vec<Worker> = create_test_workers();
    let values: BTreeMap<String, f64> = BTreeMap::new();
    let inputs: FacilityInputs<'_> = FacilityInputs {
        facility: &facility,
        report_month: "2025-03".parse().unwrap(),
        field_values: &values,
        workers: &workers,
    };

    let calculation: FacilityCalculation =
        calculate_facility_remuneration(&inputs, &create_test_snapshot());

    assert!(calculation.performance_percentage.abs() < 1e-9);
    assert_eq!(calculation.facility_remuneration, 0);
    // Individual allocations do not depend on performance
    assert_eq!(calculation.workers[0].calculated_amount, 20000);
    assert_eq!(calculation.workers[1].calculated_amount, 0);
}

#[test]
fn test_facility_type_without_rules_pays_no_workers() {
    let facility: Facility = Facility::new("F-002", "Ward 4 UPHC", FacilityType::new("UPHC"));
    let workers: Vec<Worker> = create_test_workers();
    let values: BTreeMap<String, f64> = create_test_values();
    let inputs: FacilityInputs<'_> = FacilityInputs {
        facility: &facility,
        report_month: "2025-03".parse().unwrap(),
        field_values: &values,
        workers: &workers,
    };

    let calculation: FacilityCalculation =
        calculate_facility_remuneration(&inputs, &create_test_snapshot());

    assert_eq!(calculation.workers.len(), 3);
    assert!(calculation.workers.iter().all(|worker| worker.calculated_amount == 0));
}

#[test]
fn test_simple_average_method() {
    let facility: Facility = create_test_facility();
    let values: BTreeMap<String, f64> = create_test_values();
    let mut snapshot: ConfigurationSnapshot = create_test_snapshot();
    snapshot.remuneration_formula.performance_method = PerformanceMethod::SimpleAverage;
    let inputs: FacilityInputs<'_> = FacilityInputs {
        facility: &facility,
        report_month: "2025-03".parse().unwrap(),
        field_values: &values,
        workers: &[],
    };

    let calculation: FacilityCalculation = calculate_facility_remuneration(&inputs, &snapshot);

    // (100 + 50 + 80) / 3
    assert!((calculation.performance_percentage - 76.67).abs() < 1e-9);
}
