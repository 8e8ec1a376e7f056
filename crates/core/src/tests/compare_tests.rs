// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_snapshot;
use crate::{ChangeCategory, ImpactLevel, Recommendation, VersionComparison, compare_snapshots};
use pbi_domain::{
    AllocationType, ConfigurationSnapshot, FormulaConfig, KpiSnapshot, PerformanceMethod,
    WorkerAllocationRule, WorkerAllocationSnapshot,
};

fn next_version(snapshot: &ConfigurationSnapshot) -> ConfigurationSnapshot {
    ConfigurationSnapshot {
        version: "1.1.0".parse().unwrap(),
        ..snapshot.clone()
    }
}

#[test]
fn test_identical_snapshots_are_safe() {
    let old: ConfigurationSnapshot = create_test_snapshot();
    let new: ConfigurationSnapshot = next_version(&old);

    let comparison: VersionComparison = compare_snapshots(&old, &new);

    assert!(comparison.changes.is_empty());
    assert_eq!(comparison.impact, ImpactLevel::Low);
    assert_eq!(comparison.recommendation, Recommendation::Safe);
    assert_eq!(comparison.old_version.to_string(), "1.0.0");
    assert_eq!(comparison.new_version.to_string(), "1.1.0");
}

#[test]
fn test_kpi_weight_change_is_high_impact() {
    let old: ConfigurationSnapshot = create_test_snapshot();
    let mut new: ConfigurationSnapshot = next_version(&old);
    new.kpis[0].weight = 3.0;

    let comparison: VersionComparison = compare_snapshots(&old, &new);

    assert_eq!(comparison.changes.len(), 1);
    assert_eq!(comparison.changes[0].path, "kpis.anc_visits.weight");
    assert_eq!(comparison.changes[0].old_value.as_deref(), Some("2"));
    assert_eq!(comparison.changes[0].new_value.as_deref(), Some("3"));
    assert_eq!(comparison.impact, ImpactLevel::High);
    assert_eq!(comparison.recommendation, Recommendation::ManualVerification);
}

#[test]
fn test_formula_change_is_high_impact() {
    let old: ConfigurationSnapshot = create_test_snapshot();
    let mut new: ConfigurationSnapshot = next_version(&old);
    new.kpis[2].formula = Some(FormulaConfig::percentage_range(4.0, 6.0));

    let comparison: VersionComparison = compare_snapshots(&old, &new);

    assert_eq!(comparison.changes.len(), 1);
    assert_eq!(comparison.changes[0].path, "kpis.footfall.formula");
    assert_eq!(comparison.impact, ImpactLevel::High);
}

#[test]
fn test_kpi_added_and_removed() {
    let old: ConfigurationSnapshot = create_test_snapshot();
    let mut new: ConfigurationSnapshot = next_version(&old);
    new.kpis.remove(1);
    new.kpis.push(KpiSnapshot::new("tb_screening", 1.0, 30.0));

    let comparison: VersionComparison = compare_snapshots(&old, &new);

    let removed = comparison
        .changes
        .iter()
        .find(|change| change.path == "kpis.immunization")
        .unwrap();
    assert!(removed.new_value.is_none());

    let added = comparison
        .changes
        .iter()
        .find(|change| change.path == "kpis.tb_screening")
        .unwrap();
    assert!(added.old_value.is_none());
    assert_eq!(comparison.impact, ImpactLevel::High);
}

#[test]
fn test_incentive_and_method_changes_are_high_impact() {
    let old: ConfigurationSnapshot = create_test_snapshot();
    let mut new: ConfigurationSnapshot = next_version(&old);
    new.remuneration_formula.performance_method = PerformanceMethod::SimpleAverage;

    let comparison: VersionComparison = compare_snapshots(&old, &new);

    assert_eq!(comparison.changes.len(), 1);
    assert_eq!(
        comparison.changes[0].category,
        ChangeCategory::RemunerationFormula
    );
    assert_eq!(comparison.impact, ImpactLevel::High);
}

#[test]
fn test_allocation_only_change_is_medium_impact() {
    let old: ConfigurationSnapshot = create_test_snapshot();
    let mut new: ConfigurationSnapshot = next_version(&old);
    new.worker_allocations.insert(
        String::from("SC"),
        WorkerAllocationSnapshot::new(
            "SC",
            vec![WorkerAllocationRule::new(
                "CHO",
                AllocationType::Performance,
                1500.0,
            )],
        ),
    );

    let comparison: VersionComparison = compare_snapshots(&old, &new);

    assert_eq!(comparison.changes.len(), 1);
    assert_eq!(comparison.changes[0].path, "worker_allocations.SC.CHO");
    assert_eq!(
        comparison.changes[0].new_value.as_deref(),
        Some("performance 1500")
    );
    assert_eq!(comparison.impact, ImpactLevel::Medium);
    assert_eq!(comparison.recommendation, Recommendation::Review);
}

#[test]
fn test_mixed_changes_take_highest_impact() {
    let old: ConfigurationSnapshot = create_test_snapshot();
    let mut new: ConfigurationSnapshot = next_version(&old);
    new.remuneration_formula.facility_incentive_amount = 25000.0;
    if let Some(allocation) = new.worker_allocations.get_mut("PHC") {
        allocation.rules[1].allocated_amount = 2500.0;
    }

    let comparison: VersionComparison = compare_snapshots(&old, &new);

    assert_eq!(comparison.changes.len(), 2);
    assert_eq!(comparison.impact, ImpactLevel::High);
}

#[test]
fn test_impact_serialization() {
    assert_eq!(
        serde_json::to_string(&Recommendation::ManualVerification).unwrap(),
        "\"manual_verification\""
    );
    assert_eq!(serde_json::to_string(&ImpactLevel::Medium).unwrap(), "\"medium\"");
}
