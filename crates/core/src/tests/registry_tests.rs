// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_actor, create_test_cause, create_test_snapshot};
use crate::{
    Command, RecalculationOutcome, VersionRecord, VersionRegistry, apply, validate_version_exists,
};
use pbi_domain::{CalculationVersion, DomainError};

fn declare(registry: &VersionRegistry, version: &str) -> VersionRegistry {
    apply(
        registry,
        Command::CreateVersion {
            version: String::from(version),
            notes: None,
            snapshot: create_test_snapshot(),
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
    .new_registry
}

#[test]
fn test_empty_registry_defaults_to_initial_version() {
    let registry: VersionRegistry = VersionRegistry::new();
    assert_eq!(registry.active_version(), CalculationVersion::initial());
}

#[test]
fn test_only_latest_declared_version_is_active() {
    let registry: VersionRegistry = declare(&VersionRegistry::new(), "1.1");
    let registry: VersionRegistry = declare(&registry, "1.2");

    let active: Vec<&VersionRecord> = registry
        .versions
        .iter()
        .filter(|record| record.is_active)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].version.to_string(), "1.2");
}

#[test]
fn test_sorted_descending() {
    let registry: VersionRegistry = declare(&VersionRegistry::new(), "1.10");
    let registry: VersionRegistry = declare(&registry, "1.9");
    let registry: VersionRegistry = declare(&registry, "2.0.0");

    let order: Vec<String> = registry
        .sorted_descending()
        .iter()
        .map(|record| record.version.to_string())
        .collect();
    assert_eq!(order, vec!["2.0.0", "1.10", "1.9"]);
}

#[test]
fn test_validate_version_exists() {
    let registry: VersionRegistry = declare(&VersionRegistry::new(), "1.1");

    assert!(validate_version_exists(&registry, &"1.1".parse().unwrap()).is_ok());
    assert_eq!(
        validate_version_exists(&registry, &"3.0".parse().unwrap()),
        Err(DomainError::VersionNotFound(String::from("3.0")))
    );
}

#[test]
fn test_recalculation_outcome_fold() {
    let results: Vec<(&str, Result<(), String>)> = vec![
        ("F-1", Ok(())),
        ("F-2", Err(String::from("missing facility master data"))),
        ("F-3", Ok(())),
    ];

    let outcome: RecalculationOutcome = results
        .into_iter()
        .fold(RecalculationOutcome::default(), |outcome, (facility_id, result)| {
            outcome.record(facility_id, result)
        });

    assert_eq!(outcome.total_facilities, 3);
    assert_eq!(outcome.recalculated_facilities, 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].facility_id, "F-2");
    assert!(!outcome.is_complete());
}
