// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use pbi_domain::{
    AllocationType, Facility, FacilityType, KpiSnapshot, PerformanceMethod,
    RemunerationFormulaSnapshot, ReportMonth, Worker, WorkerAllocationRule,
};
use pbi_persistence::Persistence;

use crate::data_source::InMemoryFacilityData;

pub const ADMIN: &str = "admin-1";

pub fn january() -> ReportMonth {
    "2026-01".parse().unwrap()
}

/// Two equally weighted KPIs, a 20000 facility incentive, and PHC rules
/// paying ANMs by performance and MOs the full incentive.
pub fn seed_configuration(persistence: &mut Persistence) {
    persistence
        .upsert_kpi_config(&KpiSnapshot::new("anc_visits", 2.0, 50.0))
        .unwrap();
    persistence
        .upsert_kpi_config(&KpiSnapshot::new("immunization", 2.0, 40.0))
        .unwrap();
    set_incentive(persistence, 20000.0);
    persistence
        .upsert_allocation_rule(
            "PHC",
            &WorkerAllocationRule::new("ANM", AllocationType::Performance, 2000.0),
        )
        .unwrap();
    persistence
        .upsert_allocation_rule(
            "PHC",
            &WorkerAllocationRule::new("MO", AllocationType::Individual, 5000.0),
        )
        .unwrap();
}

pub fn set_incentive(persistence: &mut Persistence, amount: f64) {
    persistence
        .set_remuneration_formula(&RemunerationFormulaSnapshot::new(
            amount,
            PerformanceMethod::WeightedAverage,
        ))
        .unwrap();
}

pub fn create_seeded_persistence() -> Persistence {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_configuration(&mut persistence);
    persistence
}

/// F-1 performs at 90%, F-2 at 75%. F-404 reported values but has no
/// master data record.
pub fn create_test_data() -> InMemoryFacilityData {
    let mut data: InMemoryFacilityData = InMemoryFacilityData::new();

    data.add_facility(Facility::new("F-1", "Alpha PHC", FacilityType::new("PHC")));
    data.add_worker("F-1", Worker::new("W-1", "Asha Devi", "anm"));
    data.add_worker("F-1", Worker::new("W-2", "Dr. Rao", "MO"));
    data.set_field_value("F-1", january(), "anc_visits", 40.0);
    data.set_field_value("F-1", january(), "immunization", 40.0);

    data.add_facility(Facility::new("F-2", "Beta PHC", FacilityType::new("PHC")));
    data.add_worker("F-2", Worker::new("W-3", "Meena Kumari", "ANM"));
    data.set_field_value("F-2", january(), "anc_visits", 25.0);
    data.set_field_value("F-2", january(), "immunization", 40.0);

    data.set_field_value("F-404", january(), "anc_visits", 10.0);

    data
}
