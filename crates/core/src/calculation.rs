// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pbi_domain::{
    AllocationType, CalculationVersion, ConfigurationSnapshot, Facility, IndicatorOutcome,
    ReportMonth, Worker, WorkerAllocationRule, WorkerAllocationSnapshot, WorkerPayout,
    facility_payout, facility_performance, grade_indicator, worker_payout,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the data source reports for one facility and month.
#[derive(Debug, Clone, Copy)]
pub struct FacilityInputs<'a> {
    pub facility: &'a Facility,
    pub report_month: ReportMonth,
    pub field_values: &'a BTreeMap<String, f64>,
    pub workers: &'a [Worker],
}

/// One worker's computed remuneration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRemuneration {
    pub worker_id: String,
    pub worker_name: String,
    pub worker_category: String,
    /// `None` when the worker's category has no allocation rule.
    pub allocation_type: Option<AllocationType>,
    pub allocated_amount: f64,
    pub calculated_amount: i64,
}

/// The full remuneration of one facility for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityCalculation {
    pub facility_id: String,
    pub facility_name: String,
    pub facility_type: String,
    pub report_month: ReportMonth,
    pub calculation_version: CalculationVersion,
    pub performance_percentage: f64,
    pub facility_incentive_amount: f64,
    pub facility_remuneration: i64,
    pub indicators: Vec<IndicatorOutcome>,
    pub workers: Vec<WorkerRemuneration>,
}

impl FacilityCalculation {
    /// Sum of all worker payouts.
    #[must_use]
    pub fn total_worker_remuneration(&self) -> i64 {
        self.workers.iter().map(|worker| worker.calculated_amount).sum()
    }
}

/// Computes a facility's remuneration from its reported data and a
/// configuration snapshot.
///
/// This is a pure function. It never fails: missing field values grade as
/// zero and workers without an allocation rule are paid nothing.
///
/// # Arguments
///
/// * `inputs` - The facility, month, field values and workers
/// * `snapshot` - The configuration to calculate against
#[must_use]
pub fn calculate_facility_remuneration(
    inputs: &FacilityInputs<'_>,
    snapshot: &ConfigurationSnapshot,
) -> FacilityCalculation {
    let facility_type: &str = inputs.facility.facility_type.code();

    let indicators: Vec<IndicatorOutcome> = snapshot
        .kpis
        .iter()
        .map(|kpi| grade_indicator(kpi, inputs.field_values, facility_type))
        .collect();

    let performance_percentage: f64 = facility_performance(
        &indicators,
        snapshot.remuneration_formula.performance_method,
    );
    let facility_incentive_amount: f64 = snapshot.remuneration_formula.facility_incentive_amount;

    let allocations: Option<&WorkerAllocationSnapshot> = snapshot.allocations_for(facility_type);
    let workers: Vec<WorkerRemuneration> = inputs
        .workers
        .iter()
        .map(|worker| {
            let rule: Option<&WorkerAllocationRule> =
                allocations.and_then(|allocation| allocation.rule_for(&worker.category));
            let payout: WorkerPayout =
                worker_payout(rule, facility_incentive_amount, performance_percentage);
            WorkerRemuneration {
                worker_id: worker.worker_id.clone(),
                worker_name: worker.name.clone(),
                worker_category: worker.category.clone(),
                allocation_type: payout.allocation_type,
                allocated_amount: payout.allocated_amount,
                calculated_amount: payout.calculated_amount,
            }
        })
        .collect();

    FacilityCalculation {
        facility_id: inputs.facility.facility_id.clone(),
        facility_name: inputs.facility.name.clone(),
        facility_type: facility_type.to_string(),
        report_month: inputs.report_month,
        calculation_version: snapshot.version.clone(),
        performance_percentage,
        facility_incentive_amount,
        facility_remuneration: facility_payout(facility_incentive_amount, performance_percentage),
        indicators,
        workers,
    }
}
