// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility performance and worker payout arithmetic.
//!
//! Every KPI is graded into a 0-100 percentage, the percentages are combined
//! into one facility performance figure, and that figure sizes the payouts.
//! A facility that reported nothing grades to 0%; that is an outcome, not
//! an error.

use crate::calculator::{CalculationInput, CalculationResult, CalculationStatus, calculate_remuneration};
use crate::snapshot::{AllocationType, KpiSnapshot, PerformanceMethod, WorkerAllocationRule};
use crate::types::{round_currency, round_percentage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scale passed to the formula calculator when only the percentage matters.
const PERCENT_SCALE: f64 = 100.0;

/// How one KPI graded for a facility and month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorOutcome {
    pub field_code: String,
    pub weight: f64,
    pub submitted_value: f64,
    pub target: f64,
    pub achievement: f64,
    /// The percentage that feeds the facility average.
    pub remuneration_percentage: f64,
    pub status: CalculationStatus,
    pub message: String,
}

impl IndicatorOutcome {
    /// Whether this indicator takes part in the facility average.
    #[must_use]
    pub fn counts_towards_performance(&self) -> bool {
        self.status != CalculationStatus::NotApplicable
    }
}

/// Grades one KPI.
///
/// A KPI with a formula is graded by [`calculate_remuneration`]. A KPI without
/// one scores `value / target * 100`, capped at 100. A non-positive target
/// scores 0.
///
/// # Arguments
///
/// * `kpi` - The KPI as captured in the snapshot
/// * `field_values` - Every value the facility reported for the month
/// * `facility_type` - The facility type code used for formula overrides
#[must_use]
pub fn grade_indicator(
    kpi: &KpiSnapshot,
    field_values: &BTreeMap<String, f64>,
    facility_type: &str,
) -> IndicatorOutcome {
    let submitted_value: f64 = field_values.get(&kpi.field_code).copied().unwrap_or(0.0);

    if let Some(formula) = &kpi.formula {
        let input: CalculationInput<'_> = CalculationInput::new(submitted_value, kpi.target, PERCENT_SCALE)
            .with_facility_type(facility_type)
            .with_field_values(field_values);
        let result: CalculationResult = calculate_remuneration(&input, formula);
        return IndicatorOutcome {
            field_code: kpi.field_code.clone(),
            weight: kpi.weight,
            submitted_value,
            target: kpi.target,
            achievement: round_percentage(result.achievement),
            remuneration_percentage: round_percentage(result.remuneration_percentage),
            status: result.status,
            message: result.message,
        };
    }

    let achievement: f64 = if kpi.target > 0.0 {
        (submitted_value / kpi.target * 100.0).min(100.0)
    } else {
        0.0
    };
    let status: CalculationStatus = if achievement >= 100.0 {
        CalculationStatus::Achieved
    } else if achievement > 0.0 {
        CalculationStatus::PartiallyAchieved
    } else {
        CalculationStatus::BelowTarget
    };

    IndicatorOutcome {
        field_code: kpi.field_code.clone(),
        weight: kpi.weight,
        submitted_value,
        target: kpi.target,
        achievement: round_percentage(achievement),
        remuneration_percentage: round_percentage(achievement),
        status,
        message: format!("{submitted_value} of {} reported", kpi.target),
    }
}

/// Combines graded indicators into a facility performance percentage.
///
/// Not-applicable indicators drop out entirely. With no remaining indicators,
/// or a zero total weight, the performance is 0.
#[must_use]
pub fn facility_performance(outcomes: &[IndicatorOutcome], method: PerformanceMethod) -> f64 {
    let applicable: Vec<&IndicatorOutcome> = outcomes
        .iter()
        .filter(|outcome| outcome.counts_towards_performance())
        .collect();

    if applicable.is_empty() {
        return 0.0;
    }

    let performance: f64 = match method {
        PerformanceMethod::WeightedAverage => {
            let total_weight: f64 = applicable.iter().map(|outcome| outcome.weight).sum();
            if total_weight <= 0.0 {
                return 0.0;
            }
            applicable
                .iter()
                .map(|outcome| outcome.remuneration_percentage * outcome.weight)
                .sum::<f64>()
                / total_weight
        }
        PerformanceMethod::SimpleAverage => {
            let sum: f64 = applicable
                .iter()
                .map(|outcome| outcome.remuneration_percentage)
                .sum();
            // Indicator counts are tiny; the conversion is exact
            #[allow(clippy::cast_precision_loss)]
            let count: f64 = applicable.len() as f64;
            sum / count
        }
    };

    round_percentage(performance.clamp(0.0, 100.0))
}

/// A worker's computed payout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerPayout {
    /// `None` when the worker's category has no rule.
    pub allocation_type: Option<AllocationType>,
    pub allocated_amount: f64,
    pub calculated_amount: i64,
}

/// Sizes a worker's payout from their category rule.
///
/// `individual` pays the full facility incentive regardless of performance.
/// `performance` scales the rule's allocated amount by the facility
/// performance. No rule pays nothing.
#[must_use]
pub fn worker_payout(
    rule: Option<&WorkerAllocationRule>,
    facility_incentive_amount: f64,
    performance_percentage: f64,
) -> WorkerPayout {
    let Some(rule) = rule else {
        return WorkerPayout {
            allocation_type: None,
            allocated_amount: 0.0,
            calculated_amount: 0,
        };
    };

    match rule.allocation_type {
        AllocationType::Individual => WorkerPayout {
            allocation_type: Some(AllocationType::Individual),
            allocated_amount: facility_incentive_amount,
            calculated_amount: round_currency(facility_incentive_amount),
        },
        AllocationType::Performance => WorkerPayout {
            allocation_type: Some(AllocationType::Performance),
            allocated_amount: rule.allocated_amount,
            calculated_amount: round_currency(rule.allocated_amount * performance_percentage / 100.0),
        },
    }
}

/// The facility's own payout at the given performance.
#[must_use]
pub fn facility_payout(facility_incentive_amount: f64, performance_percentage: f64) -> i64 {
    round_currency(facility_incentive_amount * performance_percentage / 100.0)
}
