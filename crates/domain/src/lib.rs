// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calculator;
mod error;
pub mod expression;
mod formula;
mod performance;
mod snapshot;
mod types;
mod validation;
mod version;

#[cfg(test)]
mod tests;

pub use calculator::{
    CalculationInput, CalculationResult, CalculationStatus, ConditionalRemuneration,
    calculate_remuneration, partial_baseline,
};
pub use expression::{
    DEFAULT_PERCENTAGE_FORMULA, Expression, FormulaSyntaxError, calculate_mathematical_formula,
    validate_formula,
};
pub use performance::{
    IndicatorOutcome, WorkerPayout, facility_payout, facility_performance, grade_indicator,
    worker_payout,
};

// Re-export public types
pub use error::DomainError;
pub use formula::{
    ConditionType, ConditionalQuestion, FacilityTarget, FormulaConfig, FormulaRange, FormulaType,
    TargetValue,
};
pub use snapshot::{
    AllocationType, CalculationMetadata, ConfigurationSnapshot, KpiSnapshot, PerformanceMethod,
    RemunerationFormulaSnapshot, WorkerAllocationRule, WorkerAllocationSnapshot,
};
pub use types::{
    Facility, FacilityType, ReportMonth, Worker, round_currency, round_percentage, utc_timestamp,
};
pub use validation::{
    validate_allocation_rule, validate_formula_config, validate_kpi, validate_remuneration_formula,
    validate_snapshot,
};
pub use version::CalculationVersion;
