// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Immutable configuration snapshots.
//!
//! A snapshot captures the KPI weights and targets, the facility incentive
//! parameters and the worker allocation rules as of one instant. Snapshots
//! are values: editing the live configuration afterwards never changes a
//! snapshot that was already taken.

use crate::error::DomainError;
use crate::formula::FormulaConfig;
use crate::version::CalculationVersion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One KPI as it was configured at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    /// The field whose value is graded.
    pub field_code: String,
    /// Relative weight in the weighted-average performance method.
    pub weight: f64,
    /// Target the reported value is measured against.
    pub target: f64,
    /// Optional grading formula. Without one, achievement is a plain ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<FormulaConfig>,
}

impl KpiSnapshot {
    #[must_use]
    pub fn new(field_code: &str, weight: f64, target: f64) -> Self {
        Self {
            field_code: field_code.to_string(),
            weight,
            target,
            formula: None,
        }
    }

    #[must_use]
    pub fn with_formula(mut self, formula: FormulaConfig) -> Self {
        self.formula = Some(formula);
        self
    }
}

/// How per-KPI achievements are combined into one facility percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMethod {
    #[default]
    WeightedAverage,
    SimpleAverage,
}

impl PerformanceMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WeightedAverage => "weighted_average",
            Self::SimpleAverage => "simple_average",
        }
    }
}

impl FromStr for PerformanceMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weighted_average" => Ok(Self::WeightedAverage),
            "simple_average" => Ok(Self::SimpleAverage),
            _ => Err(DomainError::InvalidPerformanceMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for PerformanceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Facility-level remuneration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemunerationFormulaSnapshot {
    /// Amount paid to a facility at 100% performance.
    pub facility_incentive_amount: f64,
    #[serde(default)]
    pub performance_method: PerformanceMethod,
}

impl RemunerationFormulaSnapshot {
    #[must_use]
    pub const fn new(facility_incentive_amount: f64, performance_method: PerformanceMethod) -> Self {
        Self {
            facility_incentive_amount,
            performance_method,
        }
    }
}

impl Default for RemunerationFormulaSnapshot {
    fn default() -> Self {
        Self::new(0.0, PerformanceMethod::WeightedAverage)
    }
}

/// How a worker category is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationType {
    /// A fixed amount, independent of facility performance.
    Individual,
    /// The allocated amount scaled by facility performance.
    Performance,
}

impl AllocationType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Performance => "performance",
        }
    }
}

impl FromStr for AllocationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "performance" => Ok(Self::Performance),
            _ => Err(DomainError::InvalidAllocationType(s.to_string())),
        }
    }
}

impl std::fmt::Display for AllocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The payout rule for one worker category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerAllocationRule {
    pub worker_category: String,
    pub allocation_type: AllocationType,
    pub allocated_amount: f64,
}

impl WorkerAllocationRule {
    #[must_use]
    pub fn new(worker_category: &str, allocation_type: AllocationType, allocated_amount: f64) -> Self {
        Self {
            worker_category: worker_category.trim().to_uppercase(),
            allocation_type,
            allocated_amount,
        }
    }
}

/// All allocation rules for one facility type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkerAllocationSnapshot {
    pub facility_type: String,
    pub rules: Vec<WorkerAllocationRule>,
}

impl WorkerAllocationSnapshot {
    #[must_use]
    pub fn new(facility_type: &str, rules: Vec<WorkerAllocationRule>) -> Self {
        Self {
            facility_type: facility_type.trim().to_uppercase(),
            rules,
        }
    }

    /// Finds the rule for a worker category, ignoring case.
    #[must_use]
    pub fn rule_for(&self, worker_category: &str) -> Option<&WorkerAllocationRule> {
        let category: &str = worker_category.trim();
        self.rules
            .iter()
            .find(|rule| rule.worker_category.eq_ignore_ascii_case(category))
    }
}

/// Who captured a snapshot, when, and under which version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationMetadata {
    pub version: CalculationVersion,
    /// RFC 3339 capture time.
    pub captured_at: String,
    pub captured_by: Option<String>,
}

/// The complete configuration in effect at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSnapshot {
    pub version: CalculationVersion,
    pub captured_at: String,
    #[serde(default)]
    pub captured_by: Option<String>,
    pub kpis: Vec<KpiSnapshot>,
    pub remuneration_formula: RemunerationFormulaSnapshot,
    /// Allocation rules keyed by uppercase facility type code.
    #[serde(default)]
    pub worker_allocations: BTreeMap<String, WorkerAllocationSnapshot>,
}

impl ConfigurationSnapshot {
    /// Returns the capture metadata of this snapshot.
    #[must_use]
    pub fn metadata(&self) -> CalculationMetadata {
        CalculationMetadata {
            version: self.version.clone(),
            captured_at: self.captured_at.clone(),
            captured_by: self.captured_by.clone(),
        }
    }

    /// Returns the allocation rules for a facility type, if any were configured.
    #[must_use]
    pub fn allocations_for(&self, facility_type: &str) -> Option<&WorkerAllocationSnapshot> {
        let key: String = facility_type.trim().to_uppercase();
        self.worker_allocations.get(&key)
    }

    /// Sum of all KPI weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.kpis.iter().map(|kpi| kpi.weight).sum()
    }
}
