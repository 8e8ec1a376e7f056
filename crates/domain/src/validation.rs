// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::expression::validate_formula;
use crate::formula::{FormulaConfig, FormulaType};
use crate::snapshot::{
    ConfigurationSnapshot, KpiSnapshot, RemunerationFormulaSnapshot, WorkerAllocationRule,
};
use std::collections::HashSet;

/// Validates a single KPI entry.
///
/// # Arguments
///
/// * `kpi` - The KPI to validate
///
/// # Errors
///
/// Returns an error if:
/// - The field code is empty
/// - The weight or target is negative or not finite
/// - The attached formula is invalid (see [`validate_formula_config`])
pub fn validate_kpi(kpi: &KpiSnapshot) -> Result<(), DomainError> {
    if kpi.field_code.trim().is_empty() {
        return Err(DomainError::InvalidKpiConfig {
            field_code: kpi.field_code.clone(),
            reason: String::from("Field code cannot be empty"),
        });
    }

    if !kpi.weight.is_finite() || kpi.weight < 0.0 {
        return Err(DomainError::InvalidKpiConfig {
            field_code: kpi.field_code.clone(),
            reason: format!("Weight must be a non-negative number, got {}", kpi.weight),
        });
    }

    if !kpi.target.is_finite() || kpi.target < 0.0 {
        return Err(DomainError::InvalidKpiConfig {
            field_code: kpi.field_code.clone(),
            reason: format!("Target must be a non-negative number, got {}", kpi.target),
        });
    }

    if let Some(formula) = &kpi.formula {
        validate_formula_config(&kpi.field_code, formula)?;
    }

    Ok(())
}

/// Validates a formula configuration attached to a KPI.
///
/// Unsupported families are accepted so that historical configuration
/// still loads; they grade as below target.
///
/// # Errors
///
/// Returns an error if:
/// - A configured band has `min > max` or non-finite bounds
/// - The calculation formula does not parse
pub fn validate_formula_config(field_code: &str, config: &FormulaConfig) -> Result<(), DomainError> {
    let ranges = config.range.iter().chain(
        config
            .facility_specific_targets
            .values()
            .filter_map(|target| target.range.as_ref()),
    );
    for range in ranges {
        if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
            return Err(DomainError::InvalidFormula {
                field_code: field_code.to_string(),
                reason: format!("Invalid range {}..{}", range.min, range.max),
            });
        }
    }

    if let Some(formula) = &config.calculation_formula {
        validate_formula(formula).map_err(|e| DomainError::InvalidFormula {
            field_code: field_code.to_string(),
            reason: e.to_string(),
        })?;
    }

    if let Some(baseline) = config.partial_baseline
        && !(0.0..=100.0).contains(&baseline)
    {
        return Err(DomainError::InvalidFormula {
            field_code: field_code.to_string(),
            reason: format!("Partial baseline must be between 0 and 100, got {baseline}"),
        });
    }

    if config.formula_type == FormulaType::Binary && config.range.is_some() {
        return Err(DomainError::InvalidFormula {
            field_code: field_code.to_string(),
            reason: String::from("Binary formulas do not take a range"),
        });
    }

    Ok(())
}

/// Validates the facility-level remuneration parameters.
///
/// # Errors
///
/// Returns an error if the facility incentive amount is negative or not finite.
pub fn validate_remuneration_formula(
    formula: &RemunerationFormulaSnapshot,
) -> Result<(), DomainError> {
    let amount: f64 = formula.facility_incentive_amount;
    if !amount.is_finite() || amount < 0.0 {
        return Err(DomainError::InvalidIncentiveAmount(amount.to_string()));
    }
    Ok(())
}

/// Validates a worker allocation rule.
///
/// # Errors
///
/// Returns an error if the category is empty or the amount is negative or not finite.
pub fn validate_allocation_rule(rule: &WorkerAllocationRule) -> Result<(), DomainError> {
    if rule.worker_category.trim().is_empty() {
        return Err(DomainError::InvalidAllocationRule {
            worker_category: rule.worker_category.clone(),
            reason: String::from("Worker category cannot be empty"),
        });
    }
    if !rule.allocated_amount.is_finite() || rule.allocated_amount < 0.0 {
        return Err(DomainError::InvalidAllocationRule {
            worker_category: rule.worker_category.clone(),
            reason: format!(
                "Allocated amount must be a non-negative number, got {}",
                rule.allocated_amount
            ),
        });
    }
    Ok(())
}

/// Validates a whole configuration snapshot before it is stored.
///
/// # Errors
///
/// Returns the first problem found: an invalid KPI, a KPI field code that
/// appears twice, invalid incentive parameters, an invalid allocation rule,
/// or a worker category with more than one rule for the same facility type.
pub fn validate_snapshot(snapshot: &ConfigurationSnapshot) -> Result<(), DomainError> {
    let mut seen_fields: HashSet<&str> = HashSet::new();
    for kpi in &snapshot.kpis {
        validate_kpi(kpi)?;
        if !seen_fields.insert(kpi.field_code.as_str()) {
            return Err(DomainError::InvalidKpiConfig {
                field_code: kpi.field_code.clone(),
                reason: String::from("Field code appears more than once"),
            });
        }
    }

    validate_remuneration_formula(&snapshot.remuneration_formula)?;

    for allocation in snapshot.worker_allocations.values() {
        let mut seen_categories: HashSet<String> = HashSet::new();
        for rule in &allocation.rules {
            validate_allocation_rule(rule)?;
            if !seen_categories.insert(rule.worker_category.to_uppercase()) {
                return Err(DomainError::InvalidAllocationRule {
                    worker_category: rule.worker_category.clone(),
                    reason: format!(
                        "More than one rule for facility type {}",
                        allocation.facility_type
                    ),
                });
            }
        }
    }

    Ok(())
}
