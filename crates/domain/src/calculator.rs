// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Remuneration calculation for a single indicator.
//!
//! This module provides a pure, deterministic grading function. It never
//! fails: bad configuration or data produces a `BELOW_TARGET` result with a
//! diagnostic message, so one malformed indicator cannot abort a batch.
//!
//! Evaluation order:
//! 1. Conditional not-applicable rules
//! 2. Facility-type override of band and target
//! 3. Dispatch on the formula family

use crate::expression::{DEFAULT_PERCENTAGE_FORMULA, evaluate};
use crate::formula::{FormulaConfig, FormulaRange, FormulaType, TargetValue};
use crate::types::round_currency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default band for `RANGE` indicators.
const DEFAULT_RANGE: FormulaRange = FormulaRange::new(5.0, 10.0);

/// Default band for `PERCENTAGE_RANGE` indicators.
const DEFAULT_PERCENTAGE_RANGE: FormulaRange = FormulaRange::new(3.0, 5.0);

/// Baseline paid at the bottom of a partial band.
const STANDARD_PARTIAL_BASELINE: f64 = 50.0;

/// Baseline paid at the bottom of the 3-5% band.
const THREE_TO_FIVE_PARTIAL_BASELINE: f64 = 60.0;

/// Outcome of grading one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculationStatus {
    #[serde(rename = "BELOW_TARGET")]
    BelowTarget,
    #[serde(rename = "PARTIALLY_ACHIEVED")]
    PartiallyAchieved,
    #[serde(rename = "ACHIEVED")]
    Achieved,
    #[serde(rename = "NA")]
    NotApplicable,
}

impl CalculationStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BelowTarget => "BELOW_TARGET",
            Self::PartiallyAchieved => "PARTIALLY_ACHIEVED",
            Self::Achieved => "ACHIEVED",
            Self::NotApplicable => "NA",
        }
    }
}

impl std::fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the indicator would have paid with and without its condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalRemuneration {
    pub with_condition: i64,
    pub without_condition: i64,
    pub applied_condition: String,
}

/// Result of grading one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// User-facing percentage of the target reached.
    pub achievement: f64,
    /// Payout in whole currency units.
    pub remuneration: i64,
    /// The 0-100 scale used to size the payout.
    pub remuneration_percentage: f64,
    pub status: CalculationStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_remuneration: Option<ConditionalRemuneration>,
}

impl CalculationResult {
    fn below_target(achievement: f64, message: String) -> Self {
        Self {
            achievement,
            remuneration: 0,
            remuneration_percentage: 0.0,
            status: CalculationStatus::BelowTarget,
            message,
            conditional_remuneration: None,
        }
    }

    fn achieved(achievement: f64, max_remuneration: f64, message: String) -> Self {
        Self {
            achievement,
            remuneration: round_currency(max_remuneration),
            remuneration_percentage: 100.0,
            status: CalculationStatus::Achieved,
            message,
            conditional_remuneration: None,
        }
    }

    fn partial(
        achievement: f64,
        remuneration_percentage: f64,
        max_remuneration: f64,
        message: String,
    ) -> Self {
        Self {
            achievement,
            remuneration: round_currency(remuneration_percentage / 100.0 * max_remuneration),
            remuneration_percentage,
            status: CalculationStatus::PartiallyAchieved,
            message,
            conditional_remuneration: None,
        }
    }

    fn not_applicable(max_remuneration: f64, message: &str, applied_condition: String) -> Self {
        Self {
            achievement: 0.0,
            remuneration: 0,
            remuneration_percentage: 0.0,
            status: CalculationStatus::NotApplicable,
            message: message.to_string(),
            conditional_remuneration: Some(ConditionalRemuneration {
                with_condition: 0,
                without_condition: round_currency(max_remuneration),
                applied_condition,
            }),
        }
    }
}

/// Inputs to [`calculate_remuneration`].
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationInput<'a> {
    /// The value reported for the month (numerator).
    pub submitted_value: f64,
    /// The target (denominator for ratio indicators, threshold for binary ones).
    pub target_value: TargetValue,
    /// The payout for full achievement.
    pub max_remuneration: f64,
    /// Facility type code used to select overrides.
    pub facility_type: Option<&'a str>,
    /// Legacy yes/no gate for ratio indicators.
    pub condition_met: Option<bool>,
    /// Other field values reported by the facility for the month.
    pub field_values: Option<&'a BTreeMap<String, f64>>,
}

impl<'a> CalculationInput<'a> {
    #[must_use]
    pub fn new(submitted_value: f64, target_value: impl Into<TargetValue>, max_remuneration: f64) -> Self {
        Self {
            submitted_value,
            target_value: target_value.into(),
            max_remuneration,
            facility_type: None,
            condition_met: None,
            field_values: None,
        }
    }

    #[must_use]
    pub const fn with_facility_type(mut self, facility_type: &'a str) -> Self {
        self.facility_type = Some(facility_type);
        self
    }

    #[must_use]
    pub const fn with_condition_met(mut self, condition_met: bool) -> Self {
        self.condition_met = Some(condition_met);
        self
    }

    #[must_use]
    pub const fn with_field_values(mut self, field_values: &'a BTreeMap<String, f64>) -> Self {
        self.field_values = Some(field_values);
        self
    }
}

/// Grades one indicator and sizes its payout.
///
/// This function is pure and never fails. Conditional not-applicable rules
/// take precedence over the formula family; facility overrides are applied
/// before dispatch.
#[must_use]
pub fn calculate_remuneration(input: &CalculationInput<'_>, config: &FormulaConfig) -> CalculationResult {
    if let Some(result) = check_not_applicable(input, config) {
        return result;
    }

    let resolved: FormulaConfig = config.resolve_for_facility(input.facility_type);

    match &resolved.formula_type {
        FormulaType::Binary => calculate_binary(input, &resolved),
        FormulaType::Range => calculate_range(input, &resolved),
        FormulaType::PercentageRange => calculate_percentage_range(input, &resolved),
        FormulaType::Unsupported(tag) => CalculationResult::below_target(
            0.0,
            format!("Unsupported formula type '{tag}'; no remuneration calculated"),
        ),
    }
}

fn check_not_applicable(
    input: &CalculationInput<'_>,
    config: &FormulaConfig,
) -> Option<CalculationResult> {
    let field_value = |field: &str| -> Option<f64> {
        input
            .field_values
            .and_then(|values| values.get(field))
            .copied()
    };

    // Indicator-specific rule
    if config.condition_type.is_some() || config.condition_field.is_some() {
        let field: &str = match (&config.condition_field, config.condition_type) {
            (Some(field), _) => field.as_str(),
            (None, Some(condition_type)) => condition_type.default_field(),
            (None, None) => "",
        };
        let trigger: f64 = config.condition_value.unwrap_or(0.0);

        if let Some(value) = field_value(field)
            && (value - trigger).abs() < f64::EPSILON
        {
            let message: String = config.condition_type.map_or_else(
                || format!("Not applicable: {field} is {trigger}"),
                |condition_type| condition_type.not_applicable_message().to_string(),
            );
            let applied: String = config.condition_type.map_or_else(
                || format!("{field} = {trigger}"),
                |condition_type| format!("{condition_type:?}: {field} = {trigger}"),
            );
            return Some(CalculationResult::not_applicable(
                input.max_remuneration,
                &message,
                applied,
            ));
        }
    }

    // Generic yes/no question
    if let Some(question) = &config.conditional_question
        && let Some(value) = field_value(&question.field)
        && value == 0.0
    {
        let message: String = format!("Not applicable: answered 'No' to '{}'", question.text);
        return Some(CalculationResult::not_applicable(
            input.max_remuneration,
            &message,
            question.text.clone(),
        ));
    }

    // Legacy boolean gate
    if config.formula_type == FormulaType::PercentageRange && input.condition_met == Some(false) {
        return Some(CalculationResult::not_applicable(
            input.max_remuneration,
            "Not applicable: condition not met for this period",
            String::from("condition_met = false"),
        ));
    }

    None
}

fn calculate_binary(input: &CalculationInput<'_>, config: &FormulaConfig) -> CalculationResult {
    let threshold: f64 = config
        .target_value
        .as_ref()
        .and_then(TargetValue::as_number)
        .or_else(|| input.target_value.as_number().filter(|value| *value > 0.0))
        .or(config.min_threshold)
        .unwrap_or(1.0);

    if input.submitted_value >= threshold {
        CalculationResult::achieved(
            100.0,
            input.max_remuneration,
            format!(
                "Achieved: {} meets the threshold of {threshold}",
                input.submitted_value
            ),
        )
    } else {
        CalculationResult::below_target(
            0.0,
            format!(
                "Below target: {} is below the threshold of {threshold}",
                input.submitted_value
            ),
        )
    }
}

fn calculate_range(input: &CalculationInput<'_>, config: &FormulaConfig) -> CalculationResult {
    let FormulaRange { min, max } = config.range.unwrap_or(DEFAULT_RANGE);
    let submitted: f64 = input.submitted_value;

    let achievement: f64 = if max > 0.0 {
        submitted / max * 100.0
    } else {
        0.0
    };

    if submitted < min {
        return CalculationResult::below_target(
            achievement,
            format!("Below target: {submitted} is below the minimum of {min}"),
        );
    }

    if submitted >= max {
        return CalculationResult::achieved(
            100.0,
            input.max_remuneration,
            format!("Achieved: {submitted} reaches the maximum of {max}"),
        );
    }

    let remuneration_percentage: f64 = STANDARD_PARTIAL_BASELINE
        + ((submitted - min) / (max - min)) * (100.0 - STANDARD_PARTIAL_BASELINE);

    CalculationResult::partial(
        achievement,
        remuneration_percentage,
        input.max_remuneration,
        format!(
            "Partially achieved: {submitted} is between {min} and {max} ({remuneration_percentage:.2}% of remuneration)"
        ),
    )
}

fn calculate_percentage_range(
    input: &CalculationInput<'_>,
    config: &FormulaConfig,
) -> CalculationResult {
    let range: FormulaRange = config.range.unwrap_or(DEFAULT_PERCENTAGE_RANGE);
    let FormulaRange { min, max } = range;
    let target: f64 = config
        .target_value
        .as_ref()
        .and_then(TargetValue::as_number)
        .or_else(|| input.target_value.as_number())
        .unwrap_or(0.0);

    if target == 0.0 {
        return CalculationResult::below_target(
            0.0,
            String::from("Below target: target value is zero, percentage cannot be calculated"),
        );
    }

    let formula: &str = config
        .calculation_formula
        .as_deref()
        .unwrap_or(DEFAULT_PERCENTAGE_FORMULA);
    let actual_percentage: f64 = match evaluate(formula, input.submitted_value, target) {
        Ok(value) => value,
        Err(err) => {
            return CalculationResult::below_target(
                0.0,
                format!("Invalid calculation formula '{formula}': {err}"),
            );
        }
    };

    if actual_percentage < min {
        return CalculationResult::below_target(
            actual_percentage,
            format!("Below target: {actual_percentage:.2}% is below the minimum of {min}%"),
        );
    }

    if actual_percentage >= max {
        return CalculationResult::achieved(
            actual_percentage,
            input.max_remuneration,
            format!("Achieved: {actual_percentage:.2}% reaches the maximum of {max}%"),
        );
    }

    let baseline: f64 = partial_baseline(config, range);
    let remuneration_percentage: f64 =
        baseline + ((actual_percentage - min) / (max - min)) * (100.0 - baseline);

    CalculationResult::partial(
        actual_percentage,
        remuneration_percentage,
        input.max_remuneration,
        format!(
            "Partially achieved: {actual_percentage:.2}% is between {min}% and {max}% ({remuneration_percentage:.2}% of remuneration)"
        ),
    )
}

/// The remuneration percentage paid at the bottom of a partial band.
///
/// An explicit `partial_baseline` wins. Otherwise the 3-5% band starts at
/// 60% and every other band at 50%.
#[must_use]
pub fn partial_baseline(config: &FormulaConfig, range: FormulaRange) -> f64 {
    if let Some(baseline) = config.partial_baseline {
        return baseline;
    }
    if range == DEFAULT_PERCENTAGE_RANGE {
        THREE_TO_FIVE_PARTIAL_BASELINE
    } else {
        STANDARD_PARTIAL_BASELINE
    }
}
