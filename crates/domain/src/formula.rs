// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Indicator formula configuration.
//!
//! A [`FormulaConfig`] is a tagged value: the [`FormulaType`] selects the
//! grading family, the remaining optional fields parameterize it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The grading family of an indicator.
///
/// Tags outside the three supported families are kept verbatim in
/// [`FormulaType::Unsupported`] so historical configuration still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FormulaType {
    /// Achieved or not: a single threshold.
    Binary,
    /// Direct counts graded against a `{min, max}` band.
    Range,
    /// Ratios graded against a `{min, max}` band of percentages.
    PercentageRange,
    /// A legacy or unknown family. Evaluates to `BELOW_TARGET`.
    Unsupported(String),
}

impl FormulaType {
    /// Returns the wire tag for this family.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Binary => "BINARY",
            Self::Range => "RANGE",
            Self::PercentageRange => "PERCENTAGE_RANGE",
            Self::Unsupported(tag) => tag,
        }
    }
}

impl From<String> for FormulaType {
    fn from(value: String) -> Self {
        match value.trim().to_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "RANGE" => Self::Range,
            "PERCENTAGE_RANGE" => Self::PercentageRange,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<FormulaType> for String {
    fn from(value: FormulaType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FormulaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lower and upper bounds of a grading band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormulaRange {
    pub min: f64,
    pub max: f64,
}

impl FormulaRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// A target as stored in configuration.
///
/// Older configuration encodes binary targets as text (`"Yes"`, `"100%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetValue {
    Number(f64),
    Text(String),
}

impl TargetValue {
    /// Interprets the target as a number.
    ///
    /// `"Yes"`/`"true"` read as `1`, `"No"`/`"false"` as `0`, a trailing `%`
    /// is dropped (`"100%"` reads as `100`). Anything else unparseable is `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => value.is_finite().then_some(*value),
            Self::Text(text) => {
                let trimmed: &str = text.trim();
                if trimmed.eq_ignore_ascii_case("yes") || trimmed.eq_ignore_ascii_case("true") {
                    return Some(1.0);
                }
                if trimmed.eq_ignore_ascii_case("no") || trimmed.eq_ignore_ascii_case("false") {
                    return Some(0.0);
                }
                let numeric: &str = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
                numeric
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
            }
        }
    }
}

impl From<f64> for TargetValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for TargetValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Per-facility-type replacement for the band and target.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FacilityTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<FormulaRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<TargetValue>,
}

/// Indicator-specific not-applicable rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    /// No antenatal care visits were due this month.
    AncDueZero,
    /// The facility has no TB patients.
    NoTbPatients,
    /// The facility has no pulmonary TB patients.
    NoPulmonaryTb,
    /// There were no index cases to trace contacts for.
    TbContactTracing,
    /// No TB patients were eligible for differentiated care.
    TbDifferentiatedCare,
}

impl ConditionType {
    /// The field consulted when the configuration names no `condition_field`.
    #[must_use]
    pub const fn default_field(self) -> &'static str {
        match self {
            Self::AncDueZero => "anc_due_count",
            Self::NoTbPatients => "total_tb_patients",
            Self::NoPulmonaryTb => "pulmonary_tb_patients",
            Self::TbContactTracing => "tb_index_cases",
            Self::TbDifferentiatedCare => "tb_patients_on_treatment",
        }
    }

    /// The explanation attached to a not-applicable result.
    #[must_use]
    pub const fn not_applicable_message(self) -> &'static str {
        match self {
            Self::AncDueZero => "Not applicable: no ANC visits were due this month",
            Self::NoTbPatients => "Not applicable: no TB patients reported",
            Self::NoPulmonaryTb => "Not applicable: no pulmonary TB patients reported",
            Self::TbContactTracing => "Not applicable: no TB index cases for contact tracing",
            Self::TbDifferentiatedCare => {
                "Not applicable: no TB patients eligible for differentiated care"
            }
        }
    }
}

/// A yes/no gate: the indicator only applies when the named field is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalQuestion {
    pub field: String,
    pub text: String,
}

/// How one indicator is graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaConfig {
    #[serde(rename = "type")]
    pub formula_type: FormulaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<FormulaRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<TargetValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_formula: Option<String>,
    /// Remuneration percentage paid at the bottom of the partial band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_baseline: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub facility_specific_targets: BTreeMap<String, FacilityTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<ConditionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_question: Option<ConditionalQuestion>,
}

impl FormulaConfig {
    /// Creates a configuration of the given family with no parameters set.
    #[must_use]
    pub const fn new(formula_type: FormulaType) -> Self {
        Self {
            formula_type,
            range: None,
            target_value: None,
            min_threshold: None,
            percentage_cap: None,
            bonus_threshold: None,
            calculation_formula: None,
            partial_baseline: None,
            facility_specific_targets: BTreeMap::new(),
            condition_type: None,
            condition_field: None,
            condition_value: None,
            conditional_question: None,
        }
    }

    #[must_use]
    pub const fn binary() -> Self {
        Self::new(FormulaType::Binary)
    }

    #[must_use]
    pub fn range(min: f64, max: f64) -> Self {
        let mut config: Self = Self::new(FormulaType::Range);
        config.range = Some(FormulaRange::new(min, max));
        config
    }

    #[must_use]
    pub fn percentage_range(min: f64, max: f64) -> Self {
        let mut config: Self = Self::new(FormulaType::PercentageRange);
        config.range = Some(FormulaRange::new(min, max));
        config
    }

    #[must_use]
    pub fn with_target_value(mut self, target: impl Into<TargetValue>) -> Self {
        self.target_value = Some(target.into());
        self
    }

    #[must_use]
    pub fn with_min_threshold(mut self, threshold: f64) -> Self {
        self.min_threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_formula(mut self, formula: &str) -> Self {
        self.calculation_formula = Some(formula.to_string());
        self
    }

    #[must_use]
    pub fn with_partial_baseline(mut self, baseline: f64) -> Self {
        self.partial_baseline = Some(baseline);
        self
    }

    #[must_use]
    pub fn with_facility_target(mut self, facility_type: &str, target: FacilityTarget) -> Self {
        self.facility_specific_targets
            .insert(facility_type.trim().to_uppercase(), target);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition_type: ConditionType, field: Option<&str>) -> Self {
        self.condition_type = Some(condition_type);
        self.condition_field = field.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_conditional_question(mut self, field: &str, text: &str) -> Self {
        self.conditional_question = Some(ConditionalQuestion {
            field: field.to_string(),
            text: text.to_string(),
        });
        self
    }

    /// Applies the facility-type override, if one is configured.
    ///
    /// Only `range` and `target_value` are replaced; the family and the
    /// conditional metadata are never touched by an override.
    #[must_use]
    pub fn resolve_for_facility(&self, facility_type: Option<&str>) -> Self {
        let mut resolved: Self = self.clone();

        let Some(code) = facility_type else {
            return resolved;
        };
        let key: String = code.trim().to_uppercase();
        let target: Option<&FacilityTarget> =
            self.facility_specific_targets.get(&key).or_else(|| {
                self.facility_specific_targets
                    .iter()
                    .find(|(candidate, _)| candidate.eq_ignore_ascii_case(&key))
                    .map(|(_, target)| target)
            });
        if let Some(target) = target {
            if let Some(range) = target.range {
                resolved.range = Some(range);
            }
            if let Some(value) = &target.target_value {
                resolved.target_value = Some(value.clone());
            }
        }

        resolved
    }
}
