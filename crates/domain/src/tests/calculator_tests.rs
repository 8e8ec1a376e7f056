// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{assert_close, field_values};
use crate::{
    CalculationInput, CalculationResult, CalculationStatus, ConditionType, ConditionalRemuneration,
    FacilityTarget,
    FormulaConfig, FormulaRange, FormulaType, TargetValue, calculate_remuneration,
    partial_baseline,
};
use std::collections::BTreeMap;

#[test]
fn test_percentage_range_footfall_example() {
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0).with_formula("(A/B)*100");
    let input: CalculationInput<'_> = CalculationInput::new(300.0, 10000.0, 500.0);

    let result: CalculationResult = calculate_remuneration(&input, &config);

    assert_eq!(result.status, CalculationStatus::PartiallyAchieved);
    assert_close(result.achievement, 3.0);
    assert_close(result.remuneration_percentage, 60.0);
    assert_eq!(result.remuneration, 300);
}

#[test]
fn test_range_interpolation_example() {
    let config: FormulaConfig = FormulaConfig::range(25.0, 50.0);
    let input: CalculationInput<'_> = CalculationInput::new(35.0, 0.0, 1000.0);

    let result: CalculationResult = calculate_remuneration(&input, &config);

    assert_eq!(result.status, CalculationStatus::PartiallyAchieved);
    assert_close(result.remuneration_percentage, 70.0);
    assert_eq!(result.remuneration, 700);
}

#[test]
fn test_range_band_edges() {
    let config: FormulaConfig = FormulaConfig::range(4.0, 12.0);

    let at_min: CalculationResult =
        calculate_remuneration(&CalculationInput::new(4.0, 0.0, 800.0), &config);
    assert_eq!(at_min.status, CalculationStatus::PartiallyAchieved);
    assert_close(at_min.remuneration_percentage, 50.0);
    assert_eq!(at_min.remuneration, 400);

    let at_max: CalculationResult =
        calculate_remuneration(&CalculationInput::new(12.0, 0.0, 800.0), &config);
    assert_eq!(at_max.status, CalculationStatus::Achieved);
    assert_close(at_max.remuneration_percentage, 100.0);
    assert_eq!(at_max.remuneration, 800);

    let below: CalculationResult =
        calculate_remuneration(&CalculationInput::new(3.9, 0.0, 800.0), &config);
    assert_eq!(below.status, CalculationStatus::BelowTarget);
    assert_eq!(below.remuneration, 0);
}

#[test]
fn test_range_achievement_is_capped_when_exceeding_max() {
    let config: FormulaConfig = FormulaConfig::range(5.0, 10.0);
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(25.0, 0.0, 100.0), &config);

    assert_eq!(result.status, CalculationStatus::Achieved);
    assert_close(result.achievement, 100.0);
}

#[test]
fn test_range_defaults_to_five_to_ten() {
    let config: FormulaConfig = FormulaConfig::new(FormulaType::Range);

    let below: CalculationResult =
        calculate_remuneration(&CalculationInput::new(4.0, 0.0, 100.0), &config);
    assert_eq!(below.status, CalculationStatus::BelowTarget);

    let achieved: CalculationResult =
        calculate_remuneration(&CalculationInput::new(10.0, 0.0, 100.0), &config);
    assert_eq!(achieved.status, CalculationStatus::Achieved);
}

#[test]
fn test_range_with_non_positive_max_reports_zero_achievement() {
    let config: FormulaConfig = FormulaConfig::range(-5.0, 0.0);
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(-3.0, 0.0, 100.0), &config);

    assert_close(result.achievement, 0.0);
    assert!(result.achievement.is_finite());
}

#[test]
fn test_percentage_range_three_to_five_curve() {
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0);

    let at_three: CalculationResult =
        calculate_remuneration(&CalculationInput::new(3.0, 100.0, 1000.0), &config);
    assert_close(at_three.remuneration_percentage, 60.0);

    let at_four: CalculationResult =
        calculate_remuneration(&CalculationInput::new(4.0, 100.0, 1000.0), &config);
    assert_close(at_four.remuneration_percentage, 80.0);
    assert_eq!(at_four.remuneration, 800);

    let at_five: CalculationResult =
        calculate_remuneration(&CalculationInput::new(5.0, 100.0, 1000.0), &config);
    assert_eq!(at_five.status, CalculationStatus::Achieved);
    assert_close(at_five.remuneration_percentage, 100.0);
    assert_eq!(at_five.remuneration, 1000);
}

#[test]
fn test_percentage_range_other_bands_use_fifty_percent_baseline() {
    let config: FormulaConfig = FormulaConfig::percentage_range(40.0, 80.0);
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(40.0, 100.0, 1000.0), &config);

    assert_eq!(result.status, CalculationStatus::PartiallyAchieved);
    assert_close(result.remuneration_percentage, 50.0);
}

#[test]
fn test_explicit_partial_baseline_wins() {
    let config: FormulaConfig =
        FormulaConfig::percentage_range(3.0, 5.0).with_partial_baseline(20.0);
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(4.0, 100.0, 1000.0), &config);

    assert_close(result.remuneration_percentage, 60.0);
    assert_close(partial_baseline(&config, FormulaRange::new(3.0, 5.0)), 20.0);
}

#[test]
fn test_percentage_range_achievement_is_not_capped() {
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0);
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(12.0, 100.0, 500.0), &config);

    assert_eq!(result.status, CalculationStatus::Achieved);
    assert_close(result.achievement, 12.0);
    assert_eq!(result.remuneration, 500);
}

#[test]
fn test_percentage_range_zero_target() {
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0);
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(300.0, 0.0, 500.0), &config);

    assert_eq!(result.status, CalculationStatus::BelowTarget);
    assert_eq!(result.remuneration, 0);
    assert!(result.message.contains("target value is zero"));
}

#[test]
fn test_malformed_formula_is_reported_not_raised() {
    let config: FormulaConfig =
        FormulaConfig::percentage_range(3.0, 5.0).with_formula("Math.max(A,B)");
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(300.0, 100.0, 500.0), &config);

    assert_eq!(result.status, CalculationStatus::BelowTarget);
    assert_eq!(result.remuneration, 0);
    assert!(result.message.contains("Invalid calculation formula"));
}

#[test]
fn test_binary_threshold_edges() {
    let config: FormulaConfig = FormulaConfig::binary().with_target_value(10.0);

    let below: CalculationResult =
        calculate_remuneration(&CalculationInput::new(9.999, 0.0, 250.0), &config);
    assert_eq!(below.status, CalculationStatus::BelowTarget);
    assert_eq!(below.remuneration, 0);

    let at: CalculationResult =
        calculate_remuneration(&CalculationInput::new(10.0, 0.0, 250.0), &config);
    assert_eq!(at.status, CalculationStatus::Achieved);
    assert_eq!(at.remuneration, 250);
    assert_close(at.remuneration_percentage, 100.0);
}

#[test]
fn test_binary_threshold_resolution_order() {
    // Configured text target
    let yes: FormulaConfig = FormulaConfig::binary().with_target_value("Yes");
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(1.0, 50.0, 100.0), &yes);
    assert_eq!(result.status, CalculationStatus::Achieved);

    let percent: FormulaConfig = FormulaConfig::binary().with_target_value("100%");
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(99.0, 0.0, 100.0), &percent);
    assert_eq!(result.status, CalculationStatus::BelowTarget);

    // Input target when nothing is configured
    let bare: FormulaConfig = FormulaConfig::binary().with_min_threshold(2.0);
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(4.0, 5.0, 100.0), &bare);
    assert_eq!(result.status, CalculationStatus::BelowTarget);

    // Minimum threshold when the input target is zero
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(2.0, 0.0, 100.0), &bare);
    assert_eq!(result.status, CalculationStatus::Achieved);

    // Defaults to one
    let result: CalculationResult = calculate_remuneration(
        &CalculationInput::new(1.0, 0.0, 100.0),
        &FormulaConfig::binary(),
    );
    assert_eq!(result.status, CalculationStatus::Achieved);
}

#[test]
fn test_condition_type_takes_precedence() {
    let values: BTreeMap<String, f64> = field_values(&[("total_tb_patients", 0.0)]);
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0)
        .with_condition(ConditionType::NoTbPatients, None);
    let input: CalculationInput<'_> =
        CalculationInput::new(500.0, 100.0, 750.0).with_field_values(&values);

    let result: CalculationResult = calculate_remuneration(&input, &config);

    assert_eq!(result.status, CalculationStatus::NotApplicable);
    assert_eq!(result.remuneration, 0);
    let conditional: ConditionalRemuneration = result.conditional_remuneration.unwrap();
    assert_eq!(conditional.with_condition, 0);
    assert_eq!(conditional.without_condition, 750);
}

#[test]
fn test_condition_not_triggered_grades_normally() {
    let values: BTreeMap<String, f64> = field_values(&[("total_tb_patients", 7.0)]);
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0)
        .with_condition(ConditionType::NoTbPatients, None);
    let input: CalculationInput<'_> =
        CalculationInput::new(5.0, 100.0, 750.0).with_field_values(&values);

    let result: CalculationResult = calculate_remuneration(&input, &config);

    assert_eq!(result.status, CalculationStatus::Achieved);
    assert!(result.conditional_remuneration.is_none());
}

#[test]
fn test_condition_field_and_value_override_defaults() {
    let values: BTreeMap<String, f64> = field_values(&[("anc_registered", 3.0)]);
    let mut config: FormulaConfig =
        FormulaConfig::range(1.0, 2.0).with_condition(ConditionType::AncDueZero, Some("anc_registered"));
    config.condition_value = Some(3.0);
    let input: CalculationInput<'_> =
        CalculationInput::new(2.0, 0.0, 100.0).with_field_values(&values);

    let result: CalculationResult = calculate_remuneration(&input, &config);

    assert_eq!(result.status, CalculationStatus::NotApplicable);
}

#[test]
fn test_conditional_question_answered_no() {
    let values: BTreeMap<String, f64> = field_values(&[("has_lab", 0.0)]);
    let config: FormulaConfig = FormulaConfig::binary()
        .with_conditional_question("has_lab", "Does the facility have a laboratory?");
    let input: CalculationInput<'_> =
        CalculationInput::new(1.0, 1.0, 300.0).with_field_values(&values);

    let result: CalculationResult = calculate_remuneration(&input, &config);

    assert_eq!(result.status, CalculationStatus::NotApplicable);
    assert_eq!(
        result.conditional_remuneration.unwrap().applied_condition,
        "Does the facility have a laboratory?"
    );
}

#[test]
fn test_legacy_condition_met_flag() {
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0);

    let gated: CalculationResult = calculate_remuneration(
        &CalculationInput::new(5.0, 100.0, 100.0).with_condition_met(false),
        &config,
    );
    assert_eq!(gated.status, CalculationStatus::NotApplicable);

    let open: CalculationResult = calculate_remuneration(
        &CalculationInput::new(5.0, 100.0, 100.0).with_condition_met(true),
        &config,
    );
    assert_eq!(open.status, CalculationStatus::Achieved);

    // The legacy flag only gates ratio indicators
    let range: CalculationResult = calculate_remuneration(
        &CalculationInput::new(10.0, 0.0, 100.0).with_condition_met(false),
        &FormulaConfig::range(5.0, 10.0),
    );
    assert_eq!(range.status, CalculationStatus::Achieved);
}

#[test]
fn test_facility_specific_override() {
    let config: FormulaConfig = FormulaConfig::range(5.0, 10.0).with_facility_target(
        "uphc",
        FacilityTarget {
            range: Some(FormulaRange::new(20.0, 40.0)),
            target_value: None,
        },
    );

    let phc: CalculationResult = calculate_remuneration(
        &CalculationInput::new(10.0, 0.0, 100.0).with_facility_type("PHC"),
        &config,
    );
    assert_eq!(phc.status, CalculationStatus::Achieved);

    let uphc: CalculationResult = calculate_remuneration(
        &CalculationInput::new(10.0, 0.0, 100.0).with_facility_type("UPHC"),
        &config,
    );
    assert_eq!(uphc.status, CalculationStatus::BelowTarget);
}

#[test]
fn test_override_replaces_binary_target() {
    let config: FormulaConfig = FormulaConfig::binary()
        .with_target_value(1.0)
        .with_facility_target(
            "SC",
            FacilityTarget {
                range: None,
                target_value: Some(TargetValue::Number(3.0)),
            },
        );

    let result: CalculationResult = calculate_remuneration(
        &CalculationInput::new(2.0, 0.0, 100.0).with_facility_type("sc"),
        &config,
    );
    assert_eq!(result.status, CalculationStatus::BelowTarget);
}

#[test]
fn test_override_replaces_percentage_range_denominator() {
    let config: FormulaConfig = FormulaConfig::percentage_range(3.0, 5.0).with_facility_target(
        "PHC",
        FacilityTarget {
            range: None,
            target_value: Some(TargetValue::Number(10000.0)),
        },
    );
    let input: CalculationInput<'_> =
        CalculationInput::new(300.0, 5000.0, 500.0).with_facility_type("PHC");

    let result: CalculationResult = calculate_remuneration(&input, &config);

    assert_eq!(result.status, CalculationStatus::PartiallyAchieved);
    assert_close(result.achievement, 3.0);
    assert_close(result.remuneration_percentage, 60.0);
    assert_eq!(result.remuneration, 300);

    // Other facility types keep the submitted target
    let other: CalculationResult = calculate_remuneration(
        &CalculationInput::new(300.0, 5000.0, 500.0).with_facility_type("SC"),
        &config,
    );
    assert_eq!(other.status, CalculationStatus::Achieved);
    assert_eq!(other.remuneration, 500);
}

#[test]
fn test_unsupported_formula_type_is_a_no_op() {
    let config: FormulaConfig =
        FormulaConfig::new(FormulaType::Unsupported(String::from("THRESHOLD_BONUS")));
    let result: CalculationResult =
        calculate_remuneration(&CalculationInput::new(100.0, 1.0, 500.0), &config);

    assert_eq!(result.status, CalculationStatus::BelowTarget);
    assert_eq!(result.remuneration, 0);
    assert!(result.message.contains("THRESHOLD_BONUS"));
}

#[test]
fn test_status_serialization() {
    assert_eq!(
        serde_json::to_string(&CalculationStatus::PartiallyAchieved).unwrap(),
        "\"PARTIALLY_ACHIEVED\""
    );
    assert_eq!(
        serde_json::to_string(&CalculationStatus::NotApplicable).unwrap(),
        "\"NA\""
    );
    assert_eq!(CalculationStatus::BelowTarget.to_string(), "BELOW_TARGET");
}
