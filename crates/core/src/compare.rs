// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field-by-field comparison of two configuration snapshots.
//!
//! Any change that moves money for every facility (KPI weights, targets,
//! formulas, the incentive amount, the performance method) is `high`
//! impact. Changes confined to worker allocation rules are `medium`.

use pbi_domain::{
    CalculationVersion, ConfigurationSnapshot, KpiSnapshot, WorkerAllocationRule,
    WorkerAllocationSnapshot,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How much a configuration change can move payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl ImpactLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// The action recommended before adopting a change of this impact.
    #[must_use]
    pub const fn recommendation(self) -> Recommendation {
        match self {
            Self::Low => Recommendation::Safe,
            Self::Medium => Recommendation::Review,
            Self::High => Recommendation::ManualVerification,
        }
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Safe,
    Review,
    ManualVerification,
}

impl Recommendation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Review => "review",
            Self::ManualVerification => "manual_verification",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which part of the configuration a change touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCategory {
    Kpi,
    RemunerationFormula,
    WorkerAllocation,
}

impl ChangeCategory {
    const fn impact(self) -> ImpactLevel {
        match self {
            Self::Kpi | Self::RemunerationFormula => ImpactLevel::High,
            Self::WorkerAllocation => ImpactLevel::Medium,
        }
    }
}

/// One differing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationChange {
    pub category: ChangeCategory,
    /// Dotted path to the field, e.g. `kpis.anc.weight`.
    pub path: String,
    /// `None` when the field was added.
    pub old_value: Option<String>,
    /// `None` when the field was removed.
    pub new_value: Option<String>,
}

/// The result of comparing two versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub old_version: CalculationVersion,
    pub new_version: CalculationVersion,
    pub changes: Vec<ConfigurationChange>,
    pub impact: ImpactLevel,
    pub recommendation: Recommendation,
}

#[derive(Default)]
struct ChangeCollector {
    changes: Vec<ConfigurationChange>,
}

impl ChangeCollector {
    fn push(
        &mut self,
        category: ChangeCategory,
        path: String,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        if old_value != new_value {
            self.changes.push(ConfigurationChange {
                category,
                path,
                old_value,
                new_value,
            });
        }
    }
}

/// Compares two snapshots field by field.
#[must_use]
pub fn compare_snapshots(
    old: &ConfigurationSnapshot,
    new: &ConfigurationSnapshot,
) -> VersionComparison {
    let mut collector: ChangeCollector = ChangeCollector::default();

    compare_kpis(&mut collector, &old.kpis, &new.kpis);

    collector.push(
        ChangeCategory::RemunerationFormula,
        String::from("remuneration_formula.facility_incentive_amount"),
        Some(old.remuneration_formula.facility_incentive_amount.to_string()),
        Some(new.remuneration_formula.facility_incentive_amount.to_string()),
    );
    collector.push(
        ChangeCategory::RemunerationFormula,
        String::from("remuneration_formula.performance_method"),
        Some(old.remuneration_formula.performance_method.to_string()),
        Some(new.remuneration_formula.performance_method.to_string()),
    );

    compare_allocations(&mut collector, &old.worker_allocations, &new.worker_allocations);

    let impact: ImpactLevel = collector
        .changes
        .iter()
        .map(|change| change.category.impact())
        .max()
        .unwrap_or(ImpactLevel::Low);

    VersionComparison {
        old_version: old.version.clone(),
        new_version: new.version.clone(),
        changes: collector.changes,
        impact,
        recommendation: impact.recommendation(),
    }
}

fn formula_text(kpi: &KpiSnapshot) -> Option<String> {
    kpi.formula
        .as_ref()
        .and_then(|formula| serde_json::to_string(formula).ok())
}

fn compare_kpis(collector: &mut ChangeCollector, old: &[KpiSnapshot], new: &[KpiSnapshot]) {
    let old_by_code: BTreeMap<&str, &KpiSnapshot> =
        old.iter().map(|kpi| (kpi.field_code.as_str(), kpi)).collect();
    let new_by_code: BTreeMap<&str, &KpiSnapshot> =
        new.iter().map(|kpi| (kpi.field_code.as_str(), kpi)).collect();
    let codes: BTreeSet<&str> = old_by_code.keys().chain(new_by_code.keys()).copied().collect();

    for code in codes {
        match (old_by_code.get(code), new_by_code.get(code)) {
            (Some(before), Some(after)) => {
                collector.push(
                    ChangeCategory::Kpi,
                    format!("kpis.{code}.weight"),
                    Some(before.weight.to_string()),
                    Some(after.weight.to_string()),
                );
                collector.push(
                    ChangeCategory::Kpi,
                    format!("kpis.{code}.target"),
                    Some(before.target.to_string()),
                    Some(after.target.to_string()),
                );
                collector.push(
                    ChangeCategory::Kpi,
                    format!("kpis.{code}.formula"),
                    formula_text(before),
                    formula_text(after),
                );
            }
            (Some(before), None) => collector.push(
                ChangeCategory::Kpi,
                format!("kpis.{code}"),
                Some(format!("weight={}, target={}", before.weight, before.target)),
                None,
            ),
            (None, Some(after)) => collector.push(
                ChangeCategory::Kpi,
                format!("kpis.{code}"),
                None,
                Some(format!("weight={}, target={}", after.weight, after.target)),
            ),
            (None, None) => {}
        }
    }
}

fn rule_text(rule: &WorkerAllocationRule) -> String {
    format!("{} {}", rule.allocation_type, rule.allocated_amount)
}

fn compare_allocations(
    collector: &mut ChangeCollector,
    old: &BTreeMap<String, WorkerAllocationSnapshot>,
    new: &BTreeMap<String, WorkerAllocationSnapshot>,
) {
    let facility_types: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    for facility_type in facility_types {
        let old_rules: BTreeMap<&str, &WorkerAllocationRule> = old
            .get(facility_type)
            .map(|allocation| {
                allocation
                    .rules
                    .iter()
                    .map(|rule| (rule.worker_category.as_str(), rule))
                    .collect()
            })
            .unwrap_or_default();
        let new_rules: BTreeMap<&str, &WorkerAllocationRule> = new
            .get(facility_type)
            .map(|allocation| {
                allocation
                    .rules
                    .iter()
                    .map(|rule| (rule.worker_category.as_str(), rule))
                    .collect()
            })
            .unwrap_or_default();
        let categories: BTreeSet<&str> =
            old_rules.keys().chain(new_rules.keys()).copied().collect();

        for category in categories {
            collector.push(
                ChangeCategory::WorkerAllocation,
                format!("worker_allocations.{facility_type}.{category}"),
                old_rules.get(category).map(|rule| rule_text(rule)),
                new_rules.get(category).map(|rule| rule_text(rule)),
            );
        }
    }
}
