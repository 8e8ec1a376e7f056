// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit log types for administrative changes to the remuneration engine.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use pbi_domain::{CalculationVersion, ReportMonth};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Who made an administrative change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User name or process identifier. Never blank for a recorded event.
    pub id: String,
    /// `admin` for people, anything else for automated callers.
    pub actor_type: String,
}

impl Actor {
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// An administrator identified by user name.
    #[must_use]
    pub fn admin(id: &str) -> Self {
        Self::new(id.to_string(), String::from("admin"))
    }
}

/// Why a change was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// Correlates the event with whatever triggered it, e.g. `create-version-2.0`.
    pub id: String,
    /// Free text supplied by the administrator.
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// What was done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// `CreateVersion` or `ForceRecalculation`.
    pub name: String,
    /// Human-readable summary.
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// Opaque text describing the version registry, or a recalculation
/// outcome, on one side of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// One entry in the administrative audit log.
///
/// Declaring a calculation version and forcing a month's recalculation each
/// append exactly one event. Events are never updated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// `None` until the event has been stored.
    pub event_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    /// The declared version, or the version active during a recalculation.
    pub calculation_version: Option<CalculationVersion>,
    /// Set for recalculations only.
    pub report_month: Option<ReportMonth>,
}

impl AuditEvent {
    /// Creates an unstored event with no version or month attached.
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
            calculation_version: None,
            report_month: None,
        }
    }

    /// Tags the event with the calculation version it concerns.
    #[must_use]
    pub fn with_calculation_version(mut self, version: CalculationVersion) -> Self {
        self.calculation_version = Some(version);
        self
    }

    /// Tags the event with the report month it concerns.
    #[must_use]
    pub const fn with_report_month(mut self, report_month: ReportMonth) -> Self {
        self.report_month = Some(report_month);
        self
    }

    /// Attaches the identifier assigned by the store.
    #[must_use]
    pub fn with_id(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }
}
