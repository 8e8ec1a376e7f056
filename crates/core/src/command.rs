// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::RecalculationOutcome;
use pbi_domain::{ConfigurationSnapshot, ReportMonth};

/// A command represents administrative intent as data only.
///
/// Commands are the only way to change the version registry or to record
/// that stored calculations were discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Declare a new calculation version from the current configuration.
    CreateVersion {
        /// The requested version string, validated by `apply`.
        version: String,
        /// Free-text notes describing the change.
        notes: Option<String>,
        /// The configuration captured for the new version.
        snapshot: ConfigurationSnapshot,
    },
    /// Record a completed forced recalculation of one report month.
    ForceRecalculation {
        /// The month whose stored calculations were replaced.
        report_month: ReportMonth,
        /// Why the recalculation was forced.
        reason: String,
        /// What the recalculation achieved.
        outcome: RecalculationOutcome,
    },
}
