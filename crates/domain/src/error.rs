// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A calculation version string is not of the form `major.minor[.patch]`.
    InvalidVersionFormat(String),
    /// A calculation version has already been declared.
    DuplicateVersion(String),
    /// The requested calculation version does not exist.
    VersionNotFound(String),
    /// A report month is not of the form `YYYY-MM`.
    InvalidReportMonth(String),
    /// A facility type code is empty or invalid.
    InvalidFacilityType(String),
    /// A performance method name is not recognized.
    InvalidPerformanceMethod(String),
    /// A worker allocation type is not recognized.
    InvalidAllocationType(String),
    /// A KPI configuration entry is invalid.
    InvalidKpiConfig {
        /// The KPI field code.
        field_code: String,
        /// Description of the problem.
        reason: String,
    },
    /// A calculation formula attached to a KPI does not parse.
    InvalidFormula {
        /// The KPI field code owning the formula.
        field_code: String,
        /// The parser diagnostic.
        reason: String,
    },
    /// A worker allocation rule is invalid.
    InvalidAllocationRule {
        /// The worker category the rule applies to.
        worker_category: String,
        /// Description of the problem.
        reason: String,
    },
    /// The facility incentive amount is negative or not finite.
    InvalidIncentiveAmount(String),
    /// An administrative action was requested without an admin user.
    MissingAdminUser,
    /// An administrative action requires a reason.
    MissingReason,
    /// A timestamp could not be produced or parsed.
    TimestampError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidVersionFormat(version) => write!(
                f,
                "Invalid version format '{version}': expected major.minor or major.minor.patch"
            ),
            Self::DuplicateVersion(version) => {
                write!(f, "Calculation version {version} already exists")
            }
            Self::VersionNotFound(version) => {
                write!(f, "Calculation version {version} not found")
            }
            Self::InvalidReportMonth(value) => {
                write!(f, "Invalid report month '{value}': expected YYYY-MM")
            }
            Self::InvalidFacilityType(msg) => write!(f, "Invalid facility type: {msg}"),
            Self::InvalidPerformanceMethod(value) => {
                write!(f, "Unknown performance method '{value}'")
            }
            Self::InvalidAllocationType(value) => {
                write!(f, "Unknown worker allocation type '{value}'")
            }
            Self::InvalidKpiConfig { field_code, reason } => {
                write!(f, "Invalid KPI configuration for '{field_code}': {reason}")
            }
            Self::InvalidFormula { field_code, reason } => {
                write!(f, "Invalid calculation formula for '{field_code}': {reason}")
            }
            Self::InvalidAllocationRule {
                worker_category,
                reason,
            } => {
                write!(
                    f,
                    "Invalid allocation rule for worker category '{worker_category}': {reason}"
                )
            }
            Self::InvalidIncentiveAmount(msg) => {
                write!(f, "Invalid facility incentive amount: {msg}")
            }
            Self::MissingAdminUser => write!(f, "An admin user is required for this action"),
            Self::MissingReason => write!(f, "A reason is required for this action"),
            Self::TimestampError(msg) => write!(f, "Timestamp error: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
