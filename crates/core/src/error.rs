// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pbi_domain::DomainError;

/// Errors raised when a version command is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The command broke a version or configuration rule.
    DomainViolation(DomainError),
    /// The registry or snapshot could not be encoded for the audit log.
    SerializationError(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Command rejected: {err}"),
            Self::SerializationError(msg) => write!(f, "Failed to encode audit state: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
