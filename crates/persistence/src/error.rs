// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pbi_domain::DomainError;

/// Errors raised by the remuneration store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The database could not be opened.
    DatabaseConnectionFailed(String),
    /// The embedded schema migrations could not be applied.
    MigrationFailed(String),
    /// The store could not be opened for a reason other than the connection.
    InitializationError(String),
    /// A statement failed.
    QueryFailed(String),
    /// No audit event has this ID.
    EventNotFound(i64),
    /// No snapshot is stored for this calculation version.
    VersionNotFound(String),
    /// A stored column does not decode into its domain value.
    CorruptData(String),
    /// A historical row does not belong to the facility and month being replaced.
    ForeignRecord {
        facility_id: String,
        report_month: String,
    },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::EventNotFound(id) => write!(f, "Event not found: {id}"),
            Self::VersionNotFound(version) => {
                write!(f, "No snapshot stored for calculation version {version}")
            }
            Self::CorruptData(msg) => write!(f, "Stored data is corrupt: {msg}"),
            Self::ForeignRecord {
                facility_id,
                report_month,
            } => write!(
                f,
                "Record for facility {facility_id} in {report_month} does not belong to this replacement"
            ),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::QueryFailed(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::CorruptData(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::CorruptData(err.to_string())
    }
}
