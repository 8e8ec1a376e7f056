// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Engine error types.

use pbi::CoreError;
use pbi_domain::DomainError;
use pbi_persistence::PersistenceError;
use thiserror::Error;

/// Errors raised while calculating, replaying or administering remuneration.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The facility has no master data record.
    #[error("Facility not found: {0}")]
    FacilityNotFound(String),

    /// The facility data source could not be read.
    #[error("Facility data source failed: {0}")]
    DataSource(String),

    /// Stored rows exist but cannot be turned back into a result.
    #[error("Stored remuneration for facility {facility_id} in {report_month} is corrupt: {reason}")]
    CorruptRecord {
        facility_id: String,
        report_month: String,
        reason: String,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
