// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence of administrative transitions.

use diesel::prelude::*;
use pbi::{TransitionResult, VersionRecord};
use pbi_domain::ConfigurationSnapshot;
use tracing::info;

use crate::data_models::NewVersion;
use crate::diesel_schema::calculation_versions;
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;

fn insert_active_version(
    conn: &mut SqliteConnection,
    record: &VersionRecord,
    snapshot: &ConfigurationSnapshot,
) -> Result<(), PersistenceError> {
    let version: String = record.version.to_string();
    let snapshot_json: String = serde_json::to_string(snapshot)?;

    // At most one row may be active
    diesel::update(calculation_versions::table.filter(calculation_versions::is_active.eq(1)))
        .set(calculation_versions::is_active.eq(0))
        .execute(conn)?;

    diesel::insert_into(calculation_versions::table)
        .values(&NewVersion {
            version: &version,
            snapshot_json: &snapshot_json,
            created_at: &record.created_at,
            created_by: &record.created_by,
            notes: record.notes.as_deref(),
            is_active: 1,
        })
        .execute(conn)?;

    info!(version = %version, created_by = %record.created_by, "Activated calculation version");
    Ok(())
}

/// Persists a transition result in one transaction.
///
/// A transition that captured a snapshot declares a new active version;
/// every transition records its audit event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The transition result to persist
///
/// # Returns
///
/// The ID of the persisted audit event.
///
/// # Errors
///
/// Returns an error if any write fails. Nothing is persisted in that case.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction::<i64, PersistenceError, _>(|conn| {
        if let Some(snapshot) = &result.snapshot {
            let record: &VersionRecord = result
                .new_registry
                .versions
                .iter()
                .find(|record| record.version == snapshot.version)
                .ok_or_else(|| PersistenceError::VersionNotFound(snapshot.version.to_string()))?;
            insert_active_version(conn, record, snapshot)?;
        }

        persist_audit_event(conn, &result.audit_event)
    })
}
