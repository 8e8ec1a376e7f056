// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calculation version queries.

use diesel::prelude::*;
use pbi::{VersionRecord, VersionRegistry};
use pbi_domain::{CalculationVersion, ConfigurationSnapshot};

use crate::data_models::VersionRow;
use crate::diesel_schema::calculation_versions;
use crate::error::PersistenceError;

/// Retrieves every declared version in declaration order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored version string does not
/// parse.
pub fn list_versions(conn: &mut SqliteConnection) -> Result<Vec<VersionRecord>, PersistenceError> {
    let rows: Vec<VersionRow> = calculation_versions::table
        .order(calculation_versions::version_id.asc())
        .select(VersionRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            let version: CalculationVersion = row.version.parse()?;
            Ok(VersionRecord {
                version,
                created_at: row.created_at,
                created_by: row.created_by,
                notes: row.notes,
                is_active: row.is_active != 0,
            })
        })
        .collect()
}

/// Loads the version registry.
///
/// # Errors
///
/// Returns an error if the versions cannot be loaded.
pub fn load_version_registry(
    conn: &mut SqliteConnection,
) -> Result<VersionRegistry, PersistenceError> {
    Ok(VersionRegistry::from_records(list_versions(conn)?))
}

/// Retrieves the configuration snapshot frozen by a version.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `version` - The version to look up
///
/// # Errors
///
/// Returns `PersistenceError::VersionNotFound` if the version was never
/// declared, or an error if the snapshot cannot be deserialized.
pub fn get_version_snapshot(
    conn: &mut SqliteConnection,
    version: &CalculationVersion,
) -> Result<ConfigurationSnapshot, PersistenceError> {
    let snapshot_json: Option<String> = calculation_versions::table
        .filter(calculation_versions::version.eq(version.to_string()))
        .select(calculation_versions::snapshot_json)
        .first(conn)
        .optional()?;

    let snapshot_json: String =
        snapshot_json.ok_or_else(|| PersistenceError::VersionNotFound(version.to_string()))?;
    Ok(serde_json::from_str(&snapshot_json)?)
}

/// Retrieves the snapshot of the active version, if any version is active.
///
/// # Errors
///
/// Returns an error if the query fails or the snapshot cannot be deserialized.
pub fn get_active_snapshot(
    conn: &mut SqliteConnection,
) -> Result<Option<ConfigurationSnapshot>, PersistenceError> {
    let snapshot_json: Option<String> = calculation_versions::table
        .filter(calculation_versions::is_active.eq(1))
        .select(calculation_versions::snapshot_json)
        .first(conn)
        .optional()?;

    snapshot_json
        .map(|json| serde_json::from_str(&json).map_err(PersistenceError::from))
        .transpose()
}
