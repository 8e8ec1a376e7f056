// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use diesel::prelude::*;
use pbi_audit::AuditEvent;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::NewAuditEvent;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let new_event: NewAuditEvent<'_> = NewAuditEvent {
        action_name: &event.action.name,
        calculation_version: event
            .calculation_version
            .as_ref()
            .map(ToString::to_string),
        report_month: event.report_month.map(|month| month.to_string()),
        actor_json: serde_json::to_string(&event.actor)?,
        cause_json: serde_json::to_string(&event.cause)?,
        action_json: serde_json::to_string(&event.action)?,
        before_snapshot_json: serde_json::to_string(&event.before)?,
        after_snapshot_json: serde_json::to_string(&event.after)?,
    };

    diesel::insert_into(audit_events::table)
        .values(&new_event)
        .execute(conn)?;

    let event_id: i64 = get_last_insert_rowid(conn)?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}
