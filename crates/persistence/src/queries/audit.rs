// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::prelude::*;
use pbi_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use pbi_domain::{CalculationVersion, ReportMonth};

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

fn event_from_row(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor: Actor = serde_json::from_str(&row.actor_json)?;
    let cause: Cause = serde_json::from_str(&row.cause_json)?;
    let action: Action = serde_json::from_str(&row.action_json)?;
    let before: StateSnapshot = serde_json::from_str(&row.before_snapshot_json)?;
    let after: StateSnapshot = serde_json::from_str(&row.after_snapshot_json)?;

    let mut event: AuditEvent =
        AuditEvent::new(actor, cause, action, before, after).with_id(row.event_id);

    if let Some(version) = row.calculation_version {
        let version: CalculationVersion = version.parse()?;
        event = event.with_calculation_version(version);
    }
    if let Some(month) = row.report_month {
        let month: ReportMonth = month.parse()?;
        event = event.with_report_month(month);
    }

    Ok(event)
}

/// Retrieves an audit event by ID.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `event_id` - The event ID to retrieve
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: Option<AuditEventRow> = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn)
        .optional()?;

    row.map_or_else(|| Err(PersistenceError::EventNotFound(event_id)), event_from_row)
}

/// Retrieves all audit events in the order they were recorded.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn get_audit_events(conn: &mut SqliteConnection) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?;

    rows.into_iter().map(event_from_row).collect()
}

/// Retrieves the audit events recorded for the given action names.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `action_names` - The action names to include
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn get_audit_events_for_actions(
    conn: &mut SqliteConnection,
    action_names: &[&str],
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::action_name.eq_any(action_names.to_vec()))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?;

    rows.into_iter().map(event_from_row).collect()
}
