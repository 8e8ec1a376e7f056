// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{TransitionResult, VersionRecord, VersionRegistry};
use pbi_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use pbi_domain::{CalculationVersion, ConfigurationSnapshot, DomainError, validate_snapshot};

/// Applies an administrative command to the version registry, producing the
/// new registry and the audit event that records the change.
///
/// # Arguments
///
/// * `registry` - The current version registry (immutable)
/// * `command` - The command to apply
/// * `actor` - The administrator performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new registry and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The actor has no identifier
/// - A version string is malformed or already declared
/// - The captured configuration is invalid
/// - A forced recalculation carries no reason
pub fn apply(
    registry: &VersionRegistry,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    if actor.id.trim().is_empty() {
        return Err(CoreError::DomainViolation(DomainError::MissingAdminUser));
    }

    match command {
        Command::CreateVersion {
            version,
            notes,
            snapshot,
        } => {
            let version: CalculationVersion = version.trim().parse()?;

            // Check for duplicate
            if registry.has_version(&version) {
                return Err(CoreError::DomainViolation(DomainError::DuplicateVersion(
                    version.to_string(),
                )));
            }

            validate_snapshot(&snapshot)?;

            // Re-tag the captured configuration with the new version
            let snapshot: ConfigurationSnapshot = ConfigurationSnapshot {
                version: version.clone(),
                captured_by: Some(actor.id.clone()),
                ..snapshot
            };

            let before: StateSnapshot = registry.to_snapshot();

            let mut new_registry: VersionRegistry = registry.clone();
            new_registry.activate(VersionRecord {
                version: version.clone(),
                created_at: snapshot.captured_at.clone(),
                created_by: actor.id.clone(),
                notes: notes.clone(),
                is_active: true,
            });

            let after: StateSnapshot = new_registry.to_snapshot();

            let action: Action = Action::new(
                String::from("CreateVersion"),
                Some(notes.map_or_else(
                    || format!("Created calculation version {version}"),
                    |notes| format!("Created calculation version {version}: {notes}"),
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(actor, cause, action, before, after)
                .with_calculation_version(version);

            Ok(TransitionResult {
                new_registry,
                audit_event,
                snapshot: Some(snapshot),
            })
        }
        Command::ForceRecalculation {
            report_month,
            reason,
            outcome,
        } => {
            if reason.trim().is_empty() {
                return Err(CoreError::DomainViolation(DomainError::MissingReason));
            }

            // The registry does not change; the audit trail records what was replaced
            let before: StateSnapshot = registry.to_snapshot();
            let after: StateSnapshot = StateSnapshot::new(serde_json::to_string(&outcome)?);

            let action: Action = Action::new(
                String::from("ForceRecalculation"),
                Some(format!(
                    "Recalculated {} of {} facilities for {report_month}: {reason}",
                    outcome.recalculated_facilities, outcome.total_facilities
                )),
            );
            let audit_event: AuditEvent = AuditEvent::new(actor, cause, action, before, after)
                .with_calculation_version(registry.active_version())
                .with_report_month(report_month);

            Ok(TransitionResult {
                new_registry: registry.clone(),
                audit_event,
                snapshot: None,
            })
        }
    }
}

/// Checks that a forced recalculation may start.
///
/// This is a read-only validation that does not create audit events.
///
/// # Errors
///
/// Returns an error if the admin user or the reason is blank.
pub fn validate_recalculation_request(admin_user: &str, reason: &str) -> Result<(), CoreError> {
    if admin_user.trim().is_empty() {
        return Err(CoreError::DomainViolation(DomainError::MissingAdminUser));
    }
    if reason.trim().is_empty() {
        return Err(CoreError::DomainViolation(DomainError::MissingReason));
    }
    Ok(())
}
