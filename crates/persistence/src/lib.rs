// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the PBI remuneration engine.
//!
//! This crate stores:
//!
//! - the live calculation configuration (KPIs, the facility remuneration
//!   formula, worker allocation rules),
//! - declared calculation versions with the configuration snapshot each froze,
//! - historical remuneration rows, one per facility, month and worker,
//! - the administrative audit log.
//!
//! It is built on Diesel over `SQLite`. Migrations are embedded and applied
//! whenever a connection is opened.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` opens a uniquely named shared-cache
//! in-memory database, so every test gets an isolated schema.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use backend::sqlite::StorageMode;
use diesel::SqliteConnection;
use pbi::{TransitionResult, VersionRecord, VersionRegistry};
use pbi_audit::AuditEvent;
use pbi_domain::{
    CalculationVersion, ConfigurationSnapshot, KpiSnapshot, RemunerationFormulaSnapshot,
    ReportMonth, WorkerAllocationRule, WorkerAllocationSnapshot,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Suffix for in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{HistoricalRemunerationRecord, NewHistoricalRemunerationRecord};
pub use error::PersistenceError;

/// The remuneration store, one `SQLite` connection.
///
/// Every method takes `&mut self`; callers that share a store across threads
/// wrap it in a mutex.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Opens a fresh in-memory store.
    ///
    /// Every call gets its own uniquely named database, so tests sharing a
    /// process never see each other's rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:pbi_memdb_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection =
            backend::sqlite::open_connection(&shared_memory_url, StorageMode::InMemory)?;
        Ok(Self { conn })
    }

    /// Opens, or creates, a store in a database file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8 or the database cannot
    /// be opened or migrated.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError(format!(
                "Database path is not valid UTF-8: {}",
                path.as_ref().display()
            ))
        })?;

        let conn: SqliteConnection =
            backend::sqlite::open_connection(path_str, StorageMode::File)?;
        Ok(Self { conn })
    }

    // ========================================================================
    // Live Configuration
    // ========================================================================

    /// Retrieves every configured KPI, ordered by field code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored formula is malformed.
    pub fn get_kpi_configs(&mut self) -> Result<Vec<KpiSnapshot>, PersistenceError> {
        queries::config::get_kpi_configs(&mut self.conn)
    }

    /// Retrieves the facility remuneration formula, if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_remuneration_formula(
        &mut self,
    ) -> Result<Option<RemunerationFormulaSnapshot>, PersistenceError> {
        queries::config::get_remuneration_formula(&mut self.conn)
    }

    /// Retrieves the allocation rules of one facility type.
    ///
    /// # Arguments
    ///
    /// * `facility_type` - The facility type code
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_allocation_rules(
        &mut self,
        facility_type: &str,
    ) -> Result<Vec<WorkerAllocationRule>, PersistenceError> {
        queries::config::get_allocation_rules(&mut self.conn, facility_type)
    }

    /// Retrieves all allocation rules grouped by facility type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_all_allocation_rules(
        &mut self,
    ) -> Result<BTreeMap<String, WorkerAllocationSnapshot>, PersistenceError> {
        queries::config::get_all_allocation_rules(&mut self.conn)
    }

    /// Inserts or replaces a KPI configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_kpi_config(&mut self, kpi: &KpiSnapshot) -> Result<(), PersistenceError> {
        mutations::config::upsert_kpi_config(&mut self.conn, kpi)
    }

    /// Removes a KPI configuration, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_kpi_config(&mut self, field_code: &str) -> Result<bool, PersistenceError> {
        mutations::config::delete_kpi_config(&mut self.conn, field_code)
    }

    /// Sets the facility remuneration formula.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn set_remuneration_formula(
        &mut self,
        formula: &RemunerationFormulaSnapshot,
    ) -> Result<(), PersistenceError> {
        mutations::config::set_remuneration_formula(&mut self.conn, formula)
    }

    /// Inserts or replaces a worker allocation rule.
    ///
    /// # Arguments
    ///
    /// * `facility_type` - The facility type the rule applies to
    /// * `rule` - The allocation rule
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_allocation_rule(
        &mut self,
        facility_type: &str,
        rule: &WorkerAllocationRule,
    ) -> Result<(), PersistenceError> {
        mutations::config::upsert_allocation_rule(&mut self.conn, facility_type, rule)
    }

    // ========================================================================
    // Calculation Versions
    // ========================================================================

    /// Persists a transition result (audit event and, for a new version, its snapshot).
    ///
    /// # Arguments
    ///
    /// * `result` - The transition result to persist
    ///
    /// # Returns
    ///
    /// The event ID assigned to the persisted audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_transition(&mut self, result: &TransitionResult) -> Result<i64, PersistenceError> {
        mutations::versions::persist_transition(&mut self.conn, result)
    }

    /// Retrieves every declared version in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_versions(&mut self) -> Result<Vec<VersionRecord>, PersistenceError> {
        queries::versions::list_versions(&mut self.conn)
    }

    /// Loads the version registry used by administrative transitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_version_registry(&mut self) -> Result<VersionRegistry, PersistenceError> {
        queries::versions::load_version_registry(&mut self.conn)
    }

    /// Retrieves the configuration snapshot frozen by a version.
    ///
    /// # Arguments
    ///
    /// * `version` - The version to look up
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::VersionNotFound` if the version was never declared.
    pub fn get_version_snapshot(
        &mut self,
        version: &CalculationVersion,
    ) -> Result<ConfigurationSnapshot, PersistenceError> {
        queries::versions::get_version_snapshot(&mut self.conn, version)
    }

    /// Retrieves the snapshot of the active version, if one is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_active_snapshot(
        &mut self,
    ) -> Result<Option<ConfigurationSnapshot>, PersistenceError> {
        queries::versions::get_active_snapshot(&mut self.conn)
    }

    // ========================================================================
    // Audit Events
    // ========================================================================

    /// Persists a standalone audit event.
    ///
    /// # Returns
    ///
    /// The event ID assigned to the persisted audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(&mut self.conn, event)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Arguments
    ///
    /// * `event_id` - The event ID to retrieve
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves every audit event in recording order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_audit_events(&mut self) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_audit_events(&mut self.conn)
    }

    /// Retrieves the audit events of the given actions in recording order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_audit_events_for_actions(
        &mut self,
        action_names: &[&str],
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_audit_events_for_actions(&mut self.conn, action_names)
    }

    // ========================================================================
    // Historical Remuneration
    // ========================================================================

    /// Retrieves the stored rows of one facility and month, facility row first.
    ///
    /// # Arguments
    ///
    /// * `facility_id` - The facility identifier
    /// * `report_month` - The report month
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_facility_records(
        &mut self,
        facility_id: &str,
        report_month: ReportMonth,
    ) -> Result<Vec<HistoricalRemunerationRecord>, PersistenceError> {
        queries::historical::get_facility_records(&mut self.conn, facility_id, report_month)
    }

    /// Lists the facilities that have stored rows for a month.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_calculated_facilities(
        &mut self,
        report_month: ReportMonth,
    ) -> Result<Vec<String>, PersistenceError> {
        queries::historical::list_calculated_facilities(&mut self.conn, report_month)
    }

    /// Atomically replaces the stored rows of one facility and month.
    ///
    /// # Arguments
    ///
    /// * `facility_id` - The facility identifier
    /// * `report_month` - The report month
    /// * `records` - The new rows
    ///
    /// # Returns
    ///
    /// The number of rows that were replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if a row does not belong to the facility and month,
    /// or if the write fails.
    pub fn replace_facility_records(
        &mut self,
        facility_id: &str,
        report_month: ReportMonth,
        records: &[NewHistoricalRemunerationRecord],
    ) -> Result<usize, PersistenceError> {
        mutations::historical::replace_facility_records(
            &mut self.conn,
            facility_id,
            report_month,
            records,
        )
    }
}
