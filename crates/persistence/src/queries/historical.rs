// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Historical remuneration queries.

use diesel::prelude::*;
use pbi_domain::ReportMonth;

use crate::data_models::HistoricalRemunerationRecord;
use crate::diesel_schema::historical_remuneration;
use crate::error::PersistenceError;

/// Retrieves the stored rows of one facility and month.
///
/// The facility row is returned before the worker rows.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `facility_id` - The facility identifier
/// * `report_month` - The report month
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_facility_records(
    conn: &mut SqliteConnection,
    facility_id: &str,
    report_month: ReportMonth,
) -> Result<Vec<HistoricalRemunerationRecord>, PersistenceError> {
    let mut records: Vec<HistoricalRemunerationRecord> = historical_remuneration::table
        .filter(historical_remuneration::facility_id.eq(facility_id))
        .filter(historical_remuneration::report_month.eq(report_month.to_string()))
        .order(historical_remuneration::record_id.asc())
        .select(HistoricalRemunerationRecord::as_select())
        .load(conn)?;

    // Stable: worker rows keep their insertion order
    records.sort_by_key(|record| !record.is_facility_row());
    Ok(records)
}

/// Lists the facilities that have stored rows for a month.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_calculated_facilities(
    conn: &mut SqliteConnection,
    report_month: ReportMonth,
) -> Result<Vec<String>, PersistenceError> {
    Ok(historical_remuneration::table
        .filter(historical_remuneration::report_month.eq(report_month.to_string()))
        .filter(historical_remuneration::worker_id.is_null())
        .order(historical_remuneration::facility_id.asc())
        .select(historical_remuneration::facility_id)
        .load(conn)?)
}
