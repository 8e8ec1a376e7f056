// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Historical remuneration writes.

use diesel::prelude::*;
use pbi_domain::ReportMonth;
use tracing::info;

use crate::data_models::NewHistoricalRemunerationRecord;
use crate::diesel_schema::historical_remuneration;
use crate::error::PersistenceError;

/// Replaces every stored row of one facility and month.
///
/// The delete and the inserts run in one transaction, so readers see either
/// the old rows or the new ones.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `facility_id` - The facility identifier
/// * `report_month` - The report month
/// * `records` - The new rows; each must belong to `facility_id` and `report_month`
///
/// # Returns
///
/// The number of rows that were replaced.
///
/// # Errors
///
/// Returns an error if a row belongs to another facility or month, or if a
/// write fails.
pub fn replace_facility_records(
    conn: &mut SqliteConnection,
    facility_id: &str,
    report_month: ReportMonth,
    records: &[NewHistoricalRemunerationRecord],
) -> Result<usize, PersistenceError> {
    let month: String = report_month.to_string();

    if let Some(stray) = records
        .iter()
        .find(|record| record.facility_id != facility_id || record.report_month != month)
    {
        return Err(PersistenceError::ForeignRecord {
            facility_id: stray.facility_id.clone(),
            report_month: stray.report_month.clone(),
        });
    }

    conn.transaction::<usize, PersistenceError, _>(|conn| {
        let replaced: usize = diesel::delete(
            historical_remuneration::table
                .filter(historical_remuneration::facility_id.eq(facility_id))
                .filter(historical_remuneration::report_month.eq(&month)),
        )
        .execute(conn)?;

        if !records.is_empty() {
            diesel::insert_into(historical_remuneration::table)
                .values(records)
                .execute(conn)?;
        }

        info!(
            facility_id,
            report_month = %month,
            replaced,
            inserted = records.len(),
            "Stored remuneration records"
        );
        Ok(replaced)
    })
}
