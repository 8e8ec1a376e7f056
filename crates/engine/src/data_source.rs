// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Facility master data and reported field values.
//!
//! The engine does not own this data. It reads it through
//! [`FacilityDataSource`], which a deployment backs with whatever system
//! holds facilities, workers and monthly submissions.

use pbi_domain::{Facility, ReportMonth, Worker};
use std::collections::BTreeMap;

use crate::error::EngineError;

/// Read access to facilities, their workers and their reported values.
pub trait FacilityDataSource {
    /// Looks up a facility. `Ok(None)` means the facility does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn facility(&self, facility_id: &str) -> Result<Option<Facility>, EngineError>;

    /// Returns the field values a facility reported for a month, already
    /// coerced to numbers. Fields that were not reported are absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn field_values(
        &self,
        facility_id: &str,
        report_month: ReportMonth,
    ) -> Result<BTreeMap<String, f64>, EngineError>;

    /// Returns the workers attached to a facility.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn workers(&self, facility_id: &str) -> Result<Vec<Worker>, EngineError>;

    /// Lists the facilities that reported any value for a month.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    fn facilities_with_data(&self, report_month: ReportMonth) -> Result<Vec<String>, EngineError>;
}

/// A [`FacilityDataSource`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFacilityData {
    facilities: BTreeMap<String, Facility>,
    workers: BTreeMap<String, Vec<Worker>>,
    field_values: BTreeMap<(String, ReportMonth), BTreeMap<String, f64>>,
}

impl InMemoryFacilityData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a facility.
    pub fn add_facility(&mut self, facility: Facility) {
        self.facilities
            .insert(facility.facility_id.clone(), facility);
    }

    /// Attaches a worker to a facility.
    pub fn add_worker(&mut self, facility_id: &str, worker: Worker) {
        self.workers
            .entry(facility_id.to_string())
            .or_default()
            .push(worker);
    }

    /// Records one reported field value.
    pub fn set_field_value(
        &mut self,
        facility_id: &str,
        report_month: ReportMonth,
        field_code: &str,
        value: f64,
    ) {
        self.field_values
            .entry((facility_id.to_string(), report_month))
            .or_default()
            .insert(field_code.to_string(), value);
    }
}

impl FacilityDataSource for InMemoryFacilityData {
    fn facility(&self, facility_id: &str) -> Result<Option<Facility>, EngineError> {
        Ok(self.facilities.get(facility_id).cloned())
    }

    fn field_values(
        &self,
        facility_id: &str,
        report_month: ReportMonth,
    ) -> Result<BTreeMap<String, f64>, EngineError> {
        Ok(self
            .field_values
            .get(&(facility_id.to_string(), report_month))
            .cloned()
            .unwrap_or_default())
    }

    fn workers(&self, facility_id: &str) -> Result<Vec<Worker>, EngineError> {
        Ok(self.workers.get(facility_id).cloned().unwrap_or_default())
    }

    fn facilities_with_data(&self, report_month: ReportMonth) -> Result<Vec<String>, EngineError> {
        Ok(self
            .field_values
            .keys()
            .filter(|(_, month)| *month == report_month)
            .map(|(facility_id, _)| facility_id.clone())
            .collect())
    }
}
