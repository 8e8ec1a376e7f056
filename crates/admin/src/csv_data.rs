// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV-backed facility data for the admin CLI.
//!
//! A data directory holds three files:
//!
//! - `facilities.csv`: `facility_id`, `name`, `facility_type`
//! - `workers.csv`: `worker_id`, `name`, `facility_id`, `category`
//! - `field_values.csv`: `facility_id`, `report_month`, `field_code`, `value`
//!
//! Headers are matched case-insensitively and may contain spaces. A missing
//! file reads as empty. The first invalid row aborts the load.
//!
//! [`CsvDataDirectory`] reads the directory on first use, so commands that
//! never touch facility data never parse it.

use csv::StringRecord;
use pbi_domain::{Facility, FacilityType, ReportMonth, Worker};
use pbi_engine::{EngineError, FacilityDataSource, InMemoryFacilityData};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const FACILITIES_FILE: &str = "facilities.csv";
pub const WORKERS_FILE: &str = "workers.csv";
pub const FIELD_VALUES_FILE: &str = "field_values.csv";

const FACILITY_HEADERS: &[&str] = &["facility_id", "name", "facility_type"];
const WORKER_HEADERS: &[&str] = &["worker_id", "name", "facility_id", "category"];
const FIELD_VALUE_HEADERS: &[&str] = &["facility_id", "report_month", "field_code", "value"];

/// Errors raised while loading the CSV data directory.
#[derive(Debug, Error)]
pub enum CsvDataError {
    #[error("Failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid CSV format in {file}: {reason}")]
    InvalidFormat { file: String, reason: String },

    #[error("{file} row {row_number}: {}", errors.join("; "))]
    InvalidRow {
        file: String,
        /// 1-based, excluding the header.
        row_number: usize,
        errors: Vec<String>,
    },
}

/// One reported value from `field_values.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValueRow {
    pub facility_id: String,
    pub report_month: ReportMonth,
    pub field_code: String,
    pub value: f64,
}

/// A data row with its normalized header map.
struct CsvRow<'a> {
    record: &'a StringRecord,
    header_map: &'a HashMap<String, usize>,
}

impl CsvRow<'_> {
    fn get(&self, name: &str) -> Option<String> {
        self.header_map
            .get(name)
            .and_then(|&idx| self.record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn required(&self, name: &str, errors: &mut Vec<String>) -> String {
        self.get(name).unwrap_or_else(|| {
            errors.push(format!("{name}: required field is missing or empty"));
            String::new()
        })
    }
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

fn validate_headers(
    file: &str,
    headers: &StringRecord,
    required_headers: &[&str],
) -> Result<HashMap<String, usize>, CsvDataError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let missing: Vec<&str> = required_headers
        .iter()
        .copied()
        .filter(|required| !header_map.contains_key(*required))
        .collect();

    if !missing.is_empty() {
        return Err(CsvDataError::InvalidFormat {
            file: file.to_string(),
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

fn read_rows<T>(
    file: &str,
    content: &str,
    required_headers: &[&str],
    parse_row: impl Fn(&CsvRow<'_>) -> Result<T, Vec<String>>,
) -> Result<Vec<T>, CsvDataError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| CsvDataError::InvalidFormat {
            file: file.to_string(),
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(file, &headers, required_headers)?;

    let mut rows: Vec<T> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row_number: usize = idx + 1;
        let record: StringRecord = result.map_err(|e| CsvDataError::InvalidFormat {
            file: file.to_string(),
            reason: format!("Failed to parse row {row_number}: {e}"),
        })?;
        let row: CsvRow<'_> = CsvRow {
            record: &record,
            header_map: &header_map,
        };
        let parsed: T = parse_row(&row).map_err(|errors| CsvDataError::InvalidRow {
            file: file.to_string(),
            row_number,
            errors,
        })?;
        rows.push(parsed);
    }

    Ok(rows)
}

/// Parses the contents of `facilities.csv`.
///
/// # Errors
///
/// Returns an error if a header is missing or a row is invalid.
pub fn parse_facilities(content: &str) -> Result<Vec<Facility>, CsvDataError> {
    read_rows(FACILITIES_FILE, content, FACILITY_HEADERS, |row| {
        let mut errors: Vec<String> = Vec::new();
        let facility_id: String = row.required("facility_id", &mut errors);
        let name: String = row.required("name", &mut errors);
        let facility_type: Option<FacilityType> = match row.get("facility_type") {
            Some(code) => match code.parse::<FacilityType>() {
                Ok(facility_type) => Some(facility_type),
                Err(e) => {
                    errors.push(format!("facility_type: {e}"));
                    None
                }
            },
            None => {
                errors.push(String::from(
                    "facility_type: required field is missing or empty",
                ));
                None
            }
        };

        match facility_type {
            Some(facility_type) if errors.is_empty() => {
                Ok(Facility::new(&facility_id, &name, facility_type))
            }
            _ => Err(errors),
        }
    })
}

/// Parses the contents of `workers.csv` into `(facility_id, worker)` pairs.
///
/// # Errors
///
/// Returns an error if a header is missing or a row is invalid.
pub fn parse_workers(content: &str) -> Result<Vec<(String, Worker)>, CsvDataError> {
    read_rows(WORKERS_FILE, content, WORKER_HEADERS, |row| {
        let mut errors: Vec<String> = Vec::new();
        let worker_id: String = row.required("worker_id", &mut errors);
        let name: String = row.required("name", &mut errors);
        let facility_id: String = row.required("facility_id", &mut errors);
        let category: String = row.required("category", &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok((facility_id, Worker::new(&worker_id, &name, &category)))
    })
}

/// Parses the contents of `field_values.csv`.
///
/// Values must be finite numbers.
///
/// # Errors
///
/// Returns an error if a header is missing or a row is invalid.
pub fn parse_field_values(content: &str) -> Result<Vec<FieldValueRow>, CsvDataError> {
    read_rows(FIELD_VALUES_FILE, content, FIELD_VALUE_HEADERS, |row| {
        let mut errors: Vec<String> = Vec::new();
        let facility_id: String = row.required("facility_id", &mut errors);
        let field_code: String = row.required("field_code", &mut errors);

        let report_month: Option<ReportMonth> = match row.get("report_month") {
            Some(month) => match month.parse::<ReportMonth>() {
                Ok(report_month) => Some(report_month),
                Err(e) => {
                    errors.push(format!("report_month: {e}"));
                    None
                }
            },
            None => {
                errors.push(String::from(
                    "report_month: required field is missing or empty",
                ));
                None
            }
        };

        let value: Option<f64> = match row.get("value") {
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Some(value),
                _ => {
                    errors.push(format!("value: invalid number '{raw}'"));
                    None
                }
            },
            None => {
                errors.push(String::from("value: required field is missing or empty"));
                None
            }
        };

        match (report_month, value) {
            (Some(report_month), Some(value)) if errors.is_empty() => Ok(FieldValueRow {
                facility_id,
                report_month,
                field_code,
                value,
            }),
            _ => Err(errors),
        }
    })
}

fn read_file(dir: &Path, file: &str) -> Result<Option<String>, CsvDataError> {
    let path: PathBuf = dir.join(file);
    if !path.exists() {
        warn!(path = %path.display(), "Data file not found; treating as empty");
        return Ok(None);
    }
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|source| CsvDataError::Io {
            file: path.display().to_string(),
            source,
        })
}

/// Loads a data directory into an in-memory facility data source.
///
/// # Arguments
///
/// * `dir` - The directory holding the CSV files
///
/// # Errors
///
/// Returns an error if a file cannot be read or contains an invalid row.
pub fn load_facility_data(dir: &Path) -> Result<InMemoryFacilityData, CsvDataError> {
    let mut data: InMemoryFacilityData = InMemoryFacilityData::new();

    let facilities: Vec<Facility> = match read_file(dir, FACILITIES_FILE)? {
        Some(content) => parse_facilities(&content)?,
        None => Vec::new(),
    };
    let workers: Vec<(String, Worker)> = match read_file(dir, WORKERS_FILE)? {
        Some(content) => parse_workers(&content)?,
        None => Vec::new(),
    };
    let field_values: Vec<FieldValueRow> = match read_file(dir, FIELD_VALUES_FILE)? {
        Some(content) => parse_field_values(&content)?,
        None => Vec::new(),
    };

    info!(
        dir = %dir.display(),
        facilities = facilities.len(),
        workers = workers.len(),
        field_values = field_values.len(),
        "Loaded facility data"
    );

    for facility in facilities {
        data.add_facility(facility);
    }
    for (facility_id, worker) in workers {
        data.add_worker(&facility_id, worker);
    }
    for row in field_values {
        data.set_field_value(&row.facility_id, row.report_month, &row.field_code, row.value);
    }

    Ok(data)
}

/// A [`FacilityDataSource`] backed by a CSV data directory.
///
/// The directory is loaded on the first lookup and kept for the life of the
/// value. A load failure is reported as [`EngineError::DataSource`] and the
/// next lookup tries again.
#[derive(Debug)]
pub struct CsvDataDirectory {
    dir: PathBuf,
    loaded: OnceCell<InMemoryFacilityData>,
}

impl CsvDataDirectory {
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            loaded: OnceCell::new(),
        }
    }

    fn data(&self) -> Result<&InMemoryFacilityData, EngineError> {
        if let Some(data) = self.loaded.get() {
            return Ok(data);
        }
        let data: InMemoryFacilityData = load_facility_data(&self.dir).map_err(|e| {
            EngineError::DataSource(format!("{}: {e}", self.dir.display()))
        })?;
        Ok(self.loaded.get_or_init(|| data))
    }
}

impl FacilityDataSource for CsvDataDirectory {
    fn facility(&self, facility_id: &str) -> Result<Option<Facility>, EngineError> {
        self.data()?.facility(facility_id)
    }

    fn field_values(
        &self,
        facility_id: &str,
        report_month: ReportMonth,
    ) -> Result<BTreeMap<String, f64>, EngineError> {
        self.data()?.field_values(facility_id, report_month)
    }

    fn workers(&self, facility_id: &str) -> Result<Vec<Worker>, EngineError> {
        self.data()?.workers(facility_id)
    }

    fn facilities_with_data(&self, report_month: ReportMonth) -> Result<Vec<String>, EngineError> {
        self.data()?.facilities_with_data(report_month)
    }
}
