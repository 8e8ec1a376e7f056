// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pbi_domain::{Facility, ReportMonth, Worker};
use pbi_engine::{
    EngineError, FacilityDataSource, HistoricalRemunerationCalculation, InMemoryFacilityData,
    get_facility_remuneration,
};
use pbi_persistence::Persistence;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::csv_data::{
    CsvDataDirectory, CsvDataError, FACILITIES_FILE, FIELD_VALUES_FILE, FieldValueRow, WORKERS_FILE,
    load_facility_data, parse_facilities, parse_field_values, parse_workers,
};
use crate::tests::create_temp_dir;

#[test]
fn test_facility_headers_are_normalized() {
    let csv: &str = "Facility ID, Name ,FACILITY TYPE\nF-1,Alpha PHC,phc\n";

    let facilities: Vec<Facility> = parse_facilities(csv).unwrap();

    assert_eq!(facilities.len(), 1);
    assert_eq!(facilities[0].facility_id, "F-1");
    assert_eq!(facilities[0].name, "Alpha PHC");
    assert_eq!(facilities[0].facility_type.code(), "PHC");
}

#[test]
fn test_missing_headers_are_reported() {
    let csv: &str = "facility_id,name\nF-1,Alpha PHC\n";

    let result: Result<Vec<Facility>, CsvDataError> = parse_facilities(csv);

    match result {
        Err(CsvDataError::InvalidFormat { file, reason }) => {
            assert_eq!(file, FACILITIES_FILE);
            assert_eq!(reason, "Missing required headers: facility_type");
        }
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

#[test]
fn test_invalid_facility_type_names_the_row() {
    let csv: &str = "facility_id,name,facility_type\nF-1,Alpha,PHC\nF-2,Beta,P HC\n";

    let result: Result<Vec<Facility>, CsvDataError> = parse_facilities(csv);

    match result {
        Err(CsvDataError::InvalidRow {
            row_number, errors, ..
        }) => {
            assert_eq!(row_number, 2);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("facility_type:"));
        }
        other => panic!("expected InvalidRow, got {other:?}"),
    }
}

#[test]
fn test_workers_collect_every_missing_field() {
    let csv: &str = "worker_id,name,facility_id,category\n,Asha,,ANM\n";

    let result: Result<Vec<(String, Worker)>, CsvDataError> = parse_workers(csv);

    match result {
        Err(CsvDataError::InvalidRow { file, errors, .. }) => {
            assert_eq!(file, WORKERS_FILE);
            assert_eq!(
                errors,
                vec![
                    "worker_id: required field is missing or empty",
                    "facility_id: required field is missing or empty",
                ]
            );
        }
        other => panic!("expected InvalidRow, got {other:?}"),
    }
}

#[test]
fn test_worker_categories_are_uppercased() {
    let csv: &str = "worker_id,name,facility_id,category\nW-1,Asha Devi,F-1,anm\n";

    let workers: Vec<(String, Worker)> = parse_workers(csv).unwrap();

    assert_eq!(workers[0].0, "F-1");
    assert_eq!(workers[0].1.category, "ANM");
}

#[test]
fn test_field_values_parse_numbers_and_months() {
    let csv: &str = "facility_id,report_month,field_code,value\n\
                     F-1,2026-01,anc_visits,40\n\
                     F-1,2026-01,footfall,300.5\n";

    let rows: Vec<FieldValueRow> = parse_field_values(csv).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].report_month, "2026-01".parse::<ReportMonth>().unwrap());
    assert!((rows[1].value - 300.5).abs() < f64::EPSILON);
}

#[test]
fn test_field_values_reject_bad_numbers_and_months() {
    let csv: &str = "facility_id,report_month,field_code,value\nF-1,2026-13,anc_visits,NaN\n";

    let result: Result<Vec<FieldValueRow>, CsvDataError> = parse_field_values(csv);

    match result {
        Err(CsvDataError::InvalidRow { file, errors, .. }) => {
            assert_eq!(file, FIELD_VALUES_FILE);
            assert_eq!(errors.len(), 2);
            assert!(errors[0].starts_with("report_month:"));
            assert_eq!(errors[1], "value: invalid number 'NaN'");
        }
        other => panic!("expected InvalidRow, got {other:?}"),
    }
}

#[test]
fn test_load_facility_data_from_directory() {
    let dir: PathBuf = create_temp_dir();
    std::fs::write(
        dir.join(FACILITIES_FILE),
        "facility_id,name,facility_type\nF-1,Alpha PHC,PHC\n",
    )
    .unwrap();
    std::fs::write(
        dir.join(WORKERS_FILE),
        "worker_id,name,facility_id,category\nW-1,Asha Devi,F-1,ANM\nW-2,Dr. Rao,F-1,MO\n",
    )
    .unwrap();
    std::fs::write(
        dir.join(FIELD_VALUES_FILE),
        "facility_id,report_month,field_code,value\nF-1,2026-01,anc_visits,40\nF-9,2026-01,anc_visits,5\n",
    )
    .unwrap();

    let data: InMemoryFacilityData = load_facility_data(&dir).unwrap();
    let january: ReportMonth = "2026-01".parse().unwrap();

    assert!(data.facility("F-1").unwrap().is_some());
    assert!(data.facility("F-9").unwrap().is_none());
    assert_eq!(data.workers("F-1").unwrap().len(), 2);
    let values: BTreeMap<String, f64> = data.field_values("F-1", january).unwrap();
    assert!((values["anc_visits"] - 40.0).abs() < f64::EPSILON);
    assert_eq!(
        data.facilities_with_data(january).unwrap(),
        vec![String::from("F-1"), String::from("F-9")]
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_files_read_as_empty() {
    let dir: PathBuf = create_temp_dir();

    let data: InMemoryFacilityData = load_facility_data(&dir).unwrap();

    assert!(data.facility("F-1").unwrap().is_none());
    assert!(
        data.facilities_with_data("2026-01".parse().unwrap())
            .unwrap()
            .is_empty()
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_data_directory_reports_invalid_files_as_source_failures() {
    let dir: PathBuf = create_temp_dir();
    std::fs::write(
        dir.join(FACILITIES_FILE),
        "facility_id,name,facility_type\nF-1,Alpha PHC,P HC\n",
    )
    .unwrap();
    let source: CsvDataDirectory = CsvDataDirectory::new(&dir);

    match source.facility("F-1") {
        Err(EngineError::DataSource(message)) => {
            assert!(message.contains("facilities.csv row 1"));
        }
        other => panic!("expected DataSource, got {other:?}"),
    }

    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let result: Result<HistoricalRemunerationCalculation, EngineError> = get_facility_remuneration(
        &mut persistence,
        &source,
        "F-1",
        "2026-01".parse().unwrap(),
        false,
    );
    assert!(matches!(result, Err(EngineError::DataSource(_))));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_data_directory_loads_on_first_lookup() {
    let dir: PathBuf = create_temp_dir();
    let source: CsvDataDirectory = CsvDataDirectory::new(&dir);
    std::fs::write(
        dir.join(FACILITIES_FILE),
        "facility_id,name,facility_type\nF-1,Alpha PHC,PHC\n",
    )
    .unwrap();

    assert!(source.facility("F-1").unwrap().is_some());

    // Later edits are not picked up once loaded
    std::fs::remove_file(dir.join(FACILITIES_FILE)).unwrap();
    assert!(source.facility("F-1").unwrap().is_some());
    assert!(source.workers("F-1").unwrap().is_empty());

    std::fs::remove_dir_all(&dir).unwrap();
}
