//! End-to-end reconciliation tests against an in-memory store.

use std::collections::BTreeMap;

use cohort_core::{
    AutoApprove, AutoDecline, ReconcileError, insert_subjects, load_dictionary,
    load_measurements,
};
use cohort_model::{Table, template};
use cohort_store::Store;
use cohort_validate::{
    ValidatedDictionary, ValidatedMeasurements, validate_dictionary, validate_measurements,
    validate_subjects,
};

fn dictionary_headers() -> Vec<String> {
    template::DICTIONARY_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn dictionary_cells(values: &BTreeMap<&str, &str>) -> Vec<Option<String>> {
    template::DICTIONARY_COLUMNS
        .iter()
        .map(|col| values.get(col).map(|v| v.to_string()))
        .collect()
}

fn variable_row(name: &str, data_type: &str) -> BTreeMap<&'static str, String> {
    let mut row: BTreeMap<&'static str, String> = BTreeMap::new();
    row.insert("dataset_name", "STUDY1".to_string());
    row.insert("variable_name", name.to_string());
    row.insert("data_type", data_type.to_string());
    row.insert("has_options", "0".to_string());
    row.insert("deidentification_required", "0".to_string());
    row.insert("variable_source", "ORIGINAL".to_string());
    row
}

fn study1_dictionary() -> ValidatedDictionary {
    let mut hr = variable_row("hr", "int");
    hr.insert("category_level_1", "VITALS".to_string());
    hr.insert("range_min", "20".to_string());
    hr.insert("range_max", "250".to_string());

    let mut smoker_yes = variable_row("smoker", "str");
    smoker_yes.insert("has_options", "1".to_string());
    smoker_yes.insert("option_name", "yes".to_string());
    smoker_yes.insert("option_description", "current smoker".to_string());
    let mut smoker_no = smoker_yes.clone();
    smoker_no.insert("option_name", "no".to_string());
    smoker_no.insert("option_description", "non-smoker".to_string());

    let mut visit_hr = variable_row("vhr", "int");
    visit_hr.insert("associated_visit", "baseline".to_string());

    let rows = [hr, smoker_yes, smoker_no, visit_hr]
        .iter()
        .map(|row| {
            let borrowed: BTreeMap<&str, &str> =
                row.iter().map(|(k, v)| (*k, v.as_str())).collect();
            dictionary_cells(&borrowed)
        })
        .collect();
    validate_dictionary(&Table::new(dictionary_headers(), rows)).unwrap()
}

fn measurement_headers() -> Vec<String> {
    template::MEASUREMENT_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn measurement_cells(
    subject: &str,
    dob: Option<&str>,
    variable: &str,
    date: Option<&str>,
    visit: Option<&str>,
    value: Option<&str>,
) -> Vec<Option<String>> {
    vec![
        Some("STUDY1".to_string()),
        Some(subject.to_string()),
        Some("F".to_string()),
        dob.map(str::to_string),
        None,
        None,
        Some(variable.to_string()),
        date.map(str::to_string),
        None,
        visit.map(str::to_string),
        value.map(str::to_string),
    ]
}

fn measurements(rows: Vec<Vec<Option<String>>>) -> ValidatedMeasurements {
    validate_measurements(&Table::new(measurement_headers(), rows)).unwrap()
}

#[test]
fn dictionary_load_creates_dataset_annotations_variables_options() {
    let store = Store::open_in_memory().unwrap();
    let summary = load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();

    assert!(summary.dataset_created);
    assert_eq!(summary.annotations_inserted, 1);
    assert_eq!(summary.variables_inserted, 3);
    assert_eq!(summary.options_inserted, 2);

    assert!(store.dataset_exists("STUDY1").unwrap());
    assert!(store.variable_exists("STUDY1_hr").unwrap());
    assert!(store.variable_exists("STUDY1_smoker").unwrap());
    let smoker = store.variable_id("STUDY1_smoker").unwrap();
    assert!(store.option_exists(smoker, "yes").unwrap());
    assert!(store.option_exists(smoker, "no").unwrap());
}

#[test]
fn dictionary_reload_inserts_nothing() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();
    let second = load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();

    assert!(!second.dataset_created);
    assert_eq!(second.annotations_inserted, 0);
    assert_eq!(second.annotations_existing, 1);
    assert_eq!(second.variables_inserted, 0);
    assert_eq!(second.variables_existing, 3);
    assert_eq!(second.options_inserted, 0);
    assert_eq!(second.options_existing, 2);
}

#[test]
fn declined_dictionary_load_commits_nothing() {
    let store = Store::open_in_memory().unwrap();
    let result = load_dictionary(&store, &study1_dictionary(), &mut AutoDecline);
    assert!(matches!(result, Err(ReconcileError::UserAbort)));
    assert!(!store.dataset_exists("STUDY1").unwrap());
}

#[test]
fn measurement_load_creates_subjects_and_measurements() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();

    let batch = measurements(vec![
        measurement_cells("S001", Some("1980-05-12"), "hr", Some("2023-04-01"), None, Some("72")),
        measurement_cells("S001", Some("1980-05-12"), "smoker", None, None, Some("no")),
        measurement_cells("S002", None, "hr", Some("2023-04-02"), None, Some("80")),
    ]);
    let summary = load_measurements(&store, &batch).unwrap();

    assert_eq!(summary.rows_total, 3);
    assert_eq!(summary.subjects_inserted, 2);
    assert_eq!(summary.measurements_inserted, 3);
    assert_eq!(summary.measurements_duplicate, 0);
    assert!(store.subject_exists("STUDY1", "S001").unwrap());
    assert!(store.subject_exists("STUDY1", "S002").unwrap());
}

#[test]
fn measurement_reload_skips_everything() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();
    let batch = measurements(vec![
        measurement_cells("S001", None, "hr", Some("2023-04-01"), None, Some("72")),
        measurement_cells("S002", None, "hr", Some("2023-04-02"), None, Some("80")),
    ]);
    load_measurements(&store, &batch).unwrap();
    let second = load_measurements(&store, &batch).unwrap();

    assert_eq!(second.subjects_inserted, 0);
    assert_eq!(second.subjects_existing, 2);
    assert_eq!(second.measurements_inserted, 0);
    assert_eq!(second.measurements_duplicate, 2);
}

#[test]
fn unknown_variable_rolls_back_subjects() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();
    let batch = measurements(vec![measurement_cells(
        "S001",
        None,
        "undeclared",
        None,
        None,
        Some("1"),
    )]);
    let result = load_measurements(&store, &batch);
    assert!(matches!(
        result,
        Err(ReconcileError::UnknownVariable { variable }) if variable == "STUDY1_undeclared"
    ));
    // The subject insert from the same load must not survive the failure.
    assert!(!store.subject_exists("STUDY1", "S001").unwrap());
}

#[test]
fn out_of_range_value_fails_batch() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();
    let batch = measurements(vec![measurement_cells(
        "S001",
        None,
        "hr",
        Some("2023-04-01"),
        None,
        Some("500"),
    )]);
    assert!(matches!(
        load_measurements(&store, &batch),
        Err(ReconcileError::OutOfRange { .. })
    ));
}

#[test]
fn undeclared_option_value_fails_batch() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();
    let batch = measurements(vec![measurement_cells(
        "S001",
        None,
        "smoker",
        None,
        None,
        Some("sometimes"),
    )]);
    assert!(matches!(
        load_measurements(&store, &batch),
        Err(ReconcileError::UnknownOption { .. })
    ));
}

#[test]
fn measurement_before_birth_fails_batch() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();
    let batch = measurements(vec![measurement_cells(
        "S001",
        Some("1980-05-12"),
        "hr",
        Some("1979-12-31"),
        None,
        Some("72"),
    )]);
    assert!(matches!(
        load_measurements(&store, &batch),
        Err(ReconcileError::OutsideLifespan { .. })
    ));
}

#[test]
fn visit_grouping_inherited_from_variable() {
    let store = Store::open_in_memory().unwrap();
    load_dictionary(&store, &study1_dictionary(), &mut AutoApprove).unwrap();

    // `vhr` declares associated_visit "baseline"; a row without an
    // explicit visit inherits it.
    let implicit = measurements(vec![measurement_cells(
        "S001",
        None,
        "vhr",
        Some("2023-04-01"),
        None,
        Some("72"),
    )]);
    load_measurements(&store, &implicit).unwrap();

    let explicit = measurements(vec![measurement_cells(
        "S001",
        None,
        "vhr",
        Some("2023-04-01"),
        Some("baseline"),
        Some("72"),
    )]);
    let second = load_measurements(&store, &explicit).unwrap();
    assert_eq!(second.measurements_duplicate, 1);
    assert_eq!(second.measurements_inserted, 0);
}

#[test]
fn subject_insert_is_insert_only() {
    let store = Store::open_in_memory().unwrap();
    store.insert_dataset("STUDY1").unwrap();
    let table = Table::new(
        template::SUBJECT_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect(),
        vec![vec![
            Some("STUDY1".to_string()),
            Some("S001".to_string()),
            Some("F".to_string()),
            Some("1980-05-12".to_string()),
            None,
            None,
        ]],
    );
    let batch = validate_subjects(&table).unwrap();

    assert_eq!(insert_subjects(&store, &batch).unwrap(), 1);
    assert!(matches!(
        insert_subjects(&store, &batch),
        Err(ReconcileError::SubjectAlreadyPresent { subject }) if subject == "S001"
    ));
}

#[test]
fn anon_date_on_text_variable_does_not_reject_short_values() {
    let store = Store::open_in_memory().unwrap();
    // A text variable may still declare ANON_DATE; its values are free
    // text, so the transform has to cope with non-date input.
    let mut note = variable_row("note", "str");
    note.insert("deidentification_required", "1".to_string());
    note.insert("deidentification_method", "ANON_DATE".to_string());
    let borrowed: BTreeMap<&str, &str> = note.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let dictionary = validate_dictionary(&Table::new(
        dictionary_headers(),
        vec![dictionary_cells(&borrowed)],
    ))
    .unwrap();
    load_dictionary(&store, &dictionary, &mut AutoApprove).unwrap();

    let batch = measurements(vec![measurement_cells(
        "S001",
        None,
        "note",
        None,
        None,
        Some("ab"),
    )]);
    let summary = load_measurements(&store, &batch).unwrap();
    assert_eq!(summary.measurements_inserted, 1);
}
