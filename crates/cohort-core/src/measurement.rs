//! Measurement reconciliation.
//!
//! A measurement load first reconciles the subjects projected out of the
//! batch, then resolves every referenced variable against the metadata
//! dictionary, validates each value against its variable's declared type,
//! options, and range, and finally inserts the rows whose natural key is
//! not already present. Everything runs in one transaction.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use cohort_model::{
    DataType, MeasurementKey, NewMeasurement, Table, VariableDetails, format_variable_name,
    template,
};
use cohort_store::{Store, StoreError};
use cohort_validate::{MeasurementRow, ValidatedMeasurements, pattern, validate_subjects};

use crate::deid::apply_deidentification;
use crate::error::{ReconcileError, Result};
use crate::subject::insert_subjects;
use crate::summary::MeasurementSummary;

/// Reconcile a validated measurement batch against the store. The
/// batch's dataset and every referenced variable must already be present;
/// subjects are created on the fly from the batch's own subject columns.
pub fn load_measurements(
    store: &Store,
    batch: &ValidatedMeasurements,
) -> Result<MeasurementSummary> {
    store.in_transaction(|store| {
        let dataset_name = batch.dataset_name();
        let mut summary = MeasurementSummary {
            dataset_name: dataset_name.to_string(),
            rows_total: batch.rows().len(),
            ..MeasurementSummary::default()
        };

        let (existing, new_rows) = partition_subject_rows(store, dataset_name, batch)?;
        summary.subjects_existing = existing;
        if !new_rows.is_empty() {
            info!(
                dataset = %dataset_name,
                new = new_rows.len(),
                existing,
                "inserting subjects projected from the batch"
            );
            let projection = subject_projection(new_rows)?;
            summary.subjects_inserted = insert_subjects(store, &projection)?;
        }

        let subject_ids = resolve_subjects(store, dataset_name, batch)?;
        let details_by_variable = resolve_variables(store, batch)?;

        let mut new_measurements: Vec<NewMeasurement> = Vec::new();
        let mut batch_keys: Vec<MeasurementKey> = Vec::new();
        for row in batch.rows() {
            let details = &details_by_variable[row.variable_name.as_str()];
            if let Some(value) = row.value.as_deref() {
                check_value(value, details)?;
            }
            check_lifespan(row)?;

            // An unmeasured visit grouping falls back to the variable's
            // declared visit.
            let visit_grouping = row
                .visit_grouping
                .clone()
                .or_else(|| details.associated_visit.clone());

            let key = MeasurementKey {
                dataset_name: dataset_name.to_string(),
                subject_identifier: row.subject_identifier.clone(),
                variable_name: details.variable_name.clone(),
                measurement_date: row.measurement_date.clone(),
                measurement_time: row.measurement_time.clone(),
                visit_grouping: visit_grouping.clone(),
            };
            if batch_keys.contains(&key) || store.measurement_exists(&key)? {
                debug!(
                    subject = %row.subject_identifier,
                    variable = %details.variable_name,
                    "measurement already present; skipping"
                );
                summary.measurements_duplicate += 1;
                continue;
            }
            batch_keys.push(key);

            new_measurements.push(NewMeasurement {
                subject_id: subject_ids[row.subject_identifier.as_str()],
                variable_id: details.variable_id,
                measurement_date: row.measurement_date.clone(),
                measurement_time: row.measurement_time.clone(),
                visit_grouping,
                value: row.value.clone(),
                value_deid: apply_deidentification(row.value.as_deref(), details),
            });
        }

        if !new_measurements.is_empty() {
            summary.measurements_inserted = new_measurements.len();
            store.insert_measurements(&new_measurements)?;
        }
        info!(
            dataset = %dataset_name,
            inserted = summary.measurements_inserted,
            duplicate = summary.measurements_duplicate,
            "measurement load complete"
        );
        Ok(summary)
    })
}

/// Split the batch's distinct subject projection into the count of
/// already-present subjects and the template-shaped rows still to insert.
fn partition_subject_rows(
    store: &Store,
    dataset_name: &str,
    batch: &ValidatedMeasurements,
) -> Result<(usize, Vec<Vec<Option<String>>>)> {
    let mut distinct: Vec<Vec<Option<String>>> = Vec::new();
    for row in batch.rows() {
        let cells = vec![
            Some(dataset_name.to_string()),
            Some(row.subject_identifier.clone()),
            row.gender.map(|g| g.as_str().to_string()),
            row.date_of_birth.clone(),
            row.date_of_death.clone(),
            row.ethnicity.clone(),
        ];
        if !distinct.contains(&cells) {
            distinct.push(cells);
        }
    }

    let mut existing: BTreeSet<String> = BTreeSet::new();
    let mut new_rows: Vec<Vec<Option<String>>> = Vec::new();
    for cells in distinct {
        // Column 1 of the subject template is subject_identifier.
        let identifier = cells[1].clone().unwrap_or_default();
        if store.subject_exists(dataset_name, &identifier)? {
            existing.insert(identifier);
        } else {
            new_rows.push(cells);
        }
    }
    Ok((existing.len(), new_rows))
}

/// Wrap template-shaped subject rows as a validated batch. Subject-level
/// rules the measurement validator does not apply (birth before death)
/// are enforced here.
fn subject_projection(
    rows: Vec<Vec<Option<String>>>,
) -> Result<cohort_validate::ValidatedSubjects> {
    let table = Table::new(
        template::SUBJECT_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows,
    );
    Ok(validate_subjects(&table)?)
}

/// Map every distinct subject identifier in the batch to its stored id.
/// All of them were just reconciled, so failing to resolve one means the
/// insert silently did not take.
fn resolve_subjects<'a>(
    store: &Store,
    dataset_name: &str,
    batch: &'a ValidatedMeasurements,
) -> Result<BTreeMap<&'a str, i64>> {
    let mut ids = BTreeMap::new();
    for row in batch.rows() {
        let identifier = row.subject_identifier.as_str();
        if ids.contains_key(identifier) {
            continue;
        }
        let id = store
            .subject_id(dataset_name, identifier)
            .map_err(|error| match error {
                StoreError::NotFound { .. } => ReconcileError::SubjectVanished {
                    subject: identifier.to_string(),
                },
                other => ReconcileError::Store(other),
            })?;
        ids.insert(identifier, id);
    }
    Ok(ids)
}

/// Resolve every distinct raw variable name to its dictionary entry,
/// bulk-fetched in one query. A name missing from the dictionary fails
/// the whole batch before anything is written.
fn resolve_variables<'a>(
    store: &Store,
    batch: &'a ValidatedMeasurements,
) -> Result<BTreeMap<&'a str, VariableDetails>> {
    let mut variable_ids: BTreeMap<&str, i64> = BTreeMap::new();
    for row in batch.rows() {
        let raw_name = row.variable_name.as_str();
        if variable_ids.contains_key(raw_name) {
            continue;
        }
        let formatted = format_variable_name(batch.dataset_name(), raw_name);
        let id = store.variable_id(&formatted).map_err(|error| match error {
            StoreError::NotFound { .. } => ReconcileError::UnknownVariable {
                variable: formatted.clone(),
            },
            other => ReconcileError::Store(other),
        })?;
        variable_ids.insert(raw_name, id);
    }

    let ids: Vec<i64> = variable_ids.values().copied().collect();
    let details = store.variable_details(&ids)?;
    let mut by_id: BTreeMap<i64, VariableDetails> = details
        .into_iter()
        .map(|d| (d.variable_id, d))
        .collect();
    let mut by_name = BTreeMap::new();
    for (raw_name, id) in variable_ids {
        let detail = by_id.remove(&id).ok_or(StoreError::NotFound {
            entity: "variable",
            key: format!("id {id}"),
        })?;
        by_name.insert(raw_name, detail);
    }
    Ok(by_name)
}

/// Check a measurement value against its variable's declared type,
/// option list, and range bounds.
fn check_value(value: &str, details: &VariableDetails) -> Result<()> {
    let invalid = |reason: &str| ReconcileError::InvalidValue {
        variable: details.variable_name.clone(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    match details.data_type {
        DataType::Str => {}
        DataType::Int => {
            value
                .parse::<i64>()
                .map_err(|_| invalid("not an integer"))?;
        }
        DataType::Float => {
            value.parse::<f64>().map_err(|_| invalid("not a number"))?;
        }
        DataType::Boolean => {
            if !matches!(value.to_lowercase().as_str(), "true" | "false" | "0" | "1") {
                return Err(invalid("not a boolean (true/false/0/1)"));
            }
        }
        DataType::Date => {
            if !pattern::is_template_date(value) {
                return Err(invalid("not formatted as YYYY-MM-DD"));
            }
        }
        DataType::Time => {
            if !pattern::is_template_time(value) {
                return Err(invalid("not formatted as HH:MM:SS on a 24-hour clock"));
            }
        }
    }
    if details.has_options && !details.options.iter().any(|option| option == value) {
        return Err(ReconcileError::UnknownOption {
            variable: details.variable_name.clone(),
            value: value.to_string(),
        });
    }
    if details.data_type.is_numeric()
        && let Ok(number) = value.parse::<f64>()
    {
        let below = details.range_min.is_some_and(|min| number < min);
        let above = details.range_max.is_some_and(|max| number > max);
        if below || above {
            return Err(ReconcileError::OutOfRange {
                variable: details.variable_name.clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// A dated measurement must fall within the subject's lifespan when the
/// batch carries birth or death dates. Fixed-format dates order
/// lexicographically; both bounds are inclusive.
fn check_lifespan(row: &MeasurementRow) -> Result<()> {
    let Some(date) = &row.measurement_date else {
        return Ok(());
    };
    let too_early = row.date_of_birth.as_ref().is_some_and(|dob| date < dob);
    let too_late = row.date_of_death.as_ref().is_some_and(|dod| date > dod);
    if too_early || too_late {
        return Err(ReconcileError::OutsideLifespan {
            subject: row.subject_identifier.clone(),
            date: date.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(data_type: DataType) -> VariableDetails {
        VariableDetails {
            variable_id: 1,
            variable_name: "STUDY1_x".to_string(),
            data_type,
            associated_visit: None,
            has_options: false,
            range_min: None,
            range_max: None,
            deidentification_required: false,
            deidentification_method: None,
            options: Vec::new(),
        }
    }

    #[test]
    fn int_values_checked() {
        assert!(check_value("42", &details(DataType::Int)).is_ok());
        assert!(check_value("-7", &details(DataType::Int)).is_ok());
        assert!(matches!(
            check_value("4.2", &details(DataType::Int)),
            Err(ReconcileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn boolean_domain() {
        for ok in ["true", "False", "0", "1"] {
            assert!(check_value(ok, &details(DataType::Boolean)).is_ok());
        }
        assert!(check_value("yes", &details(DataType::Boolean)).is_err());
    }

    #[test]
    fn option_membership_enforced() {
        let mut smoker = details(DataType::Str);
        smoker.has_options = true;
        smoker.options = vec!["yes".to_string(), "no".to_string()];
        assert!(check_value("yes", &smoker).is_ok());
        assert!(matches!(
            check_value("maybe", &smoker),
            Err(ReconcileError::UnknownOption { .. })
        ));
    }

    #[test]
    fn range_bounds_inclusive() {
        let mut weight = details(DataType::Float);
        weight.range_min = Some(0.0);
        weight.range_max = Some(400.0);
        assert!(check_value("400", &weight).is_ok());
        assert!(check_value("0", &weight).is_ok());
        assert!(matches!(
            check_value("400.5", &weight),
            Err(ReconcileError::OutOfRange { .. })
        ));
    }

    #[test]
    fn lifespan_bounds_inclusive() {
        let row = MeasurementRow {
            subject_identifier: "S001".to_string(),
            gender: None,
            date_of_birth: Some("1980-05-12".to_string()),
            date_of_death: Some("2020-01-01".to_string()),
            ethnicity: None,
            variable_name: "hr".to_string(),
            measurement_date: Some("1980-05-12".to_string()),
            measurement_time: None,
            visit_grouping: None,
            value: None,
        };
        assert!(check_lifespan(&row).is_ok());

        let before_birth = MeasurementRow {
            measurement_date: Some("1980-05-11".to_string()),
            ..row.clone()
        };
        assert!(matches!(
            check_lifespan(&before_birth),
            Err(ReconcileError::OutsideLifespan { .. })
        ));

        let after_death = MeasurementRow {
            measurement_date: Some("2020-01-02".to_string()),
            ..row
        };
        assert!(check_lifespan(&after_death).is_err());
    }
}
