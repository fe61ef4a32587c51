//! Measurement file validation.

use cohort_model::{Gender, RowView, Table, template};

use crate::batch::{MeasurementRow, ValidatedMeasurements};
use crate::common;
use crate::error::{Result, ValidationError};
use crate::pattern;

/// Validate a loaded measurement table against the measurement template
/// and its domain rules. Values are not checked here — value validation
/// is type-directed and needs each variable's dictionary entry, which
/// only the store knows.
pub fn validate_measurements(table: &Table) -> Result<ValidatedMeasurements> {
    common::check_template(table, "measurement", template::MEASUREMENT_COLUMNS)?;
    common::check_duplicates(table)?;
    common::check_blanks(table)?;
    common::check_populated(table, "dataset_name")?;
    common::check_populated(table, "subject_identifier")?;
    common::check_populated(table, "variable_name")?;
    let dataset_name = common::single_dataset_name(table)?;

    let mut rows = Vec::with_capacity(table.height());
    for row in table.iter_rows() {
        let gender = parse_gender(&row)?;
        for field in ["date_of_birth", "date_of_death", "measurement_date"] {
            check_date_field(&row, field)?;
        }
        check_time_field(&row, "measurement_time")?;

        rows.push(MeasurementRow {
            subject_identifier: required(&row, "subject_identifier"),
            gender,
            date_of_birth: optional(&row, "date_of_birth"),
            date_of_death: optional(&row, "date_of_death"),
            ethnicity: optional(&row, "ethnicity"),
            variable_name: required(&row, "variable_name"),
            measurement_date: optional(&row, "measurement_date"),
            measurement_time: optional(&row, "measurement_time"),
            visit_grouping: optional(&row, "visit_grouping"),
            value: optional(&row, "value"),
        });
    }

    Ok(ValidatedMeasurements::new(dataset_name, rows))
}

pub(crate) fn parse_gender(row: &RowView<'_>) -> Result<Option<Gender>> {
    match row.get("gender") {
        None => Ok(None),
        Some(value) => value
            .parse::<Gender>()
            .map(Some)
            .map_err(|reason| ValidationError::InvalidField {
                field: "gender",
                value: value.to_string(),
                row: row.index(),
                reason,
            }),
    }
}

pub(crate) fn check_date_field(row: &RowView<'_>, field: &'static str) -> Result<()> {
    if let Some(value) = row.get(field)
        && !pattern::is_template_date(value)
    {
        return Err(ValidationError::InvalidField {
            field,
            value: value.to_string(),
            row: row.index(),
            reason: "not formatted as YYYY-MM-DD".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_time_field(row: &RowView<'_>, field: &'static str) -> Result<()> {
    if let Some(value) = row.get(field)
        && !pattern::is_template_time(value)
    {
        return Err(ValidationError::InvalidField {
            field,
            value: value.to_string(),
            row: row.index(),
            reason: "not formatted as HH:MM:SS on a 24-hour clock".to_string(),
        });
    }
    Ok(())
}

// Population is checked before these run.
fn required(row: &RowView<'_>, column: &str) -> String {
    row.get(column).unwrap_or_default().to_string()
}

fn optional(row: &RowView<'_>, column: &str) -> Option<String> {
    row.get(column).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dataset: &str, subject: &str, variable: &str) -> Vec<Option<String>> {
        let mut cells = vec![None; template::MEASUREMENT_COLUMNS.len()];
        cells[0] = Some(dataset.to_string());
        cells[1] = Some(subject.to_string());
        cells[6] = Some(variable.to_string());
        cells
    }

    #[test]
    fn minimal_batch_validates() {
        let table = Table::new(
            template::MEASUREMENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![row("study1", "S001", "hr")],
        );
        let validated = validate_measurements(&table).unwrap();
        assert_eq!(validated.dataset_name(), "STUDY1");
        assert_eq!(validated.rows().len(), 1);
        assert_eq!(validated.rows()[0].variable_name, "hr");
    }

    #[test]
    fn wrong_columns_rejected() {
        let mut headers: Vec<String> = template::MEASUREMENT_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();
        headers.swap(0, 1);
        let table = Table::new(headers, Vec::new());
        assert!(matches!(
            validate_measurements(&table),
            Err(ValidationError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn bad_month_rejected() {
        let mut cells = row("STUDY1", "S001", "hr");
        cells[7] = Some("2023-13-01".to_string());
        let table = Table::new(
            template::MEASUREMENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![cells],
        );
        assert!(matches!(
            validate_measurements(&table),
            Err(ValidationError::InvalidField {
                field: "measurement_date",
                ..
            })
        ));
    }

    #[test]
    fn noncalendar_date_passes_pattern_check() {
        let mut cells = row("STUDY1", "S001", "hr");
        cells[3] = Some("2023-02-29".to_string());
        let table = Table::new(
            template::MEASUREMENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![cells],
        );
        assert!(validate_measurements(&table).is_ok());
    }

    #[test]
    fn gender_domain_enforced() {
        let mut cells = row("STUDY1", "S001", "hr");
        cells[2] = Some("X".to_string());
        let table = Table::new(
            template::MEASUREMENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![cells],
        );
        assert!(matches!(
            validate_measurements(&table),
            Err(ValidationError::InvalidField { field: "gender", .. })
        ));
    }

    #[test]
    fn two_datasets_rejected() {
        let table = Table::new(
            template::MEASUREMENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![row("STUDY1", "S001", "hr"), row("STUDY2", "S001", "hr")],
        );
        assert!(matches!(
            validate_measurements(&table),
            Err(ValidationError::DatasetNotSingular(_))
        ));
    }

    #[test]
    fn duplicate_rows_rejected() {
        let table = Table::new(
            template::MEASUREMENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![row("STUDY1", "S001", "hr"), row("STUDY1", "S001", "hr")],
        );
        assert!(matches!(
            validate_measurements(&table),
            Err(ValidationError::DuplicateRows)
        ));
    }
}
