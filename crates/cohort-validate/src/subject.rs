//! Subject batch validation.
//!
//! Subject batches are usually built from the distinct-subject projection
//! of a measurement file, but the checks re-run regardless of origin: the
//! subject insert contract accepts only the validated form.

use cohort_model::{Table, template};

use crate::batch::{SubjectRow, ValidatedSubjects};
use crate::common;
use crate::error::{Result, ValidationError};
use crate::measurement::{check_date_field, parse_gender};

pub fn validate_subjects(table: &Table) -> Result<ValidatedSubjects> {
    common::check_template(table, "subject", template::SUBJECT_COLUMNS)?;
    common::check_duplicates(table)?;
    common::check_blanks(table)?;
    common::check_populated(table, "dataset_name")?;
    common::check_populated(table, "subject_identifier")?;
    let dataset_name = common::single_dataset_name(table)?;

    let mut rows = Vec::with_capacity(table.height());
    for row in table.iter_rows() {
        let gender = parse_gender(&row)?;
        check_date_field(&row, "date_of_birth")?;
        check_date_field(&row, "date_of_death")?;

        let subject_identifier = row.get("subject_identifier").unwrap_or_default().to_string();
        let date_of_birth = row.get("date_of_birth").map(str::to_string);
        let date_of_death = row.get("date_of_death").map(str::to_string);
        // Fixed-format dates order lexicographically.
        if let (Some(dob), Some(dod)) = (&date_of_birth, &date_of_death)
            && dob > dod
        {
            return Err(ValidationError::BirthAfterDeath {
                subject: subject_identifier,
            });
        }

        rows.push(SubjectRow {
            subject_identifier,
            gender,
            date_of_birth,
            date_of_death,
            ethnicity: row.get("ethnicity").map(str::to_string),
        });
    }

    Ok(ValidatedSubjects::new(dataset_name, rows))
}
