//! Checks shared by every validator.

use cohort_model::{Table, canonical_dataset_name, template};

use crate::error::{Result, ValidationError};

pub(crate) fn check_template(
    table: &Table,
    name: &'static str,
    columns: &[&str],
) -> Result<()> {
    if template::columns_match(table.headers(), columns) {
        Ok(())
    } else {
        Err(ValidationError::SchemaMismatch {
            template: name,
            expected: columns.iter().map(|c| c.to_string()).collect(),
            found: table.headers().to_vec(),
        })
    }
}

pub(crate) fn check_duplicates(table: &Table) -> Result<()> {
    if table.has_duplicate_rows() {
        Err(ValidationError::DuplicateRows)
    } else {
        Ok(())
    }
}

pub(crate) fn check_blanks(table: &Table) -> Result<()> {
    match table.find_blank_cell() {
        Some((row, column)) => Err(ValidationError::BlankCell {
            column: column.to_string(),
            row,
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_populated(table: &Table, column: &'static str) -> Result<()> {
    for row in table.iter_rows() {
        if row.get(column).is_none() {
            return Err(ValidationError::MissingValue { column });
        }
    }
    Ok(())
}

/// The batch's single dataset name, canonicalized. Whitespace inside a
/// name is rejected before normalization.
pub(crate) fn single_dataset_name(table: &Table) -> Result<String> {
    for raw in table.distinct_values("dataset_name") {
        if raw.chars().any(char::is_whitespace) {
            return Err(ValidationError::DatasetNameWhitespace(raw.to_string()));
        }
    }
    let mut names: Vec<String> = table
        .distinct_values("dataset_name")
        .into_iter()
        .map(canonical_dataset_name)
        .collect();
    names.sort();
    names.dedup();
    if names.len() == 1 {
        Ok(names.remove(0))
    } else {
        Err(ValidationError::DatasetNotSingular(names))
    }
}
