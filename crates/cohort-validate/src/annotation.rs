//! Annotation batch validation.

use cohort_model::{NewAnnotation, Table, template};

use crate::batch::ValidatedAnnotations;
use crate::common;
use crate::error::{Result, ValidationError};

/// Validate a two-column annotation batch. Categories are normalized to
/// trimmed upper-case before the duplicate check so case variants of the
/// same pair cannot slip through as distinct annotations.
pub fn validate_annotations(table: &Table) -> Result<ValidatedAnnotations> {
    common::check_template(table, "annotation", template::ANNOTATION_COLUMNS)?;
    common::check_blanks(table)?;
    common::check_populated(table, "category_level_1")?;

    let mut rows: Vec<NewAnnotation> = Vec::with_capacity(table.height());
    for row in table.iter_rows() {
        let level_1 = row
            .get("category_level_1")
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        let level_2 = row
            .get("category_level_2")
            .map(|v| v.trim().to_uppercase());
        if level_1.is_empty() && level_2.is_some() {
            return Err(ValidationError::OrphanCategoryLevel2 { row: row.index() });
        }
        let annotation = NewAnnotation {
            category_level_1: level_1,
            category_level_2: level_2,
        };
        if rows.contains(&annotation) {
            return Err(ValidationError::DuplicateRows);
        }
        rows.push(annotation);
    }

    Ok(ValidatedAnnotations::new(rows))
}
