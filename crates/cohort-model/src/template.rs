//! Fixed column contracts for the four input templates.
//!
//! Column set and order are part of the external contract: any mismatch
//! between a loaded file and its template is a hard validation failure,
//! checked before any store access.
//!
//! The subject template is a prefix of the measurement template so the
//! distinct-subject projection of a measurement batch is a column slice.

/// Measurement input template.
pub const MEASUREMENT_COLUMNS: &[&str] = &[
    "dataset_name",
    "subject_identifier",
    "gender",
    "date_of_birth",
    "date_of_death",
    "ethnicity",
    "variable_name",
    "measurement_date",
    "measurement_time",
    "visit_grouping",
    "value",
];

/// Variable-dictionary input template.
pub const DICTIONARY_COLUMNS: &[&str] = &[
    "dataset_name",
    "variable_name",
    "variable_description",
    "data_type",
    "unit",
    "category_level_1",
    "category_level_2",
    "associated_visit",
    "has_options",
    "option_name",
    "option_description",
    "range_min",
    "range_max",
    "deidentification_required",
    "deidentification_method",
    "variable_source",
];

/// Subject batch template.
pub const SUBJECT_COLUMNS: &[&str] = &[
    "dataset_name",
    "subject_identifier",
    "gender",
    "date_of_birth",
    "date_of_death",
    "ethnicity",
];

/// Annotation batch template.
pub const ANNOTATION_COLUMNS: &[&str] = &["category_level_1", "category_level_2"];

/// True when `headers` match `template` exactly, in set and order.
pub fn columns_match(headers: &[String], template: &[&str]) -> bool {
    headers.len() == template.len() && headers.iter().zip(template).all(|(h, t)| h == t)
}
