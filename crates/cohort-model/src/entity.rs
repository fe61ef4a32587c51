//! Insert-row payloads and natural keys for the consolidated schema.
//!
//! All entities are insert-only. Surrogate `id` and `date_last_updated`
//! columns are assigned by the store and never appear in these payloads.

use serde::Serialize;

use crate::enums::{DataType, Gender, VariableSource};

/// Canonical form of a dataset name: trimmed and upper-cased.
///
/// Dataset names are case-normalized once at the validation boundary so
/// every downstream lookup and insert sees the same key.
pub fn canonical_dataset_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Globally-namespaced variable name: `<DATASET_NAME>_<raw_name>`.
///
/// The raw name keeps its case; only the dataset prefix is canonical.
pub fn format_variable_name(dataset_name: &str, raw_name: &str) -> String {
    format!("{}_{}", canonical_dataset_name(dataset_name), raw_name)
}

/// A new row for the `subjects` table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubject {
    pub dataset_id: i64,
    pub subject_identifier: String,
    pub subject_identifier_deid: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    pub ethnicity: Option<String>,
}

/// A new row for the `annotations` table.
///
/// `category_level_2` is stored as SQL NULL when absent; an empty string
/// is rejected upstream and never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NewAnnotation {
    pub category_level_1: String,
    pub category_level_2: Option<String>,
}

/// A new row for the `metadata_variables` table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariable {
    pub variable_name: String,
    pub dataset_id: i64,
    pub variable_description: Option<String>,
    pub data_type: DataType,
    pub unit: Option<String>,
    pub associated_visit: Option<String>,
    pub category_id: Option<i64>,
    pub has_options: bool,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub deidentification_required: bool,
    pub deidentification_method: Option<String>,
    pub variable_source: VariableSource,
}

/// A new row for the `metadata_variable_options` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOption {
    pub variable_id: i64,
    pub option_name: String,
    pub option_description: String,
}

/// A new row for the `measurements` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeasurement {
    pub subject_id: i64,
    pub variable_id: i64,
    pub measurement_date: Option<String>,
    pub measurement_time: Option<String>,
    pub visit_grouping: Option<String>,
    pub value: Option<String>,
    pub value_deid: Option<String>,
}

/// Natural key for measurement duplicate detection.
///
/// Subject, dataset, and variable always participate; each optional field
/// narrows the match only when non-null (a null field places no predicate
/// on the stored column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementKey {
    pub dataset_name: String,
    pub subject_identifier: String,
    /// Formatted (dataset-prefixed) variable name.
    pub variable_name: String,
    pub measurement_date: Option<String>,
    pub measurement_time: Option<String>,
    pub visit_grouping: Option<String>,
}

/// Full variable metadata needed to validate measurement values,
/// bulk-fetched in one query per batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDetails {
    pub variable_id: i64,
    pub variable_name: String,
    pub data_type: DataType,
    pub associated_visit: Option<String>,
    pub has_options: bool,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub deidentification_required: bool,
    pub deidentification_method: Option<String>,
    /// Declared option names; empty unless `has_options`.
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_name_is_canonicalized() {
        assert_eq!(canonical_dataset_name(" study1 "), "STUDY1");
        assert_eq!(canonical_dataset_name("STUDY1"), "STUDY1");
    }

    #[test]
    fn variable_name_keeps_raw_case() {
        assert_eq!(format_variable_name("study1", "hr"), "STUDY1_hr");
        assert_eq!(format_variable_name("STUDY1", "SysBP"), "STUDY1_SysBP");
    }
}
