//! Validated batch types.
//!
//! The `Validated*` wrappers are capabilities: their constructors are
//! private to this crate, so the only way to obtain one is through the
//! corresponding validator. Insert entry points downstream are typed to
//! accept only the validated form, which makes "insert unvalidated data"
//! unrepresentable rather than a runtime flag check.

use cohort_model::{DataType, Gender, NewAnnotation, VariableSource};

/// One validated measurement row. Dates and times are pattern-valid
/// strings; the value stays raw until checked against its variable's
/// declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    pub subject_identifier: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    pub ethnicity: Option<String>,
    /// Raw variable name, without the dataset prefix.
    pub variable_name: String,
    pub measurement_date: Option<String>,
    pub measurement_time: Option<String>,
    pub visit_grouping: Option<String>,
    pub value: Option<String>,
}

/// A measurement batch that passed [`validate_measurements`].
///
/// [`validate_measurements`]: crate::validate_measurements
#[derive(Debug, Clone)]
pub struct ValidatedMeasurements {
    dataset_name: String,
    rows: Vec<MeasurementRow>,
}

impl ValidatedMeasurements {
    pub(crate) fn new(dataset_name: String, rows: Vec<MeasurementRow>) -> Self {
        Self { dataset_name, rows }
    }

    /// The batch's single, canonical dataset name.
    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }
}

/// One validated dictionary row, with categories normalized to trimmed
/// upper-case and boolean-coded columns coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryRow {
    /// Raw variable name, without the dataset prefix.
    pub variable_name: String,
    pub variable_description: Option<String>,
    pub data_type: DataType,
    pub unit: Option<String>,
    pub category_level_1: Option<String>,
    pub category_level_2: Option<String>,
    pub associated_visit: Option<String>,
    pub has_options: bool,
    pub option_name: Option<String>,
    pub option_description: Option<String>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub deidentification_required: bool,
    pub deidentification_method: Option<String>,
    pub variable_source: VariableSource,
}

/// A dictionary batch that passed [`validate_dictionary`].
///
/// [`validate_dictionary`]: crate::validate_dictionary
#[derive(Debug, Clone)]
pub struct ValidatedDictionary {
    dataset_name: String,
    rows: Vec<DictionaryRow>,
}

impl ValidatedDictionary {
    pub(crate) fn new(dataset_name: String, rows: Vec<DictionaryRow>) -> Self {
        Self { dataset_name, rows }
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn rows(&self) -> &[DictionaryRow] {
        &self.rows
    }
}

/// One validated subject row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRow {
    pub subject_identifier: String,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    pub ethnicity: Option<String>,
}

/// A subject batch that passed [`validate_subjects`].
///
/// [`validate_subjects`]: crate::validate_subjects
#[derive(Debug, Clone)]
pub struct ValidatedSubjects {
    dataset_name: String,
    rows: Vec<SubjectRow>,
}

impl ValidatedSubjects {
    pub(crate) fn new(dataset_name: String, rows: Vec<SubjectRow>) -> Self {
        Self { dataset_name, rows }
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn rows(&self) -> &[SubjectRow] {
        &self.rows
    }
}

/// An annotation batch that passed [`validate_annotations`]; categories
/// normalized to trimmed upper-case.
///
/// [`validate_annotations`]: crate::validate_annotations
#[derive(Debug, Clone)]
pub struct ValidatedAnnotations {
    rows: Vec<NewAnnotation>,
}

impl ValidatedAnnotations {
    pub(crate) fn new(rows: Vec<NewAnnotation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[NewAnnotation] {
        &self.rows
    }
}
