//! Template and domain-rule validation for input batches.
//!
//! Each validator is a pure function from a loaded [`Table`] to a
//! validated batch type or a [`ValidationError`]. The validated types can
//! only be constructed here; the reconcilers' insert entry points require
//! them, so unvalidated data cannot reach the store by construction.
//!
//! [`Table`]: cohort_model::Table

mod annotation;
mod batch;
mod common;
mod dictionary;
mod error;
mod measurement;
pub mod pattern;
mod subject;

pub use annotation::validate_annotations;
pub use batch::{
    DictionaryRow, MeasurementRow, SubjectRow, ValidatedAnnotations, ValidatedDictionary,
    ValidatedMeasurements, ValidatedSubjects,
};
pub use dictionary::validate_dictionary;
pub use error::ValidationError;
pub use measurement::validate_measurements;
pub use subject::validate_subjects;
