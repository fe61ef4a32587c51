//! Shared data model for the cohort consolidation pipeline.

pub mod entity;
pub mod enums;
pub mod table;
pub mod template;

pub use entity::{
    MeasurementKey, NewAnnotation, NewMeasurement, NewOption, NewSubject, NewVariable,
    VariableDetails, canonical_dataset_name, format_variable_name,
};
pub use enums::{DataType, DeidMethod, Gender, VariableSource};
pub use table::{RowView, Table};
