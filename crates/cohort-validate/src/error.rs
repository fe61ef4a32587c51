use thiserror::Error;

/// Validation failures. All are fatal for the whole batch: nothing is
/// committed, and nothing reaches the store before validation passes.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("columns of the input do not match the {template} template: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        template: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("duplicated rows present in the input")]
    DuplicateRows,

    #[error("blank string in column '{column}' (row {row}); missing values must be empty cells")]
    BlankCell { column: String, row: usize },

    #[error("'{column}' is not populated in every row")]
    MissingValue { column: &'static str },

    #[error("exactly one dataset_name must appear in a batch; found {0:?}")]
    DatasetNotSingular(Vec<String>),

    #[error("dataset_name '{0}' contains whitespace")]
    DatasetNameWhitespace(String),

    #[error("invalid {field} '{value}' (row {row}): {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        row: usize,
        reason: String,
    },

    #[error("category_level_2 populated without category_level_1 (row {row})")]
    OrphanCategoryLevel2 { row: usize },

    #[error("option_description missing where option_name is populated (row {row})")]
    OptionDescriptionMissing { row: usize },

    #[error("option_name missing for variable '{variable}' which declares has_options")]
    OptionNameMissing { variable: String },

    #[error("non-unique option_names submitted for variable '{variable}'")]
    NonUniqueOptions { variable: String },

    #[error("range bounds populated for non-numeric variable '{variable}'")]
    RangeOnNonNumeric { variable: String },

    #[error("date_of_birth is later than date_of_death for subject '{subject}'")]
    BirthAfterDeath { subject: String },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
