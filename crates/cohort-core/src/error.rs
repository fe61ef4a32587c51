use thiserror::Error;

use cohort_store::StoreError;
use cohort_validate::ValidationError;

/// Failures while reconciling a validated batch against the store. Any
/// error aborts the surrounding transaction, so a failed load leaves the
/// database exactly as it was.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The operator declined a staged insert.
    #[error("aborted at operator request; nothing was committed")]
    UserAbort,

    /// A measurement references a variable the dictionary never declared.
    #[error("variable '{variable}' is not present in the metadata dictionary")]
    UnknownVariable { variable: String },

    /// The subject insert contract is insert-only, never merge.
    #[error("subject '{subject}' already exists in its dataset")]
    SubjectAlreadyPresent { subject: String },

    /// A subject inserted earlier in the same load no longer resolves.
    #[error("subject '{subject}' was inserted but does not resolve")]
    SubjectVanished { subject: String },

    #[error("value '{value}' for variable '{variable}' is invalid: {reason}")]
    InvalidValue {
        variable: String,
        value: String,
        reason: String,
    },

    #[error("value '{value}' is not a declared option of variable '{variable}'")]
    UnknownOption { variable: String, value: String },

    #[error("value '{value}' for variable '{variable}' is outside its declared range")]
    OutOfRange { variable: String, value: String },

    #[error("measurement date '{date}' for subject '{subject}' falls outside the subject's lifespan")]
    OutsideLifespan { subject: String, date: String },

    #[error("could not generate an unused pseudonym after {attempts} attempts")]
    PseudonymExhausted { attempts: usize },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
