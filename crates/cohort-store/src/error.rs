use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sql error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A referenced natural key resolved to zero rows.
    #[error("{entity} not found for {key}")]
    NotFound { entity: &'static str, key: String },

    /// A natural key that must be unique matched more than one row. This
    /// is a data-integrity defect in the store, never retried.
    #[error("{count} rows of {entity} match {key}; natural keys must resolve to at most one row")]
    Consistency {
        entity: &'static str,
        key: String,
        count: usize,
    },

    /// A stored value no longer parses as its declared domain type.
    #[error("stored value '{value}' in {table}.{column} is not valid")]
    Decode {
        table: &'static str,
        column: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
