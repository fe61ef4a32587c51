//! DDL for the consolidated schema.
//!
//! Table names and columns are a fixed external contract. Surrogate `id`
//! and `date_last_updated` columns are owned by the store; callers never
//! supply them. Idempotent thanks to `CREATE TABLE IF NOT EXISTS`.

pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS datasets (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset_name      TEXT NOT NULL UNIQUE,
    date_last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset_id              INTEGER NOT NULL REFERENCES datasets(id),
    subject_identifier      TEXT NOT NULL,
    subject_identifier_deid TEXT NOT NULL UNIQUE,
    gender                  TEXT,     -- 'F' | 'M' | NULL
    date_of_birth           TEXT,
    date_of_death           TEXT,
    ethnicity               TEXT,
    date_last_updated       TEXT NOT NULL,
    UNIQUE (dataset_id, subject_identifier)
);

CREATE TABLE IF NOT EXISTS annotations (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    category_level_1  TEXT NOT NULL,
    category_level_2  TEXT,           -- NULL when absent; never ''
    date_last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS metadata_variables (
    id                        INTEGER PRIMARY KEY AUTOINCREMENT,
    variable_name             TEXT NOT NULL UNIQUE,
    dataset_id                INTEGER NOT NULL REFERENCES datasets(id),
    variable_description      TEXT,
    data_type                 TEXT NOT NULL,
    unit                      TEXT,
    associated_visit          TEXT,
    category_id               INTEGER REFERENCES annotations(id),
    has_options               INTEGER NOT NULL DEFAULT 0,
    range_min                 REAL,
    range_max                 REAL,
    deidentification_required INTEGER NOT NULL DEFAULT 0,
    deidentification_method   TEXT,
    variable_source           TEXT NOT NULL,
    date_last_updated         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS metadata_variable_options (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    variable_id        INTEGER NOT NULL REFERENCES metadata_variables(id),
    option_name        TEXT NOT NULL,
    option_description TEXT NOT NULL,
    date_last_updated  TEXT NOT NULL,
    UNIQUE (variable_id, option_name)
);

CREATE TABLE IF NOT EXISTS measurements (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id        INTEGER NOT NULL REFERENCES subjects(id),
    variable_id       INTEGER NOT NULL REFERENCES metadata_variables(id),
    measurement_date  TEXT,
    measurement_time  TEXT,
    visit_grouping    TEXT,
    value             TEXT,
    value_deid        TEXT,
    date_last_updated TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subjects_dataset_idx      ON subjects(dataset_id);
CREATE INDEX IF NOT EXISTS measurements_subject_idx  ON measurements(subject_id);
CREATE INDEX IF NOT EXISTS measurements_variable_idx ON measurements(variable_id);
CREATE INDEX IF NOT EXISTS options_variable_idx      ON metadata_variable_options(variable_id);
";
