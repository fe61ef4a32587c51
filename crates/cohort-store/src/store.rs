//! [`Store`] — the SQLite connection wrapper plus batched inserts.
//!
//! All access is synchronous and blocking; the pipeline is
//! single-threaded and the store is handed around as an explicit
//! collaborator, never ambient state.

use std::path::Path;

use chrono::Utc;
use tracing::debug;

use cohort_model::{
    NewAnnotation, NewMeasurement, NewOption, NewSubject, NewVariable, canonical_dataset_name,
};

use crate::error::{Result, StoreError};
use crate::schema::SCHEMA;

pub struct Store {
    pub(crate) conn: rusqlite::Connection,
}

impl Store {
    /// Open (or create) a store at `path` and run schema initialisation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store — useful for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Run `f` inside a single transaction: commit on `Ok`, roll back on
    /// `Err`. Multi-stage reconciliation uses this so a decline or
    /// failure at a later stage cannot leave earlier stages committed.
    pub fn in_transaction<T, E>(&self, f: impl FnOnce(&Self) -> std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        E: From<StoreError>,
    {
        let tx = self.conn.unchecked_transaction().map_err(StoreError::from)?;
        match f(self) {
            Ok(value) => {
                tx.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(error) => {
                // Dropping the transaction rolls back; do it explicitly so
                // a rollback failure is not silently swallowed.
                tx.rollback().map_err(StoreError::from)?;
                Err(error)
            }
        }
    }

    fn now(&self) -> String {
        Utc::now().to_rfc3339()
    }

    /// Insert a single dataset; the name is stored in canonical
    /// (trimmed, upper-case) form. Fails if the dataset already exists.
    pub fn insert_dataset(&self, dataset_name: &str) -> Result<()> {
        let name = canonical_dataset_name(dataset_name);
        if self.dataset_exists(&name)? {
            return Err(StoreError::Consistency {
                entity: "dataset",
                key: format!("dataset_name '{name}' (already present before insert)"),
                count: 1,
            });
        }
        self.conn.execute(
            "INSERT INTO datasets (dataset_name, date_last_updated) VALUES (?1, ?2)",
            rusqlite::params![name, self.now()],
        )?;
        debug!(dataset_name = %name, "inserted dataset");
        Ok(())
    }

    pub fn insert_annotations(&self, annotations: &[NewAnnotation]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO annotations (category_level_1, category_level_2, date_last_updated)
             VALUES (?1, ?2, ?3)",
        )?;
        for annotation in annotations {
            stmt.execute(rusqlite::params![
                annotation.category_level_1,
                annotation.category_level_2,
                self.now(),
            ])?;
        }
        debug!(count = annotations.len(), "inserted annotations");
        Ok(())
    }

    pub fn insert_subjects(&self, subjects: &[NewSubject]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO subjects (
                 dataset_id, subject_identifier, subject_identifier_deid,
                 gender, date_of_birth, date_of_death, ethnicity, date_last_updated
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for subject in subjects {
            stmt.execute(rusqlite::params![
                subject.dataset_id,
                subject.subject_identifier,
                subject.subject_identifier_deid,
                subject.gender.map(|g| g.as_str()),
                subject.date_of_birth,
                subject.date_of_death,
                subject.ethnicity,
                self.now(),
            ])?;
        }
        debug!(count = subjects.len(), "inserted subjects");
        Ok(())
    }

    pub fn insert_variables(&self, variables: &[NewVariable]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO metadata_variables (
                 variable_name, dataset_id, variable_description, data_type, unit,
                 associated_visit, category_id, has_options, range_min, range_max,
                 deidentification_required, deidentification_method, variable_source,
                 date_last_updated
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;
        for variable in variables {
            stmt.execute(rusqlite::params![
                variable.variable_name,
                variable.dataset_id,
                variable.variable_description,
                variable.data_type.as_str(),
                variable.unit,
                variable.associated_visit,
                variable.category_id,
                variable.has_options,
                variable.range_min,
                variable.range_max,
                variable.deidentification_required,
                variable.deidentification_method,
                variable.variable_source.as_str(),
                self.now(),
            ])?;
        }
        debug!(count = variables.len(), "inserted metadata variables");
        Ok(())
    }

    pub fn insert_options(&self, options: &[NewOption]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO metadata_variable_options (
                 variable_id, option_name, option_description, date_last_updated
             ) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for option in options {
            stmt.execute(rusqlite::params![
                option.variable_id,
                option.option_name,
                option.option_description,
                self.now(),
            ])?;
        }
        debug!(count = options.len(), "inserted variable options");
        Ok(())
    }

    pub fn insert_measurements(&self, measurements: &[NewMeasurement]) -> Result<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO measurements (
                 subject_id, variable_id, measurement_date, measurement_time,
                 visit_grouping, value, value_deid, date_last_updated
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for measurement in measurements {
            stmt.execute(rusqlite::params![
                measurement.subject_id,
                measurement.variable_id,
                measurement.measurement_date,
                measurement.measurement_time,
                measurement.visit_grouping,
                measurement.value,
                measurement.value_deid,
                self.now(),
            ])?;
        }
        debug!(count = measurements.len(), "inserted measurements");
        Ok(())
    }
}
