//! Natural-key lookups.
//!
//! Every lookup follows the same contract: a natural key matching zero
//! rows means "absent", exactly one row means "present", and two or more
//! rows is a [`StoreError::Consistency`] — the schema's unique
//! constraints make that state unreachable through this crate, so seeing
//! it means the database was modified out of band.

use rusqlite::{OptionalExtension, ToSql};

use cohort_model::{DataType, MeasurementKey, NewAnnotation, VariableDetails};

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    fn count_rows(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count as usize)
    }

    fn key_count(
        &self,
        entity: &'static str,
        key: impl Fn() -> String,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<usize> {
        let count = self.count_rows(sql, params)?;
        if count > 1 {
            return Err(StoreError::Consistency {
                entity,
                key: key(),
                count,
            });
        }
        Ok(count)
    }

    fn resolve_id(
        &self,
        entity: &'static str,
        key: impl Fn() -> String,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<i64> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map(params, |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        match ids.as_slice() {
            [] => Err(StoreError::NotFound { entity, key: key() }),
            [id] => Ok(*id),
            _ => Err(StoreError::Consistency {
                entity,
                key: key(),
                count: ids.len(),
            }),
        }
    }

    // -- datasets -----------------------------------------------------

    pub fn dataset_exists(&self, dataset_name: &str) -> Result<bool> {
        let count = self.key_count(
            "dataset",
            || format!("dataset_name '{dataset_name}'"),
            "SELECT COUNT(*) FROM datasets WHERE dataset_name = ?1",
            &[&dataset_name],
        )?;
        Ok(count == 1)
    }

    pub fn dataset_id(&self, dataset_name: &str) -> Result<i64> {
        self.resolve_id(
            "dataset",
            || format!("dataset_name '{dataset_name}'"),
            "SELECT id FROM datasets WHERE dataset_name = ?1",
            &[&dataset_name],
        )
    }

    pub fn dataset_name(&self, dataset_id: i64) -> Result<String> {
        self.conn
            .query_row(
                "SELECT dataset_name FROM datasets WHERE id = ?1",
                [dataset_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound {
                entity: "dataset",
                key: format!("id {dataset_id}"),
            })
    }

    // -- subjects -----------------------------------------------------

    /// Whether a subject exists within its dataset. The dataset itself
    /// must already exist; an unknown dataset is an error, not "absent".
    pub fn subject_exists(&self, dataset_name: &str, subject_identifier: &str) -> Result<bool> {
        let dataset_id = self.dataset_id(dataset_name)?;
        let count = self.key_count(
            "subject",
            || format!("subject_identifier '{subject_identifier}' in dataset '{dataset_name}'"),
            "SELECT COUNT(*) FROM subjects WHERE dataset_id = ?1 AND subject_identifier = ?2",
            &[&dataset_id, &subject_identifier],
        )?;
        Ok(count == 1)
    }

    pub fn subject_id(&self, dataset_name: &str, subject_identifier: &str) -> Result<i64> {
        let dataset_id = self.dataset_id(dataset_name)?;
        self.resolve_id(
            "subject",
            || format!("subject_identifier '{subject_identifier}' in dataset '{dataset_name}'"),
            "SELECT id FROM subjects WHERE dataset_id = ?1 AND subject_identifier = ?2",
            &[&dataset_id, &subject_identifier],
        )
    }

    /// Pseudonym uniqueness is global, across all datasets.
    pub fn pseudonym_exists(&self, pseudonym: &str) -> Result<bool> {
        let count = self.key_count(
            "subject",
            || format!("subject_identifier_deid '{pseudonym}'"),
            "SELECT COUNT(*) FROM subjects WHERE subject_identifier_deid = ?1",
            &[&pseudonym],
        )?;
        Ok(count == 1)
    }

    pub fn subject_id_by_pseudonym(&self, pseudonym: &str) -> Result<i64> {
        self.resolve_id(
            "subject",
            || format!("subject_identifier_deid '{pseudonym}'"),
            "SELECT id FROM subjects WHERE subject_identifier_deid = ?1",
            &[&pseudonym],
        )
    }

    // -- annotations --------------------------------------------------

    fn annotation_where(annotation: &NewAnnotation) -> (&'static str, Vec<&dyn ToSql>) {
        match &annotation.category_level_2 {
            Some(level_2) => (
                "category_level_1 = ?1 AND category_level_2 = ?2",
                vec![&annotation.category_level_1 as &dyn ToSql, level_2],
            ),
            // NULL never matches `= ?`, so the absent case needs its own
            // predicate.
            None => (
                "category_level_1 = ?1 AND category_level_2 IS NULL",
                vec![&annotation.category_level_1 as &dyn ToSql],
            ),
        }
    }

    fn annotation_key(annotation: &NewAnnotation) -> String {
        format!(
            "category ('{}', {})",
            annotation.category_level_1,
            match &annotation.category_level_2 {
                Some(level_2) => format!("'{level_2}'"),
                None => "NULL".to_string(),
            }
        )
    }

    pub fn annotation_exists(&self, annotation: &NewAnnotation) -> Result<bool> {
        let (predicate, params) = Self::annotation_where(annotation);
        let sql = format!("SELECT COUNT(*) FROM annotations WHERE {predicate}");
        let count = self.key_count(
            "annotation",
            || Self::annotation_key(annotation),
            &sql,
            params.as_slice(),
        )?;
        Ok(count == 1)
    }

    pub fn annotation_id(&self, annotation: &NewAnnotation) -> Result<i64> {
        let (predicate, params) = Self::annotation_where(annotation);
        let sql = format!("SELECT id FROM annotations WHERE {predicate}");
        self.resolve_id(
            "annotation",
            || Self::annotation_key(annotation),
            &sql,
            params.as_slice(),
        )
    }

    pub fn category_levels(&self, annotation_id: i64) -> Result<(String, Option<String>)> {
        self.conn
            .query_row(
                "SELECT category_level_1, category_level_2 FROM annotations WHERE id = ?1",
                [annotation_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(StoreError::NotFound {
                entity: "annotation",
                key: format!("id {annotation_id}"),
            })
    }

    // -- metadata variables -------------------------------------------

    /// `variable_name` is the formatted, dataset-prefixed name.
    pub fn variable_exists(&self, variable_name: &str) -> Result<bool> {
        let count = self.key_count(
            "variable",
            || format!("variable_name '{variable_name}'"),
            "SELECT COUNT(*) FROM metadata_variables WHERE variable_name = ?1",
            &[&variable_name],
        )?;
        Ok(count == 1)
    }

    pub fn variable_id(&self, variable_name: &str) -> Result<i64> {
        self.resolve_id(
            "variable",
            || format!("variable_name '{variable_name}'"),
            "SELECT id FROM metadata_variables WHERE variable_name = ?1",
            &[&variable_name],
        )
    }

    // -- variable options ---------------------------------------------

    pub fn option_exists(&self, variable_id: i64, option_name: &str) -> Result<bool> {
        let count = self.key_count(
            "variable option",
            || format!("option_name '{option_name}' for variable id {variable_id}"),
            "SELECT COUNT(*) FROM metadata_variable_options
             WHERE variable_id = ?1 AND option_name = ?2",
            &[&variable_id, &option_name],
        )?;
        Ok(count == 1)
    }

    pub fn option_id(&self, variable_id: i64, option_name: &str) -> Result<i64> {
        self.resolve_id(
            "variable option",
            || format!("option_name '{option_name}' for variable id {variable_id}"),
            "SELECT id FROM metadata_variable_options
             WHERE variable_id = ?1 AND option_name = ?2",
            &[&variable_id, &option_name],
        )
    }

    // -- measurements -------------------------------------------------

    /// Duplicate check against the natural measurement key. Null key
    /// fields place no predicate on the stored column, so a key with a
    /// null date matches rows with any stored date. More than one match
    /// is a [`StoreError::Consistency`], same as every other lookup.
    pub fn measurement_exists(&self, key: &MeasurementKey) -> Result<bool> {
        let mut sql = String::from(
            "SELECT COUNT(*) FROM measurements m
             JOIN subjects s ON s.id = m.subject_id
             JOIN datasets d ON d.id = s.dataset_id
             JOIN metadata_variables v ON v.id = m.variable_id
             WHERE d.dataset_name = ?1
               AND s.subject_identifier = ?2
               AND v.variable_name = ?3",
        );
        let mut params: Vec<&dyn ToSql> = vec![
            &key.dataset_name,
            &key.subject_identifier,
            &key.variable_name,
        ];
        if let Some(date) = &key.measurement_date {
            params.push(date);
            sql.push_str(&format!(" AND m.measurement_date = ?{}", params.len()));
        }
        if let Some(time) = &key.measurement_time {
            params.push(time);
            sql.push_str(&format!(" AND m.measurement_time = ?{}", params.len()));
        }
        if let Some(visit) = &key.visit_grouping {
            params.push(visit);
            sql.push_str(&format!(" AND m.visit_grouping = ?{}", params.len()));
        }
        let count = self.key_count(
            "measurement",
            || {
                format!(
                    "subject '{}' variable '{}' in dataset '{}'",
                    key.subject_identifier, key.variable_name, key.dataset_name
                )
            },
            &sql,
            params.as_slice(),
        )?;
        Ok(count == 1)
    }

    // -- variable details ---------------------------------------------

    /// Bulk-fetch the metadata needed to validate measurement values for
    /// every variable in `variable_ids`, options included, in one query.
    pub fn variable_details(&self, variable_ids: &[i64]) -> Result<Vec<VariableDetails>> {
        if variable_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=variable_ids.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT v.id, v.variable_name, v.data_type, v.associated_visit,
                    v.has_options, v.range_min, v.range_max,
                    v.deidentification_required, v.deidentification_method,
                    o.option_name
             FROM metadata_variables v
             LEFT JOIN metadata_variable_options o ON o.variable_id = v.id
             WHERE v.id IN ({placeholders})
             ORDER BY v.id, o.id"
        );
        let params: Vec<&dyn ToSql> = variable_ids.iter().map(|id| id as &dyn ToSql).collect();

        struct DetailRow {
            variable_id: i64,
            variable_name: String,
            data_type: String,
            associated_visit: Option<String>,
            has_options: bool,
            range_min: Option<f64>,
            range_max: Option<f64>,
            deidentification_required: bool,
            deidentification_method: Option<String>,
            option_name: Option<String>,
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), |row| {
            Ok(DetailRow {
                variable_id: row.get(0)?,
                variable_name: row.get(1)?,
                data_type: row.get(2)?,
                associated_visit: row.get(3)?,
                has_options: row.get(4)?,
                range_min: row.get(5)?,
                range_max: row.get(6)?,
                deidentification_required: row.get(7)?,
                deidentification_method: row.get(8)?,
                option_name: row.get(9)?,
            })
        })?;

        let mut details: Vec<VariableDetails> = Vec::new();
        for row in rows {
            let row = row?;
            let matches_last = details
                .last()
                .is_some_and(|last| last.variable_id == row.variable_id);
            if !matches_last {
                let data_type: DataType =
                    row.data_type
                        .parse()
                        .map_err(|_| StoreError::Decode {
                            table: "metadata_variables",
                            column: "data_type",
                            value: row.data_type.clone(),
                        })?;
                details.push(VariableDetails {
                    variable_id: row.variable_id,
                    variable_name: row.variable_name,
                    data_type,
                    associated_visit: row.associated_visit,
                    has_options: row.has_options,
                    range_min: row.range_min,
                    range_max: row.range_max,
                    deidentification_required: row.deidentification_required,
                    deidentification_method: row.deidentification_method,
                    options: Vec::new(),
                });
            }
            if let (Some(detail), Some(option_name)) = (details.last_mut(), row.option_name) {
                detail.options.push(option_name);
            }
        }
        Ok(details)
    }
}
