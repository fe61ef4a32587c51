//! Dictionary reconciliation.
//!
//! A dictionary load runs in four stages — dataset, annotations,
//! variables, options — each of which partitions its batch into rows
//! already present (skipped) and rows to insert (gated by operator
//! confirmation). The whole load runs in one transaction: a decline or
//! failure at any stage rolls back every earlier stage.

use std::collections::BTreeSet;

use tracing::{debug, info};

use cohort_model::{
    NewAnnotation, NewOption, NewVariable, Table, format_variable_name, template,
};
use cohort_store::Store;
use cohort_validate::{DictionaryRow, ValidatedDictionary, validate_annotations};

use crate::confirm::Confirm;
use crate::error::{ReconcileError, Result};
use crate::summary::DictionarySummary;

/// Reconcile a validated dictionary batch against the store.
pub fn load_dictionary(
    store: &Store,
    batch: &ValidatedDictionary,
    confirm: &mut dyn Confirm,
) -> Result<DictionarySummary> {
    store.in_transaction(|store| {
        let mut summary = DictionarySummary {
            dataset_name: batch.dataset_name().to_string(),
            ..DictionarySummary::default()
        };
        reconcile_dataset(store, batch.dataset_name(), confirm, &mut summary)?;
        reconcile_annotations(store, batch, confirm, &mut summary)?;
        reconcile_variables(store, batch, confirm, &mut summary)?;
        reconcile_options(store, batch, confirm, &mut summary)?;
        info!(dataset = %batch.dataset_name(), "dictionary load complete");
        Ok(summary)
    })
}

fn reconcile_dataset(
    store: &Store,
    dataset_name: &str,
    confirm: &mut dyn Confirm,
    summary: &mut DictionarySummary,
) -> Result<()> {
    if store.dataset_exists(dataset_name)? {
        debug!(dataset = %dataset_name, "dataset already present");
        return Ok(());
    }
    let prompt = format!("Dataset '{dataset_name}' is not present yet. Create it?");
    if !confirm.confirm(&prompt) {
        return Err(ReconcileError::UserAbort);
    }
    store.insert_dataset(dataset_name)?;
    summary.dataset_created = true;
    Ok(())
}

fn reconcile_annotations(
    store: &Store,
    batch: &ValidatedDictionary,
    confirm: &mut dyn Confirm,
    summary: &mut DictionarySummary,
) -> Result<()> {
    // Distinct category pairs, normalized before deduplication so case
    // variants collapse to one annotation.
    let mut seen: BTreeSet<(String, Option<String>)> = BTreeSet::new();
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for row in batch.rows() {
        let Some(level_1) = &row.category_level_1 else {
            continue;
        };
        let pair = (
            level_1.trim().to_uppercase(),
            row.category_level_2.as_ref().map(|v| v.trim().to_uppercase()),
        );
        if seen.insert(pair.clone()) {
            rows.push(vec![Some(pair.0), pair.1]);
        }
    }
    let table = Table::new(
        template::ANNOTATION_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect(),
        rows,
    );
    let annotations = validate_annotations(&table)?;

    let mut new_annotations: Vec<NewAnnotation> = Vec::new();
    for annotation in annotations.rows() {
        if store.annotation_exists(annotation)? {
            summary.annotations_existing += 1;
        } else {
            new_annotations.push(annotation.clone());
        }
    }
    if new_annotations.is_empty() {
        return Ok(());
    }
    let prompt = format!(
        "{} new annotation(s) will be inserted ({} already present). Proceed?",
        new_annotations.len(),
        summary.annotations_existing
    );
    if !confirm.confirm(&prompt) {
        return Err(ReconcileError::UserAbort);
    }
    summary.annotations_inserted = new_annotations.len();
    store.insert_annotations(&new_annotations)?;
    Ok(())
}

/// First dictionary row for each distinct raw variable name, in file
/// order. Option rows repeat the variable columns; the first row is
/// authoritative for the variable itself.
fn unique_variables(batch: &ValidatedDictionary) -> Vec<&DictionaryRow> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    batch
        .rows()
        .iter()
        .filter(|row| seen.insert(row.variable_name.as_str()))
        .collect()
}

fn reconcile_variables(
    store: &Store,
    batch: &ValidatedDictionary,
    confirm: &mut dyn Confirm,
    summary: &mut DictionarySummary,
) -> Result<()> {
    let dataset_id = store.dataset_id(batch.dataset_name())?;

    let mut new_variables: Vec<NewVariable> = Vec::new();
    for row in unique_variables(batch) {
        let variable_name = format_variable_name(batch.dataset_name(), &row.variable_name);
        if store.variable_exists(&variable_name)? {
            summary.variables_existing += 1;
            continue;
        }
        let category_id = match &row.category_level_1 {
            Some(level_1) => Some(store.annotation_id(&NewAnnotation {
                category_level_1: level_1.clone(),
                category_level_2: row.category_level_2.clone(),
            })?),
            None => None,
        };
        new_variables.push(NewVariable {
            variable_name,
            dataset_id,
            variable_description: row.variable_description.clone(),
            data_type: row.data_type,
            unit: row.unit.clone(),
            associated_visit: row.associated_visit.clone(),
            category_id,
            has_options: row.has_options,
            range_min: row.range_min,
            range_max: row.range_max,
            deidentification_required: row.deidentification_required,
            deidentification_method: row.deidentification_method.clone(),
            variable_source: row.variable_source,
        });
    }
    if new_variables.is_empty() {
        return Ok(());
    }
    let prompt = format!(
        "{} new variable(s) will be inserted ({} already present). Proceed?",
        new_variables.len(),
        summary.variables_existing
    );
    if !confirm.confirm(&prompt) {
        return Err(ReconcileError::UserAbort);
    }
    summary.variables_inserted = new_variables.len();
    store.insert_variables(&new_variables)?;
    Ok(())
}

fn reconcile_options(
    store: &Store,
    batch: &ValidatedDictionary,
    confirm: &mut dyn Confirm,
    summary: &mut DictionarySummary,
) -> Result<()> {
    let mut new_options: Vec<NewOption> = Vec::new();
    for row in batch.rows() {
        let Some(option_name) = &row.option_name else {
            continue;
        };
        let variable_name = format_variable_name(batch.dataset_name(), &row.variable_name);
        let variable_id = store.variable_id(&variable_name)?;
        if store.option_exists(variable_id, option_name)? {
            summary.options_existing += 1;
            continue;
        }
        new_options.push(NewOption {
            variable_id,
            option_name: option_name.clone(),
            // Presence is enforced during dictionary validation.
            option_description: row.option_description.clone().unwrap_or_default(),
        });
    }
    if new_options.is_empty() {
        return Ok(());
    }
    let prompt = format!(
        "{} new option(s) will be inserted ({} already present). Proceed?",
        new_options.len(),
        summary.options_existing
    );
    if !confirm.confirm(&prompt) {
        return Err(ReconcileError::UserAbort);
    }
    summary.options_inserted = new_options.len();
    store.insert_options(&new_options)?;
    Ok(())
}
