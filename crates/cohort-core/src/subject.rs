//! Subject batch insert.

use std::collections::BTreeSet;

use tracing::info;

use cohort_model::NewSubject;
use cohort_store::Store;
use cohort_validate::ValidatedSubjects;

use crate::error::{ReconcileError, Result};
use crate::pseudonym;

/// Insert a validated subject batch. Insert-only, never merge: the
/// batch's dataset must already exist and none of its subjects may.
/// Callers that tolerate pre-existing subjects partition their batch
/// first. Each row gets a fresh store-verified pseudonym, additionally
/// unique within the batch itself.
pub fn insert_subjects(store: &Store, batch: &ValidatedSubjects) -> Result<usize> {
    let dataset_name = batch.dataset_name();
    let dataset_id = store.dataset_id(dataset_name)?;

    let mut reserved: BTreeSet<String> = BTreeSet::new();
    let mut new_subjects: Vec<NewSubject> = Vec::with_capacity(batch.rows().len());
    for row in batch.rows() {
        if store.subject_exists(dataset_name, &row.subject_identifier)? {
            return Err(ReconcileError::SubjectAlreadyPresent {
                subject: row.subject_identifier.clone(),
            });
        }
        let pseudonym = pseudonym::unique_pseudonym(store, &reserved)?;
        reserved.insert(pseudonym.clone());
        new_subjects.push(NewSubject {
            dataset_id,
            subject_identifier: row.subject_identifier.clone(),
            subject_identifier_deid: pseudonym,
            gender: row.gender,
            date_of_birth: row.date_of_birth.clone(),
            date_of_death: row.date_of_death.clone(),
            ethnicity: row.ethnicity.clone(),
        });
    }

    store.insert_subjects(&new_subjects)?;
    info!(
        dataset = %dataset_name,
        inserted = new_subjects.len(),
        "inserted subjects"
    );
    Ok(new_subjects.len())
}
