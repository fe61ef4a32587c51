//! Reconciliation pipeline: loads validated batches into the store with
//! skip-or-insert semantics.
//!
//! Each loader takes the store as an explicit collaborator, runs inside
//! one transaction, and returns a summary of what it skipped and what it
//! inserted. The dictionary loader additionally gates its staged inserts
//! behind an operator [`Confirm`] seam. Re-running the same load against
//! the same store inserts nothing and fails nothing.

mod confirm;
mod deid;
mod dictionary;
mod error;
mod measurement;
mod pseudonym;
mod subject;
mod summary;

pub use confirm::{AutoApprove, AutoDecline, Confirm};
pub use deid::apply_deidentification;
pub use dictionary::load_dictionary;
pub use error::ReconcileError;
pub use measurement::load_measurements;
pub use subject::insert_subjects;
pub use summary::{DictionarySummary, MeasurementSummary};
