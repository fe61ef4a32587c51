//! Per-load outcome counts, reported by the CLI as a table or as JSON.

use serde::Serialize;

/// Outcome of one dictionary load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DictionarySummary {
    pub dataset_name: String,
    pub dataset_created: bool,
    pub annotations_existing: usize,
    pub annotations_inserted: usize,
    pub variables_existing: usize,
    pub variables_inserted: usize,
    pub options_existing: usize,
    pub options_inserted: usize,
}

/// Outcome of one measurement load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeasurementSummary {
    pub dataset_name: String,
    pub rows_total: usize,
    pub subjects_existing: usize,
    pub subjects_inserted: usize,
    pub measurements_duplicate: usize,
    pub measurements_inserted: usize,
}
