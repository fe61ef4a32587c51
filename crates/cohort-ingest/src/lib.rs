//! CSV ingestion for template-shaped input files.
//!
//! Every cell is read as a string: native type inference would strip
//! leading zeros from subject identifiers and similar codes. Type
//! handling happens later, against each variable's declared data type.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::debug;

use cohort_model::Table;

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// An empty field is a true null; anything else is kept trimmed.
/// A whitespace-only field survives as an empty string so the validators
/// can reject it as a blank (bad null encoding upstream).
fn normalize_cell(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.trim().trim_matches('\u{feff}').to_string())
    }
}

/// Load a CSV file into a [`Table`], headers from the first record.
///
/// No template is enforced here; the validators own that check so that
/// it runs for programmatically-built batches too.
pub fn load_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read headers: {}", path.display()))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        let row: Vec<Option<String>> = record.iter().map(normalize_cell).collect();
        // Fully-empty trailing lines carry no data.
        if row.iter().all(Option::is_none) {
            continue;
        }
        rows.push(row);
    }

    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "loaded csv table"
    );
    Ok(Table::new(headers, rows))
}
