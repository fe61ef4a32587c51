//! Load summaries, printed as a table or as JSON.

use anyhow::Result;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Table};

use cohort_core::{DictionarySummary, MeasurementSummary};

pub fn print_dictionary_summary(summary: &DictionarySummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!("Dataset: {}", summary.dataset_name);
    if summary.dataset_created {
        println!("Dataset was created by this load.");
    }
    let mut table = new_summary_table();
    table.add_row(count_row(
        "Annotations",
        summary.annotations_existing,
        summary.annotations_inserted,
    ));
    table.add_row(count_row(
        "Variables",
        summary.variables_existing,
        summary.variables_inserted,
    ));
    table.add_row(count_row(
        "Options",
        summary.options_existing,
        summary.options_inserted,
    ));
    println!("{table}");
    Ok(())
}

pub fn print_measurement_summary(summary: &MeasurementSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!(
        "Dataset: {} ({} rows read)",
        summary.dataset_name, summary.rows_total
    );
    let mut table = new_summary_table();
    table.add_row(count_row(
        "Subjects",
        summary.subjects_existing,
        summary.subjects_inserted,
    ));
    table.add_row(count_row(
        "Measurements",
        summary.measurements_duplicate,
        summary.measurements_inserted,
    ));
    println!("{table}");
    Ok(())
}

fn new_summary_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Entity", "Skipped", "Inserted"]);
    for column in table.column_iter_mut().skip(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

fn count_row(entity: &str, skipped: usize, inserted: usize) -> Vec<Cell> {
    vec![
        Cell::new(entity),
        Cell::new(skipped),
        Cell::new(inserted),
    ]
}
