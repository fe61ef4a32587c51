use anyhow::{Context, Result};
use tracing::info;

use cohort_core::{
    AutoApprove, Confirm, DictionarySummary, MeasurementSummary, load_dictionary,
    load_measurements,
};
use cohort_ingest::load_table;
use cohort_store::Store;
use cohort_validate::{validate_dictionary, validate_measurements};

use crate::cli::{DbArgs, DictionaryArgs, MeasurementArgs};
use crate::prompt::StdinConfirm;

pub fn run_init_db(args: &DbArgs) -> Result<()> {
    Store::open(&args.db)
        .with_context(|| format!("initialize database at {}", args.db.display()))?;
    info!(db = %args.db.display(), "database initialized");
    println!("Database ready at {}", args.db.display());
    Ok(())
}

pub fn run_load_dictionary(args: &DictionaryArgs) -> Result<DictionarySummary> {
    let table = load_table(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;
    let batch = validate_dictionary(&table)
        .with_context(|| format!("validate {}", args.file.display()))?;
    let store = Store::open(&args.db)
        .with_context(|| format!("open database at {}", args.db.display()))?;
    let summary = load_dictionary(&store, &batch, confirm_for(args).as_mut())?;
    Ok(summary)
}

pub fn run_load_measurements(args: &MeasurementArgs) -> Result<MeasurementSummary> {
    let table = load_table(&args.file)
        .with_context(|| format!("read {}", args.file.display()))?;
    let batch = validate_measurements(&table)
        .with_context(|| format!("validate {}", args.file.display()))?;
    let store = Store::open(&args.db)
        .with_context(|| format!("open database at {}", args.db.display()))?;
    let summary = load_measurements(&store, &batch)?;
    Ok(summary)
}

fn confirm_for(args: &DictionaryArgs) -> Box<dyn Confirm> {
    if args.yes {
        Box::new(AutoApprove)
    } else {
        Box::new(StdinConfirm)
    }
}
