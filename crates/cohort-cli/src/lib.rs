//! Library components of the cohort loader CLI.

pub mod logging;
