//! Operator confirmation seam.
//!
//! Staged inserts describe what they are about to write and wait for a
//! yes/no. The trait keeps the pipeline testable: tests plug in
//! [`AutoApprove`] or [`AutoDecline`], the CLI plugs in a stdin prompt.

/// Answers yes/no questions posed by the reconcilers.
pub trait Confirm {
    /// Whether to proceed with the described insert stage.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Approves every stage. Used by tests and the CLI's `--yes` flag.
#[derive(Debug, Default)]
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Declines every stage.
#[derive(Debug, Default)]
pub struct AutoDecline;

impl Confirm for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }
}
