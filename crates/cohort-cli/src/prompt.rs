//! Interactive yes/no prompting on stdin.

use std::io::{self, BufRead, Write};

use cohort_core::Confirm;

/// Asks the operator on stdout/stdin. Anything other than a clear yes or
/// no repeats the question.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let stdin = io::stdin();
        loop {
            print!("{prompt} [y/n] ");
            let _ = io::stdout().flush();
            let mut answer = String::new();
            if stdin.lock().read_line(&mut answer).is_err() {
                return false;
            }
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" => return false,
                // EOF: treat a closed stdin as a decline.
                "" if answer.is_empty() => return false,
                _ => println!("Please answer 'y' or 'n'."),
            }
        }
    }
}
