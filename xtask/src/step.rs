//! One cargo invocation with a timed, colored status line.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// What a failing step does to the overall run.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Abort with an error.
    Fail,
    /// Print the output and keep going.
    Warn,
}

/// A labelled `cargo` command.
pub struct Step<'a> {
    pub label: &'a str,
    pub args: &'a [&'a str],
    pub on_failure: OnFailure,
}

impl Step<'_> {
    /// Run the step. Returns captured stdout on success.
    pub fn run(&self) -> Result<Option<String>> {
        println!("{}", format!("  {}...", self.label).cyan());
        let start = Instant::now();

        let output: Output = Command::new("cargo")
            .args(self.args)
            .output()
            .with_context(|| format!("Failed to run cargo {}", self.args.join(" ")))?;

        if output.status.success() {
            println!(
                "{}",
                format!("  ✓ {} passed in {:.2}s", self.label, start.elapsed().as_secs_f64()).green()
            );
            return Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()));
        }

        match self.on_failure {
            OnFailure::Fail => {
                eprintln!("{}", format!("  ✗ {} failed", self.label).red().bold());
                eprintln!();
                eprintln!("{}", String::from_utf8_lossy(&output.stdout));
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                anyhow::bail!("{} failed", self.label);
            }
            OnFailure::Warn => {
                eprintln!("{}", format!("  ⚠ {} reported problems", self.label).yellow().bold());
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                Ok(None)
            }
        }
    }
}
