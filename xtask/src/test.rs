use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{OnFailure, Step};

pub fn run(unit_only: bool, integration_only: bool) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();

    if !integration_only {
        let unit = Step {
            label: "Unit tests",
            args: &["test", "--lib", "-p", "platform", "-p", "firmware"],
            on_failure: OnFailure::Fail,
        };
        report(unit.run()?);
    }

    if !unit_only {
        let integration = Step {
            label: "Integration tests",
            args: &["test", "--tests", "-p", "platform", "-p", "firmware"],
            on_failure: OnFailure::Fail,
        };
        report(integration.run()?);

        let demo = Step {
            label: "Flash viewer demo",
            args: &["run", "-p", "firmware", "--features", "std", "--example", "flash_viewer"],
            on_failure: OnFailure::Fail,
        };
        demo.run()?;
    }

    let doc = Step {
        label: "Doc tests",
        args: &["test", "--doc", "-p", "platform", "-p", "firmware"],
        on_failure: OnFailure::Warn,
    };
    report(doc.run()?);

    println!();
    println!(
        "{}",
        format!("✓ All tests completed in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();

    Ok(())
}

fn report(stdout: Option<String>) {
    if let Some(stdout) = stdout {
        println!("    {}", extract_test_summary(&stdout).dimmed());
    }
}

/// Totals over every "test result:" line cargo printed.
fn extract_test_summary(output: &str) -> String {
    let mut passed = 0u32;
    let mut failed = 0u32;
    let mut binaries = 0u32;
    for line in output.lines().filter(|l| l.contains("test result:")) {
        binaries += 1;
        for part in line.split(';').map(str::trim) {
            let count = |suffix: &str| {
                part.strip_suffix(suffix)
                    .and_then(|n| n.rsplit(' ').next())
                    .and_then(|n| n.parse::<u32>().ok())
            };
            if let Some(n) = count(" passed") {
                passed += n;
            } else if let Some(n) = count(" failed") {
                failed += n;
            }
        }
    }
    if binaries == 0 {
        return "(summary not available)".to_string();
    }
    format!("{passed} passed, {failed} failed across {binaries} test binaries")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_sums_binaries() {
        let out = "\
test result: ok. 5 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out; finished in 0.01s
test result: ok. 12 passed; 1 failed; 0 ignored; 0 measured; 0 filtered out; finished in 0.20s
";
        assert_eq!(extract_test_summary(out), "17 passed, 1 failed across 2 test binaries");
    }

    #[test]
    fn test_summary_without_results() {
        assert_eq!(extract_test_summary("compiling..."), "(summary not available)");
    }
}
