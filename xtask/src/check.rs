use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{OnFailure, Step};

/// Cortex-M4F, the STM32F4 the panel is wired to.
const MCU_TARGET: &str = "thumbv7em-none-eabihf";

pub fn run(quick: bool) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking driver builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    let builds = [
        Step {
            label: "platform (no_std)",
            args: &["check", "-p", "platform", "--target", MCU_TARGET],
            on_failure: OnFailure::Fail,
        },
        Step {
            label: "firmware (no_std)",
            args: &["check", "-p", "firmware", "--target", MCU_TARGET],
            on_failure: OnFailure::Fail,
        },
        Step {
            label: "firmware (no_std + defmt)",
            args: &["check", "-p", "firmware", "--target", MCU_TARGET, "--features", "defmt"],
            on_failure: OnFailure::Fail,
        },
        Step {
            label: "firmware (host, std)",
            args: &["check", "-p", "firmware", "--features", "std", "--all-targets"],
            on_failure: OnFailure::Fail,
        },
    ];
    for step in &builds {
        step.run()?;
    }

    if !quick {
        let lints = [
            Step {
                label: "clippy",
                args: &["clippy", "--workspace", "--all-targets", "--features", "firmware/std", "--", "-D", "warnings"],
                on_failure: OnFailure::Warn,
            },
            Step {
                label: "rustfmt",
                args: &["fmt", "--all", "--check"],
                on_failure: OnFailure::Warn,
            },
        ];
        for step in &lints {
            step.run()?;
        }
    }

    println!();
    println!(
        "{}",
        format!("✓ All checks completed in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();

    Ok(())
}
