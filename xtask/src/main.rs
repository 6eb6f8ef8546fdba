//! Host-side tasks for the ILI9341 workspace: `cargo xtask <check|test|doc>`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::arithmetic_side_effects)]
#![allow(missing_docs)]

mod check;
mod doc;
mod step;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", version, about = "ILI9341 flash viewer development tasks")]
struct Cli {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Check the driver builds for the MCU target and the host
    Check {
        /// Skip clippy and rustfmt
        #[arg(long)]
        quick: bool,
    },
    /// Run unit, integration and doc tests
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
}

fn main() -> Result<()> {
    match Cli::parse().task {
        Task::Check { quick } => check::run(quick),
        Task::Test { unit, integration } => test::run(unit, integration),
        Task::Doc { open } => doc::run(open),
    }
}
