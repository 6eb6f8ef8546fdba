use anyhow::Result;
use colored::Colorize;

use crate::step::{OnFailure, Step};

const DOC_ARGS: &[&str] = &[
    "doc",
    "-p",
    "platform",
    "-p",
    "firmware",
    "--features",
    "firmware/std",
    "--no-deps",
    "--document-private-items",
];

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building driver documentation...".cyan().bold());
    println!();

    let mut args = DOC_ARGS.to_vec();
    if open {
        args.push("--open");
    }
    Step {
        label: "rustdoc",
        args: &args,
        on_failure: OnFailure::Fail,
    }
    .run()?;

    if !open {
        println!();
        for page in ["firmware", "platform"] {
            println!("   {}", format!("target/doc/{page}/index.html").dimmed());
        }
        println!("   {}", "Or run 'cargo xtask doc --open'".dimmed());
    }
    println!();

    Ok(())
}
