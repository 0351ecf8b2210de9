use std::fs;

use anyhow::{Context, Result};
use sougraph_fixture::{truncate_to_lines, truncate_with_priorities, verify};

use crate::cli::TruncateArgs;

pub fn run_truncate(args: &TruncateArgs) -> Result<()> {
    let truncated = if args.priority_prefixes.is_empty() {
        truncate_to_lines(&args.input, args.max_lines)
    } else {
        truncate_with_priorities(&args.input, args.max_lines, &args.priority_prefixes)
    }
    .with_context(|| format!("failed to truncate {}", args.input.display()))?;

    fs::write(&args.output, &truncated)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Truncated XML written to: {}", args.output.display());

    match verify(&truncated) {
        Ok(report) => {
            println!("✓ Output is valid XML");
            println!("✓ Root element: <{}>", report.root);
            println!("✓ Number of child elements: {}", report.children);
            println!("✓ Output line count: {}", report.lines);
            Ok(())
        }
        Err(err) => {
            eprintln!("✗ Output XML validation failed: {err}");
            std::process::exit(1);
        }
    }
}
