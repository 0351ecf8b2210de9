use std::io::Write;

use anyhow::{Context, Result};
use sougraph_parse::{SouReader, SouStats, method_names};

use crate::cli::{FqNamesArgs, ParseArgs};

pub fn run_parse(args: &ParseArgs) -> Result<()> {
    let reader = SouReader::from_file(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut stats = SouStats::default();

    for symbol in reader {
        let symbol = symbol
            .with_context(|| format!("failed to parse {}", args.input.display()))?;
        stats.record(&symbol);

        if !args.stats {
            serde_json::to_writer(&mut out, &symbol).context("failed to write symbol")?;
            out.write_all(b"\n")?;
        }
    }

    if args.stats {
        println!("types: {}", stats.types);
        println!("methods: {}", stats.methods);
        println!("symbols: {}", stats.total());
        println!("mean body lines: {:.1}", stats.mean_body_lines());
    }

    Ok(())
}

pub fn run_fq_names(args: &FqNamesArgs) -> Result<()> {
    let names = method_names(&args.input)
        .with_context(|| format!("failed to scan {}", args.input.display()))?;

    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();
    for name in names {
        println!("{name}");
    }

    Ok(())
}
