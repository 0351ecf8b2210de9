use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "sougraph",
    version,
    about = "Utilities for the .sou code-graph ingestion pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct CreateIndexesArgs {
    #[arg(long, default_value = ".", help = "Directory holding sougraph.toml")]
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct LinkArgs {
    #[arg(long, default_value = ".", help = "Directory holding sougraph.toml")]
    pub config_dir: PathBuf,

    #[arg(
        long,
        help = "Repository url scoping the queries (overrides graph.repository_url)"
    )]
    pub repository_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ParseArgs {
    #[arg(help = ".sou file to parse")]
    pub input: PathBuf,

    #[arg(long, help = "Print only the summary counters")]
    pub stats: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct FqNamesArgs {
    #[arg(help = ".sou file to scan")]
    pub input: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct TruncateArgs {
    #[arg(help = ".sou file to slice")]
    pub input: PathBuf,

    #[arg(long, short = 'o', help = "Where to write the fixture")]
    pub output: PathBuf,

    #[arg(long, default_value_t = 100, help = "Line budget for the fixture")]
    pub max_lines: usize,

    #[arg(
        long = "priority-prefix",
        value_name = "PREFIX",
        help = "Class name prefix to keep intact (with its methods); repeatable"
    )]
    pub priority_prefixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Create the code-graph indexes and print the resulting catalog
    CreateIndexes(CreateIndexesArgs),
    /// Build the fixed relationship set, reporting timing and created counts
    Link(LinkArgs),
    /// Stream a .sou file as JSON-lines symbol records
    Parse(ParseArgs),
    /// Print the sorted fully-qualified method names of a .sou file
    FqNames(FqNamesArgs),
    /// Slice a .sou file into a small well-formed XML fixture
    Truncate(TruncateArgs),
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn truncate_args_accept_repeated_priority_prefixes() {
        let cli = Cli::try_parse_from([
            "sougraph",
            "truncate",
            "export.sou",
            "--output",
            "fixture.xml",
            "--max-lines",
            "50",
            "--priority-prefix",
            "Foo",
            "--priority-prefix",
            "Bar",
        ])
        .expect("parse truncate args");

        let Commands::Truncate(args) = cli.command else {
            panic!("expected truncate command");
        };
        assert_eq!(args.max_lines, 50);
        assert_eq!(args.priority_prefixes, vec!["Foo", "Bar"]);
        assert_eq!(args.output, std::path::PathBuf::from("fixture.xml"));
    }

    #[test]
    fn truncate_defaults_to_one_hundred_lines() {
        let cli = Cli::try_parse_from(["sougraph", "truncate", "export.sou", "-o", "out.xml"])
            .expect("parse truncate args");

        let Commands::Truncate(args) = cli.command else {
            panic!("expected truncate command");
        };
        assert_eq!(args.max_lines, 100);
        assert!(args.priority_prefixes.is_empty());
    }

    #[test]
    fn link_accepts_repository_url_override() {
        let cli = Cli::try_parse_from([
            "sougraph",
            "link",
            "--repository-url",
            "https://example.com/source.git",
        ])
        .expect("parse link args");

        let Commands::Link(args) = cli.command else {
            panic!("expected link command");
        };
        assert_eq!(
            args.repository_url.as_deref(),
            Some("https://example.com/source.git")
        );
    }

    #[test]
    fn parse_stats_flag_is_off_by_default() {
        let cli = Cli::try_parse_from(["sougraph", "parse", "export.sou"]).expect("parse args");

        let Commands::Parse(args) = cli.command else {
            panic!("expected parse command");
        };
        assert!(!args.stats);
    }
}
