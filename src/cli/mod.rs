//! Command-line interface for docgraph.
//!
//! - `docgraph graph <ENTRY>` - build the import graph and export it
//! - `docgraph levels <ENTRY>` - show the bottom-up processing order
//! - `docgraph run <ENTRY>` - traverse the graph and run a generator per file
//! - `docgraph dirs [PATH]` - print a directory tree

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub use commands::execute;

use crate::export::ExportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "docgraph",
    version,
    about = "Build a source import graph and process it bottom-up"
)]
pub struct Cli {
    /// Config file (defaults to ./.docgraph.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Artifact output directory
    #[arg(long, global = true, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Exclude matching paths (glob, or `re:` regex). Repeatable.
    #[arg(long = "ignore", global = true, value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the import graph and print it
    Graph(GraphArgs),
    /// List graph levels in processing order
    Levels(LevelsArgs),
    /// Run a generator for every file, dependencies first
    Run(RunArgs),
    /// Print a directory tree
    Dirs(DirsArgs),
}

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Entry file (falls back to `entry` in config or DOCGRAPH_ENTRY)
    #[arg(value_name = "ENTRY")]
    pub entry: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = ExportFormat::Tree)]
    pub format: ExportFormat,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LevelsArgs {
    #[arg(value_name = "ENTRY")]
    pub entry: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(value_name = "ENTRY")]
    pub entry: Option<PathBuf>,

    /// Program (and arguments) run once per file; without it nodes are only
    /// logged
    #[arg(
        long,
        num_args = 1..,
        allow_hyphen_values = true,
        value_name = "PROG"
    )]
    pub command: Vec<String>,

    /// Maximum generators running at once within a level
    #[arg(short = 'j', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Print the progress tree after each level
    #[arg(long)]
    pub progress: bool,

    /// Skip files whose artifact already exists
    #[arg(long)]
    pub skip_existing: bool,
}

#[derive(Args, Debug)]
pub struct DirsArgs {
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_graph_with_format_and_globals() {
        let cli = Cli::try_parse_from([
            "docgraph",
            "graph",
            "src/index.ts",
            "--format",
            "mermaid",
            "--ignore",
            "**/*.test.ts",
            "--ignore",
            "vendor",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.ignore, ["**/*.test.ts", "vendor"]);
        match cli.command {
            Command::Graph(args) => {
                assert_eq!(args.entry, Some(PathBuf::from("src/index.ts")));
                assert_eq!(args.format, ExportFormat::Mermaid);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn graph_format_defaults_to_tree() {
        let cli = Cli::try_parse_from(["docgraph", "graph", "a.ts"]).unwrap();
        match cli.command {
            Command::Graph(args) => assert_eq!(args.format, ExportFormat::Tree),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_collects_command_with_hyphenated_args() {
        let cli = Cli::try_parse_from([
            "docgraph",
            "run",
            "index.ts",
            "-j",
            "4",
            "--skip-existing",
            "--command",
            "node",
            "gen.js",
            "--model",
            "small",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.concurrency, Some(4));
                assert!(args.skip_existing);
                assert!(!args.progress);
                assert_eq!(args.command, ["node", "gen.js", "--model", "small"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn dirs_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["docgraph", "dirs"]).unwrap();
        match cli.command {
            Command::Dirs(args) => assert_eq!(args.path, PathBuf::from(".")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["docgraph", "graph", "a.ts", "-f", "dot"]).is_err());
    }
}
