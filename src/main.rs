//! docgraph CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use console::style;
use docgraph::cli::{self, Cli};
use docgraph::observability::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.verbose);

    match cli::execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
