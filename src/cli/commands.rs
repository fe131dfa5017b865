//! Command execution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{Cli, Command, DirsArgs, GraphArgs, LevelsArgs, RunArgs};
use crate::config::{load_config, DocGraphConfig};
use crate::error::{DocGraphError, Result};
use crate::export::{
    render_directory, render_json, render_levels, render_mermaid, render_tree, ExportFormat,
};
use crate::generate::{CommandGenerator, DryRunGenerator, Generator};
use crate::graph::{
    DependencyGraph, LevelMap, TraversalEngine, TraversalOptions, TraversalReport,
};

/// Run the parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let project_dir = std::env::current_dir()?;
    let mut config = load_config(cli.config.as_deref(), &project_dir)?;
    if let Some(out_dir) = cli.out_dir {
        config.out_dir = out_dir;
    }
    config.ignore.extend(cli.ignore);

    match cli.command {
        Command::Graph(args) => graph(args, &config, &project_dir).await,
        Command::Levels(args) => levels(args, &config, &project_dir).await,
        Command::Run(args) => run(args, config, &project_dir).await,
        Command::Dirs(args) => dirs(args, &config),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn graph(args: GraphArgs, config: &DocGraphConfig, project_dir: &Path) -> Result<()> {
    let graph = build(args.entry, config, project_dir).await?;

    let color = args.output.is_none() && console::colors_enabled();
    let rendered = match args.format {
        ExportFormat::Tree => render_tree(&graph, color),
        ExportFormat::Mermaid => render_mermaid(&graph),
        ExportFormat::Json => render_json(&graph)? + "\n",
    };

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, rendered).await?;
            eprintln!(
                "{} {}",
                style("Graph written to").green(),
                path.display()
            );
        }
        None => {
            if args.format == ExportFormat::Tree {
                println!("{}", style("Dependency Graph:").bold().green());
            }
            print!("{}", rendered);
        }
    }
    Ok(())
}

async fn levels(args: LevelsArgs, config: &DocGraphConfig, project_dir: &Path) -> Result<()> {
    let graph = build(args.entry, config, project_dir).await?;
    let levels = LevelMap::compute(&graph);
    print!("{}", render_levels(&graph, &levels));
    Ok(())
}

async fn run(args: RunArgs, mut config: DocGraphConfig, project_dir: &Path) -> Result<()> {
    if args.concurrency.is_some() {
        config.traversal.concurrency = args.concurrency;
    }
    config.traversal.show_progress |= args.progress;
    config.traversal.skip_existing |= args.skip_existing;
    config.validate()?;

    let mut graph = build(args.entry, &config, project_dir).await?;

    let generator: Box<dyn Generator> = match CommandGenerator::from_argv(&args.command) {
        Some(command) => {
            tracing::info!("Running {} for each file", command.program());
            Box::new(command)
        }
        None => Box::new(DryRunGenerator),
    };

    let options = config.traversal_options();
    let bar = if options.show_progress {
        ProgressBar::hidden()
    } else {
        progress_bar(pending_count(&mut graph, &options) as u64)
    };

    let engine = TraversalEngine::new(options);
    let report = engine
        .traverse(&mut graph, |node| {
            let bar = bar.clone();
            let name = node.name.clone();
            let pending = generator.generate(node);
            async move {
                let outcome = pending.await;
                bar.set_message(name);
                bar.inc(1);
                outcome
            }
        })
        .await;
    bar.finish_and_clear();

    summarize(&report, &graph)
}

fn dirs(args: DirsArgs, config: &DocGraphConfig) -> Result<()> {
    let ignore = config.ignore_matcher()?;
    let rendered = render_directory(&args.path, &ignore, console::colors_enabled())?;
    print!("{}", rendered);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn build(
    entry: Option<PathBuf>,
    config: &DocGraphConfig,
    project_dir: &Path,
) -> Result<DependencyGraph> {
    let entry = entry.or_else(|| config.entry.clone()).ok_or_else(|| {
        DocGraphError::Config(
            "no entry file: pass ENTRY, set `entry` in the config or DOCGRAPH_ENTRY".into(),
        )
    })?;
    let entry = project_dir.join(entry);
    if !entry.is_file() {
        return Err(DocGraphError::Config(format!(
            "entry file not found: {}",
            entry.display()
        )));
    }
    config.graph_builder(project_dir)?.build(&entry).await
}

/// Nodes the traversal will actually dispatch. With `skip_existing` the
/// artifacts on disk are marked up front so the bar length matches.
fn pending_count(graph: &mut DependencyGraph, options: &TraversalOptions) -> usize {
    if options.skip_existing {
        graph.mark_existing_artifacts();
    }
    graph.len() - graph.generated_count()
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn summarize(report: &TraversalReport, graph: &DependencyGraph) -> Result<()> {
    eprintln!(
        "{} {} processed, {} skipped, {}/{} files generated",
        style("Done:").bold(),
        report.processed,
        report.skipped,
        graph.generated_count(),
        graph.len()
    );
    if report.is_success() {
        return Ok(());
    }
    for failure in &report.failures {
        eprintln!(
            "  {} {} (level {}): {}",
            style("✗").red(),
            failure.path.display(),
            failure.level,
            failure.message
        );
    }
    Err(DocGraphError::Other(format!(
        "{} file(s) failed; rerun to retry them",
        report.failures.len()
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
