//! Lattice CLI
//!
//! Ingests a GitLab account into a typed access graph:
//! - `lattice plan` validates configuration and the stage dependency
//!   graph, then prints the execution order without running anything
//! - `lattice run` executes the pipeline and writes a JSONL snapshot,
//!   flushed per completed stage

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lattice_gitlab::steps::all_stages;
use lattice_gitlab::{GitlabClient, GitlabConfig};
use lattice_pipeline::{Pipeline, PipelineError, RunReport, StageStatus};

mod sink;

use sink::JsonlSink;

#[derive(Parser)]
#[command(name = "lattice")]
#[command(author, version, about = "Lattice: GitLab access-graph ingestion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and the stage dependency graph.
    Plan,

    /// Run the ingestion pipeline and write a snapshot.
    Run {
        /// Snapshot path (JSON lines, one entity or relationship each)
        #[arg(short, long, default_value = "lattice-snapshot.jsonl")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan => plan(),
        Commands::Run { out } => run(out).await,
    }
}

fn build_pipeline() -> Result<Pipeline> {
    let config = GitlabConfig::from_env().context("loading GitLab configuration")?;
    let client = Arc::new(GitlabClient::new(&config));
    Ok(Pipeline::with_stages(all_stages(client)))
}

fn plan() -> Result<()> {
    let pipeline = build_pipeline()?;
    let order = pipeline.execution_order()?;

    println!("{}", "execution order".bold());
    for (position, id) in order.iter().enumerate() {
        println!("{:>3}. {}", position + 1, id);
    }
    Ok(())
}

async fn run(out: PathBuf) -> Result<()> {
    let pipeline = build_pipeline()?;
    let mut sink = JsonlSink::create(&out)
        .with_context(|| format!("creating snapshot at {}", out.display()))?;

    match pipeline.run(&mut sink).await {
        Ok(report) => {
            print_report(&report);
            println!(
                "{} snapshot written to {}",
                "ok".green().bold(),
                out.display()
            );
            Ok(())
        }
        Err(PipelineError::RunFailed { report }) => {
            print_report(&report);
            Err(anyhow!("pipeline run failed"))
        }
        Err(err) => Err(err.into()),
    }
}

fn print_report(report: &RunReport) {
    for (id, status) in &report.statuses {
        let line = match status {
            StageStatus::Completed => format!("{} {}", "completed".green(), id),
            StageStatus::Failed { message } => {
                format!("{} {}: {}", "failed".red().bold(), id, message)
            }
            StageStatus::Skipped { blocked_on } => {
                format!("{} {} (blocked on {})", "skipped".yellow(), id, blocked_on)
            }
            other => format!("{:?} {}", other, id),
        };
        println!("{}", line);
    }
    println!(
        "{} entities, {} relationships flushed",
        report.entities_flushed, report.relationships_flushed
    );
}
