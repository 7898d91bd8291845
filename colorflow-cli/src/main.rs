//! Command-line interface for colorflow.
//!
//! Two subcommands, matching the two halves of the library:
//!
//! - `build`: drive the staged construction of a color index by invoking
//!   the external tool once per remaining stage.
//! - `cluster`: k-means cluster a binary sketch file and print one label
//!   per sketch.
//!
//! Diagnostics go to stderr via `tracing` (filter with `RUST_LOG`); the
//! `build` subcommand can additionally write a JSON run report.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colorflow::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "colorflow", author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a color index by running the staged pipeline.
    Build(BuildArgs),
    /// Cluster a sketch file into a fixed number of groups.
    Cluster(ClusterArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Path prefix of the upstream dataset.
    input_prefix: PathBuf,

    /// Directory holding the external executable.
    #[arg(long, default_value = ".", value_name = "DIR")]
    bin_dir: PathBuf,

    /// K-mer length, passed to the final stage.
    #[arg(short, default_value_t = 31)]
    k: u32,

    /// Minimizer length, passed to the final stage. Must be smaller than k.
    #[arg(short, default_value_t = 17)]
    m: u32,

    /// Scratch directory the stages hand data off through.
    #[arg(long, default_value = ".", value_name = "DIR")]
    tmp_dir: PathBuf,

    /// Print the stage commands without executing them.
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Working-memory budget in gigabytes.
    #[arg(short = 'g', long = "working-mem", default_value_t = 8, value_name = "GB")]
    working_mem: u32,

    /// Stage to start from: invert, sort_unique, permute_unitigs or build.
    #[arg(short = 's', default_value = "invert", value_name = "STAGE")]
    resume_from: Stage,

    /// Stop at the first failing stage instead of running the rest.
    #[arg(long)]
    stop_on_failure: bool,

    /// Write the run report as JSON to this path.
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ClusterArgs {
    /// The sketch file to cluster.
    sketches: PathBuf,

    /// Number of clusters to produce.
    num_clusters: usize,

    /// Write labels here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// RNG seed for reproducible runs.
    #[arg(long, default_value_t = 13)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Build(args) => run_build(args),
        Commands::Cluster(args) => run_cluster(&args),
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    // Relative defaults are resolved once, here; the library never
    // consults the environment.
    let bin_dir = resolve_dot(args.bin_dir)?;

    let policy = if args.stop_on_failure {
        FailurePolicy::FailFast
    } else {
        FailurePolicy::Continue
    };
    let config = PipelineConfig::new(args.input_prefix)
        .with_bin_dir(bin_dir)
        .with_tmp_dir(args.tmp_dir)
        .with_working_mem_gb(args.working_mem)
        .with_params(args.k, args.m)
        .with_resume_from(args.resume_from)
        .with_dry_run(args.dry_run)
        .with_failure_policy(policy);

    let report = PipelineRunner::new().run(&config)?;

    if let Some(path) = args.report_json {
        write_report(&path, &report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }
    Ok(())
}

fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

fn run_cluster(args: &ClusterArgs) -> Result<()> {
    let sketches = SketchSet::read_from_path(&args.sketches)
        .with_context(|| format!("failed to read sketches from {}", args.sketches.display()))?;

    let params = ClusteringParams::new(args.num_clusters).with_seed(args.seed);
    let labels = cluster_sketches(&sketches, &params)?;

    match &args.output {
        Some(path) => {
            let writer = BufWriter::new(
                File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            );
            write_labels(writer, &labels)?;
        }
        None => write_labels(io::stdout().lock(), &labels)?,
    }
    Ok(())
}

fn resolve_dot(dir: PathBuf) -> Result<PathBuf> {
    if dir == Path::new(".") {
        std::env::current_dir().context("cannot resolve the current working directory")
    } else {
        Ok(dir)
    }
}
