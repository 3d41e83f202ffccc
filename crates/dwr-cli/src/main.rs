//! dwr - partial-order planner for dock-worker-robots problems.
//!
//! - `dwr solve <problem>` - search for a plan and print or write it
//! - `dwr check <problem>` - parse and validate a problem without searching

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use dwr_core::Problem;
use dwr_pocl::{PlanExport, PoclPlanner};

mod config;
mod report;

use config::{DwrConfig, OutputFormat};
use report::SolveReport;

#[derive(Parser)]
#[command(name = "dwr")]
#[command(about = "Partial-order causal-link planner for dock-worker-robots problems", version)]
struct Cli {
    /// Config file (defaults to .dwr/config.yaml in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a plan
    Solve {
        /// Problem file
        problem: PathBuf,

        /// Write the plan here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON report instead of the text layout
        #[arg(long)]
        json: bool,

        /// Override the expansion budget
        #[arg(long)]
        max_expansions: Option<usize>,

        /// Override the step ceiling
        #[arg(long)]
        max_steps: Option<usize>,
    },

    /// Parse and validate a problem
    Check {
        /// Problem file
        problem: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if cli.log_json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let mut config = DwrConfig::resolve(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Solve {
            problem,
            output,
            json,
            max_expansions,
            max_steps,
        } => {
            config.apply_overrides(max_expansions, max_steps);
            if json {
                config.output = OutputFormat::Json;
            }
            solve(&problem, output.as_deref(), &config)
        }
        Commands::Check { problem } => check(&problem),
    }
}

fn load_problem(path: &Path) -> Result<Problem> {
    Problem::load(path).with_context(|| format!("Failed to load problem {}", path.display()))
}

fn solve(path: &Path, output: Option<&Path>, config: &DwrConfig) -> Result<()> {
    let problem = load_problem(path)?;
    tracing::info!(
        problem = %path.display(),
        max_expansions = config.planner.max_expansions,
        max_steps = config.planner.max_steps,
        "Solving"
    );

    let planner = PoclPlanner::new().with_config(config.planner);
    let started = Instant::now();
    let result = planner.plan(problem.initial_plan(), &problem.terms);
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let name = path.display().to_string();

    match result {
        Ok(solution) => {
            let export = PlanExport::from_plan(&solution.plan, &problem.terms)
                .context("Solution has cyclic orderings")?;
            tracing::info!(
                steps = solution.plan.operator_steps(),
                expansions = solution.stats.expansions,
                elapsed_ms,
                "Plan found"
            );
            let rendered = match config.output {
                OutputFormat::Text => export.to_string(),
                OutputFormat::Json => {
                    let report = SolveReport::solved(&name, elapsed_ms, solution.stats, export);
                    serde_json::to_string_pretty(&report)? + "\n"
                }
            };
            emit(&rendered, output)
        }
        Err(err) => {
            let partial = err
                .best_partial()
                .and_then(|plan| PlanExport::from_plan(plan, &problem.terms));
            if let Some(plan) = err.best_partial() {
                tracing::info!(
                    steps = plan.operator_steps(),
                    open = plan.open_conditions().len(),
                    threats = plan.threats().len(),
                    "Best partial plan"
                );
            }
            if config.output == OutputFormat::Json {
                if let Some(report) = SolveReport::failed(&name, elapsed_ms, &err, partial) {
                    emit(&(serde_json::to_string_pretty(&report)? + "\n"), output)?;
                }
            }
            Err(anyhow::Error::new(err).context("Planning failed"))
        }
    }
}

fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Plan written");
            Ok(())
        }
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

fn check(path: &Path) -> Result<()> {
    let problem = load_problem(path)?;
    problem
        .initial_plan()
        .validate(&problem.terms)
        .with_context(|| format!("Invalid initial plan in {}", path.display()))?;

    let counts = problem.terms.counts();
    println!("{}", path.display());
    println!(
        "  objects: {} locations, {} robots, {} cranes, {} piles, {} containers",
        counts.locations, counts.robots, counts.cranes, counts.piles, counts.containers
    );
    println!("  initial facts: {}", problem.initial.len());
    println!("  goal facts: {}", problem.goal.len());
    for goal in &problem.goal {
        println!("    {}", goal.display(&problem.terms));
    }
    Ok(())
}
