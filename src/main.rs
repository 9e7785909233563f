use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use conference_scheduler::domain::resource::inventory::InMemoryInventory;
use conference_scheduler::domain::scheduler::scheduler::{PassResult, Scheduler};
use conference_scheduler::domain::time_slot::TimeSlot;
use conference_scheduler::{load_scenario, logger};

/// Allocates the reservation requests of a scenario file in one scheduling pass.
#[derive(Parser, Debug)]
#[command(name = "conference-scheduler")]
#[command(version)]
#[command(about = "Allocates rooms, aliases, recording services and compartments from a resource inventory")]
struct Cli {
    /// Path of the JSON scenario file.
    scenario: String,

    /// Overrides the start of the working interval (unix seconds).
    #[arg(long)]
    start: Option<i64>,

    /// Overrides the end of the working interval (unix seconds).
    #[arg(long)]
    end: Option<i64>,

    /// Writes per-request statistics as CSV to this path.
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Persists successful allocations into the inventory and runs the requests a second time
    /// against the updated inventory.
    #[arg(long)]
    commit: bool,

    /// Prints the reservation tree of every allocated request.
    #[arg(short, long)]
    verbose: bool,
}

fn print_pass(result: &PassResult, verbose: bool) {
    println!("{} {}", "Pass".bold(), result.pass_id);
    for outcome in &result.outcomes {
        match &outcome.result {
            Ok(tree) => {
                println!("  {} {} ({} reservations)", "ALLOCATED".green().bold(), outcome.request_id, tree.len());
                if verbose {
                    for line in tree.describe().lines() {
                        println!("      {}", line);
                    }
                }
            }
            Err(error) => {
                println!("  {} {} ({})", "FAILED".red().bold(), outcome.request_id, error.failure_kind());
                for line in error.report().render().lines() {
                    println!("      {}", line.dimmed());
                }
            }
        }
    }
    println!(
        "{} allocated, {} failed",
        result.statistics.allocated_count().to_string().green(),
        result.statistics.failed_count().to_string().red()
    );
}

fn commit_pass(scheduler: &mut Scheduler<InMemoryInventory>, result: &PassResult) -> usize {
    let mut committed = 0;
    for outcome in &result.outcomes {
        if let Ok(tree) = &outcome.result {
            let identifiers = scheduler.inventory_mut().commit(tree);
            log::info!("Committed request {} as {} reservations.", outcome.request_id, identifiers.len());
            committed += identifiers.len();
        }
    }
    committed
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.stats.is_some());

    let scenario = load_scenario(&cli.scenario).with_context(|| format!("Failed to load scenario '{}'", cli.scenario))?;

    let start = cli.start.unwrap_or(scenario.working_interval.start);
    let end = cli.end.unwrap_or(scenario.working_interval.end);
    let Some(working_interval) = TimeSlot::try_new(start, end) else {
        bail!("Working interval start {} is after its end {}", start, end);
    };

    let requests = scenario.requests;
    let mut scheduler = Scheduler::new(scenario.inventory);

    let mut context = scheduler.create_context(working_interval);
    let result = scheduler.run_pass(&requests, &mut context);
    print_pass(&result, cli.verbose);

    if let Some(path) = &cli.stats {
        result.statistics.write_csv_file(path).with_context(|| format!("Failed to write statistics to '{}'", path.display()))?;
        log::info!("Statistics written to '{}'.", path.display());
    }

    if cli.commit {
        let committed = commit_pass(&mut scheduler, &result);
        println!("{} {} allocations committed", "Commit".bold(), committed);

        let mut context = scheduler.create_context(working_interval);
        let replay = scheduler.run_pass(&requests, &mut context);
        print_pass(&replay, cli.verbose);
    }

    Ok(())
}
