//! bagunion CLI: external-sort bag union of two fixed-width record files.

mod generate;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use bagunion_core::budget::{blocks_for_tuples, MemoryBudget, BLOCK_CAPACITY};
use bagunion_core::config::{EngineConfig, StrategyKind};
use bagunion_core::report::RunReport;
use bagunion_exec::Engine;
use bagunion_io::count_records;

#[derive(Parser)]
#[command(name = "bagunion")]
#[command(about = "Bag union of two record files under a fixed memory budget", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sort both relations and write their bag union (`record:count` lines)
    Run {
        /// First input relation
        #[arg(long)]
        left: PathBuf,

        /// Second input relation
        #[arg(long)]
        right: PathBuf,

        /// Output file for the bag union
        #[arg(short, long)]
        output: PathBuf,

        /// Memory limit in bytes (overrides BAGUNION_MEM_LIMIT_BYTES)
        #[arg(long)]
        memory_limit: Option<u64>,

        /// Scratch directory for run files (overrides BAGUNION_SCRATCH_DIR)
        #[arg(long)]
        scratch_dir: Option<String>,

        /// Merge strategy: kway or pairwise (overrides BAGUNION_STRATEGY)
        #[arg(long)]
        strategy: Option<StrategyKind>,

        /// Buffer union output in memory and write it once at the end
        #[arg(long)]
        buffered: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Externally sort a single relation
    Sort {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        memory_limit: Option<u64>,

        #[arg(long)]
        scratch_dir: Option<String>,

        #[arg(long)]
        strategy: Option<StrategyKind>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count the records (lines) of a file and the blocks they occupy
    Count {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write random student records
    Generate {
        #[arg(short, long)]
        output: PathBuf,

        /// Number of records to write
        #[arg(short = 'n', long, default_value_t = 1_000_000)]
        records: u64,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the record budget and fan-in derived from a memory limit
    Explain {
        #[arg(long)]
        memory_limit: Option<u64>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            left,
            right,
            output,
            memory_limit,
            scratch_dir,
            strategy,
            buffered,
            json,
        } => {
            let config = build_config(memory_limit, scratch_dir, strategy, buffered);
            run_union(&left, &right, &output, config, json)
        }
        Commands::Sort {
            input,
            output,
            memory_limit,
            scratch_dir,
            strategy,
            json,
        } => {
            let config = build_config(memory_limit, scratch_dir, strategy, false);
            run_sort(&input, &output, config, json)
        }
        Commands::Count { input } => count_file(&input),
        Commands::Generate {
            output,
            records,
            seed,
        } => generate_file(&output, records, seed),
        Commands::Explain { memory_limit } => {
            explain(build_config(memory_limit, None, None, false));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Environment first, then CLI flags on top.
fn build_config(
    memory_limit: Option<u64>,
    scratch_dir: Option<String>,
    strategy: Option<StrategyKind>,
    buffered: bool,
) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    apply_overrides(&mut config, memory_limit, scratch_dir, strategy, buffered);
    config
}

fn apply_overrides(
    config: &mut EngineConfig,
    memory_limit: Option<u64>,
    scratch_dir: Option<String>,
    strategy: Option<StrategyKind>,
    buffered: bool,
) {
    if let Some(limit) = memory_limit {
        config.mem_limit_bytes = limit;
    }
    if let Some(dir) = scratch_dir {
        config.scratch_dir = dir;
    }
    if let Some(strategy) = strategy {
        config.strategy = strategy;
    }
    if buffered {
        config.buffered_output = true;
    }
}

fn run_union(
    left: &Path,
    right: &Path,
    output: &Path,
    config: EngineConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(config)?;
    let report = engine.bag_union(left, right, output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✓ Bag union complete");
    println!("  Output: {}", output.display());
    println!("  Distinct tuples: {}", report.metrics.distinct_tuples);
    println!(
        "  Output blocks ({} tuples/block): {}",
        BLOCK_CAPACITY, report.metrics.output_blocks
    );
    print_phases(&report);
    Ok(())
}

fn run_sort(
    input: &Path,
    output: &Path,
    config: EngineConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(config)?;
    let report = engine.sort(input, output)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✓ Sort complete");
    for relation in &report.relations {
        println!("  Sorted: {}", relation.sorted);
        println!("  Records: {}", relation.records);
    }
    print_phases(&report);
    Ok(())
}

fn print_phases(report: &RunReport) {
    for relation in &report.relations {
        println!(
            "  {}: {} records, {} runs, {} merge passes",
            relation.input, relation.records, relation.runs_generated, relation.merge_passes
        );
    }
    for phase in &report.phases {
        println!(
            "  Phase {}: {} ms, {} blocks read, {} blocks written",
            phase.phase, phase.elapsed_ms, phase.io.blocks_read, phase.io.blocks_written
        );
    }
    println!(
        "  Total I/O: {} blocks read, {} blocks written",
        report.io.blocks_read, report.io.blocks_written
    );
}

fn count_file(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let count = count_records(input)?;
    println!("File: {}", input.display());
    println!("Total records : {}", count.records);
    println!("Blocks ({} tuples/block): {}", BLOCK_CAPACITY, count.blocks);
    Ok(())
}

fn generate_file(
    output: &Path,
    records: u64,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let written = generate::write_records(output, records, seed)?;
    println!("Generated {} records into {}", written, output.display());
    Ok(())
}

fn explain(config: EngineConfig) {
    let budget: MemoryBudget = config.budget();
    println!("Memory Budget");
    println!("=============");
    println!(
        "  Memory Limit: {} bytes ({:.2} MB)",
        budget.mem_limit_bytes,
        budget.mem_limit_bytes as f64 / 1_048_576.0
    );
    println!("  Records per Run: {}", budget.records);
    println!(
        "  Blocks per Run: {}",
        blocks_for_tuples(budget.records as u64)
    );
    println!("  Merge Fan-in: {}", budget.fan_in);
    println!("  Strategy: {}", config.strategy);
    println!("  Scratch Dir: {}", config.scratch_dir);
}

#[cfg(test)]
mod tests {
    use super::{apply_overrides, Cli, Commands, EngineConfig, StrategyKind};
    use clap::Parser;

    #[test]
    fn cli_overrides_higher_priority_than_env() {
        let mut config = EngineConfig::from_lookup(|key| match key {
            "BAGUNION_MEM_LIMIT_BYTES" => Some("4096".into()),
            "BAGUNION_STRATEGY" => Some("pairwise".into()),
            _ => None,
        });
        assert_eq!(config.mem_limit_bytes, 4096);

        apply_overrides(&mut config, Some(8192), Some("/tmp/cli".into()), None, true);
        assert_eq!(config.mem_limit_bytes, 8192);
        assert_eq!(config.scratch_dir, "/tmp/cli");
        assert_eq!(config.strategy, StrategyKind::Pairwise);
        assert!(config.buffered_output);
    }

    #[test]
    fn run_arguments_parse() {
        let cli = Cli::try_parse_from([
            "bagunion",
            "run",
            "--left",
            "a.txt",
            "--right",
            "b.txt",
            "-o",
            "out.txt",
            "--strategy",
            "k-way",
            "--memory-limit",
            "1048576",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                strategy,
                memory_limit,
                buffered,
                ..
            } => {
                assert_eq!(strategy, Some(StrategyKind::Kway));
                assert_eq!(memory_limit, Some(1_048_576));
                assert!(!buffered);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let parsed = Cli::try_parse_from(["bagunion", "explain", "--memory-limit", "x"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from([
            "bagunion", "sort", "-i", "a", "-o", "b", "--strategy", "bubble",
        ]);
        assert!(parsed.is_err());
    }
}
