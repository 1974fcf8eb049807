#![allow(clippy::cast_precision_loss)]

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use sudoku_solver::benchmark::{Benchmark, BenchmarkConfig, BenchmarkResult, MultiWorkerResult};
use sudoku_solver::board::Board;
use sudoku_solver::json;
use sudoku_solver::puzzles;
use sudoku_solver::solver::{create, SolveResult, SolverAlgorithm};

/// Defines the command-line interface for the Sudoku solver application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "sudoku_solver", version, about = "A high-performance Sudoku solver")]
pub(crate) struct Cli {
    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Show JSON input format help and exit.
    #[arg(long, global = true, default_value_t = false)]
    pub json_help: bool,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a puzzle from a JSON or plain-text file.
    /// Directories are walked, solving every puzzle file inside.
    Solve {
        /// Path to the puzzle file or directory.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a puzzle provided inline as text
    /// (row format or a flat string, `.`/`0` for empty).
    Text {
        /// The puzzle text.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a built-in test puzzle.
    Builtin {
        /// Puzzle size: 9, 16 or 25.
        #[arg(short, long, default_value_t = 9)]
        size: usize,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Benchmark one algorithm with repeated solves.
    Bench {
        /// Timed runs (per worker in multi-worker mode).
        #[arg(short, long, default_value_t = 10)]
        runs: usize,

        /// Warmup runs, discarded from the statistics.
        #[arg(long, default_value_t = 2)]
        warmup: usize,

        /// Number of parallel workers (0 = auto-detect).
        #[arg(short, long, default_value_t = 1)]
        workers: usize,

        /// Built-in puzzle size to benchmark on.
        #[arg(short, long, default_value_t = 9)]
        size: usize,

        /// Benchmark a puzzle file instead of a built-in.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Compare both algorithms side by side.
    Compare {
        /// Timed runs (per worker in multi-worker mode).
        #[arg(short, long, default_value_t = 10)]
        runs: usize,

        /// Number of parallel workers (0 = auto-detect).
        #[arg(short, long, default_value_t = 1)]
        workers: usize,

        /// Built-in puzzle size to compare on.
        #[arg(short, long, default_value_t = 9)]
        size: usize,

        /// Compare on a puzzle file instead of a built-in.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across subcommands.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Solving algorithm.
    #[arg(short, long, value_enum, default_value_t = SolverAlgorithm::DancingLinks)]
    pub(crate) algorithm: SolverAlgorithm,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub(crate) verbose: bool,

    /// Minimal output: print only the solution grid.
    #[arg(short, long, default_value_t = false)]
    pub(crate) quiet: bool,

    /// Check whether the solution is unique.
    #[arg(short, long, default_value_t = false)]
    pub(crate) unique: bool,

    /// Find all solutions instead of the first.
    #[arg(long, default_value_t = false)]
    pub(crate) solve_all: bool,

    /// Maximum number of solutions for --solve-all (0 = unlimited,
    /// WARNING: an unlimited search may never finish).
    #[arg(long, default_value_t = 100)]
    pub(crate) max_solutions: usize,

    /// Write the solution (or all solutions) to a JSON file.
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,
}

/// Dispatches a parsed command line. Returns the process exit code.
///
/// # Errors
///
/// A diagnostic for I/O failures, malformed puzzles and unsupported
/// options; the caller renders it and exits nonzero.
pub(crate) fn run(cli: Cli) -> Result<i32, String> {
    if cli.json_help {
        print!("{}", json::format_help());
        return Ok(0);
    }

    match cli.command {
        Some(Commands::Solve { path, common }) => solve_path(&path, &common),
        Some(Commands::Text { input, common }) => {
            let board = puzzles::parse_puzzle(&input)?;
            solve_board(&board, &common)
        }
        Some(Commands::Builtin { size, common }) => {
            if !common.quiet {
                println!("Using built-in test puzzle: {}\n", puzzles::description(size));
            }
            let (grid, dimension) = puzzles::by_size(size)?;
            let board = Board::with_dimension(grid, dimension).map_err(|e| e.to_string())?;
            solve_board(&board, &common)
        }
        Some(Commands::Bench {
            runs,
            warmup,
            workers,
            size,
            path,
            common,
        }) => bench(runs, warmup, workers, size, path.as_deref(), &common),
        Some(Commands::Compare {
            runs,
            workers,
            size,
            path,
            common,
        }) => compare(runs, workers, size, path.as_deref(), &common),
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(0)
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| format!("cannot print help: {e}"))?;
            Ok(1)
        }
    }
}

/// Loads a puzzle from a single file, dispatching on the extension:
/// `.json` documents go through the JSON layer, everything else is parsed
/// as plain text.
fn load_board(path: &Path) -> Result<Board, String> {
    if path.extension().is_some_and(|ext| ext == "json") {
        json::load_from_file(path)
    } else {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        puzzles::parse_puzzle(&text)
    }
}

fn is_puzzle_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "json" || ext == "sudoku" || ext == "txt")
}

/// Solves a file, or every puzzle file under a directory.
fn solve_path(path: &Path, common: &CommonOptions) -> Result<i32, String> {
    if !path.is_dir() {
        let board = load_board(path)?;
        if !common.quiet {
            println!("Solving: {}", path.display());
        }
        return solve_board(&board, common);
    }

    let mut exit = 0;
    let mut seen = false;
    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file = entry.path();
        if !file.is_file() || !is_puzzle_file(file) {
            continue;
        }
        seen = true;
        if !common.quiet {
            println!("Solving: {}", file.display());
        }
        let board = load_board(file)?;
        exit = exit.max(solve_board(&board, common)?);
    }

    if seen {
        Ok(exit)
    } else {
        Err(format!("no puzzle files found under {}", path.display()))
    }
}

/// The shared solve flow: show the input, run the selected mode, render
/// and optionally save the outcome.
fn solve_board(board: &Board, common: &CommonOptions) -> Result<i32, String> {
    if !common.quiet {
        println!("Input Puzzle:");
        print!("{board}");
        if let Some(name) = board.name() {
            println!("Name: {name}");
        }
        if let Some(difficulty) = board.difficulty() {
            println!("Difficulty: {difficulty}");
        }
        println!("Size: {0}x{0}", board.size());
        println!("Empty cells: {}", board.count_empty());
        println!("Fill ratio: {:.1}%\n", board.fill_ratio() * 100.0);
    }

    if !board.is_valid() {
        return Err("input puzzle is invalid".to_string());
    }

    if common.solve_all {
        return solve_all(board, common);
    }

    let mut solver = create(common.algorithm);
    if !common.quiet {
        println!("Solving with {}...", solver.name());
    }
    let result = solver.solve(board);

    if common.quiet {
        if result.solved {
            let solution = result.board(board.dimension()).map_err(|e| e.to_string())?;
            println!("{}", solution.compact());
        }
    } else {
        print_result(&result);
        if result.solved {
            let solution = result.board(board.dimension()).map_err(|e| e.to_string())?;
            println!("\nSolution:");
            print!("{solution}");
        }
    }

    if result.solved && common.unique {
        if !common.quiet {
            println!("\nChecking uniqueness...");
        }
        if solver.has_unique_solution(board) {
            println!("Solution is UNIQUE");
        } else {
            println!("Multiple solutions exist");
        }
    }

    if result.solved {
        if let Some(output) = &common.output {
            json::save_solution_to_file(board, &result, output)?;
            if !common.quiet {
                println!("\nSolution saved to: {}", output.display());
            }
        }
    }

    Ok(i32::from(!result.solved))
}

/// The `--solve-all` flow: enumerate up to `max_solutions` completions.
fn solve_all(board: &Board, common: &CommonOptions) -> Result<i32, String> {
    let mut solver = create(common.algorithm);
    let limit = common.max_solutions;

    if !common.quiet {
        if limit > 0 {
            println!("Finding all solutions (max: {limit})...");
        } else {
            println!("Finding all solutions (UNLIMITED)...");
        }
    }

    let started = Instant::now();
    let solutions = solver.find_all_solutions(board, limit);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    println!("\n=== All Solutions Result ===");
    print!("Solutions found: {}", solutions.len());
    if limit > 0 && solutions.len() >= limit {
        print!(" (limit reached)");
    }
    println!();
    println!("Time: {elapsed_ms:.2} ms");

    let shown = solutions.len().min(3);
    for (i, solution) in solutions.iter().take(shown).enumerate() {
        println!("\nSolution #{}:", i + 1);
        print!("{solution}");
    }
    if solutions.len() > shown {
        println!("\n... and {} more solutions", solutions.len() - shown);
    }

    if !solutions.is_empty() {
        if let Some(output) = &common.output {
            json::save_all_solutions_to_file(board, &solutions, elapsed_ms, output)?;
            println!("\nAll solutions saved to: {}", output.display());
        }
    }

    Ok(i32::from(solutions.is_empty()))
}

/// Resolves the benchmark input: an explicit file beats the built-in.
fn bench_board(size: usize, path: Option<&Path>) -> Result<Board, String> {
    match path {
        Some(path) => load_board(path),
        None => {
            let (grid, dimension) = puzzles::by_size(size)?;
            Board::with_dimension(grid, dimension).map_err(|e| e.to_string())
        }
    }
}

fn bench_config(runs: usize, warmup: usize, workers: usize, verbose: bool) -> BenchmarkConfig {
    BenchmarkConfig {
        runs: runs.max(1),
        warmup_runs: warmup,
        num_workers: if workers == 0 {
            Benchmark::hardware_concurrency()
        } else {
            workers
        },
        verbose,
    }
}

fn bench(
    runs: usize,
    warmup: usize,
    workers: usize,
    size: usize,
    path: Option<&Path>,
    common: &CommonOptions,
) -> Result<i32, String> {
    let board = bench_board(size, path)?;
    if !board.is_valid() {
        return Err("input puzzle is invalid".to_string());
    }

    let config = bench_config(runs, warmup, workers, common.verbose);
    let bench = Benchmark::new(config);

    if config.num_workers > 1 {
        if !common.quiet {
            println!("Running multi-threaded benchmark...");
            println!("  Workers: {}", config.num_workers);
            println!("  Runs per worker: {}", config.runs);
            println!("  Total runs: {}\n", config.num_workers * config.runs);
        }
        let result = bench.run_multi(&board, common.algorithm);
        print_multi_result(&result, config.verbose);
    } else {
        if !common.quiet {
            println!("Running benchmark ({} iterations)...\n", config.runs);
        }
        let result = bench.run(&board, common.algorithm);
        print_benchmark_result(&result, config.verbose);
    }
    Ok(0)
}

fn compare(
    runs: usize,
    workers: usize,
    size: usize,
    path: Option<&Path>,
    common: &CommonOptions,
) -> Result<i32, String> {
    let board = bench_board(size, path)?;
    if !board.is_valid() {
        return Err("input puzzle is invalid".to_string());
    }

    let algorithms = [SolverAlgorithm::DancingLinks, SolverAlgorithm::Backtracking];
    let config = bench_config(runs, 2, workers, common.verbose);
    let bench = Benchmark::new(config);

    if config.num_workers > 1 {
        if !common.quiet {
            println!(
                "Comparing algorithms (multi-threaded: {} workers)...\n",
                config.num_workers
            );
        }
        let results = bench.compare_multi(&board, &algorithms);
        print_multi_comparison(&results);
    } else {
        if !common.quiet {
            println!("Comparing algorithms...\n");
        }
        let results = bench.compare(&board, &algorithms);
        if !common.quiet {
            for result in &results {
                if result.result.solved {
                    if let Ok(solution) = result.result.board(board.dimension()) {
                        println!("Solution: {}", result.algorithm);
                        print!("{solution}");
                        println!();
                    }
                }
            }
        }
        print_comparison(&results);
    }
    Ok(0)
}

/// Helper to print a single statistic line in a formatted table row.
fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<24} {value:>22}  |");
}

/// Prints a solve result in the standard report shape.
fn print_result(result: &SolveResult) {
    println!("\n=== Solution Result ===");
    if result.solved {
        println!("Status: SOLVED");
    } else {
        println!("Status: FAILED");
        if let Some(message) = &result.error_message {
            println!("Error: {message}");
        }
    }
    println!("Algorithm: {}", result.algorithm);
    if result.time_ms < 1.0 {
        println!(
            "Time: {:.6} ms ({:.3} us)",
            result.time_ms,
            result.time_ms * 1000.0
        );
    } else {
        println!("Time: {:.6} ms", result.time_ms);
    }
    println!("Iterations: {}", result.iterations);
    println!("Backtracks: {}", result.backtracks);
}

fn print_benchmark_result(result: &BenchmarkResult, verbose: bool) {
    println!(
        "==================[ Benchmark: {} ]==================",
        result.algorithm
    );
    let stats = &result.stats;
    stat_line("Runs", stats.times_ms.len());
    stat_line("Min (ms)", format!("{:.4}", stats.min_ms));
    stat_line("Max (ms)", format!("{:.4}", stats.max_ms));
    stat_line("Mean (ms)", format!("{:.4}", stats.mean_ms));
    stat_line("Median (ms)", format!("{:.4}", stats.median_ms));
    stat_line("Stddev (ms)", format!("{:.4}", stats.stddev_ms));
    stat_line("Throughput (puzzles/s)", format!("{:.2}", stats.throughput));
    println!("=====================================================================");

    if verbose {
        for (i, time) in stats.times_ms.iter().enumerate() {
            println!("  run {:>3}: {time:.4} ms", i + 1);
        }
    }

    println!("\n=== Performance Summary ===");
    println!("  Throughput: {:.2} puzzles/sec", stats.throughput);
    println!("  Avg per puzzle: {:.4} ms", stats.mean_ms);
    let threads = Benchmark::hardware_concurrency();
    if threads > 1 {
        println!("\n  Tip: Use -w 0 for a multi-threaded benchmark ({threads} threads available)");
    }
}

fn print_multi_result(result: &MultiWorkerResult, verbose: bool) {
    println!(
        "=============[ Multi-worker Benchmark: {} ]=============",
        result.algorithm
    );
    for worker in &result.per_worker {
        stat_line(
            &format!("Worker {} mean (ms)", worker.worker_id),
            format!("{:.4}", worker.stats.mean_ms),
        );
        if verbose {
            stat_line(
                &format!("Worker {} stddev (ms)", worker.worker_id),
                format!("{:.4}", worker.stats.stddev_ms),
            );
        }
    }
    stat_line("Wall time (ms)", format!("{:.2}", result.wall_time_ms));
    stat_line(
        "Total throughput (p/s)",
        format!("{:.2}", result.total_throughput),
    );
    println!("=====================================================================");

    let total_runs: usize = result
        .per_worker
        .iter()
        .map(|w| w.stats.times_ms.len())
        .sum();
    println!("\n=== Performance Summary ===");
    println!("  Throughput: {:.2} puzzles/sec", result.total_throughput);
    println!("  Total Time: {:.2} ms", result.wall_time_ms);
    if total_runs > 0 {
        println!(
            "  Avg per puzzle: {:.4} ms",
            result.wall_time_ms / total_runs as f64
        );
    }
}

fn print_comparison(results: &[BenchmarkResult]) {
    println!("========================[ Algorithm Comparison ]=======================");
    println!(
        "| {:<18} | {:>10} | {:>11} | {:>10} | {:>12} |",
        "Algorithm", "Mean (ms)", "Median (ms)", "Min (ms)", "Puzzles/sec"
    );
    for result in results {
        println!(
            "| {:<18} | {:>10.4} | {:>11.4} | {:>10.4} | {:>12.2} |",
            result.algorithm,
            result.stats.mean_ms,
            result.stats.median_ms,
            result.stats.min_ms,
            result.stats.throughput,
        );
    }
    println!("=======================================================================");
}

fn print_multi_comparison(results: &[MultiWorkerResult]) {
    println!("==================[ Algorithm Comparison (multi-worker) ]==============");
    println!(
        "| {:<18} | {:>8} | {:>14} | {:>16} |",
        "Algorithm", "Workers", "Wall time (ms)", "Total puzzles/s"
    );
    for result in results {
        println!(
            "| {:<18} | {:>8} | {:>14.2} | {:>16.2} |",
            result.algorithm,
            result.per_worker.len(),
            result.wall_time_ms,
            result.total_throughput,
        );
    }
    println!("=======================================================================");
}
