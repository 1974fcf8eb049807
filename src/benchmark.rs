//! Micro-benchmark harness for the solver backends.
//!
//! Runs a solver repeatedly on a fixed board and aggregates timing
//! statistics. Two modes:
//!
//! - single-worker: warmups followed by timed runs on one solver instance
//!   (every entry point rebuilds its search state, so a reused instance is
//!   equivalent to a fresh one);
//! - multi-worker: one OS thread per worker, each constructing its own
//!   solver through the factory and sharing the board immutably. The only
//!   cross-thread synchronization is the final join.
//!
//! The harness computes and returns; rendering belongs to the caller.

use crate::board::Board;
use crate::solver::{create, SolveResult, Solver, SolverAlgorithm};
use itertools::Itertools;
use std::num::NonZeroUsize;
use std::time::Instant;

/// Benchmark parameters.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkConfig {
    /// Timed runs per worker (at least 1 is enforced).
    pub runs: usize,
    /// Untimed warmup runs per worker, results discarded.
    pub warmup_runs: usize,
    /// Worker threads (at least 1 is enforced).
    pub num_workers: usize,
    /// Ask the renderer for per-run detail.
    pub verbose: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            runs: 10,
            warmup_runs: 2,
            num_workers: 1,
            verbose: false,
        }
    }
}

/// Aggregate statistics over one worker's timed runs.
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Raw per-run times, in run order.
    pub times_ms: Vec<f64>,
    /// Fastest run.
    pub min_ms: f64,
    /// Slowest run.
    pub max_ms: f64,
    /// Arithmetic mean.
    pub mean_ms: f64,
    /// Sorted middle, or the average of the two middles.
    pub median_ms: f64,
    /// Sample standard deviation (N−1 denominator).
    pub stddev_ms: f64,
    /// Puzzles per second, `1000 / mean_ms`.
    pub throughput: f64,
}

impl RunStats {
    fn from_times(times_ms: Vec<f64>) -> Self {
        let n = times_ms.len();
        if n == 0 {
            return Self {
                times_ms,
                min_ms: 0.0,
                max_ms: 0.0,
                mean_ms: 0.0,
                median_ms: 0.0,
                stddev_ms: 0.0,
                throughput: 0.0,
            };
        }

        let sorted = times_ms.iter().copied().sorted_by(f64::total_cmp).collect_vec();
        let mean_ms = times_ms.iter().sum::<f64>() / n as f64;
        let median_ms = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let stddev_ms = if n > 1 {
            let var = times_ms
                .iter()
                .map(|t| (t - mean_ms).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Self {
            min_ms: sorted[0],
            max_ms: sorted[n - 1],
            mean_ms,
            median_ms,
            stddev_ms,
            throughput: if mean_ms > 0.0 { 1000.0 / mean_ms } else { 0.0 },
            times_ms,
        }
    }
}

/// Single-worker benchmark outcome.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    /// Name of the benchmarked backend.
    pub algorithm: String,
    /// Timing statistics over the timed runs.
    pub stats: RunStats,
    /// The last run's solve result, for rendering the solution.
    pub result: SolveResult,
}

/// One worker's share of a multi-worker benchmark.
#[derive(Debug, Clone)]
pub struct WorkerResult {
    /// Zero-based worker index.
    pub worker_id: usize,
    /// This worker's timing statistics.
    pub stats: RunStats,
    /// This worker's last solve result.
    pub result: SolveResult,
}

/// Multi-worker benchmark outcome.
#[derive(Debug, Clone)]
pub struct MultiWorkerResult {
    /// Name of the benchmarked backend.
    pub algorithm: String,
    /// Per-worker statistics, indexed by worker id.
    pub per_worker: Vec<WorkerResult>,
    /// First worker start to last worker finish.
    pub wall_time_ms: f64,
    /// `workers * runs / wall_time_secs`.
    pub total_throughput: f64,
}

/// The benchmark driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct Benchmark {
    config: BenchmarkConfig,
}

impl Benchmark {
    /// Creates a driver with the given configuration.
    #[must_use]
    pub const fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Number of hardware threads, for `workers = 0` auto-detection.
    #[must_use]
    pub fn hardware_concurrency() -> usize {
        std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }

    /// Runs the single-worker benchmark: warmups, then timed runs on one
    /// reused solver instance.
    #[must_use]
    pub fn run(&self, board: &Board, algorithm: SolverAlgorithm) -> BenchmarkResult {
        let mut solver = create(algorithm);
        let (stats, result) = worker_pass(solver.as_mut(), board, &self.config);
        BenchmarkResult {
            algorithm: solver.name().to_string(),
            stats,
            result,
        }
    }

    /// Runs the multi-worker benchmark. Each worker thread builds its own
    /// solver and runs the full warmup + timed sequence; the board is
    /// shared by reference and never mutated.
    #[must_use]
    pub fn run_multi(&self, board: &Board, algorithm: SolverAlgorithm) -> MultiWorkerResult {
        let workers = self.config.num_workers.max(1);
        let config = self.config;
        let started = Instant::now();

        let per_worker = std::thread::scope(|scope| {
            let handles = (0..workers)
                .map(|worker_id| {
                    scope.spawn(move || {
                        let mut solver = create(algorithm);
                        let (stats, result) = worker_pass(solver.as_mut(), board, &config);
                        WorkerResult {
                            worker_id,
                            stats,
                            result,
                        }
                    })
                })
                .collect_vec();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("benchmark worker panicked"))
                .collect_vec()
        });

        let wall_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let total_runs = workers * config.runs.max(1);
        MultiWorkerResult {
            algorithm: per_worker[0].result.algorithm.clone(),
            per_worker,
            wall_time_ms,
            total_throughput: if wall_time_ms > 0.0 {
                total_runs as f64 / (wall_time_ms / 1000.0)
            } else {
                0.0
            },
        }
    }

    /// Benchmarks each algorithm in turn, single-worker.
    #[must_use]
    pub fn compare(
        &self,
        board: &Board,
        algorithms: &[SolverAlgorithm],
    ) -> Vec<BenchmarkResult> {
        algorithms
            .iter()
            .map(|&algorithm| self.run(board, algorithm))
            .collect()
    }

    /// Benchmarks each algorithm in turn, multi-worker.
    #[must_use]
    pub fn compare_multi(
        &self,
        board: &Board,
        algorithms: &[SolverAlgorithm],
    ) -> Vec<MultiWorkerResult> {
        algorithms
            .iter()
            .map(|&algorithm| self.run_multi(board, algorithm))
            .collect()
    }
}

/// Warmups followed by timed runs on one solver instance.
fn worker_pass(
    solver: &mut (dyn Solver + Send),
    board: &Board,
    config: &BenchmarkConfig,
) -> (RunStats, SolveResult) {
    for _ in 0..config.warmup_runs {
        let _ = solver.solve(board);
    }

    let runs = config.runs.max(1);
    let mut times_ms = Vec::with_capacity(runs);
    let mut last = None;
    for _ in 0..runs {
        let started = Instant::now();
        let result = solver.solve(board);
        times_ms.push(started.elapsed().as_secs_f64() * 1000.0);
        last = Some(result);
    }

    (
        RunStats::from_times(times_ms),
        last.expect("at least one timed run"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn small_board() -> Board {
        let mut grid = vec![vec![0; 4]; 4];
        grid[0][0] = 1;
        grid[1][2] = 3;
        Board::new(grid).unwrap()
    }

    #[test]
    fn stats_on_known_values() {
        let stats = RunStats::from_times(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.mean_ms - 5.0).abs() < 1e-12);
        assert!((stats.median_ms - 4.5).abs() < 1e-12);
        assert!((stats.min_ms - 2.0).abs() < 1e-12);
        assert!((stats.max_ms - 9.0).abs() < 1e-12);
        // Sample standard deviation: sqrt(32 / 7).
        assert!((stats.stddev_ms - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!((stats.throughput - 200.0).abs() < 1e-9);
    }

    #[test]
    fn stats_ordering_invariants() {
        let stats = RunStats::from_times(vec![3.5, 1.25, 2.0, 8.75, 0.5]);
        assert!(stats.min_ms <= stats.median_ms && stats.median_ms <= stats.max_ms);
        assert!(stats.min_ms <= stats.mean_ms && stats.mean_ms <= stats.max_ms);
        assert!(stats.stddev_ms >= 0.0);
        assert!((stats.throughput * stats.mean_ms - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn single_run_has_zero_spread() {
        let stats = RunStats::from_times(vec![4.25]);
        assert!((stats.median_ms - 4.25).abs() < 1e-12);
        assert!((stats.stddev_ms).abs() < 1e-12);
        assert!((stats.min_ms - stats.max_ms).abs() < 1e-12);
    }

    #[test]
    fn single_worker_benchmark_runs_and_solves() {
        let bench = Benchmark::new(BenchmarkConfig {
            runs: 3,
            warmup_runs: 1,
            num_workers: 1,
            verbose: false,
        });
        let result = bench.run(&small_board(), SolverAlgorithm::Backtracking);
        assert_eq!(result.stats.times_ms.len(), 3);
        assert!(result.result.solved);
        assert_eq!(result.algorithm, "Backtracking");
    }

    #[test]
    fn multi_worker_benchmark_is_isolated_per_worker() {
        let bench = Benchmark::new(BenchmarkConfig {
            runs: 2,
            warmup_runs: 0,
            num_workers: 3,
            verbose: false,
        });
        let result = bench.run_multi(&small_board(), SolverAlgorithm::DancingLinks);
        assert_eq!(result.per_worker.len(), 3);
        assert!(result.wall_time_ms > 0.0);
        assert!(result.total_throughput > 0.0);
        for (id, worker) in result.per_worker.iter().enumerate() {
            assert_eq!(worker.worker_id, id);
            assert_eq!(worker.stats.times_ms.len(), 2);
            assert!(worker.result.solved);
        }
    }

    #[test]
    fn compare_covers_every_algorithm() {
        let bench = Benchmark::new(BenchmarkConfig {
            runs: 1,
            warmup_runs: 0,
            num_workers: 1,
            verbose: false,
        });
        let algorithms = [SolverAlgorithm::DancingLinks, SolverAlgorithm::Backtracking];
        let results = bench.compare(&small_board(), &algorithms);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].algorithm, "Dancing Links");
        assert_eq!(results[1].algorithm, "Backtracking");
    }
}
