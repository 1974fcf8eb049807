#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The solver contract and its two backends.
//!
//! Every backend implements [`Solver`]: find one solution, enumerate all
//! (or up to K) solutions, or test uniqueness. Callers pick a backend
//! through [`SolverAlgorithm`] and the [`create`] factory and never branch
//! on the concrete type.

/// Constraint-propagating backtracking with bitmask domains and MRV.
pub mod backtrack;
/// Exact-cover formulation solved with Knuth's Algorithm X on Dancing Links.
pub mod dlx;

use crate::board::{Board, BoardDimension, BoardError, Grid};
use serde::Serialize;
use std::fmt::Display;

/// The outcome of a single [`Solver::solve`] call.
///
/// `solution` is meaningful only when `solved` is true; on failure it holds
/// the input grid unchanged and `error_message` carries a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResult {
    /// Whether a solution was found.
    pub solved: bool,
    /// The solved grid (row-major), or the input grid on failure.
    pub solution: Grid,
    /// Human identifier of the backend that produced this result.
    pub algorithm: String,
    /// Wall-clock time spent inside the solver, in milliseconds.
    pub time_ms: f64,
    /// Number of search-node entries.
    pub iterations: u64,
    /// Number of abandoned branches.
    pub backtracks: u64,
    /// Diagnostic for `solved == false`; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SolveResult {
    /// Wraps the solution grid back into a [`Board`].
    ///
    /// # Errors
    ///
    /// Propagates [`BoardError`] if the grid disagrees with `dimension`,
    /// which only happens when the result was a failure carrying a
    /// malformed input grid.
    pub fn board(&self, dimension: BoardDimension) -> Result<Board, BoardError> {
        Board::with_dimension(self.solution.clone(), dimension)
    }
}

/// The polymorphic solver contract.
///
/// All operations are pure with respect to the caller's [`Board`]; solvers
/// work on private copies or ephemeral decision structures. Entry points
/// reset any retained state, so repeated calls behave like calls on a
/// freshly constructed solver.
pub trait Solver {
    /// Finds one solution, or reports failure with a diagnostic.
    ///
    /// Malformed or contradictory input yields `solved == false`; the
    /// solver never panics on bad boards and never prints.
    fn solve(&mut self, board: &Board) -> SolveResult;

    /// Enumerates solutions in the backend's deterministic search order.
    ///
    /// `max == 0` means unbounded; otherwise the search stops once `max`
    /// solutions have been collected. The returned vector is fully
    /// realized so callers can index it.
    fn find_all_solutions(&mut self, board: &Board, max: usize) -> Vec<Board>;

    /// True iff exactly one solution exists.
    fn has_unique_solution(&mut self, board: &Board) -> bool {
        self.find_all_solutions(board, 2).len() == 1
    }

    /// Human identifier for reports and result records.
    fn name(&self) -> &'static str;
}

/// Selector for the two interchangeable backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SolverAlgorithm {
    /// Dancing Links (Algorithm X over the exact-cover matrix).
    #[value(name = "dlx")]
    DancingLinks,
    /// Bitmask backtracking with MRV cell selection.
    #[value(name = "backtrack")]
    Backtracking,
}

impl Display for SolverAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DancingLinks => write!(f, "dlx"),
            Self::Backtracking => write!(f, "backtrack"),
        }
    }
}

/// Builds a boxed solver for the selected algorithm.
#[must_use]
pub fn create(algorithm: SolverAlgorithm) -> Box<dyn Solver + Send> {
    match algorithm {
        SolverAlgorithm::DancingLinks => Box::new(dlx::DlxSolver::new()),
        SolverAlgorithm::Backtracking => Box::new(backtrack::BacktrackingSolver::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzles;

    const ALGORITHMS: [SolverAlgorithm; 2] =
        [SolverAlgorithm::DancingLinks, SolverAlgorithm::Backtracking];

    fn classic_board() -> Board {
        Board::new(puzzles::nine_by_nine()).unwrap()
    }

    /// Unique solution of the classic 30-clue 9x9 puzzle.
    fn classic_solution() -> Grid {
        vec![
            vec![5, 3, 4, 6, 7, 8, 9, 1, 2],
            vec![6, 7, 2, 1, 9, 5, 3, 4, 8],
            vec![1, 9, 8, 3, 4, 2, 5, 6, 7],
            vec![8, 5, 9, 7, 6, 1, 4, 2, 3],
            vec![4, 2, 6, 8, 5, 3, 7, 9, 1],
            vec![7, 1, 3, 9, 2, 4, 8, 5, 6],
            vec![9, 6, 1, 5, 3, 7, 2, 8, 4],
            vec![2, 8, 7, 4, 1, 9, 6, 3, 5],
            vec![3, 4, 5, 2, 8, 6, 1, 7, 9],
        ]
    }

    /// A published 17-clue puzzle with a unique solution.
    fn seventeen_clue_board() -> Board {
        let text = "000000010400000000020000000000050407008000300001090000300400200050100000000806000";
        puzzles::parse_puzzle(text).unwrap()
    }

    fn assert_givens_preserved(input: &Board, solution: &Grid) {
        for (r, row) in input.rows().enumerate() {
            for (c, &given) in row.iter().enumerate() {
                if given != 0 {
                    assert_eq!(solution[r][c], given, "clue at ({r}, {c}) was overwritten");
                }
            }
        }
    }

    #[test]
    fn classic_9x9_solved_by_both_backends() {
        let board = classic_board();
        let expected = classic_solution();
        for algorithm in ALGORITHMS {
            let mut solver = create(algorithm);
            let result = solver.solve(&board);
            assert!(result.solved, "{} failed", solver.name());
            assert_eq!(result.solution, expected, "{} disagrees", solver.name());
            assert_givens_preserved(&board, &result.solution);
            assert!(result.board(board.dimension()).unwrap().is_solved());
            assert!(result.error_message.is_none());
        }
    }

    #[test]
    fn classic_9x9_is_unique() {
        let board = classic_board();
        for algorithm in ALGORITHMS {
            let mut solver = create(algorithm);
            assert!(solver.has_unique_solution(&board));
            assert_eq!(solver.find_all_solutions(&board, 0).len(), 1);
        }
    }

    #[test]
    fn empty_9x9_has_many_solutions() {
        let board = Board::new(vec![vec![0; 9]; 9]).unwrap();
        for algorithm in ALGORITHMS {
            let mut solver = create(algorithm);
            let result = solver.solve(&board);
            assert!(result.solved);
            assert!(result.board(board.dimension()).unwrap().is_solved());
            assert!(!solver.has_unique_solution(&board));
            assert_eq!(solver.find_all_solutions(&board, 5).len(), 5);
        }
    }

    #[test]
    fn contradictory_input_fails_cleanly() {
        let mut grid = vec![vec![0; 9]; 9];
        grid[0][1] = 5;
        grid[0][6] = 5;
        let board = Board::new(grid).unwrap();
        assert!(!board.is_valid());
        for algorithm in ALGORITHMS {
            let mut solver = create(algorithm);
            let result = solver.solve(&board);
            assert!(!result.solved, "{} claimed success", solver.name());
            assert!(result.error_message.is_some());
            assert!(solver.find_all_solutions(&board, 10).is_empty());
            assert!(!solver.has_unique_solution(&board));
        }
    }

    #[test]
    fn seventeen_clue_puzzle_is_unique_and_backends_agree() {
        let board = seventeen_clue_board();
        let mut dlx = create(SolverAlgorithm::DancingLinks);
        let mut bt = create(SolverAlgorithm::Backtracking);
        assert!(dlx.has_unique_solution(&board));
        let a = dlx.solve(&board);
        let b = bt.solve(&board);
        assert!(a.solved && b.solved);
        assert_eq!(a.solution, b.solution);
        assert_givens_preserved(&board, &a.solution);
    }

    #[test]
    fn hard_16x16_solves() {
        let board = Board::new(puzzles::sixteen_by_sixteen()).unwrap();
        let mut solver = create(SolverAlgorithm::DancingLinks);
        let result = solver.solve(&board);
        assert!(result.solved);
        assert_givens_preserved(&board, &result.solution);
        assert!(result.board(board.dimension()).unwrap().is_solved());
    }

    #[test]
    fn seeded_25x25_solves() {
        let board = Board::new(puzzles::twenty_five_by_twenty_five()).unwrap();
        let mut solver = create(SolverAlgorithm::DancingLinks);
        let result = solver.solve(&board);
        assert!(result.solved);
        assert_givens_preserved(&board, &result.solution);
        assert!(result.board(board.dimension()).unwrap().is_solved());
    }

    #[test]
    fn all_solutions_bounding_on_4x4() {
        // The empty 4x4 grid has exactly 288 completions.
        let board = Board::new(vec![vec![0; 4]; 4]).unwrap();
        for algorithm in ALGORITHMS {
            let mut solver = create(algorithm);
            for max in [1, 2, 7, 100] {
                assert!(solver.find_all_solutions(&board, max).len() <= max);
            }
            let all = solver.find_all_solutions(&board, 0);
            assert_eq!(all.len(), 288, "{} miscounted", solver.name());
            assert!(all.iter().all(Board::is_solved));
            assert_eq!(solver.find_all_solutions(&board, 288).len(), 288);
        }
    }

    #[test]
    fn repeated_solves_are_deterministic() {
        let board = classic_board();
        for algorithm in ALGORITHMS {
            let mut solver = create(algorithm);
            let first = solver.solve(&board);
            let second = solver.solve(&board);
            assert_eq!(first.solution, second.solution);
            assert_eq!(first.solved, second.solved);
            assert_eq!(first.iterations, second.iterations);
            assert_eq!(first.backtracks, second.backtracks);
        }
    }

    #[test]
    fn solvers_do_not_mutate_the_input() {
        let board = classic_board();
        let snapshot = board.clone();
        for algorithm in ALGORITHMS {
            let mut solver = create(algorithm);
            let _ = solver.solve(&board);
            let _ = solver.find_all_solutions(&board, 2);
            assert_eq!(board, snapshot);
        }
    }
}
