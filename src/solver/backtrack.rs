//! Constraint-propagating backtracking solver.
//!
//! The search keeps one bitmask per row, column and box with bit `v - 1`
//! set iff digit `v` is already placed in that unit. The candidate set of
//! an empty cell is the complement of the union of its three unit masks,
//! restricted to the low N bits, so computing it is three ORs and a NOT.
//!
//! Cell selection uses the MRV (minimum remaining values) heuristic with
//! ties broken in row-major scan order; candidate values are tried from
//! the least significant set bit upwards. Both orders are deterministic,
//! so the same board always yields the same solution sequence.

use crate::board::{Board, BoardDimension, Grid};
use crate::solver::{SolveResult, Solver};
use std::time::Instant;

/// The backtracking backend. Holds only the counters that outlive a call;
/// all search state is rebuilt per invocation.
#[derive(Debug, Default)]
pub struct BacktrackingSolver {
    iterations: u64,
    backtracks: u64,
}

/// Ephemeral search state: the working grid plus the three mask families.
#[derive(Debug)]
struct Search {
    dim: BoardDimension,
    grid: Grid,
    all: u64,
    row_mask: Vec<u64>,
    col_mask: Vec<u64>,
    box_mask: Vec<u64>,
    iterations: u64,
    backtracks: u64,
}

impl Search {
    /// Seeds the masks from the clues, rejecting any clue that conflicts
    /// with an earlier one.
    fn seed(board: &Board) -> Result<Self, String> {
        let dim = board.dimension();
        let n = dim.size;
        let mut search = Self {
            dim,
            grid: board.grid().clone(),
            all: if n == 64 { u64::MAX } else { (1u64 << n) - 1 },
            row_mask: vec![0; n],
            col_mask: vec![0; n],
            box_mask: vec![0; n],
            iterations: 0,
            backtracks: 0,
        };

        for r in 0..n {
            for c in 0..n {
                let value = search.grid[r][c];
                if value == 0 {
                    continue;
                }
                let bit = 1u64 << (value - 1);
                let b = dim.box_of(r, c);
                if search.row_mask[r] & bit != 0
                    || search.col_mask[c] & bit != 0
                    || search.box_mask[b] & bit != 0
                {
                    return Err(format!("contradictory clue {value} at ({r}, {c})"));
                }
                search.row_mask[r] |= bit;
                search.col_mask[c] |= bit;
                search.box_mask[b] |= bit;
            }
        }
        Ok(search)
    }

    /// MRV selection: the empty cell with the fewest candidates, ties
    /// broken by row-major scan order. `None` means the grid is complete.
    fn select_cell(&self) -> Option<(usize, usize, u64)> {
        let n = self.dim.size;
        let mut best: Option<(usize, usize, u64)> = None;
        let mut best_count = u32::MAX;

        for r in 0..n {
            for c in 0..n {
                if self.grid[r][c] != 0 {
                    continue;
                }
                let candidates = !(self.row_mask[r]
                    | self.col_mask[c]
                    | self.box_mask[self.dim.box_of(r, c)])
                    & self.all;
                let count = candidates.count_ones();
                if count < best_count {
                    best = Some((r, c, candidates));
                    best_count = count;
                    if count == 0 {
                        return best;
                    }
                }
            }
        }
        best
    }

    fn place(&mut self, row: usize, col: usize, value: usize) {
        let bit = 1u64 << (value - 1);
        self.grid[row][col] = value;
        self.row_mask[row] |= bit;
        self.col_mask[col] |= bit;
        self.box_mask[self.dim.box_of(row, col)] |= bit;
    }

    fn unplace(&mut self, row: usize, col: usize, value: usize) {
        let bit = 1u64 << (value - 1);
        self.grid[row][col] = 0;
        self.row_mask[row] &= !bit;
        self.col_mask[col] &= !bit;
        self.box_mask[self.dim.box_of(row, col)] &= !bit;
    }

    /// Depth-first search for the first completion. Returns true once the
    /// grid is complete; the winning values are left in place.
    fn solve_first(&mut self) -> bool {
        self.iterations += 1;
        let Some((row, col, candidates)) = self.select_cell() else {
            return true;
        };

        let mut values = candidates;
        while values != 0 {
            let value = values.trailing_zeros() as usize + 1;
            values &= values - 1;
            self.place(row, col, value);
            if self.solve_first() {
                return true;
            }
            self.unplace(row, col, value);
        }
        self.backtracks += 1;
        false
    }

    /// Exhaustive search that snapshots every completion. Returns true
    /// once `max` solutions have been collected (`max == 0` never stops).
    fn enumerate(&mut self, results: &mut Vec<Grid>, max: usize) -> bool {
        self.iterations += 1;
        let Some((row, col, candidates)) = self.select_cell() else {
            results.push(self.grid.clone());
            return max > 0 && results.len() >= max;
        };

        let mut values = candidates;
        let mut done = false;
        while values != 0 && !done {
            let value = values.trailing_zeros() as usize + 1;
            values &= values - 1;
            self.place(row, col, value);
            done = self.enumerate(results, max);
            self.unplace(row, col, value);
        }
        if !done {
            self.backtracks += 1;
        }
        done
    }
}

impl BacktrackingSolver {
    /// Creates a solver with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn failure(&self, board: &Board, message: String, started: Instant) -> SolveResult {
        SolveResult {
            solved: false,
            solution: board.grid().clone(),
            algorithm: self.name().to_string(),
            time_ms: started.elapsed().as_secs_f64() * 1000.0,
            iterations: self.iterations,
            backtracks: self.backtracks,
            error_message: Some(message),
        }
    }
}

impl Solver for BacktrackingSolver {
    fn solve(&mut self, board: &Board) -> SolveResult {
        let started = Instant::now();
        self.iterations = 0;
        self.backtracks = 0;

        let mut search = match Search::seed(board) {
            Ok(search) => search,
            Err(message) => return self.failure(board, message, started),
        };

        let solved = search.solve_first();
        self.iterations = search.iterations;
        self.backtracks = search.backtracks;

        SolveResult {
            solved,
            solution: if solved {
                search.grid
            } else {
                board.grid().clone()
            },
            algorithm: self.name().to_string(),
            time_ms: started.elapsed().as_secs_f64() * 1000.0,
            iterations: self.iterations,
            backtracks: self.backtracks,
            error_message: if solved {
                None
            } else {
                Some("puzzle has no solution".to_string())
            },
        }
    }

    fn find_all_solutions(&mut self, board: &Board, max: usize) -> Vec<Board> {
        self.iterations = 0;
        self.backtracks = 0;

        let Ok(mut search) = Search::seed(board) else {
            return Vec::new();
        };

        let mut grids = Vec::new();
        search.enumerate(&mut grids, max);
        self.iterations = search.iterations;
        self.backtracks = search.backtracks;

        let dim = board.dimension();
        grids
            .into_iter()
            .map(|grid| {
                Board::with_dimension(grid, dim).expect("search produced a malformed grid")
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "Backtracking"
    }
}
