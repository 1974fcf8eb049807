//! Dancing Links solver: Sudoku as exact cover, searched with Knuth's
//! Algorithm X.
//!
//! An N×N board maps to a 0/1 matrix with `4N²` columns (one per
//! constraint) and up to `N³` rows (one per candidate placement). The four
//! constraint families, in canonical column order:
//!
//! 1. cell `(r, c)` holds some digit,
//! 2. row `r` contains digit `v`,
//! 3. column `c` contains digit `v`,
//! 4. box `b` contains digit `v`.
//!
//! A candidate `(r, c, v)` satisfies exactly one column of each family, so
//! every matrix row has exactly four 1-nodes. The matrix lives in an index
//! arena: nodes are `Vec` slots linked by indices in two circular
//! dimensions, which sidesteps the aliasing a pointer-linked toroidal
//! structure would need. Cover and uncover are pure index manipulation and
//! strict mirror images, so a cover/uncover pair leaves the arena
//! bit-identical.
//!
//! Pre-filled clues are applied before the search by covering the four
//! columns of their candidate row; the covered headers go onto a stack so
//! the whole pre-search state can be unwound afterwards.

use crate::board::{Board, BoardDimension, Grid};
use crate::solver::{SolveResult, Solver};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::time::Instant;

/// The root sentinel's index in the arena.
const ROOT: usize = 0;

/// One node of the toroidal matrix. Column headers are nodes too; their
/// `column` field points at themselves and their `row_id` is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    left: usize,
    right: usize,
    up: usize,
    down: usize,
    /// Arena index of this node's column header.
    column: usize,
    /// Candidate id `(r * n + c) * n + (v - 1)`.
    row_id: usize,
}

/// The exact-cover matrix for one solve invocation.
///
/// Owned exclusively by that invocation; the arena is released when the
/// matrix is dropped on return.
struct Matrix {
    dim: BoardDimension,
    nodes: Vec<Node>,
    /// Live 1-node count per column, indexed by header index.
    sizes: Vec<usize>,
    /// First node of each candidate row, keyed by candidate id. Used to
    /// locate given-clue rows at pre-search cover time.
    row_index: FxHashMap<usize, usize>,
    /// Headers covered for the givens, in cover order (LIFO unwind).
    given_covers: Vec<usize>,
}

impl Matrix {
    /// Builds the matrix for `board`: root, `4N²` headers in canonical
    /// order, and one 4-node row per candidate placement compatible with
    /// the clues.
    ///
    /// # Errors
    ///
    /// A diagnostic when the arena reservation fails.
    fn build(board: &Board) -> Result<Self, String> {
        let dim = board.dimension();
        let n = dim.size;
        let columns = 4 * n * n;

        let candidates: usize = board
            .rows()
            .flat_map(|row| row.iter())
            .map(|&cell| if cell == 0 { n } else { 1 })
            .sum();
        let node_count = 1 + columns + 4 * candidates;

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(node_count)
            .map_err(|_| format!("resource exhausted: cover matrix needs {node_count} nodes"))?;

        // Root and header ring. Headers self-link vertically until rows
        // arrive.
        nodes.push(Node {
            left: columns,
            right: if columns == 0 { ROOT } else { 1 },
            up: ROOT,
            down: ROOT,
            column: ROOT,
            row_id: usize::MAX,
        });
        for header in 1..=columns {
            nodes.push(Node {
                left: header - 1,
                right: if header == columns { ROOT } else { header + 1 },
                up: header,
                down: header,
                column: header,
                row_id: usize::MAX,
            });
        }

        let mut matrix = Self {
            dim,
            nodes,
            sizes: vec![0; columns + 1],
            row_index: FxHashMap::default(),
            given_covers: Vec::new(),
        };

        for (r, row) in board.rows().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                for v in 1..=n {
                    if cell == 0 || cell == v {
                        matrix.append_row(r, c, v);
                    }
                }
            }
        }
        Ok(matrix)
    }

    fn candidate_id(&self, r: usize, c: usize, v: usize) -> usize {
        let n = self.dim.size;
        (r * n + c) * n + (v - 1)
    }

    /// The four headers a candidate `(r, c, v)` satisfies, in canonical
    /// family order.
    fn columns_of(&self, r: usize, c: usize, v: usize) -> [usize; 4] {
        let n = self.dim.size;
        let b = self.dim.box_of(r, c);
        [
            1 + r * n + c,
            1 + n * n + r * n + (v - 1),
            1 + 2 * n * n + c * n + (v - 1),
            1 + 3 * n * n + b * n + (v - 1),
        ]
    }

    /// Appends the 4-node row for candidate `(r, c, v)`: each node is
    /// linked to the bottom of its column's vertical ring and the four
    /// nodes form a horizontal cycle.
    fn append_row(&mut self, r: usize, c: usize, v: usize) {
        let headers = self.columns_of(r, c, v);
        let row_id = self.candidate_id(r, c, v);
        let base = self.nodes.len();
        let row: SmallVec<[usize; 4]> = (0..headers.len()).map(|i| base + i).collect();

        for (i, &header) in headers.iter().enumerate() {
            let index = row[i];
            let above = self.nodes[header].up;
            self.nodes.push(Node {
                left: row[(i + 3) % 4],
                right: row[(i + 1) % 4],
                up: above,
                down: header,
                column: header,
                row_id,
            });
            self.nodes[above].down = index;
            self.nodes[header].up = index;
            self.sizes[header] += 1;
        }
        self.row_index.insert(row_id, base);
    }

    /// Covers column `header`: unlink it from the header ring, then unlink
    /// every row of its vertical ring from all other columns.
    fn cover(&mut self, header: usize) {
        let Node { left, right, .. } = self.nodes[header];
        self.nodes[left].right = right;
        self.nodes[right].left = left;

        let mut row = self.nodes[header].down;
        while row != header {
            let mut j = self.nodes[row].right;
            while j != row {
                let Node { up, down, column, .. } = self.nodes[j];
                self.nodes[up].down = down;
                self.nodes[down].up = up;
                self.sizes[column] -= 1;
                j = self.nodes[j].right;
            }
            row = self.nodes[row].down;
        }
    }

    /// Exact inverse of [`Matrix::cover`], relinking in reverse order.
    fn uncover(&mut self, header: usize) {
        let mut row = self.nodes[header].up;
        while row != header {
            let mut j = self.nodes[row].left;
            while j != row {
                let Node { up, down, column, .. } = self.nodes[j];
                self.sizes[column] += 1;
                self.nodes[up].down = j;
                self.nodes[down].up = j;
                j = self.nodes[j].left;
            }
            row = self.nodes[row].up;
        }

        let Node { left, right, .. } = self.nodes[header];
        self.nodes[left].right = header;
        self.nodes[right].left = header;
    }

    /// Whether the candidate row starting at `first` is still linked into
    /// its cell column's vertical ring.
    fn row_alive(&self, first: usize) -> bool {
        let header = self.nodes[first].column;
        let mut i = self.nodes[header].down;
        while i != header {
            if i == first {
                return true;
            }
            i = self.nodes[i].down;
        }
        false
    }

    /// Selects the rows of all given clues by covering their columns,
    /// recording each cover for the later unwind.
    ///
    /// # Errors
    ///
    /// A diagnostic naming the first clue whose row was already unlinked
    /// by an earlier, conflicting given.
    fn apply_givens(&mut self, board: &Board) -> Result<(), String> {
        for (r, row) in board.rows().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v == 0 {
                    continue;
                }
                let first = self.row_index[&self.candidate_id(r, c, v)];
                if !self.row_alive(first) {
                    return Err(format!("contradictory clue {v} at ({r}, {c})"));
                }
                let mut j = first;
                loop {
                    let header = self.nodes[j].column;
                    self.cover(header);
                    self.given_covers.push(header);
                    j = self.nodes[j].right;
                    if j == first {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Unwinds every pre-search cover in reverse order, restoring the
    /// matrix to its freshly built state.
    fn unwind_givens(&mut self) {
        while let Some(header) = self.given_covers.pop() {
            self.uncover(header);
        }
    }

    /// S-heuristic: the live column with the fewest 1-nodes, ties broken
    /// by first-encountered order from `root.right`.
    fn select_column(&self) -> usize {
        let mut best = ROOT;
        let mut best_size = usize::MAX;
        let mut header = self.nodes[ROOT].right;
        while header != ROOT {
            if self.sizes[header] < best_size {
                best = header;
                best_size = self.sizes[header];
                if best_size == 0 {
                    break;
                }
            }
            header = self.nodes[header].right;
        }
        best
    }
}

/// One Algorithm X run over a built matrix.
struct AlgorithmX {
    matrix: Matrix,
    /// Candidate ids of the rows currently selected.
    partial: Vec<usize>,
    /// Completed grids, in search order.
    solutions: Vec<Grid>,
    /// The input grid; every recorded solution starts from it.
    base: Grid,
    /// Stop after this many solutions; 0 = unbounded.
    max: usize,
    done: bool,
    iterations: u64,
    backtracks: u64,
}

impl AlgorithmX {
    fn new(matrix: Matrix, base: Grid, max: usize) -> Self {
        Self {
            matrix,
            partial: Vec::new(),
            solutions: Vec::new(),
            base,
            max,
            done: false,
            iterations: 0,
            backtracks: 0,
        }
    }

    /// The recursive search. On return the matrix is exactly as it was on
    /// entry.
    fn run(&mut self) {
        self.iterations += 1;

        if self.matrix.nodes[ROOT].right == ROOT {
            self.record();
            return;
        }

        let header = self.matrix.select_column();
        if self.matrix.sizes[header] == 0 {
            // Dead end: an unsatisfiable constraint remains.
            return;
        }

        self.matrix.cover(header);
        let mut row = self.matrix.nodes[header].down;
        while row != header {
            self.partial.push(self.matrix.nodes[row].row_id);
            let mut j = self.matrix.nodes[row].right;
            while j != row {
                let column = self.matrix.nodes[j].column;
                self.matrix.cover(column);
                j = self.matrix.nodes[j].right;
            }

            self.run();

            let mut j = self.matrix.nodes[row].left;
            while j != row {
                let column = self.matrix.nodes[j].column;
                self.matrix.uncover(column);
                j = self.matrix.nodes[j].left;
            }
            self.partial.pop();

            if self.done {
                break;
            }
            self.backtracks += 1;
            row = self.matrix.nodes[row].down;
        }
        self.matrix.uncover(header);
    }

    /// Reconstructs the grid from the selected rows and records it.
    fn record(&mut self) {
        let n = self.matrix.dim.size;
        let mut grid = self.base.clone();
        for &row_id in &self.partial {
            let value = row_id % n + 1;
            let cell = row_id / n;
            grid[cell / n][cell % n] = value;
        }
        self.solutions.push(grid);
        if self.max > 0 && self.solutions.len() >= self.max {
            self.done = true;
        }
    }
}

/// The Dancing Links backend. Holds only the counters that outlive a
/// call; the matrix is rebuilt per invocation.
#[derive(Debug, Default)]
pub struct DlxSolver {
    iterations: u64,
    backtracks: u64,
}

impl DlxSolver {
    /// Creates a solver with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the matrix, applies the givens and searches for up to `max`
    /// solutions (`max == 0` unbounded).
    fn run_search(&mut self, board: &Board, max: usize) -> Result<Vec<Grid>, String> {
        self.iterations = 0;
        self.backtracks = 0;

        let mut matrix = Matrix::build(board)?;
        matrix.apply_givens(board)?;

        let mut search = AlgorithmX::new(matrix, board.grid().clone(), max);
        search.run();
        search.matrix.unwind_givens();

        self.iterations = search.iterations;
        self.backtracks = search.backtracks;
        Ok(search.solutions)
    }
}

impl Solver for DlxSolver {
    fn solve(&mut self, board: &Board) -> SolveResult {
        let started = Instant::now();
        let outcome = self.run_search(board, 1);
        let time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let (solved, solution, error_message) = match outcome {
            Ok(mut solutions) => match solutions.pop() {
                Some(grid) => (true, grid, None),
                None => (
                    false,
                    board.grid().clone(),
                    Some("puzzle has no solution".to_string()),
                ),
            },
            Err(message) => (false, board.grid().clone(), Some(message)),
        };

        SolveResult {
            solved,
            solution,
            algorithm: self.name().to_string(),
            time_ms,
            iterations: self.iterations,
            backtracks: self.backtracks,
            error_message,
        }
    }

    fn find_all_solutions(&mut self, board: &Board, max: usize) -> Vec<Board> {
        let dim = board.dimension();
        self.run_search(board, max)
            .unwrap_or_default()
            .into_iter()
            .map(|grid| {
                Board::with_dimension(grid, dim).expect("search produced a malformed grid")
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "Dancing Links"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_4x4(cells: &[(usize, usize, usize)]) -> Board {
        let mut grid = vec![vec![0; 4]; 4];
        for &(r, c, v) in cells {
            grid[r][c] = v;
        }
        Board::new(grid).unwrap()
    }

    fn live_headers(matrix: &Matrix) -> Vec<usize> {
        let mut headers = Vec::new();
        let mut h = matrix.nodes[ROOT].right;
        while h != ROOT {
            headers.push(h);
            h = matrix.nodes[h].right;
        }
        headers
    }

    #[test]
    fn empty_board_matrix_has_canonical_shape() {
        let board = Board::new(vec![vec![0; 4]; 4]).unwrap();
        let matrix = Matrix::build(&board).unwrap();
        // 4 * 4^2 constraint columns, 4^3 candidate rows of 4 nodes each.
        assert_eq!(live_headers(&matrix).len(), 64);
        assert_eq!(matrix.nodes.len(), 1 + 64 + 4 * 64);
        // Every cell column sees one candidate per digit.
        assert!(matrix.sizes[1..].iter().all(|&s| s == 4));
    }

    #[test]
    fn given_cells_contribute_one_row() {
        let board = board_4x4(&[(0, 0, 2)]);
        let matrix = Matrix::build(&board).unwrap();
        // Cell column (0,0) holds exactly the row for digit 2.
        assert_eq!(matrix.sizes[1], 1);
        let first = matrix.nodes[1].down;
        assert_eq!(matrix.nodes[first].row_id, matrix.candidate_id(0, 0, 2));
    }

    #[test]
    fn cover_uncover_restores_the_exact_state() {
        let board = board_4x4(&[(0, 0, 1), (1, 2, 4), (3, 3, 2)]);
        let mut matrix = Matrix::build(&board).unwrap();
        let nodes_before = matrix.nodes.clone();
        let sizes_before = matrix.sizes.clone();

        let first = matrix.nodes[ROOT].right;
        matrix.cover(first);
        assert_ne!(matrix.nodes, nodes_before);
        matrix.uncover(first);
        assert_eq!(matrix.nodes, nodes_before);
        assert_eq!(matrix.sizes, sizes_before);
    }

    #[test]
    fn nested_covers_unwind_in_lifo_order() {
        let board = Board::new(vec![vec![0; 4]; 4]).unwrap();
        let mut matrix = Matrix::build(&board).unwrap();
        let nodes_before = matrix.nodes.clone();
        let sizes_before = matrix.sizes.clone();

        let a = matrix.nodes[ROOT].right;
        matrix.cover(a);
        let b = matrix.nodes[ROOT].right;
        matrix.cover(b);
        matrix.uncover(b);
        matrix.uncover(a);

        assert_eq!(matrix.nodes, nodes_before);
        assert_eq!(matrix.sizes, sizes_before);
    }

    #[test]
    fn applying_givens_covers_their_columns() {
        let board = board_4x4(&[(0, 0, 1), (2, 3, 2)]);
        let mut matrix = Matrix::build(&board).unwrap();
        let fresh_nodes = matrix.nodes.clone();
        matrix.apply_givens(&board).unwrap();
        // Two givens cover four columns each.
        assert_eq!(live_headers(&matrix).len(), 64 - 8);
        assert_eq!(matrix.given_covers.len(), 8);
        matrix.unwind_givens();
        assert_eq!(matrix.nodes, fresh_nodes);
    }

    #[test]
    fn conflicting_givens_are_rejected_at_cover_time() {
        // Same digit twice in one row: the second clue's candidate row is
        // unlinked when the first clue covers its row-digit column.
        let board = board_4x4(&[(0, 0, 1), (0, 2, 1)]);
        let mut matrix = Matrix::build(&board).unwrap();
        let err = matrix.apply_givens(&board).unwrap_err();
        assert!(err.contains("contradictory clue 1"));
    }

    #[test]
    fn select_column_takes_the_smallest() {
        let board = board_4x4(&[(1, 1, 3)]);
        let mut matrix = Matrix::build(&board).unwrap();
        matrix.apply_givens(&board).unwrap();
        let chosen = matrix.select_column();
        let min = live_headers(&matrix)
            .iter()
            .map(|&h| matrix.sizes[h])
            .min()
            .unwrap();
        assert_eq!(matrix.sizes[chosen], min);
        // First-encountered tiebreak: no earlier live header has that size.
        for header in live_headers(&matrix) {
            if header == chosen {
                break;
            }
            assert!(matrix.sizes[header] > min);
        }
    }

    #[test]
    fn solve_reconstructs_givens_and_search_rows() {
        let board = board_4x4(&[(0, 0, 1), (0, 1, 2), (1, 0, 3), (1, 3, 1), (2, 2, 1)]);
        let mut solver = DlxSolver::new();
        let result = solver.solve(&board);
        assert!(result.solved);
        let solved = result.board(board.dimension()).unwrap();
        assert!(solved.is_solved());
        assert_eq!(solved.get(0, 0), Some(1));
        assert_eq!(solved.get(2, 2), Some(1));
    }

    #[test]
    fn search_leaves_counters_deterministic() {
        let board = board_4x4(&[(0, 0, 1)]);
        let mut solver = DlxSolver::new();
        let first = solver.solve(&board);
        let second = solver.solve(&board);
        assert_eq!(first.iterations, second.iterations);
        assert_eq!(first.backtracks, second.backtracks);
        assert!(first.iterations > 0);
    }
}
