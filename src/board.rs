#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The Sudoku board abstraction.
//!
//! A [`Board`] is the immutable problem instance handed to the solvers: a
//! dense N×N grid of cell values together with a [`BoardDimension`] that
//! describes how the grid divides into boxes. `0` represents an empty cell;
//! filled cells hold values in `1..=N`.
//!
//! Validity (`is_valid`) and completeness (`is_solved`) are queried on
//! demand rather than enforced at construction, so partially filled and
//! even contradictory boards can be represented and inspected.

use itertools::Itertools;
use std::fmt::Display;

/// A row-major N×N grid of cell values. `0` means empty.
pub type Grid = Vec<Vec<usize>>;

/// Largest supported board edge. Validity checks track each unit with a
/// 64-bit mask, one bit per candidate digit.
pub const MAX_SIZE: usize = 64;

/// Errors surfaced at the board construction boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The grid is not square, or the dimension triple is inconsistent
    /// (`size != box_rows * box_cols`), or the size is unsupported.
    InvalidDimension(String),
    /// A cell value lies outside `0..=size`.
    OutOfRange {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// The rejected value.
        value: usize,
        /// The largest permitted value (the board size).
        max: usize,
    },
}

impl Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimension(msg) => write!(f, "invalid dimension: {msg}"),
            Self::OutOfRange {
                row,
                col,
                value,
                max,
            } => {
                write!(
                    f,
                    "value {value} at ({row}, {col}) is out of range 0..={max}"
                )
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// The dimension descriptor of a board: edge length `size` and the box
/// shape `box_rows` × `box_cols`, with `size == box_rows * box_cols`.
///
/// Canonical sizes are 9 (3×3 boxes), 16 (4×4) and 25 (5×5); any composite
/// size up to [`MAX_SIZE`] is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardDimension {
    /// Edge length N of the N×N grid.
    pub size: usize,
    /// Rows per box.
    pub box_rows: usize,
    /// Columns per box.
    pub box_cols: usize,
}

impl BoardDimension {
    /// Creates a dimension triple, checking `size == box_rows * box_cols`.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` if the triple is inconsistent, the size is zero,
    /// or the size exceeds [`MAX_SIZE`].
    pub fn new(size: usize, box_rows: usize, box_cols: usize) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::InvalidDimension("size must be at least 1".into()));
        }
        if size > MAX_SIZE {
            return Err(BoardError::InvalidDimension(format!(
                "size {size} exceeds the supported maximum of {MAX_SIZE}"
            )));
        }
        if box_rows * box_cols != size {
            return Err(BoardError::InvalidDimension(format!(
                "box shape {box_rows}x{box_cols} does not tile a {size}x{size} grid"
            )));
        }
        Ok(Self {
            size,
            box_rows,
            box_cols,
        })
    }

    /// Infers the box shape for a bare edge length.
    ///
    /// The canonical sizes 4, 9, 16 and 25 use square boxes. Any other
    /// composite size picks the divisor pair closest to √size, with
    /// `box_rows <= box_cols`.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` for size 0 or sizes above [`MAX_SIZE`].
    pub fn from_size(size: usize) -> Result<Self, BoardError> {
        match size {
            4 => Self::new(4, 2, 2),
            9 => Self::new(9, 3, 3),
            16 => Self::new(16, 4, 4),
            25 => Self::new(25, 5, 5),
            n => {
                let root = (1..=n).take_while(|r| r * r <= n).last().unwrap_or(1);
                let box_rows = (1..=root).rev().find(|r| n % r == 0).unwrap_or(1);
                Self::new(n, box_rows, n / box_rows)
            }
        }
    }

    /// Index of the box containing cell `(row, col)`, counting boxes in
    /// row-major order.
    #[must_use]
    pub const fn box_of(&self, row: usize, col: usize) -> usize {
        (row / self.box_rows) * self.box_rows + col / self.box_cols
    }
}

/// An N×N Sudoku board.
///
/// Construction validates shape and value range; the cell contents are
/// otherwise taken as-is, including contradictions (query [`Board::is_valid`]
/// to detect those). The board is a plain value: solvers receive it by
/// reference and never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    dimension: BoardDimension,
    name: Option<String>,
    difficulty: Option<String>,
}

impl Board {
    /// Creates a board from a grid, inferring the dimension from the grid's
    /// edge length.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` if the grid is not square or its size has no box
    /// decomposition; `OutOfRange` if any cell value exceeds the size.
    pub fn new(grid: Grid) -> Result<Self, BoardError> {
        let dimension = BoardDimension::from_size(grid.len())?;
        Self::with_dimension(grid, dimension)
    }

    /// Creates a board from a grid and an explicit dimension.
    ///
    /// # Errors
    ///
    /// `InvalidDimension` if the grid shape disagrees with the dimension;
    /// `OutOfRange` if any cell value exceeds the size.
    pub fn with_dimension(grid: Grid, dimension: BoardDimension) -> Result<Self, BoardError> {
        let n = dimension.size;
        if grid.len() != n {
            return Err(BoardError::InvalidDimension(format!(
                "grid has {} rows, dimension expects {n}",
                grid.len()
            )));
        }
        for (r, row) in grid.iter().enumerate() {
            if row.len() != n {
                return Err(BoardError::InvalidDimension(format!(
                    "row {r} has {} cells, expected {n}",
                    row.len()
                )));
            }
            for (c, &value) in row.iter().enumerate() {
                if value > n {
                    return Err(BoardError::OutOfRange {
                        row: r,
                        col: c,
                        value,
                        max: n,
                    });
                }
            }
        }
        Ok(Self {
            grid,
            dimension,
            name: None,
            difficulty: None,
        })
    }

    /// Attaches an opaque display name (carried, never interpreted).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches an opaque difficulty label (carried, never interpreted).
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = Some(difficulty.into());
        self
    }

    /// The board's edge length N.
    #[must_use]
    pub fn size(&self) -> usize {
        self.dimension.size
    }

    /// The dimension descriptor.
    #[must_use]
    pub const fn dimension(&self) -> BoardDimension {
        self.dimension
    }

    /// The raw grid, row-major.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The optional display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The optional difficulty label.
    #[must_use]
    pub fn difficulty(&self) -> Option<&str> {
        self.difficulty.as_deref()
    }

    /// Iterates over the rows of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &Vec<usize>> {
        self.grid.iter()
    }

    /// The value at `(row, col)`, or `None` when the indices are outside
    /// the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.grid.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Sets the value at `(row, col)`.
    ///
    /// This is the explicit copy-and-modify escape hatch; the solver layer
    /// never calls it.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the indices fall outside the grid or the value
    /// exceeds the board size.
    pub fn set(&mut self, row: usize, col: usize, value: usize) -> Result<(), BoardError> {
        let n = self.dimension.size;
        if row >= n || col >= n || value > n {
            return Err(BoardError::OutOfRange {
                row,
                col,
                value,
                max: n,
            });
        }
        self.grid[row][col] = value;
        Ok(())
    }

    /// Returns false iff some row, column or box contains the same nonzero
    /// value twice.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let n = self.dimension.size;
        let mut row_seen = vec![0u64; n];
        let mut col_seen = vec![0u64; n];
        let mut box_seen = vec![0u64; n];

        for r in 0..n {
            for c in 0..n {
                let value = self.grid[r][c];
                if value == 0 {
                    continue;
                }
                let bit = 1u64 << (value - 1);
                let b = self.dimension.box_of(r, c);
                if row_seen[r] & bit != 0 || col_seen[c] & bit != 0 || box_seen[b] & bit != 0 {
                    return false;
                }
                row_seen[r] |= bit;
                col_seen[c] |= bit;
                box_seen[b] |= bit;
            }
        }
        true
    }

    /// True iff the board is valid and no cell is empty.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.is_valid() && self.count_empty() == 0
    }

    /// Number of empty cells.
    #[must_use]
    pub fn count_empty(&self) -> usize {
        self.grid
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&v| v == 0)
            .count()
    }

    /// Fraction of filled cells, in `0.0..=1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f64 {
        let total = self.dimension.size * self.dimension.size;
        let filled = total - self.count_empty();
        filled as f64 / total as f64
    }

    /// Renders the grid one row per line, cells space-separated, empty
    /// cells as `0`. This is the machine-friendly counterpart of the
    /// [`Display`] rendering.
    #[must_use]
    pub fn compact(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.iter().map(ToString::to_string).join(" "))
            .join("\n")
    }
}

impl Display for Board {
    /// Renders the grid with box separators, empty cells shown as `.`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.dimension.size;
        let width = if n >= 10 { 2 } else { 1 };
        let box_cols = self.dimension.box_cols;
        let rule_len = box_cols * (width + 1) + 1;
        let rule = format!(
            "+{}",
            format!("{}+", "-".repeat(rule_len)).repeat(n / box_cols)
        );

        for (r, row) in self.grid.iter().enumerate() {
            if r % self.dimension.box_rows == 0 {
                writeln!(f, "{rule}")?;
            }
            for (c, &value) in row.iter().enumerate() {
                if c % box_cols == 0 {
                    write!(f, "| ")?;
                }
                if value == 0 {
                    write!(f, "{:>width$} ", ".")?;
                } else {
                    write!(f, "{value:>width$} ")?;
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{rule}")
    }
}
