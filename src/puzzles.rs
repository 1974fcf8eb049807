//! Built-in test puzzles and plain-text puzzle parsing.
//!
//! The three grids back the benchmark and compare commands: a classic hard
//! 9×9, a hard 16×16, and a sparsely seeded 25×25 for heavy load. Sizes
//! and clue patterns are fixed so timings stay comparable across runs.

use crate::board::{Board, BoardDimension, Grid};
use itertools::Itertools;

/// Classic hard 9×9 puzzle (30 clues, unique solution).
#[must_use]
pub fn nine_by_nine() -> Grid {
    vec![
        vec![5, 3, 0, 0, 7, 0, 0, 0, 0],
        vec![6, 0, 0, 1, 9, 5, 0, 0, 0],
        vec![0, 9, 8, 0, 0, 0, 0, 6, 0],
        vec![8, 0, 0, 0, 6, 0, 0, 0, 3],
        vec![4, 0, 0, 8, 0, 3, 0, 0, 1],
        vec![7, 0, 0, 0, 2, 0, 0, 0, 6],
        vec![0, 6, 0, 0, 0, 0, 2, 8, 0],
        vec![0, 0, 0, 4, 1, 9, 0, 0, 5],
        vec![0, 0, 0, 0, 8, 0, 0, 7, 9],
    ]
}

/// Hard 16×16 puzzle (about 30% clues).
#[must_use]
pub fn sixteen_by_sixteen() -> Grid {
    vec![
        vec![0, 0, 0, 4, 5, 6, 7, 0, 0, 10, 0, 0, 0, 0, 15, 0],
        vec![0, 0, 0, 0, 0, 10, 0, 0, 0, 14, 0, 16, 0, 2, 0, 0],
        vec![0, 10, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 5, 6, 7, 0],
        vec![0, 14, 15, 0, 1, 0, 0, 4, 5, 0, 0, 0, 0, 0, 0, 0],
        vec![0, 0, 0, 0, 6, 0, 0, 0, 10, 0, 0, 0, 0, 0, 16, 0],
        vec![6, 0, 8, 0, 0, 0, 0, 0, 0, 0, 0, 15, 2, 0, 4, 0],
        vec![0, 9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 6, 5, 8, 0],
        vec![0, 13, 16, 0, 2, 0, 0, 0, 0, 5, 0, 7, 0, 0, 0, 11],
        vec![0, 0, 0, 2, 0, 8, 0, 6, 11, 0, 0, 0, 0, 0, 0, 0],
        vec![7, 0, 5, 0, 11, 12, 9, 10, 0, 0, 0, 0, 0, 0, 1, 0],
        vec![11, 0, 0, 0, 15, 0, 0, 0, 3, 4, 0, 0, 7, 0, 0, 0],
        vec![0, 0, 0, 0, 0, 4, 0, 2, 0, 8, 0, 6, 11, 0, 0, 0],
        vec![0, 0, 2, 0, 0, 7, 0, 5, 12, 11, 0, 0, 0, 0, 14, 0],
        vec![8, 0, 0, 0, 12, 0, 0, 0, 16, 0, 14, 0, 0, 0, 0, 0],
        vec![0, 0, 0, 0, 16, 0, 14, 0, 4, 0, 0, 0, 0, 7, 0, 0],
        vec![0, 0, 0, 0, 0, 3, 0, 0, 0, 0, 6, 0, 12, 0, 0, 0],
    ]
}

/// Sparsely seeded 25×25 puzzle for heavy benchmark load (125 clues,
/// about 80% empty).
///
/// Each row holds five clues on a cyclic pattern that is consistent by
/// construction; the grid is not expected to have a unique solution.
#[must_use]
pub fn twenty_five_by_twenty_five() -> Grid {
    let mut grid = vec![vec![0; 25]; 25];
    for (r, row) in grid.iter_mut().enumerate() {
        let mut c = r % 5;
        while c < 25 {
            row[c] = (c + 5 * (r % 5) + r / 5) % 25 + 1;
            c += 5;
        }
    }
    grid
}

/// Returns the built-in puzzle of the requested size with its dimension.
///
/// # Errors
///
/// A diagnostic for sizes other than 9, 16 or 25.
pub fn by_size(size: usize) -> Result<(Grid, BoardDimension), String> {
    let grid = match size {
        9 => nine_by_nine(),
        16 => sixteen_by_sixteen(),
        25 => twenty_five_by_twenty_five(),
        other => {
            return Err(format!(
                "unsupported test size: {other}. Supported: 9, 16, 25"
            ))
        }
    };
    let dimension = BoardDimension::from_size(size).map_err(|e| e.to_string())?;
    Ok((grid, dimension))
}

/// One-line description of a built-in puzzle.
#[must_use]
pub const fn description(size: usize) -> &'static str {
    match size {
        9 => "9x9 Classic (3x3 boxes)",
        16 => "16x16 Extended (4x4 boxes) - hard",
        25 => "25x25 Mega (5x5 boxes) - heavy benchmark",
        _ => "Unknown",
    }
}

/// Parses a puzzle from plain text.
///
/// Two formats are accepted:
///
/// - N lines of N whitespace-separated numbers, `0` for empty;
/// - a single string of N² characters with `.` or `0` for empty (sizes
///   whose digits fit one character, i.e. up to 9×9).
///
/// # Errors
///
/// A diagnostic for non-square input, non-numeric tokens or values
/// exceeding the board size.
pub fn parse_puzzle(text: &str) -> Result<Board, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("empty puzzle input".to_string());
    }

    if trimmed.split_whitespace().nth(1).is_some() {
        parse_rows(trimmed)
    } else {
        parse_flat(trimmed)
    }
}

fn parse_rows(text: &str) -> Result<Board, String> {
    let lines = text.lines().filter(|l| !l.trim().is_empty()).collect_vec();
    let size = lines.len();

    let mut grid = Vec::with_capacity(size);
    for (i, line) in lines.iter().enumerate() {
        let row: Vec<usize> = line
            .split_ascii_whitespace()
            .map(|token| {
                token
                    .parse::<usize>()
                    .map_err(|_| format!("invalid token {token:?} in line {}", i + 1))
            })
            .collect::<Result<_, _>>()?;
        if row.len() != size {
            return Err(format!(
                "line {} has {} values, expected {size}",
                i + 1,
                row.len()
            ));
        }
        grid.push(row);
    }

    Board::new(grid).map_err(|e| e.to_string())
}

fn parse_flat(text: &str) -> Result<Board, String> {
    let cells = text.chars().collect_vec();
    let size = (1..=cells.len())
        .find(|n| n * n == cells.len())
        .ok_or_else(|| {
            format!(
                "puzzle string of {} characters is not a square grid",
                cells.len()
            )
        })?;

    let mut grid = vec![vec![0; size]; size];
    for (i, &ch) in cells.iter().enumerate() {
        let value = match ch {
            '.' | '0' => 0,
            d => d
                .to_digit(10)
                .ok_or_else(|| format!("invalid character {ch:?} in puzzle string"))?
                as usize,
        };
        grid[i / size][i % size] = value;
    }

    Board::new(grid).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clue_count(grid: &Grid) -> usize {
        grid.iter().flatten().filter(|&&v| v != 0).count()
    }

    #[test]
    fn builtins_are_valid_boards() {
        for size in [9, 16, 25] {
            let (grid, dimension) = by_size(size).unwrap();
            let board = Board::with_dimension(grid, dimension).unwrap();
            assert!(board.is_valid(), "{size}x{size} builtin is invalid");
            assert!(!board.is_solved());
        }
    }

    #[test]
    fn builtin_clue_counts() {
        assert_eq!(clue_count(&nine_by_nine()), 30);
        assert_eq!(clue_count(&twenty_five_by_twenty_five()), 125);
    }

    #[test]
    fn by_size_rejects_unknown_sizes() {
        assert!(by_size(12).is_err());
        assert!(by_size(0).is_err());
    }

    #[test]
    fn parses_row_format() {
        let text = "1 0 3 0\n0 2 0 0\n0 0 0 4\n0 0 1 0";
        let board = parse_puzzle(text).unwrap();
        assert_eq!(board.size(), 4);
        assert_eq!(board.get(0, 2), Some(3));
        assert_eq!(board.get(2, 3), Some(4));
    }

    #[test]
    fn parses_flat_format() {
        let board = parse_puzzle("1.3..2.....4..1.").unwrap();
        assert_eq!(board.size(), 4);
        assert_eq!(board.get(0, 0), Some(1));
        assert_eq!(board.get(3, 2), Some(1));
        assert_eq!(board.count_empty(), 11);
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_puzzle("1 0 3\n0 2 0 0\n0 0 0 4\n0 0 1 0").unwrap_err();
        assert!(err.contains("line 1"));
    }

    #[test]
    fn rejects_bad_tokens_and_characters() {
        assert!(parse_puzzle("1 0 x 0\n0 2 0 0\n0 0 0 4\n0 0 1 0").is_err());
        assert!(parse_puzzle("1.3..2.....4..x.").is_err());
        assert!(parse_puzzle("1.3..2.....4..1").is_err());
    }

    #[test]
    fn rejects_values_above_the_size() {
        let err = parse_puzzle("1 0 3 5\n0 2 0 0\n0 0 0 4\n0 0 1 0").unwrap_err();
        assert!(err.contains("out of range"));
    }
}
