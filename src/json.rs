//! JSON puzzle load/save.
//!
//! The input document carries the grid either as a nested array or as a
//! flat puzzle string, plus optional metadata and an explicit box shape
//! for non-square-box sizes:
//!
//! ```json
//! {
//!   "name": "Example",
//!   "difficulty": "hard",
//!   "box_rows": 3,
//!   "box_cols": 3,
//!   "grid": [[5, 3, 0, ...], ...]
//! }
//! ```
//!
//! or `"puzzle": "530070000600195000..."` with `.` or `0` for empty.

use crate::board::{Board, BoardDimension, Grid};
use crate::puzzles;
use crate::solver::SolveResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The accepted input document shape.
#[derive(Debug, Deserialize)]
struct PuzzleDocument {
    name: Option<String>,
    difficulty: Option<String>,
    box_rows: Option<usize>,
    box_cols: Option<usize>,
    grid: Option<Grid>,
    puzzle: Option<String>,
}

/// Solution output: the input grid plus the flattened solve result.
#[derive(Serialize)]
struct SolutionDocument<'a> {
    puzzle: &'a Grid,
    #[serde(flatten)]
    result: &'a SolveResult,
}

/// All-solutions output, as written by the `--solve-all` flow.
#[derive(Serialize)]
struct AllSolutionsDocument<'a> {
    puzzle: &'a Grid,
    solution_count: usize,
    solutions: Vec<&'a Grid>,
    time_ms: f64,
}

/// Loads a board from a JSON document string.
///
/// # Errors
///
/// A diagnostic for malformed JSON, a document without `grid` or
/// `puzzle`, or grid contents the board constructor rejects.
pub fn load_from_str(text: &str) -> Result<Board, String> {
    let doc: PuzzleDocument =
        serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;

    let grid = match (doc.grid, doc.puzzle) {
        (Some(grid), _) => grid,
        (None, Some(puzzle)) => puzzles::parse_puzzle(&puzzle)?.grid().clone(),
        (None, None) => {
            return Err("document contains neither \"grid\" nor \"puzzle\"".to_string())
        }
    };

    let dimension = match (doc.box_rows, doc.box_cols) {
        (Some(rows), Some(cols)) => BoardDimension::new(grid.len(), rows, cols),
        _ => BoardDimension::from_size(grid.len()),
    }
    .map_err(|e| e.to_string())?;

    let mut board = Board::with_dimension(grid, dimension).map_err(|e| e.to_string())?;
    if let Some(name) = doc.name {
        board = board.with_name(name);
    }
    if let Some(difficulty) = doc.difficulty {
        board = board.with_difficulty(difficulty);
    }
    Ok(board)
}

/// Loads a board from a JSON file.
///
/// # Errors
///
/// A diagnostic when the file cannot be read or its content fails
/// [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Board, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    load_from_str(&text)
}

/// Writes the input puzzle and its solve result as pretty-printed JSON.
///
/// # Errors
///
/// A diagnostic when serialization or the file write fails.
pub fn save_solution_to_file(
    board: &Board,
    result: &SolveResult,
    path: &Path,
) -> Result<(), String> {
    let doc = SolutionDocument {
        puzzle: board.grid(),
        result,
    };
    write_pretty(&doc, path)
}

/// Writes an all-solutions document: the puzzle, the number of solutions
/// found and every solution grid.
///
/// # Errors
///
/// A diagnostic when serialization or the file write fails.
pub fn save_all_solutions_to_file(
    board: &Board,
    solutions: &[Board],
    time_ms: f64,
    path: &Path,
) -> Result<(), String> {
    let doc = AllSolutionsDocument {
        puzzle: board.grid(),
        solution_count: solutions.len(),
        solutions: solutions.iter().map(Board::grid).collect(),
        time_ms,
    };
    write_pretty(&doc, path)
}

fn write_pretty<T: Serialize>(doc: &T, path: &Path) -> Result<(), String> {
    let text =
        serde_json::to_string_pretty(doc).map_err(|e| format!("cannot serialize: {e}"))?;
    fs::write(path, text).map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// Help text describing the accepted input format.
#[must_use]
pub const fn format_help() -> &'static str {
    r#"JSON input format:
  {
    "name": "Example puzzle",        (optional)
    "difficulty": "hard",            (optional)
    "box_rows": 3, "box_cols": 3,    (optional, for non-square boxes)
    "grid": [[5, 3, 0, ...], ...]    (N rows of N numbers, 0 = empty)
  }

Alternatively the grid can be given as a flat string:
  { "puzzle": "530070000600195000..." }   (N*N characters, . or 0 = empty)
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_grid_document() {
        let board = load_from_str(
            r#"{
                "name": "tiny",
                "difficulty": "easy",
                "grid": [[1, 0, 3, 0], [0, 2, 0, 0], [0, 0, 0, 4], [0, 0, 1, 0]]
            }"#,
        )
        .unwrap();
        assert_eq!(board.size(), 4);
        assert_eq!(board.name(), Some("tiny"));
        assert_eq!(board.difficulty(), Some("easy"));
        assert_eq!(board.get(0, 2), Some(3));
    }

    #[test]
    fn loads_a_puzzle_string_document() {
        let board = load_from_str(r#"{ "puzzle": "1.3..2.....4..1." }"#).unwrap();
        assert_eq!(board.size(), 4);
        assert_eq!(board.get(2, 3), Some(4));
    }

    #[test]
    fn explicit_box_shape_wins() {
        let board = load_from_str(
            r#"{
                "box_rows": 2,
                "box_cols": 3,
                "grid": [[0,0,0,0,0,0],[0,0,0,0,0,0],[0,0,0,0,0,0],
                         [0,0,0,0,0,0],[0,0,0,0,0,0],[0,0,0,0,0,0]]
            }"#,
        )
        .unwrap();
        assert_eq!(board.dimension().box_rows, 2);
        assert_eq!(board.dimension().box_cols, 3);
    }

    #[test]
    fn rejects_documents_without_a_grid() {
        let err = load_from_str(r#"{ "name": "nothing" }"#).unwrap_err();
        assert!(err.contains("neither"));
        assert!(load_from_str("not json").is_err());
    }

    #[test]
    fn rejects_inconsistent_box_shape() {
        let err = load_from_str(
            r#"{ "box_rows": 3, "box_cols": 3,
                 "grid": [[0,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]] }"#,
        )
        .unwrap_err();
        assert!(err.contains("invalid dimension"));
    }

    #[test]
    fn solution_document_round_trips() {
        let board = load_from_str(r#"{ "puzzle": "1.3..2.....4..1." }"#).unwrap();
        let result = SolveResult {
            solved: true,
            solution: board.grid().clone(),
            algorithm: "Dancing Links".to_string(),
            time_ms: 0.25,
            iterations: 7,
            backtracks: 1,
            error_message: None,
        };

        let dir = std::env::temp_dir().join("sudoku_solver_json_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("solution.json");
        save_solution_to_file(&board, &result, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["solved"], serde_json::json!(true));
        assert_eq!(value["algorithm"], serde_json::json!("Dancing Links"));
        assert_eq!(value["iterations"], serde_json::json!(7));
        assert_eq!(value["puzzle"][0][0], serde_json::json!(1));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn all_solutions_document_counts_grids() {
        let board = load_from_str(r#"{ "puzzle": "................" }"#).unwrap();
        let solutions = vec![board.clone(), board.clone()];

        let dir = std::env::temp_dir().join("sudoku_solver_json_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("all.json");
        save_all_solutions_to_file(&board, &solutions, 1.5, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["solution_count"], serde_json::json!(2));
        assert_eq!(value["solutions"].as_array().unwrap().len(), 2);
        fs::remove_file(&path).unwrap();
    }
}
