#![deny(missing_docs)]
//! A high-performance Sudoku solver library: N×N boards (9, 16, 25 and any
//! composite size up to 64) solved through two interchangeable backends,
//! with a micro-benchmark harness on top.

/// The `benchmark` module runs a solver repeatedly, single- or
/// multi-worker, and aggregates timing statistics.
pub mod benchmark;

/// The `board` module provides the board abstraction: the grid, its
/// dimension descriptor and the validity/completeness queries.
pub mod board;

/// The `json` module loads puzzles from and saves solutions to JSON
/// documents.
pub mod json;

/// The `puzzles` module carries the built-in test puzzles and the
/// plain-text puzzle parser.
pub mod puzzles;

/// The `solver` module defines the solver contract and its two backends:
/// Dancing Links and bitmask backtracking.
pub mod solver;
