//! The command-line front-end: argument definitions, dispatch and report
//! rendering. Everything user-facing lives here; the library below never
//! prints.

pub(crate) mod cli;
