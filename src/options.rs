//! Session configuration shared by every pipeline stage.
//!
//! Mirrors the options table in the external-interfaces section of the
//! specification: the UI sets these once per session and they flow
//! unchanged through `lex`, `parse`, and the interpreter.

use serde::{Deserialize, Serialize};

/// C dialect. Ordered so `CVersion::C99 >= CVersion::C90` etc. compares
/// correctly — keyword/literal gating throughout the lexer and parser
/// relies on this ordering rather than re-deriving it ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CVersion {
    C90,
    C99,
    C11,
    C17,
    C23,
}

impl Default for CVersion {
    fn default() -> Self {
        CVersion::C17
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Options {
    pub c_version: CVersion,
    pub strict_mode: bool,
    pub detect_leaks: bool,
    pub validate_accesses: bool,
    pub max_steps: u64,
    pub max_history: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            c_version: CVersion::default(),
            strict_mode: false,
            detect_leaks: false,
            validate_accesses: false,
            max_steps: 10_000,
            max_history: 10_000,
        }
    }
}
