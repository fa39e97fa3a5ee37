//! Core definitions (error and result types), relied upon by all cqp-* crates.

pub mod error;
pub mod result;

pub use result::Result;

/// Corpus position: zero-based index of a token in the corpus token stream.
///
/// Negative values are never valid positions; `-1` marks a deleted interval or
/// an undefined anchor.
pub type Cpos = i32;
