//! Unified error types for wordml.
//!
//! Every fallible operation in the crate reports through [`Error`]; archive and
//! filesystem failures are carried through unchanged.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, Result};
