//! Common types and utilities shared across the crate.
//!
//! Errors, length units and the small XML text helpers used by the
//! hand-written serializers.

// Submodule declarations
pub mod error;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
pub use unit::Twips;
