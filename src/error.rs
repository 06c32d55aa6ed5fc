//! Crate-wide error type.
//!
//! Mirrors the shape of the teacher's `SignatureError`, but carries context
//! (`thiserror`-derived `Display`) since parameter validation failures need
//! to say *what* was wrong, not just that something was.

use thiserror::Error;

/// Precondition violations and entropy failures. Both are treated as fatal,
/// programmer-facing errors (see DESIGN.md §7): nothing in this crate
/// attempts to recover from them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RlweError {
    /// A `KeyParameters` constructor was given a malformed parameter set
    /// (e.g. `n` not a power of two, `base < 2`, `t == 0`).
    #[error("invalid RLWE parameters: {0}")]
    InvalidParameters(&'static str),

    /// The caller-supplied `RandomBytes` capability could not produce
    /// entropy (e.g. the platform CSPRNG failed).
    #[error("entropy source failure")]
    EntropyFailure,
}

pub type Result<T> = core::result::Result<T, RlweError>;
