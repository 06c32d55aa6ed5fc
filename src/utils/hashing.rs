//! Thin re-exports of the hash primitives used outside the `xof` module's
//! own internals (kept as a separate file to match the teacher's
//! `utils::hashing` layout).

pub use crate::xof::{sha256, sha3_256};
