//! The ring-arithmetic kernel: `R_q = Z_q[x] / (x^n + 1)` elements and the
//! operations the three schemes build on.

pub mod poly;

pub use poly::Polynomial;
