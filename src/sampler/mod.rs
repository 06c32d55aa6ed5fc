//! Uniform and discrete-Gaussian sampling over ring coefficients.

pub mod gaussian;
pub mod uniform;

pub use gaussian::{knuth_yao_sample, ProbabilityMatrix};
pub use uniform::{uniform_poly, uniform_poly_below};
