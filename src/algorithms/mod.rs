//! The three lattice-cryptography schemes built on the shared ring,
//! sampler, and `polyutil` layers: FV, NewHope-Simple, and Ring-TESLA.

pub mod fv;
pub mod newhope;
pub mod tesla;
