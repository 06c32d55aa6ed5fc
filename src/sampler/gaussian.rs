//! Knuth-Yao discrete Gaussian sampling over a bit-packed probability
//! matrix.
//!
//! Grounded in `original_source/src/sample.cpp`'s
//! `KnuthYaoGaussianMatrix`/`KnuthYaoSample`.

use crate::bigint::BigInt;
use crate::ring::Polynomial;
use crate::traits::RandomBytes;

/// 64 bits of probability mass per row, packed 8 bytes per row, MSB-first
/// within each byte (per the specification's §9 packing note).
const BIT_PRECISION: usize = 64;

/// The scalar the row count is derived from: `pmat_rows = ceil(sigma * 6)`.
pub const PROBABILITY_MATRIX_BOUNDS_SCALAR: f64 = 6.0;

/// A bit-packed discrete Gaussian probability table, one row per possible
/// magnitude `0..rows`.
#[derive(Clone, Debug)]
pub struct ProbabilityMatrix {
    rows: Vec<[u8; 8]>,
}

impl ProbabilityMatrix {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn bit(&self, row: usize, col: usize) -> u8 {
        (self.rows[row][col / 8] >> (7 - col % 8)) & 1
    }

    /// Builds the table for standard deviation `sigma`. Deterministic given
    /// `sigma` alone (per the specification's invariant in §3).
    pub fn build(sigma: f64) -> Self {
        let row_count = (sigma * PROBABILITY_MATRIX_BOUNDS_SCALAR).ceil() as usize;
        let variance = sigma * sigma;
        let two_pi = core::f64::consts::PI * 2.0;

        let mut probabilities = vec![0f64; row_count];
        let mut total = 0f64;
        for i in 0..row_count {
            let mut p = 1.0 / (two_pi * variance).sqrt() * (-((i * i) as f64) / (2.0 * variance)).exp();
            if i == 0 {
                // Halved: positive draws are randomly negated during
                // sampling, so row 0 (magnitude zero) must not be
                // double-counted.
                p /= 2.0;
            }
            probabilities[i] = p;
            total += p;
        }

        let scale = 1.0 / total;
        let mut rows = vec![[0u8; 8]; row_count];
        for (i, row) in rows.iter_mut().enumerate() {
            let mut probability = probabilities[i] * scale;
            let mut check_value = 0.5f64;
            for j in 0..BIT_PRECISION {
                if probability > check_value {
                    row[j / 8] |= 1 << (7 - j % 8);
                    probability -= check_value;
                }
                check_value /= 2.0;
            }
        }

        tracing::debug!(rows = row_count, sigma, "built Knuth-Yao probability matrix");
        ProbabilityMatrix { rows }
    }
}

/// A cheap single-bit buffer over a `RandomBytes` capability, so the
/// sampling loop can draw one bit at a time without a syscall per bit.
struct BitSource<'a, R: RandomBytes> {
    rng: &'a mut R,
    buffer: u8,
    remaining: u8,
}

impl<'a, R: RandomBytes> BitSource<'a, R> {
    fn new(rng: &'a mut R) -> Self {
        BitSource {
            rng,
            buffer: 0,
            remaining: 0,
        }
    }

    fn next_bit(&mut self) -> u8 {
        if self.remaining == 0 {
            let mut byte = [0u8; 1];
            self.rng.fill(&mut byte);
            self.buffer = byte[0];
            self.remaining = 8;
        }
        let bit = self.buffer & 1;
        self.buffer >>= 1;
        self.remaining -= 1;
        bit
    }
}

/// Samples `len` coefficients from the discrete Gaussian described by
/// `matrix`, using the Knuth-Yao DDG-walk algorithm: maintain a running
/// difference `d` and a column index, descending rows each time a fresh
/// random bit is mixed in, until `d` hits the terminal value `-1`.
pub fn knuth_yao_sample<R: RandomBytes>(
    rng: &mut R,
    len: usize,
    matrix: &ProbabilityMatrix,
) -> Polynomial {
    let last_row = matrix.row_count() - 1;
    let mut bits = BitSource::new(rng);
    let mut out = Polynomial::zero(len);

    for i in 0..len {
        let mut d: i64 = 0;
        let mut col: usize = 0;
        loop {
            let r = bits.next_bit();
            d = 2 * d + if r == 0 { 1 } else { 0 };

            let mut hit = false;
            for row in (0..=last_row).rev() {
                d -= matrix.bit(row, col) as i64;
                if d == -1 {
                    let sign = bits.next_bit();
                    let magnitude = row as i64;
                    let value = if sign == 1 { magnitude } else { -magnitude };
                    out.set_coeff(i, BigInt::from_i64(value));
                    hit = true;
                    break;
                }
            }
            col += 1;
            if hit {
                break;
            }
        }
    }

    out
}
