//! Ring elements and the arithmetic used by every scheme: `Z[x]` polynomials
//! reduced modulo a cyclotomic `x^n + 1` and an integer modulus `q`.
//!
//! Grounded in `original_source/src/rlwe.cpp` and `src/polyutil.cpp`: the
//! original represents ring elements with NTL's `ZZX`/`ZZ_pX` and reduces
//! against a `ZZ_pXModulus` built from `x^n + 1`; this module reproduces the
//! same reduction by hand (substituting `x^n := -1`) since no NTT-specific
//! fast path is required by the specification's own Non-goals.

use crate::bigint::BigInt;

/// A polynomial with `BigInt` coefficients, ascending by degree. No implicit
/// modulus is carried: callers pass `n`/`q` to the operations that need
/// them, matching the free-function shape of the original `polyutil`/`rlwe`
/// layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Polynomial {
    coeffs: Vec<BigInt>,
}

impl Polynomial {
    pub fn zero(len: usize) -> Self {
        Polynomial {
            coeffs: vec![BigInt::zero(); len],
        }
    }

    pub fn from_coeffs(coeffs: Vec<BigInt>) -> Self {
        Polynomial { coeffs }
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn coeffs(&self) -> &[BigInt] {
        &self.coeffs
    }

    pub fn coeffs_mut(&mut self) -> &mut [BigInt] {
        &mut self.coeffs
    }

    /// Highest index with a non-zero coefficient, or `-1` for the zero
    /// polynomial (including an empty coefficient vector).
    pub fn degree(&self) -> isize {
        for i in (0..self.coeffs.len()).rev() {
            if !self.coeffs[i].is_zero() {
                return i as isize;
            }
        }
        -1
    }

    pub fn coeff(&self, i: usize) -> BigInt {
        self.coeffs.get(i).cloned().unwrap_or_else(BigInt::zero)
    }

    pub fn set_coeff(&mut self, i: usize, v: BigInt) {
        if i >= self.coeffs.len() {
            self.coeffs.resize(i + 1, BigInt::zero());
        }
        self.coeffs[i] = v;
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(BigInt::is_zero)
    }

    /// Pads with zero coefficients up to `len` (never truncates).
    pub fn pad_to(&mut self, len: usize) {
        if self.coeffs.len() < len {
            self.coeffs.resize(len, BigInt::zero());
        }
    }

    /// Pointwise reduction of every coefficient into `[0, q)`.
    pub fn reduce_mod_q(&mut self, q: &BigInt) {
        for c in self.coeffs.iter_mut() {
            *c = c.mod_floor(q);
        }
    }

    /// Folds terms of degree `>= n` back into `[0, n)` using `x^n = -1`,
    /// i.e. `x^{n+k} = -x^k`. `n` is the ring degree (the modulus is
    /// `x^n + 1`).
    pub fn reduce_mod_phi(&self, n: usize) -> Polynomial {
        let mut out = Polynomial::zero(n);
        for (i, c) in self.coeffs.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let folds = i / n;
            let residue = i % n;
            let value = if folds % 2 == 0 {
                c.clone()
            } else {
                -c
            };
            let existing = out.coeff(residue);
            out.set_coeff(residue, existing + value);
        }
        out
    }

    /// Pointwise addition, padding the shorter operand's tail with zero
    /// coefficients (fresh-ciphertext case). Ciphertext-level addition,
    /// which pads with the *raw tail of the longer operand* instead, is
    /// implemented separately in `algorithms::fv::eval`.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let len = self.len().max(other.len());
        let mut out = Polynomial::zero(len);
        for i in 0..len {
            out.set_coeff(i, self.coeff(i) + other.coeff(i));
        }
        out
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        let len = self.len().max(other.len());
        let mut out = Polynomial::zero(len);
        for i in 0..len {
            out.set_coeff(i, self.coeff(i) - other.coeff(i));
        }
        out
    }

    /// Coefficient-wise negation mod `q`: `q - c` for non-zero coefficients,
    /// `0` for zero coefficients (per the specification's edge case note).
    pub fn negate_mod(&self, q: &BigInt) -> Polynomial {
        let mut out = Polynomial::zero(self.len());
        for (i, c) in self.coeffs.iter().enumerate() {
            let reduced = c.mod_floor(q);
            let negated = if reduced.is_zero() {
                BigInt::zero()
            } else {
                q - &reduced
            };
            out.set_coeff(i, negated);
        }
        out
    }

    pub fn scalar_mul(&self, scalar: &BigInt) -> Polynomial {
        let mut out = Polynomial::zero(self.len());
        for (i, c) in self.coeffs.iter().enumerate() {
            out.set_coeff(i, c * scalar);
        }
        out
    }

    /// Full (unreduced) convolution: `self * other` in `Z[x]`.
    pub fn convolve(&self, other: &Polynomial) -> Polynomial {
        if self.is_empty() || other.is_empty() {
            return Polynomial::zero(0);
        }
        let out_len = self.len() + other.len() - 1;
        let mut out = Polynomial::zero(out_len);
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                if b.is_zero() {
                    continue;
                }
                let existing = out.coeff(i + j);
                out.set_coeff(i + j, existing + a * b);
            }
        }
        out
    }

    /// `mul_mod(a, b, φ)`: convolution, fold modulo `x^n + 1`, reduce mod
    /// `q`.
    pub fn mul_mod(&self, other: &Polynomial, n: usize, q: &BigInt) -> Polynomial {
        let mut product = self.convolve(other).reduce_mod_phi(n);
        product.reduce_mod_q(q);
        product
    }

    /// `pow_mod(a, k, φ)` by repeated squaring, reduced mod `q` at every
    /// step.
    pub fn pow_mod(&self, mut exponent: u64, n: usize, q: &BigInt) -> Polynomial {
        let mut result = {
            let mut one = Polynomial::zero(n);
            one.set_coeff(0, BigInt::one());
            one
        };
        let mut base = self.clone();
        base.pad_to(n);
        base.reduce_mod_q(q);
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.mul_mod(&base, n, q);
            }
            base = base.mul_mod(&base, n, q);
            exponent >>= 1;
        }
        result
    }
}
