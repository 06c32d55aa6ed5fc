//! Arbitrary-precision integer wrapper and exact-rational scalars.
//!
//! The specification places "integer-type adapters" out of scope as an
//! external collaborator; this module is the thin adapter, not a bespoke
//! bignum implementation. All actual arithmetic is `num-bigint`.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Div, Mul, Neg, Rem, Sub};

use num_bigint::{BigInt as Inner, Sign};
use num_integer::Integer as _;
use num_traits::{Signed, ToPrimitive, Zero};
use zeroize::Zeroize;

/// Arbitrary-precision signed integer.
#[derive(Clone, Debug, Default)]
pub struct BigInt(Inner);

impl BigInt {
    pub fn zero() -> Self {
        BigInt(Inner::zero())
    }

    pub fn one() -> Self {
        BigInt(Inner::from(1))
    }

    pub fn from_i64(v: i64) -> Self {
        BigInt(Inner::from(v))
    }

    pub fn from_u64(v: u64) -> Self {
        BigInt(Inner::from(v))
    }

    /// Builds a `BigInt` from big-endian unsigned bytes (used for hash and
    /// keystream digests treated as integers during rejection sampling).
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        BigInt(Inner::from_bytes_be(Sign::Plus, bytes))
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn abs(&self) -> Self {
        BigInt(self.0.abs())
    }

    /// Number of bits in the magnitude (0 for zero), matching NTL's
    /// `NumBits`.
    pub fn bits_len(&self) -> u64 {
        self.0.magnitude().bits()
    }

    /// Bit `i` of the magnitude (sign ignored), matching NTL's `bit`.
    pub fn bit(&self, i: u64) -> bool {
        self.0.magnitude().bit(i)
    }

    /// Euclidean-style floor modulus, always returning a value in `[0, m)`
    /// for `m > 0`.
    pub fn mod_floor(&self, m: &BigInt) -> BigInt {
        BigInt(self.0.mod_floor(&m.0))
    }

    /// Floor division.
    pub fn div_floor(&self, m: &BigInt) -> BigInt {
        BigInt(self.0.div_floor(&m.0))
    }

    /// Reduce into the centered representative `(-m/2, m/2]`.
    pub fn centered_mod(&self, m: &BigInt) -> BigInt {
        let r = self.mod_floor(m);
        let half = m.div_floor(&BigInt::from_i64(2));
        if r > half {
            r - m.clone()
        } else {
            r
        }
    }

    pub fn pow_u32(&self, exp: u32) -> BigInt {
        BigInt(self.0.pow(exp))
    }

    pub fn shr(&self, bits: u64) -> BigInt {
        BigInt(&self.0 >> bits)
    }

    pub fn shl(&self, bits: u64) -> BigInt {
        BigInt(&self.0 << bits)
    }

    /// Bitwise AND, meaningful only on non-negative operands (used by
    /// `and_coeffs`, always applied after a mask derived from `2^k - 1`).
    pub fn bitand(&self, other: &BigInt) -> BigInt {
        BigInt(&self.0 & &other.0)
    }
}

impl PartialEq for BigInt {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for BigInt {}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}
impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for BigInt {
    fn from(v: i64) -> Self {
        BigInt::from_i64(v)
    }
}

impl From<u64> for BigInt {
    fn from(v: u64) -> Self {
        BigInt::from_u64(v)
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl $trait for BigInt {
            type Output = BigInt;
            fn $method(self, rhs: BigInt) -> BigInt {
                BigInt(self.0.$method(rhs.0))
            }
        }
        impl<'a> $trait<&'a BigInt> for &'a BigInt {
            type Output = BigInt;
            fn $method(self, rhs: &'a BigInt) -> BigInt {
                BigInt((&self.0).$method(&rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Div, div);
forward_binop!(Rem, rem);

impl Neg for BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt(-self.0)
    }
}
impl Neg for &BigInt {
    type Output = BigInt;
    fn neg(self) -> BigInt {
        BigInt(-self.0.clone())
    }
}

impl Zeroize for BigInt {
    fn zeroize(&mut self) {
        self.0 = Inner::zero();
    }
}

/// An exact rational scalar `numer/denom`, used wherever the specification
/// calls for a rounding scalar that must not lose precision to a float
/// (`t/q`, `Δ = q/t`). Grounded in `original_source/src/fv_params.cpp`,
/// which stores `delta = q / t` as a separate exact integer rather than
/// deriving it from a reciprocal.
#[derive(Clone, Debug)]
pub struct Rational {
    pub numer: BigInt,
    pub denom: BigInt,
}

impl Rational {
    pub fn new(numer: BigInt, denom: BigInt) -> Self {
        debug_assert!(!denom.is_zero());
        Rational { numer, denom }
    }

    /// `round(value * numer / denom)`, half away from zero.
    pub fn round_mul(&self, value: &BigInt) -> BigInt {
        let product = value * &self.numer;
        round_div(&product, &self.denom)
    }
}

/// `round(a / b)` with half-away-from-zero tie-breaking, computed without
/// floating point: `sign(a/b) * floor((2|a| + |b|) / (2|b|))`.
pub fn round_div(a: &BigInt, b: &BigInt) -> BigInt {
    debug_assert!(!b.is_zero());
    let negative = a.is_negative() ^ b.is_negative();
    let a_abs = a.abs();
    let b_abs = b.abs();
    let numerator = &(&a_abs + &a_abs) + &b_abs;
    let denominator = &b_abs + &b_abs;
    let magnitude = numerator.div_floor(&denominator);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}
