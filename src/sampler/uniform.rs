//! Uniform sampling over `[min, max)`.
//!
//! Grounded in `original_source/src/sample.cpp`'s `UniformSample`: a
//! specialized single-bit path when the range is exactly 2 (any
//! cryptographically strong bit source suffices per the specification),
//! falling back to rejection sampling against the smallest byte width that
//! covers the range otherwise.

use crate::bigint::BigInt;
use crate::ring::Polynomial;
use crate::traits::RandomBytes;

/// Samples `len` coefficients independently uniform in `[min, max)`.
pub fn uniform_poly<R: RandomBytes>(
    rng: &mut R,
    len: usize,
    min: &BigInt,
    max: &BigInt,
) -> Polynomial {
    let range = max - min;
    debug_assert!(!range.is_negative() && !range.is_zero());

    if range == BigInt::from_i64(2) {
        return uniform_bits(rng, len, min);
    }

    let mut out = Polynomial::zero(len);
    for i in 0..len {
        out.set_coeff(i, min + &uniform_below(rng, &range));
    }
    out
}

/// Samples `len` coefficients independently uniform in `[0, max)`.
pub fn uniform_poly_below<R: RandomBytes>(rng: &mut R, len: usize, max: &BigInt) -> Polynomial {
    uniform_poly(rng, len, &BigInt::zero(), max)
}

fn uniform_bits<R: RandomBytes>(rng: &mut R, len: usize, min: &BigInt) -> Polynomial {
    let nbytes = (len + 7) / 8;
    let mut bits = vec![0u8; nbytes];
    rng.fill(&mut bits);
    let mut out = Polynomial::zero(len);
    for i in 0..len {
        let bit = (bits[i / 8] >> (i % 8)) & 1;
        out.set_coeff(i, min + BigInt::from_u64(bit as u64));
    }
    out
}

/// Rejection-samples a value uniform in `[0, range)`.
fn uniform_below<R: RandomBytes>(rng: &mut R, range: &BigInt) -> BigInt {
    let bits = range.bits_len();
    let bytes_needed = ((bits + 7) / 8).max(1) as usize;
    loop {
        let mut buf = vec![0u8; bytes_needed];
        rng.fill(&mut buf);
        let candidate = BigInt::from_bytes_be(&buf);
        if &candidate < range {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::XofBytes;

    #[test]
    fn uniform_poly_range() {
        let mut rng = XofBytes::new(b"uniform-poly-test-seed");
        let lo = BigInt::from_i64(-3);
        let hi = BigInt::from_i64(11);
        let p = uniform_poly(&mut rng, 256, &lo, &hi);
        for c in p.coeffs() {
            assert!(*c >= lo && *c < hi);
        }
    }

    #[test]
    fn uniform_bits_ternary() {
        let mut rng = XofBytes::new(b"ternary-seed");
        let p = uniform_poly(&mut rng, 64, &BigInt::from_i64(0), &BigInt::from_i64(2));
        for c in p.coeffs() {
            assert!(c.is_zero() || *c == BigInt::from_i64(1));
        }
    }

    /// Property test for the uniform-sampling range invariant (§8), run
    /// with `cargo test --features property-tests`.
    #[cfg(feature = "property-tests")]
    mod quickcheck_tests {
        use super::*;

        quickcheck::quickcheck! {
            fn uniform_poly_stays_in_range(seed: Vec<u8>, lo: i16, span: u8) -> bool {
                let seed = if seed.is_empty() { vec![0u8] } else { seed };
                let mut rng = XofBytes::new(&seed);
                let lo_big = BigInt::from_i64(lo as i64);
                let hi_big = BigInt::from_i64(lo as i64 + span as i64 + 2);
                let p = uniform_poly(&mut rng, 32, &lo_big, &hi_big);
                p.coeffs().iter().all(|c| *c >= lo_big && *c < hi_big)
            }
        }
    }
}
