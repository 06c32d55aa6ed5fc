//! FV: a somewhat-homomorphic public-key encryption scheme over
//! `R_q = Z_q[x]/(x^n+1)`.
//!
//! Grounded in `original_source/src/fv_params.cpp`, `fv_keygen.cpp`,
//! `fv_encrypt.cpp`, `fv_eval.cpp`, and `fv_encode.cpp`. Key/ciphertext
//! types hold an `Arc<KeyParameters>` rather than the original's raw C++
//! reference: the specification's "non-owning reference" back-reference
//! (§9) is reproduced here as a cheap, thread-shareable handle instead of a
//! lifetime, since ciphertexts and keys routinely outlive the stack frame
//! that constructed their parameters in idiomatic Rust use (see DESIGN.md).

use std::sync::Arc;

use zeroize::Zeroize;

use crate::bigint::{BigInt, Rational};
use crate::error::{Result, RlweError};
use crate::polyutil::{center_coeffs, round_coeffs};
use crate::ring::Polynomial;
use crate::sampler::gaussian::ProbabilityMatrix;
use crate::sampler::{knuth_yao_sample, uniform_poly, uniform_poly_below};
use crate::traits::RandomBytes;

/// `σ` used when a caller asks for FV's default 128-bit-class parameters.
pub const DEFAULT_ERROR_STANDARD_DEVIATION: f64 = 3.192;
/// `log_w`: the base-`w` relinearization decomposition is in powers of
/// `2^{DEFAULT_DECOMPOSITION_BIT_COUNT}`.
pub const DEFAULT_DECOMPOSITION_BIT_COUNT: u32 = 32;

/// Immutable FV parameter set: `n, q, t, log_w, σ` plus everything derived
/// from them (`Δ`, the `t/q` rounding scalar, `w`, `w_mask`, `l`, and the
/// Knuth-Yao probability matrix). Equality is structural over the given
/// inputs, per the specification's §9 parameter-object note.
#[derive(Clone, Debug)]
pub struct KeyParameters {
    n: usize,
    q: BigInt,
    t: BigInt,
    log_w: u32,
    sigma: f64,
    delta: BigInt,
    decrypt_scalar: Rational,
    w: BigInt,
    w_mask: BigInt,
    l: u32,
    matrix: ProbabilityMatrix,
}

impl PartialEq for KeyParameters {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
            && self.q == other.q
            && self.t == other.t
            && self.log_w == other.log_w
            && self.sigma == other.sigma
    }
}

impl KeyParameters {
    /// Validating constructor using the default decomposition width and
    /// error standard deviation.
    pub fn new(n: usize, q: BigInt, t: BigInt) -> Result<Self> {
        Self::with_params(n, q, t, DEFAULT_DECOMPOSITION_BIT_COUNT, DEFAULT_ERROR_STANDARD_DEVIATION)
    }

    /// Validating constructor for fully custom parameters.
    pub fn with_params(n: usize, q: BigInt, t: BigInt, log_w: u32, sigma: f64) -> Result<Self> {
        if n == 0 || n % 2 != 0 {
            return Err(RlweError::InvalidParameters("n must be even and non-zero"));
        }
        if t.is_zero() {
            return Err(RlweError::InvalidParameters("t must be non-zero"));
        }
        if q.is_zero() {
            return Err(RlweError::InvalidParameters("q must be non-zero"));
        }

        let delta = q.div_floor(&t);
        let decrypt_scalar = Rational::new(t.clone(), q.clone());

        let w = BigInt::one().shl(log_w as u64);
        let w_mask = &w - &BigInt::one();

        // l = floor(log_w(q)): the largest l with w^l <= q.
        let mut l = 0u32;
        let mut w_pow = BigInt::one();
        loop {
            let next = &w_pow * &w;
            if next > q {
                break;
            }
            w_pow = next;
            l += 1;
        }

        let matrix = ProbabilityMatrix::build(sigma);

        tracing::debug!(n, %q, %t, log_w, sigma, l, "constructed FV key parameters");

        Ok(KeyParameters {
            n,
            q,
            t,
            log_w,
            sigma,
            delta,
            decrypt_scalar,
            w,
            w_mask,
            l,
            matrix,
        })
    }

    /// `n = 1024, q = 12289, t = 2, log_w = 32, σ = 3.192` per §6's Defaults
    /// table.
    pub fn default_params() -> Self {
        Self::new(1024, BigInt::from_i64(12289), BigInt::from_i64(2))
            .expect("default FV parameters are always valid")
    }

    pub fn n(&self) -> usize {
        self.n
    }
    pub fn q(&self) -> &BigInt {
        &self.q
    }
    pub fn t(&self) -> &BigInt {
        &self.t
    }
    pub fn delta(&self) -> &BigInt {
        &self.delta
    }
    pub fn decrypt_scalar(&self) -> &Rational {
        &self.decrypt_scalar
    }
    pub fn decomposition_base(&self) -> &BigInt {
        &self.w
    }
    pub fn decomposition_mask(&self) -> &BigInt {
        &self.w_mask
    }
    pub fn decomposition_bit_count(&self) -> u32 {
        self.log_w
    }
    pub fn decomposition_term_count(&self) -> u32 {
        self.l
    }
    pub fn probability_matrix(&self) -> &ProbabilityMatrix {
        &self.matrix
    }

    /// `φ = x^n + 1`, returned as its coefficient-degree (the modulus is
    /// implicit in every ring op that takes `n` directly).
    pub fn poly_modulus_degree(&self) -> usize {
        self.n
    }
}

/// `s`, sampled uniformly from `{-1, 0, 1}^n`.
pub struct PrivateKey {
    secret: Polynomial,
    params: Arc<KeyParameters>,
}

impl PrivateKey {
    pub fn secret(&self) -> &Polynomial {
        &self.secret
    }
    pub fn parameters(&self) -> &Arc<KeyParameters> {
        &self.params
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        for c in self.secret.coeffs_mut() {
            c.zeroize();
        }
    }
}

/// `(p0, p1)` with `p1 = a` uniform and `p0 = -(a*s + e) mod q, mod φ`.
#[derive(Clone)]
pub struct PublicKey {
    p0: Polynomial,
    p1: Polynomial,
    params: Arc<KeyParameters>,
}

impl PublicKey {
    pub fn p0(&self) -> &Polynomial {
        &self.p0
    }
    pub fn p1(&self) -> &Polynomial {
        &self.p1
    }
    pub fn parameters(&self) -> &Arc<KeyParameters> {
        &self.params
    }
}

/// `l+1` pairs `(b_i, a_i)` encrypting `w^i * s^level` under `s`, enabling
/// relinearization of a length-`level+1` ciphertext back to length 2.
#[derive(Clone)]
pub struct EvaluationKey {
    pairs: Vec<(Polynomial, Polynomial)>,
    level: u64,
    params: Arc<KeyParameters>,
}

impl EvaluationKey {
    pub fn level(&self) -> u64 {
        self.level
    }
    pub fn pairs(&self) -> &[(Polynomial, Polynomial)] {
        &self.pairs
    }
}

/// A message polynomial in `Z_t[x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext {
    message: Polynomial,
    params_t: BigInt,
}

impl Plaintext {
    /// Builds a plaintext directly from a message polynomial already
    /// reduced mod `t`, bypassing [`encode_integer`]'s integer codec. Used
    /// where the caller already has an `R_t` element (e.g. a uniform
    /// sample for a round-trip test) rather than an integer to encode.
    pub fn from_message(message: Polynomial, t: BigInt) -> Self {
        Plaintext {
            message,
            params_t: t,
        }
    }

    pub fn message(&self) -> &Polynomial {
        &self.message
    }
}

/// Variable-arity ciphertext: `(c_0, c_1, ..., c_{k-1})`. Fresh encryptions
/// have arity 2; multiplication lifts to 3; relinearization reduces back
/// to 2 (per the specification's §9 "variable-arity ciphertexts" note, this
/// is a `Vec`, never a fixed pair).
#[derive(Clone)]
pub struct Ciphertext {
    c: Vec<Polynomial>,
    params: Arc<KeyParameters>,
}

pub fn generate_private_key<R: RandomBytes>(params: &Arc<KeyParameters>, rng: &mut R) -> PrivateKey {
    let secret = uniform_poly(
        rng,
        params.n(),
        &BigInt::from_i64(-1),
        &BigInt::from_i64(2),
    );
    PrivateKey {
        secret,
        params: params.clone(),
    }
}

fn mul_add_mod(a: &Polynomial, b: &Polynomial, e: &Polynomial, n: usize, q: &BigInt) -> Polynomial {
    let mut out = a.mul_mod(b, n, q).add(e);
    out.reduce_mod_q(q);
    out
}

/// Samples `a` and `e` internally and derives `p0 = -(a*s + e)`.
pub fn generate_public_key<R: RandomBytes>(priv_key: &PrivateKey, rng: &mut R) -> PublicKey {
    let params = &priv_key.params;
    let a = uniform_poly_below(rng, params.n(), params.q());
    let e = knuth_yao_sample(rng, params.n(), params.probability_matrix());
    generate_public_key_with(priv_key, a, e)
}

/// Deterministic variant: `a` and `e` supplied by the caller.
pub fn generate_public_key_with(priv_key: &PrivateKey, a: Polynomial, e: Polynomial) -> PublicKey {
    let params = &priv_key.params;
    let combined = mul_add_mod(&a, &priv_key.secret, &e, params.n(), params.q());
    let p0 = combined.negate_mod(params.q());
    PublicKey {
        p0,
        p1: a,
        params: params.clone(),
    }
}

pub fn generate_evaluation_key<R: RandomBytes>(
    priv_key: &PrivateKey,
    level: u64,
    rng: &mut R,
) -> EvaluationKey {
    let params = &priv_key.params;
    let n = params.n();
    let q = params.q();
    let s_level = priv_key.secret.pow_mod(level, n, q);

    let mut pairs = Vec::with_capacity(params.decomposition_term_count() as usize + 1);
    let mut tmp_w = BigInt::one();
    for _ in 0..=params.decomposition_term_count() {
        let a = uniform_poly_below(rng, n, q);
        let e = knuth_yao_sample(rng, n, params.probability_matrix());

        let combined = mul_add_mod(&a, &priv_key.secret, &e, n, q);
        let neg = combined.negate_mod(q);
        let mut scaled = s_level.scalar_mul(&tmp_w);
        scaled.reduce_mod_q(q);
        let mut b = neg.add(&scaled);
        b.reduce_mod_q(q);

        pairs.push((b, a));
        tmp_w = &tmp_w * params.decomposition_base();
    }

    tracing::debug!(level, terms = pairs.len(), "generated FV evaluation key");
    EvaluationKey {
        pairs,
        level,
        params: params.clone(),
    }
}

/// `EncodeInteger(x, base)`: base-`b` encoding with `b == 2` handled as a
/// bit expansion (per the specification's §4.5 edge case), `b > 2` as
/// base-`b` digits. Negative integers flip the sign of every non-zero
/// coefficient (`t - digit`). `base < 2` is a precondition violation.
pub fn encode_integer(integer: &BigInt, base: u64, params: &Arc<KeyParameters>) -> Result<Plaintext> {
    if base < 2 {
        return Err(RlweError::InvalidParameters("encoding base must be >= 2"));
    }

    let t = params.t().clone();
    let negative = integer.is_negative();
    let abs = integer.abs();
    let mut message = Polynomial::zero(0);

    if base == 2 {
        let bits = abs.bits_len();
        let sign_value = if negative { &t - &BigInt::one() } else { BigInt::one() };
        for i in 0..bits {
            if abs.bit(i) {
                message.set_coeff(i as usize, sign_value.clone());
            }
        }
    } else {
        let base_big = BigInt::from_u64(base);
        let mut remaining = abs;
        let mut i = 0usize;
        while !remaining.is_zero() {
            let digit = remaining.mod_floor(&base_big);
            message.set_coeff(i, digit);
            remaining = remaining.div_floor(&base_big);
            i += 1;
        }
        if negative {
            let degree = message.degree();
            if degree >= 0 {
                for idx in 0..=degree as usize {
                    let digit = message.coeff(idx);
                    if !digit.is_zero() {
                        message.set_coeff(idx, &t - &digit);
                    }
                }
            }
        }
    }

    Ok(Plaintext {
        message,
        params_t: t,
    })
}

/// `DecodeInteger(ptx, base)`: coefficients above `t/2` are treated as
/// negative residues. `base < 2` is a precondition violation.
pub fn decode_integer(ptx: &Plaintext, base: u64) -> Result<BigInt> {
    if base < 2 {
        return Err(RlweError::InvalidParameters("decoding base must be >= 2"));
    }
    let t = &ptx.params_t;
    let center = t.div_floor(&BigInt::from_i64(2));
    let base_big = BigInt::from_u64(base);

    let mut integer = BigInt::zero();
    let mut scale = BigInt::one();
    let degree = ptx.message.degree();
    if degree >= 0 {
        for i in 0..=degree as usize {
            let c = ptx.message.coeff(i);
            let signed = if c > center { &c - t } else { c };
            integer = integer + &signed * &scale;
            scale = &scale * &base_big;
        }
    }
    Ok(integer)
}

/// `Encrypt(ptx, pub)`: `c0 = p0*u + e1 + Δ*m`, `c1 = p1*u + e2`.
pub fn encrypt<R: RandomBytes>(ptx: &Plaintext, pub_key: &PublicKey, rng: &mut R) -> Ciphertext {
    let params = &pub_key.params;
    let n = params.n();
    let q = params.q();

    let mut scaled = ptx.message.scalar_mul(params.delta());
    scaled.reduce_mod_q(q);

    let u = uniform_poly(rng, n, &BigInt::from_i64(-1), &BigInt::from_i64(2));
    let e1 = knuth_yao_sample(rng, n, params.probability_matrix());
    let e2 = knuth_yao_sample(rng, n, params.probability_matrix());

    let mut c0 = pub_key.p0.mul_mod(&u, n, q).add(&e1).add(&scaled);
    c0.reduce_mod_q(q);
    let mut c1 = pub_key.p1.mul_mod(&u, n, q).add(&e2);
    c1.reduce_mod_q(q);

    Ciphertext {
        c: vec![c0, c1],
        params: params.clone(),
    }
}

/// `Decrypt(ctx, priv)`: `m̃ = Σ c_i s^i`, centered then downscaled by
/// `t/q`. Silently returns a wrong plaintext if the noise budget was
/// exceeded (the specification's §7/§4.4 "fails silently" contract; this
/// crate never detects or reports it).
pub fn decrypt(ctx: &Ciphertext, priv_key: &PrivateKey) -> Plaintext {
    let params = &priv_key.params;
    let n = params.n();
    let q = params.q();

    let mut accumulator = Polynomial::zero(n);
    for (i, c_i) in ctx.c.iter().enumerate() {
        let s_pow = priv_key.secret.pow_mod(i as u64, n, q);
        accumulator = accumulator.add(&c_i.mul_mod(&s_pow, n, q));
    }
    accumulator.reduce_mod_q(q);

    let centered = center_coeffs(&accumulator, q);
    let message = round_coeffs(&centered, params.decrypt_scalar(), params.t());

    Plaintext {
        message,
        params_t: params.t().clone(),
    }
}

impl Ciphertext {
    pub fn len(&self) -> usize {
        self.c.len()
    }
    pub fn is_empty(&self) -> bool {
        self.c.is_empty()
    }
    pub fn component(&self, i: usize) -> &Polynomial {
        &self.c[i]
    }
    pub fn parameters(&self) -> &Arc<KeyParameters> {
        &self.params
    }

    /// Pointwise sum, copying the tail of the longer operand unchanged
    /// when arities differ (the specification's §4.1 edge case).
    pub fn add(&self, other: &Ciphertext) -> Ciphertext {
        let q = self.params.q();
        let max_len = self.c.len().max(other.c.len());
        let mut out = Vec::with_capacity(max_len);
        for i in 0..max_len {
            let r = match (self.c.get(i), other.c.get(i)) {
                (Some(a), Some(b)) => {
                    let mut r = a.add(b);
                    r.reduce_mod_q(q);
                    r
                }
                (Some(a), None) => a.clone(),
                (None, Some(b)) => b.clone(),
                (None, None) => unreachable!(),
            };
            out.push(r);
        }
        Ciphertext {
            c: out,
            params: self.params.clone(),
        }
    }

    /// Coefficient-wise negation mod `q` applied to every component.
    pub fn negate(&self) -> Ciphertext {
        let q = self.params.q();
        Ciphertext {
            c: self.c.iter().map(|p| p.negate_mod(q)).collect(),
            params: self.params.clone(),
        }
    }

    /// Lifts a length-`(j+1)` ciphertext times a length-`(k+1)` ciphertext
    /// to length `j+k+1`: the convolution accumulates in `Z[x]/(x^n+1)`
    /// (reduced by `φ` but not yet by `q`) before a single `round_coeffs`
    /// downscale by `t/q` per output coefficient.
    pub fn mul(&self, other: &Ciphertext) -> Ciphertext {
        let params = &self.params;
        let n = params.n();
        let q = params.q();
        let j = self.c.len() - 1;
        let k = other.c.len() - 1;

        let mut out = Vec::with_capacity(j + k + 1);
        for m in 0..=(j + k) {
            let mut sum = Polynomial::zero(n);
            let lo = m.saturating_sub(k);
            let hi = m.min(j);
            for r in lo..=hi {
                let s = m - r;
                let term = self.c[r].convolve(&other.c[s]).reduce_mod_phi(n);
                sum = sum.add(&term);
            }
            let rounded = round_coeffs(&sum, params.decrypt_scalar(), q);
            out.push(rounded);
        }

        tracing::trace!(arity = out.len(), "FV ciphertext multiplication");
        Ciphertext {
            c: out,
            params: params.clone(),
        }
    }

    /// Version-1 relinearization: reduces a length-3 ciphertext (the
    /// result of one multiplication) back to length 2 using a level-2
    /// evaluation key. Ciphertexts of length `<= 2` are returned unchanged.
    /// Lengths greater than 3 are undefined behaviour per the
    /// specification's open question (§9) and are not handled here.
    pub fn relinearize(&self, evk: &EvaluationKey) -> Ciphertext {
        if self.c.len() <= 2 {
            return self.clone();
        }

        let params = &self.params;
        let n = params.n();
        let q = params.q();
        assert_eq!(evk.level, (self.c.len() - 1) as u64, "evaluation key level mismatch");

        let mask = params.decomposition_mask();
        let log_w = params.decomposition_bit_count() as u64;

        let mut remainder = self.c[2].clone();
        let mut c0_addition = Polynomial::zero(n);
        let mut c1_addition = Polynomial::zero(n);

        for (b_i, a_i) in evk.pairs() {
            let mut digit = Polynomial::zero(n);
            for i in 0..n {
                digit.set_coeff(i, remainder.coeff(i).bitand(mask));
            }
            let shifted: Vec<BigInt> = remainder.coeffs().iter().map(|c| c.shr(log_w)).collect();
            remainder = Polynomial::from_coeffs(shifted);

            c0_addition = c0_addition.add(&b_i.mul_mod(&digit, n, q));
            c1_addition = c1_addition.add(&a_i.mul_mod(&digit, n, q));
        }

        let mut c0 = self.c[0].add(&c0_addition);
        c0.reduce_mod_q(q);
        let mut c1 = self.c[1].add(&c1_addition);
        c1.reduce_mod_q(q);

        Ciphertext {
            c: vec![c0, c1],
            params: params.clone(),
        }
    }
}

impl core::ops::Add for &Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: &Ciphertext) -> Ciphertext {
        Ciphertext::add(self, rhs)
    }
}

impl core::ops::Mul for &Ciphertext {
    type Output = Ciphertext;
    fn mul(self, rhs: &Ciphertext) -> Ciphertext {
        Ciphertext::mul(self, rhs)
    }
}

impl core::ops::Neg for &Ciphertext {
    type Output = Ciphertext;
    fn neg(self) -> Ciphertext {
        Ciphertext::negate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::XofBytes;

    fn small_params() -> Arc<KeyParameters> {
        Arc::new(
            KeyParameters::with_params(16, BigInt::from_i64(874), BigInt::from_i64(7), 8, 3.192)
                .unwrap(),
        )
    }

    #[test]
    fn private_key_range() {
        let params = small_params();
        let mut rng = XofBytes::new(b"fv-privkey-seed");
        let priv_key = generate_private_key(&params, &mut rng);
        for c in priv_key.secret().coeffs() {
            assert!(*c == BigInt::from_i64(0) || *c == BigInt::from_i64(1) || *c == BigInt::from_i64(-1));
        }
    }

    #[test]
    fn encode_decode_round_trip_small_base() {
        let params = small_params();
        for &x in &[1337i64, -1337, 0, 1] {
            let pt = encode_integer(&BigInt::from_i64(x), 2, &params).unwrap();
            let decoded = decode_integer(&pt, 2).unwrap();
            assert_eq!(decoded, BigInt::from_i64(x));

            let pt3 = encode_integer(&BigInt::from_i64(x), 3, &params).unwrap();
            let decoded3 = decode_integer(&pt3, 3).unwrap();
            assert_eq!(decoded3, BigInt::from_i64(x));
        }
    }

    #[test]
    fn encode_rejects_invalid_base() {
        let params = small_params();
        let err = encode_integer(&BigInt::from_i64(1), 1, &params).unwrap_err();
        assert_eq!(err, RlweError::InvalidParameters("encoding base must be >= 2"));
    }

    #[test]
    fn encrypt_decrypt_round_trip_small_params() {
        let params = small_params();
        let mut rng = XofBytes::new(b"fv-roundtrip-seed");
        let priv_key = generate_private_key(&params, &mut rng);
        let pub_key = generate_public_key(&priv_key, &mut rng);

        let pt = encode_integer(&BigInt::from_i64(1337), 2, &params).unwrap();
        let ctx = encrypt(&pt, &pub_key, &mut rng);
        let decrypted = decrypt(&ctx, &priv_key);
        let decoded = decode_integer(&decrypted, 2).unwrap();
        assert_eq!(decoded, BigInt::from_i64(1337));
    }

    #[test]
    fn encrypt_decrypt_round_trip_negative() {
        let params = small_params();
        let mut rng = XofBytes::new(b"fv-roundtrip-neg-seed");
        let priv_key = generate_private_key(&params, &mut rng);
        let pub_key = generate_public_key(&priv_key, &mut rng);

        let pt = encode_integer(&BigInt::from_i64(-1337), 2, &params).unwrap();
        let ctx = encrypt(&pt, &pub_key, &mut rng);
        let decrypted = decrypt(&ctx, &priv_key);
        let decoded = decode_integer(&decrypted, 2).unwrap();
        assert_eq!(decoded, BigInt::from_i64(-1337));
    }

    #[test]
    fn ciphertext_addition_matches_plaintext_sum_mod_t() {
        let params = Arc::new(KeyParameters::default_params());
        let mut rng = XofBytes::new(b"fv-add-seed");
        let priv_key = generate_private_key(&params, &mut rng);
        let pub_key = generate_public_key(&priv_key, &mut rng);

        let n = params.n();
        let mut rng2 = XofBytes::new(b"fv-add-msg-seed");
        let m1 = uniform_poly_below(&mut rng2, n, params.t());
        let m2 = uniform_poly_below(&mut rng2, n, params.t());

        let pt1 = Plaintext {
            message: m1.clone(),
            params_t: params.t().clone(),
        };
        let pt2 = Plaintext {
            message: m2.clone(),
            params_t: params.t().clone(),
        };

        let ctx1 = encrypt(&pt1, &pub_key, &mut rng);
        let ctx2 = encrypt(&pt2, &pub_key, &mut rng);
        let summed = ctx1.add(&ctx2);
        let decrypted = decrypt(&summed, &priv_key);

        for i in 0..n {
            let expected = (m1.coeff(i) + m2.coeff(i)).mod_floor(params.t());
            assert_eq!(decrypted.message().coeff(i), expected);
        }
    }

    #[test]
    fn multiply_then_relinearize_preserves_arity_and_semantics() {
        let params = Arc::new(
            KeyParameters::new(
                2048,
                BigInt::from_i64(1152921504606830600),
                BigInt::from_i64(2),
            )
            .unwrap(),
        );
        let mut rng = XofBytes::new(b"fv-mul-seed");
        let priv_key = generate_private_key(&params, &mut rng);
        let pub_key = generate_public_key(&priv_key, &mut rng);
        let evk = generate_evaluation_key(&priv_key, 2, &mut rng);

        let n = params.n();
        let mut rng2 = XofBytes::new(b"fv-mul-msg-seed");
        let m1 = uniform_poly_below(&mut rng2, n, params.t());
        let m2 = uniform_poly_below(&mut rng2, n, params.t());

        let pt1 = Plaintext {
            message: m1.clone(),
            params_t: params.t().clone(),
        };
        let pt2 = Plaintext {
            message: m2.clone(),
            params_t: params.t().clone(),
        };

        let ctx1 = encrypt(&pt1, &pub_key, &mut rng);
        let ctx2 = encrypt(&pt2, &pub_key, &mut rng);

        let product = ctx1.mul(&ctx2);
        assert_eq!(product.len(), 3);

        let relinearized = product.relinearize(&evk);
        assert_eq!(relinearized.len(), 2);

        let decrypted = decrypt(&relinearized, &priv_key);
        let expected = m1.convolve(&m2).reduce_mod_phi(n);
        for i in 0..n {
            let expected_coeff = expected.coeff(i).mod_floor(params.t());
            assert_eq!(decrypted.message().coeff(i), expected_coeff);
        }
    }

    /// Property tests for the encode/decode round-trip law (§8), run with
    /// `cargo test --features property-tests`.
    #[cfg(feature = "property-tests")]
    mod quickcheck_tests {
        use super::*;

        quickcheck::quickcheck! {
            fn encode_decode_round_trips_base2(x: i64) -> bool {
                let params = small_params();
                let pt = encode_integer(&BigInt::from_i64(x), 2, &params).unwrap();
                decode_integer(&pt, 2).unwrap() == BigInt::from_i64(x)
            }

            fn encode_decode_round_trips_base3(x: i64) -> bool {
                let params = small_params();
                let pt = encode_integer(&BigInt::from_i64(x), 3, &params).unwrap();
                decode_integer(&pt, 3).unwrap() == BigInt::from_i64(x)
            }
        }
    }
}
