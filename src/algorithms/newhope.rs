//! NewHope-Simple: a post-quantum ephemeral key exchange producing a
//! 32-byte shared secret between a `Server` and a `Client`.
//!
//! Grounded in `original_source/src/newhope_params.cpp`, `newhope_gen.cpp`,
//! `newhope_util.cpp`, and `newhope_kex.cpp`.

use std::sync::Arc;

use zeroize::Zeroize;

use crate::bigint::BigInt;
use crate::error::{Result, RlweError};
use crate::polyutil::{compress_poly, decompress_poly};
use crate::ring::Polynomial;
use crate::sampler::gaussian::ProbabilityMatrix;
use crate::sampler::knuth_yao_sample;
use crate::traits::RandomBytes;
use crate::xof::{sha3_256, Shake128Stream};

pub const DEFAULT_POLY_MODULUS_DEGREE: usize = 1024;
pub const DEFAULT_COEFF_MODULUS: i64 = 12289;
pub const DEFAULT_ERROR_STANDARD_DEVIATION: f64 = 2.828;

pub const SEED_BYTE_LENGTH: usize = 32;
pub const SHARED_KEY_BYTE_LENGTH: usize = 32;

/// Immutable NewHope parameter set: `n, q, σ`.
#[derive(Clone, Debug)]
pub struct KeyParameters {
    n: usize,
    q: BigInt,
    sigma: f64,
    matrix: ProbabilityMatrix,
}

impl PartialEq for KeyParameters {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.q == other.q && self.sigma == other.sigma
    }
}

impl KeyParameters {
    pub fn new(n: usize, q: BigInt, sigma: f64) -> Result<Self> {
        if n == 0 || n % 2 != 0 {
            return Err(RlweError::InvalidParameters("n must be even and non-zero"));
        }
        if q.is_zero() {
            return Err(RlweError::InvalidParameters("q must be non-zero"));
        }
        let matrix = ProbabilityMatrix::build(sigma);
        tracing::debug!(n, %q, sigma, "constructed NewHope key parameters");
        Ok(KeyParameters { n, q, sigma, matrix })
    }

    /// `n = 1024, q = 12289, σ = 2.828` per §6's Defaults table.
    pub fn default_params() -> Self {
        Self::new(
            DEFAULT_POLY_MODULUS_DEGREE,
            BigInt::from_i64(DEFAULT_COEFF_MODULUS),
            DEFAULT_ERROR_STANDARD_DEVIATION,
        )
        .expect("default NewHope parameters are always valid")
    }

    pub fn n(&self) -> usize {
        self.n
    }
    pub fn q(&self) -> &BigInt {
        &self.q
    }
    pub fn probability_matrix(&self) -> &ProbabilityMatrix {
        &self.matrix
    }

    /// `⌈log2 q⌉`, the bit width used to pack public-key coefficients on
    /// the wire.
    fn coeff_bit_length(&self) -> u32 {
        self.q.bits_len() as u32
    }
}

/// SHAKE-128-based rejection sampling of a polynomial uniform in
/// `[0, 5q)`, expanded from a 32-byte seed. Grounded in
/// `original_source/src/newhope_util.cpp`'s `Parse`; this implementation
/// reads continuously from a single SHAKE-128 squeeze rather than
/// reallocating and re-deriving a larger fixed-size buffer on exhaustion,
/// since a XOF's output is a deterministic prefix-stable stream — reading
/// further bytes from the same reader is bit-identical to the original's
/// "regrow by 128 bytes and rerun" strategy.
pub fn parse(seed: &[u8], len: usize, q: &BigInt) -> Polynomial {
    let mut stream = Shake128Stream::new(seed);
    let five_q = q * &BigInt::from_i64(5);
    let mut out = Polynomial::zero(len);
    for idx in 0..len {
        loop {
            let mut word_bytes = [0u8; 2];
            stream.read(&mut word_bytes);
            let word = ((word_bytes[0] as u64) << 8) | (word_bytes[1] as u64);
            let candidate = BigInt::from_u64(word);
            if candidate < five_q {
                out.set_coeff(idx, candidate);
                break;
            }
        }
    }
    out
}

/// `NHSEncode`: a 4-way repetition code mapping a 256-bit message into
/// `R_q`, assigning `⌊q/2⌋` per set bit and `0` per clear bit at offsets
/// `{i, i+256, i+512, i+768}`.
pub fn nhs_encode(v: &[u8; SHARED_KEY_BYTE_LENGTH], q: &BigInt, n: usize) -> Polynomial {
    let half_q = q.div_floor(&BigInt::from_i64(2));
    let mut k = Polynomial::zero(n);
    for i in 0..256 {
        let byte = v[i / 8];
        let bit = (byte >> (7 - (i % 8))) & 1;
        let value = if bit == 1 { half_q.clone() } else { BigInt::zero() };
        k.set_coeff(i, value.clone());
        k.set_coeff(i + 256, value.clone());
        k.set_coeff(i + 512, value.clone());
        k.set_coeff(i + 768, value);
    }
    k
}

/// `NHSDecode`: the inverse repetition-code vote, `t = -2q + Σ k[i+256j]`,
/// bit set iff `t < q`.
pub fn nhs_decode(k: &Polynomial, q: &BigInt) -> [u8; SHARED_KEY_BYTE_LENGTH] {
    let mut v = [0u8; SHARED_KEY_BYTE_LENGTH];
    let neg_2q = &BigInt::from_i64(-2) * q;
    for i in 0..256 {
        let mut t = neg_2q.clone();
        for j in 0..4 {
            t = t + k.coeff(i + 256 * j);
        }
        if t < *q {
            v[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    v
}

/// `NHSCompress`: `cc_i = ⌊(c_i*8 + q/2)/q⌋ mod 8`.
pub fn nhs_compress(c: &Polynomial, q: &BigInt) -> Polynomial {
    let half_q = q.div_floor(&BigInt::from_i64(2));
    let eight = BigInt::from_i64(8);
    let mut cc = Polynomial::zero(c.len());
    for i in 0..c.len() {
        let scaled = c.coeff(i) * eight.clone();
        let z = (scaled + half_q.clone()).div_floor(q);
        cc.set_coeff(i, z.mod_floor(&eight));
    }
    cc
}

/// `NHSDecompress`: `c_i = ⌊(cc_i*q + 4)/8⌋`.
pub fn nhs_decompress(cc: &Polynomial, q: &BigInt) -> Polynomial {
    let four = BigInt::from_i64(4);
    let eight = BigInt::from_i64(8);
    let mut c = Polynomial::zero(cc.len());
    for i in 0..cc.len() {
        let scaled = cc.coeff(i) * q.clone();
        let z = (scaled + four.clone()).div_floor(&eight);
        c.set_coeff(i, z);
    }
    c
}

/// Server-side handshake state: secret `s`, public `b = a*s + e`, the
/// 32-byte seed that derives `a`, and the shared key (set once the
/// serverbound packet is processed).
pub struct Server {
    secret: Polynomial,
    public: Polynomial,
    seed: [u8; SEED_BYTE_LENGTH],
    shared_key: Option<[u8; SHARED_KEY_BYTE_LENGTH]>,
    params: Arc<KeyParameters>,
}

impl Drop for Server {
    fn drop(&mut self) {
        for c in self.secret.coeffs_mut() {
            c.zeroize();
        }
        if let Some(mut key) = self.shared_key.take() {
            key.zeroize();
        }
    }
}

impl Server {
    pub fn public(&self) -> &Polynomial {
        &self.public
    }
    pub fn shared_key(&self) -> Option<&[u8; SHARED_KEY_BYTE_LENGTH]> {
        self.shared_key.as_ref()
    }
}

/// Client-side handshake state: secret `s`, errors `(e1, e2)`, public `u`,
/// ciphertext `c`, and the shared key.
pub struct Client {
    secret: Polynomial,
    errors: (Polynomial, Polynomial),
    public: Option<Polynomial>,
    ciphertext: Option<Polynomial>,
    shared_key: Option<[u8; SHARED_KEY_BYTE_LENGTH]>,
    params: Arc<KeyParameters>,
}

impl Drop for Client {
    fn drop(&mut self) {
        for c in self.secret.coeffs_mut() {
            c.zeroize();
        }
        for c in self.errors.0.coeffs_mut() {
            c.zeroize();
        }
        for c in self.errors.1.coeffs_mut() {
            c.zeroize();
        }
        if let Some(mut key) = self.shared_key.take() {
            key.zeroize();
        }
    }
}

impl Client {
    pub fn shared_key(&self) -> Option<&[u8; SHARED_KEY_BYTE_LENGTH]> {
        self.shared_key.as_ref()
    }
}

/// `Initialize(server)`: samples a fresh 32-byte seed, derives `a = Parse(seed)`,
/// samples `s, e` from the Gaussian, and computes `b = a*s + e`.
pub fn initialize_server<R: RandomBytes>(params: &Arc<KeyParameters>, rng: &mut R) -> Server {
    let mut seed = [0u8; SEED_BYTE_LENGTH];
    rng.fill(&mut seed);

    let a = parse(&seed, params.n(), params.q());
    let s = knuth_yao_sample(rng, params.n(), params.probability_matrix());
    let e = knuth_yao_sample(rng, params.n(), params.probability_matrix());

    let mut b = a.mul_mod(&s, params.n(), params.q()).add(&e);
    b.reduce_mod_q(params.q());

    Server {
        secret: s,
        public: b,
        seed,
        shared_key: None,
        params: params.clone(),
    }
}

/// `Initialize(client)`: samples `s, e1, e2` from the Gaussian.
pub fn initialize_client<R: RandomBytes>(params: &Arc<KeyParameters>, rng: &mut R) -> Client {
    let s = knuth_yao_sample(rng, params.n(), params.probability_matrix());
    let e1 = knuth_yao_sample(rng, params.n(), params.probability_matrix());
    let e2 = knuth_yao_sample(rng, params.n(), params.probability_matrix());

    Client {
        secret: s,
        errors: (e1, e2),
        public: None,
        ciphertext: None,
        shared_key: None,
        params: params.clone(),
    }
}

/// Clientbound packet: `seed(32) || pack(b, ⌈log2 q⌉)`.
pub fn clientbound_packet(server: &Server) -> Vec<u8> {
    let bits = server.params.coeff_bit_length();
    let mut out = server.seed.to_vec();
    out.extend(compress_poly(&server.public, bits));
    out
}

/// Processes a clientbound packet, advancing the client to the point
/// where its shared key and the serverbound reply are both available.
/// Returns the serverbound packet `pack(u, ⌈log2 q⌉) || pack(cc, 3)`.
pub fn process_clientbound<R: RandomBytes>(
    client: &mut Client,
    packet: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    let params = &client.params;
    let n = params.n();
    let q = params.q();
    let bits = params.coeff_bit_length();

    let seed = &packet[..SEED_BYTE_LENGTH];
    let b = decompress_poly(&packet[SEED_BYTE_LENGTH..], n, bits);
    let a = parse(seed, n, q);

    let mut u = a.mul_mod(&client.secret, n, q).add(&client.errors.0);
    u.reduce_mod_q(q);

    let mut v = [0u8; SHARED_KEY_BYTE_LENGTH];
    rng.fill(&mut v);
    let v_prime = sha3_256(&v);

    let k = nhs_encode(&v_prime, q, n);
    let mut c = b.mul_mod(&client.secret, n, q).add(&client.errors.1).add(&k);
    c.reduce_mod_q(q);
    let cc = nhs_compress(&c, q);

    let shared_key = sha3_256(&v_prime);

    let mut out = compress_poly(&u, bits);
    out.extend(compress_poly(&cc, 3));

    client.public = Some(u);
    client.ciphertext = Some(cc);
    client.shared_key = Some(shared_key);

    out
}

/// Processes a serverbound packet, completing the server's side of the
/// handshake and recovering its shared key.
pub fn process_serverbound(server: &mut Server, packet: &[u8]) {
    let params = &server.params;
    let n = params.n();
    let q = params.q();
    let bits = params.coeff_bit_length();

    let ulen_bytes = (n * bits as usize + 7) / 8;
    let u = decompress_poly(&packet[..ulen_bytes], n, bits);
    let cc = decompress_poly(&packet[ulen_bytes..], n, 3);
    let c = nhs_decompress(&cc, q);

    let us = u.mul_mod(&server.secret, n, q);
    let mut k = c.sub(&us);
    k.reduce_mod_q(q);

    let v_prime = nhs_decode(&k, q);
    let shared_key = sha3_256(&v_prime);
    server.shared_key = Some(shared_key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::XofBytes;

    #[test]
    fn nhs_encode_decode_round_trip() {
        let q = BigInt::from_i64(DEFAULT_COEFF_MODULUS);
        let mut v = [0u8; 32];
        for (i, b) in v.iter_mut().enumerate() {
            *b = (i * 37 + 11) as u8;
        }
        let k = nhs_encode(&v, &q, 1024);
        let decoded = nhs_decode(&k, &q);
        assert_eq!(decoded, v);
    }

    #[test]
    fn nhs_compress_decompress_near_identity() {
        let q = BigInt::from_i64(DEFAULT_COEFF_MODULUS);
        let mut rng = XofBytes::new(b"newhope-compress-seed");
        let c = crate::sampler::uniform_poly_below(&mut rng, 64, &q);
        let cc = nhs_compress(&c, &q);
        let back = nhs_decompress(&cc, &q);
        let bound = q.div_floor(&BigInt::from_i64(8));
        for i in 0..64 {
            let diff = (c.coeff(i) - back.coeff(i)).centered_mod(&q).abs();
            assert!(diff <= bound, "diff {diff} exceeds q/8 bound");
        }
    }

    #[test]
    fn handshake_agrees_on_shared_key() {
        let params = Arc::new(KeyParameters::default_params());
        let mut server_rng = XofBytes::new(b"newhope-server-seed");
        let mut client_rng = XofBytes::new(b"newhope-client-seed");

        let mut server = initialize_server(&params, &mut server_rng);
        let mut client = initialize_client(&params, &mut client_rng);

        let clientbound = clientbound_packet(&server);
        let serverbound = process_clientbound(&mut client, &clientbound, &mut client_rng);
        process_serverbound(&mut server, &serverbound);

        assert_eq!(server.shared_key(), client.shared_key());
        assert!(server.shared_key().is_some());
    }

    #[test]
    fn wire_format_sizes_match_defaults() {
        let params = Arc::new(KeyParameters::default_params());
        let mut rng = XofBytes::new(b"newhope-wire-seed");
        let server = initialize_server(&params, &mut rng);
        let clientbound = clientbound_packet(&server);
        assert_eq!(clientbound.len(), 32 + 1792);

        let mut client = initialize_client(&params, &mut rng);
        let serverbound = process_clientbound(&mut client, &clientbound, &mut rng);
        assert_eq!(serverbound.len(), 1792 + 384);
    }
}
