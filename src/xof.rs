//! Hash and XOF adapters: SHAKE-128 (`Parse` and the deterministic test
//! `RandomBytes` backend), SHA3-256 (NewHope shared-key derivation),
//! SHA-256 (TESLA's `Hash`), and the ChaCha20 keystream TESLA's `Encode`
//! consumes.
//!
//! These are all "consumed as named operations" per the specification's
//! out-of-scope list; this module is the adapter layer over the RustCrypto
//! crates the teacher's own `utils::hashing` reaches for the same way.

use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20Legacy;
use sha2::{Digest, Sha256};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Sha3_256, Shake128};

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut result = [0u8; 32];
    result.copy_from_slice(&out);
    result
}

pub fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut result = [0u8; 32];
    result.copy_from_slice(&out);
    result
}

/// A growable SHAKE-128 output stream, used by `Parse` (§4.6) which regrows
/// its XOF output by 128 bytes on exhaustion, and by the deterministic
/// `RandomBytes` test backend.
pub struct Shake128Stream {
    reader: <Shake128 as ExtendableOutput>::Reader,
}

impl Shake128Stream {
    pub fn new(seed: &[u8]) -> Self {
        let mut hasher = Shake128::default();
        hasher.update(seed);
        Shake128Stream {
            reader: hasher.finalize_xof(),
        }
    }

    pub fn read(&mut self, out: &mut [u8]) {
        self.reader.read(out);
    }

    pub fn read_vec(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        self.read(&mut buf);
        buf
    }
}

/// Derives `len` bytes of ChaCha20 keystream using a libsodium-style 8-byte
/// nonce `{1, 2, ..., 8}` and `key` as the 256-bit key, grounded in
/// `original_source/src/tesla_util.cpp`'s `crypto_stream_chacha20` call.
/// `key` must be exactly 32 bytes (TESLA's `Hash` output).
pub fn tesla_chacha20_stream(key: &[u8; 32], len: usize) -> Vec<u8> {
    const NONCE: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
    let mut cipher = ChaCha20Legacy::new(key.into(), &NONCE.into());
    let mut buf = vec![0u8; len];
    cipher.apply_keystream(&mut buf);
    buf
}
