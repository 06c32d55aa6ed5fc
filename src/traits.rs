//! The `RandomBytes` entropy capability and its two implementations.
//!
//! The specification places a CSPRNG for seeds and `/dev/urandom`-style
//! entropy out of scope as an external collaborator: the sampler only
//! consumes a `RandomBytes(buf)` capability. This mirrors the teacher's
//! pattern of keeping algorithms parametric over caller-supplied key
//! material rather than reaching for a global RNG (`keypair_from_seed`
//! throughout `src/algorithms/*` in the teacher).

use rand_core::RngCore;

use crate::xof::Shake128Stream;

/// Fills a buffer with entropy. Implementations must be synchronous (no
/// internal suspension points, per the concurrency/resource model) and must
/// source from either the platform CSPRNG or a deterministic XOF.
pub trait RandomBytes {
    fn fill(&mut self, buf: &mut [u8]);
}

/// Production entropy source, backed by the platform CSPRNG via `rand`'s
/// `OsRng`.
#[derive(Default)]
pub struct CsprngBytes {
    rng: rand::rngs::OsRng,
}

impl RandomBytes for CsprngBytes {
    fn fill(&mut self, buf: &mut [u8]) {
        self.rng.fill_bytes(buf);
    }
}

/// Deterministic entropy source backed by a SHAKE-128 XOF seeded once at
/// construction. Used by tests and anywhere reproducible key material is
/// required (KAT-style fixtures).
pub struct XofBytes {
    stream: Shake128Stream,
}

impl XofBytes {
    pub fn new(seed: &[u8]) -> Self {
        XofBytes {
            stream: Shake128Stream::new(seed),
        }
    }
}

impl RandomBytes for XofBytes {
    fn fill(&mut self, buf: &mut [u8]) {
        self.stream.read(buf);
    }
}
