//! `kdf(seed, label) -> 32B`, the assumed domain-separated KDF of spec §6.
//!
//! Implemented with `hkdf`+`sha2`, the exact combination the grounding
//! crate already depends on for its own Diffie-Hellman key derivation.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::Error;

/// Derive 32 pseudorandom bytes from `seed`, domain-separated by `label`.
pub fn kdf(seed: &[u8], label: &str) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(None, seed);
    let mut out = [0u8; 32];
    hk.expand(label.as_bytes(), &mut out)
        .expect("32 is a valid SHA-256 HKDF output length");
    out
}

/// Derive the `i`-th coefficient of a dealer's polynomial from `seed`.
///
/// Retries with an incrementing counter (spec §4.A) so the result is
/// non-zero with overwhelming probability; `RandomnessFailure` is returned
/// only if an implausible number of attempts all hash to zero, which would
/// indicate the seed itself violates the randomness contract.
pub fn derive_coefficient(seed: &[u8], index: usize) -> Result<crate::group::Scalar, Error> {
    for counter in 0u32..16 {
        let label = alloc_label(index, counter);
        let bytes = kdf(seed, &label);
        let scalar = crate::group::scalar_from_bytes(&bytes);
        if !ark_ff::Zero::is_zero(&scalar) {
            return Ok(scalar);
        }
    }
    Err(Error::RandomnessFailure)
}

fn alloc_label(index: usize, counter: u32) -> String {
    format!("chilldkg/coefficient/{index}/{counter}")
}
