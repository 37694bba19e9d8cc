//! Proofs of possession (spec §4.B).
//!
//! A PoP blocks rogue-key contributions where a malicious dealer picks its
//! `A_0` as a known offset of an honest dealer's key: binding the
//! signature to the dealer's declared index means a forged "borrowed" key
//! can't be reused at a different position.

use crate::bip340::{self, Signature, XOnlyPublicKey};
use crate::group::{GroupElement, Scalar};

pub type Pop = Signature;

/// `prove(a_0, idx) -> sigma`, deterministic since `aux_rand = 0`.
pub fn prove(secret: &Scalar, idx: u32) -> Pop {
    bip340::sign(&bip340::pop_msg(idx), secret, &[0u8; 32])
}

/// `verify(sigma, A_0, idx) -> bool`. Fails if `A_0 = ∞`.
pub fn verify(pop: &Pop, commitment_to_secret: &GroupElement, idx: u32) -> bool {
    let Ok(xonly) = XOnlyPublicKey::from_point(commitment_to_secret) else {
        return false;
    };
    bip340::verify(&bip340::pop_msg(idx), &xonly, pop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::random_nonzero_scalar;
    use rand::rngs::OsRng;

    #[test]
    fn pop_round_trip() {
        let secret = random_nonzero_scalar(OsRng);
        let commitment = GroupElement::generator().mul_scalar(&secret);
        let pop = prove(&secret, 3);
        assert!(verify(&pop, &commitment, 3));
    }

    #[test]
    fn pop_rejects_wrong_index() {
        let secret = random_nonzero_scalar(OsRng);
        let commitment = GroupElement::generator().mul_scalar(&secret);
        let pop = prove(&secret, 3);
        assert!(!verify(&pop, &commitment, 4));
    }

    #[test]
    fn pop_rejects_infinity() {
        let secret = random_nonzero_scalar(OsRng);
        let pop = prove(&secret, 0);
        assert!(!verify(&pop, &GroupElement::identity(), 0));
    }
}
