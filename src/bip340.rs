//! BIP-340 tagged hashing and Schnorr signatures over secp256k1.
//!
//! Spec §6 treats these as assumed external primitives; they are
//! implemented here directly atop [`crate::group`] because no crate in
//! this workspace's dependency tree already provides them, and the
//! interface is narrow and fixed by the BIP rather than a piece of
//! ambient stack to pull in wholesale. Tagged-hash construction follows
//! the pattern used throughout the pack for Bitcoin-style domain
//! separation: `SHA256(SHA256(tag) ‖ SHA256(tag) ‖ data)`.

use sha2::{Digest, Sha256};

use crate::error::{ContributionError, Error};
use crate::group::{scalar_from_bytes, scalar_to_bytes, GroupElement, Scalar};

/// `SHA256(SHA256(tag) ‖ SHA256(tag) ‖ data)`.
pub fn tagged_hash(tag: &str, data: &[u8]) -> [u8; 32] {
    let tag_hash = Sha256::digest(tag.as_bytes());
    let mut hasher = Sha256::new();
    hasher.update(tag_hash);
    hasher.update(tag_hash);
    hasher.update(data);
    hasher.finalize().into()
}

/// A BIP-340 x-only public key: the 32-byte x-coordinate of a point whose
/// y-coordinate is implicitly even.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct XOnlyPublicKey(pub [u8; 32]);

impl XOnlyPublicKey {
    pub fn from_point(point: &GroupElement) -> Result<Self, Error> {
        Ok(XOnlyPublicKey(point.to_xonly_bytes()?))
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        XOnlyPublicKey(*bytes)
    }
}

/// A 64-byte BIP-340 Schnorr signature `(r, s)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 64 {
            return Err(Error::DeserializationError);
        }
        let mut out = [0u8; 64];
        out.copy_from_slice(bytes);
        Ok(Signature(out))
    }
}

/// Lift `secret` so that `secret * G` has an even y-coordinate, per BIP-340's
/// convention that public keys are represented x-only.
fn lift_even_y(secret: &Scalar) -> (Scalar, GroupElement) {
    let point = GroupElement::generator().mul_scalar(secret);
    if point.has_even_y() {
        (*secret, point)
    } else {
        (-*secret, point.negate())
    }
}

/// BIP-340 Schnorr sign over `msg` with secret key `seckey`.
///
/// `aux_rand` is mixed into the nonce derivation as BIP-340 specifies; this
/// crate always calls with `aux_rand = [0u8; 32]` (see spec §9 Open
/// Questions), which makes signing deterministic.
pub fn sign(msg: &[u8], seckey: &Scalar, aux_rand: &[u8; 32]) -> Signature {
    let (d, pubkey) = lift_even_y(seckey);
    let pubkey_bytes = pubkey.to_xonly_bytes().expect("lifted key is never ∞");

    let t = {
        let aux_hash = tagged_hash("BIP0340/aux", aux_rand);
        let mut masked = scalar_to_bytes(&d);
        for (b, a) in masked.iter_mut().zip(aux_hash.iter()) {
            *b ^= a;
        }
        masked
    };

    let mut nonce_input = Vec::with_capacity(96 + msg.len());
    nonce_input.extend_from_slice(&t);
    nonce_input.extend_from_slice(&pubkey_bytes);
    nonce_input.extend_from_slice(msg);
    let k_raw = scalar_from_bytes(&tagged_hash("BIP0340/nonce", &nonce_input));

    let (k, r_point) = lift_even_y(&k_raw);
    let r_bytes = r_point.to_xonly_bytes().expect("lifted nonce is never ∞");

    let mut challenge_input = Vec::with_capacity(96 + msg.len());
    challenge_input.extend_from_slice(&r_bytes);
    challenge_input.extend_from_slice(&pubkey_bytes);
    challenge_input.extend_from_slice(msg);
    let e = scalar_from_bytes(&tagged_hash("BIP0340/challenge", &challenge_input));

    let s = k + e * d;

    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&r_bytes);
    sig[32..].copy_from_slice(&scalar_to_bytes(&s));
    Signature(sig)
}

/// BIP-340 Schnorr verify of `sig` over `msg` against x-only `pubkey`.
pub fn verify(msg: &[u8], pubkey: &XOnlyPublicKey, sig: &Signature) -> bool {
    let Some(px) = point_from_xonly(pubkey) else {
        return false;
    };

    let r_bytes = &sig.0[..32];
    let s = scalar_from_bytes(&sig.0[32..]);

    let mut challenge_input = Vec::with_capacity(96 + msg.len());
    challenge_input.extend_from_slice(r_bytes);
    challenge_input.extend_from_slice(&pubkey.0);
    challenge_input.extend_from_slice(msg);
    let e = scalar_from_bytes(&tagged_hash("BIP0340/challenge", &challenge_input));

    let r_computed = GroupElement::generator()
        .mul_scalar(&s)
        .add(&px.mul_scalar(&(-e)));

    if r_computed.is_identity() || !r_computed.has_even_y() {
        return false;
    }
    match r_computed.to_xonly_bytes() {
        Ok(bytes) => bytes == *r_bytes,
        Err(_) => false,
    }
}

/// Recover the (even-y) point corresponding to an x-only public key.
fn point_from_xonly(pubkey: &XOnlyPublicKey) -> Option<GroupElement> {
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02;
    compressed[1..].copy_from_slice(&pubkey.0);
    GroupElement::from_bytes_compressed_with_infinity(&compressed).ok()
}

const POP_MSG_TAG: &[u8] = b"ChillDKG/pop message";
const EQ_MSG_TAG: &[u8] = b"ChillDKG/eq_msg";

/// `pop_msg(idx) = TAG("pop message") ‖ be32(idx)`, the message signed by
/// a dealer's proof of possession. A literal tag-prefixed concatenation,
/// not itself hashed — it is `sign`/`verify` that hash it as part of the
/// BIP-340 challenge.
pub fn pop_msg(idx: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(POP_MSG_TAG.len() + 4);
    data.extend_from_slice(POP_MSG_TAG);
    data.extend_from_slice(&idx.to_be_bytes());
    data
}

/// `eq_msg = TAG("eq_msg") ‖ params_id ‖ η`, the message certified by the
/// certifying equality check. Like `pop_msg`, a raw concatenation.
pub fn eq_msg(params_id: &[u8; 32], eta: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(EQ_MSG_TAG.len() + 32 + eta.len());
    data.extend_from_slice(EQ_MSG_TAG);
    data.extend_from_slice(params_id);
    data.extend_from_slice(eta);
    data
}

/// Error helper: an `∞` point has no x-only form.
pub(crate) fn infinity_error() -> Error {
    Error::InvalidContribution(ContributionError::Unattributed)
}
