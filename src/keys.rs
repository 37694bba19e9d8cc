//! Key material shared across the protocol stack (spec §9 design notes:
//! the `DKGOutput` record belongs with the common primitives, not the top
//! layer). Grounded on the grounding crate's own `keys.rs`, which wraps
//! curve points and Diffie-Hellman key material the same way.

use zeroize::Zeroize;

use crate::error::Error;
use crate::group::{scalar_to_bytes, GroupElement, Scalar};

/// A static Diffie-Hellman private key, used to derive one-time pads for
/// encrypted share delivery (spec §4.E). Zeroised on drop.
#[derive(Clone)]
pub struct DiffieHellmanPrivateKey(pub(crate) Scalar);

impl Drop for DiffieHellmanPrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl DiffieHellmanPrivateKey {
    pub fn from_scalar(s: Scalar) -> Self {
        DiffieHellmanPrivateKey(s)
    }

    pub fn public_key(&self) -> DiffieHellmanPublicKey {
        DiffieHellmanPublicKey(GroupElement::generator().mul_scalar(&self.0))
    }

    /// The shared point `deckey * enckey`, the input to the pad hash.
    pub fn ecdh(&self, their_public: &DiffieHellmanPublicKey) -> GroupElement {
        their_public.0.mul_scalar(&self.0)
    }
}

/// The public half of a [`DiffieHellmanPrivateKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffieHellmanPublicKey(pub(crate) GroupElement);

impl DiffieHellmanPublicKey {
    pub fn to_bytes(&self) -> [u8; 33] {
        self.0.to_bytes_compressed_with_infinity()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(DiffieHellmanPublicKey(
            GroupElement::from_bytes_compressed_with_infinity(bytes)?,
        ))
    }
}

/// The group's threshold Schnorr public key, `A_0` of the aggregated VSS
/// commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupPublicKey(pub GroupElement);

impl GroupPublicKey {
    pub fn to_bytes(&self) -> [u8; 33] {
        self.0.to_bytes_compressed_with_infinity()
    }
}

/// A participant's public verification share: the evaluation of the
/// aggregated commitment at `index + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingShare {
    pub index: u32,
    pub share: GroupElement,
}

/// The result of a DKG session. The coordinator's copy has `secshare =
/// None`; every honest participant's copy has `Some`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DkgOutput {
    pub secshare: Option<Scalar>,
    pub group_pubkey: GroupPublicKey,
    pub pubshares: Vec<VerifyingShare>,
}

impl Drop for DkgOutput {
    fn drop(&mut self) {
        if let Some(s) = self.secshare.as_mut() {
            s.zeroize();
        }
    }
}

impl DkgOutput {
    /// Check `secshare * G == pubshares[own_index]` (spec §8
    /// "share/pubshare consistency").
    pub fn is_self_consistent(&self, own_index: u32) -> bool {
        let Some(secshare) = self.secshare.as_ref() else {
            return false;
        };
        let expected = GroupElement::generator().mul_scalar(secshare);
        self.pubshares
            .iter()
            .find(|ps| ps.index == own_index)
            .is_some_and(|ps| ps.share == expected)
    }
}

/// 32-byte backup of this participant's final share, for the per-session
/// recoverable backup of spec §4.G. `η` is stored alongside it so the
/// recovering party can confirm which session this backup belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backup {
    pub eta: Vec<u8>,
    pub share_sum: Scalar,
}

impl Drop for Backup {
    fn drop(&mut self) {
        self.share_sum.zeroize();
    }
}

impl Backup {
    /// `backup = eta ‖ share_sum (32B)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.eta.clone();
        out.extend_from_slice(&scalar_to_bytes(&self.share_sum));
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < 32 {
            return Err(Error::DeserializationError);
        }
        let split = bytes.len() - 32;
        Ok(Backup {
            eta: bytes[..split].to_vec(),
            share_sum: crate::group::scalar_from_bytes(&bytes[split..]),
        })
    }
}
