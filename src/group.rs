//! Scalar and group element newtypes over secp256k1.
//!
//! The curve arithmetic itself is an assumed external primitive (see spec
//! §6): this module only wraps `ark-secp256k1`/`ark-ec`/`ark-ff` types with
//! the protocol's own wire format (33-byte compressed points with an
//! explicit all-zero encoding of the identity, 32-byte big-endian scalars,
//! and BIP-340 x-only point serialization).

use ark_ec::{AffineRepr, CurveGroup, Group as _, VariableBaseMSM};
use ark_ff::{Field, PrimeField, UniformRand, Zero};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::Error;

/// An element of the secp256k1 scalar field.
pub type Scalar = ark_secp256k1::Fr;
/// An affine secp256k1 point.
pub type Affine = ark_secp256k1::Affine;
/// A projective secp256k1 point; the working representation for arithmetic.
pub type Projective = ark_secp256k1::Projective;

/// A curve point, opaque outside this crate besides the serialization
/// methods below. `∞` (the identity) is a first-class value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupElement(pub(crate) Projective);

impl GroupElement {
    /// The distinguished identity element `∞`.
    pub fn identity() -> Self {
        GroupElement(Projective::zero())
    }

    /// The secp256k1 base point `G`.
    pub fn generator() -> Self {
        GroupElement(Projective::generator())
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    pub fn mul_scalar(&self, s: &Scalar) -> Self {
        GroupElement(self.0 * s)
    }

    pub fn add(&self, other: &Self) -> Self {
        GroupElement(self.0 + other.0)
    }

    pub fn negate(&self) -> Self {
        GroupElement(-self.0)
    }

    pub fn sum(points: impl IntoIterator<Item = Self>) -> Self {
        points
            .into_iter()
            .fold(Self::identity(), |acc, p| acc.add(&p))
    }

    /// Multi-scalar multiplication `Σ scalars[i] * bases[i]`.
    pub fn msm(bases: &[Self], scalars: &[Scalar]) -> Self {
        let affine_bases: Vec<Affine> = bases.iter().map(|g| g.0.into_affine()).collect();
        Projective::msm(&affine_bases, scalars)
            .map(GroupElement)
            .unwrap_or_else(|_| {
                // Lengths mismatched: fold manually rather than panic in verification code.
                bases
                    .iter()
                    .zip(scalars.iter())
                    .fold(Self::identity(), |acc, (b, s)| acc.add(&b.mul_scalar(s)))
            })
    }

    /// True iff the affine y-coordinate is even, per BIP-340's x-only convention.
    /// `∞` has no well-defined parity and is treated as even for serialization purposes.
    pub fn has_even_y(&self) -> bool {
        let affine = self.0.into_affine();
        if affine.is_zero() {
            return true;
        }
        let y_bytes = affine.y.into_bigint().to_bytes_be();
        y_bytes[y_bytes.len() - 1] & 1 == 0
    }

    /// 33-byte SEC1 compressed encoding, with `∞` encoded as 33 zero bytes.
    pub fn to_bytes_compressed_with_infinity(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        let affine = self.0.into_affine();
        if affine.is_zero() {
            return out;
        }
        out[0] = if self.has_even_y() { 0x02 } else { 0x03 };
        let x_bytes = affine.x.into_bigint().to_bytes_be();
        out[1 + (32 - x_bytes.len())..].copy_from_slice(&x_bytes);
        out
    }

    /// Inverse of [`Self::to_bytes_compressed_with_infinity`].
    pub fn from_bytes_compressed_with_infinity(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 33 {
            return Err(Error::DeserializationError);
        }
        if bytes.iter().all(|b| *b == 0) {
            return Ok(Self::identity());
        }
        let want_even = match bytes[0] {
            0x02 => true,
            0x03 => false,
            _ => return Err(Error::DeserializationError),
        };
        let x = <Affine as AffineRepr>::BaseField::from_be_bytes_mod_order(&bytes[1..33]);
        let rhs = x * x * x + <Affine as AffineRepr>::BaseField::from(7u64);
        let y = rhs.sqrt().ok_or(Error::DeserializationError)?;
        let y_bytes = y.into_bigint().to_bytes_be();
        let y_even = y_bytes[y_bytes.len() - 1] & 1 == 0;
        let y = if y_even == want_even { y } else { -y };
        let affine = Affine::new_unchecked(x, y);
        if !affine.is_on_curve() {
            return Err(Error::DeserializationError);
        }
        Ok(GroupElement(affine.into_group()))
    }

    /// BIP-340 x-only serialization. Fails on `∞`, which has no x-only form.
    pub fn to_xonly_bytes(&self) -> Result<[u8; 32], Error> {
        let affine = self.0.into_affine();
        if affine.is_zero() {
            return Err(crate::bip340::infinity_error());
        }
        let x_bytes = affine.x.into_bigint().to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - x_bytes.len()..].copy_from_slice(&x_bytes);
        Ok(out)
    }
}

impl Zeroize for GroupElement {
    fn zeroize(&mut self) {
        // `Projective` has no `Zeroize` impl of its own; resetting to the
        // identity is all that matters since the point is public anyway.
        self.0 = Projective::zero();
    }
}

/// Serialize a scalar as 32 big-endian bytes.
pub fn scalar_to_bytes(s: &Scalar) -> [u8; 32] {
    let bytes = s.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Deserialize a scalar from 32 big-endian bytes, reduced modulo the group order.
pub fn scalar_from_bytes(bytes: &[u8]) -> Scalar {
    Scalar::from_be_bytes_mod_order(bytes)
}

/// Sample a uniformly random non-zero scalar.
pub fn random_nonzero_scalar(mut rng: impl RngCore + CryptoRng) -> Scalar {
    loop {
        let s = Scalar::rand(&mut rng);
        if !s.is_zero() {
            return s;
        }
    }
}

/// `i^j` in the scalar field, for Horner-style polynomial evaluation.
pub fn scalar_pow(base: &Scalar, exp: u64) -> Scalar {
    base.pow([exp])
}
