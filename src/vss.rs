//! Feldman VSS: polynomial generation, Shamir shares, and commitment
//! verification (spec §4.A).

use zeroize::Zeroize;

use crate::error::Error;
use crate::group::{scalar_pow, GroupElement, Scalar};
use crate::kdf::derive_coefficient;

/// A dealer's secret polynomial `f(x) = a_0 + a_1 x + ... + a_{t-1} x^{t-1}`.
///
/// Coefficients are zeroised on drop; the polynomial is meant to be
/// destroyed as soon as shares and the commitment have been produced.
#[derive(Clone)]
pub struct Polynomial {
    coefficients: Vec<Scalar>,
}

impl Drop for Polynomial {
    fn drop(&mut self) {
        self.coefficients.zeroize();
    }
}

impl Polynomial {
    /// Derive a degree-`t-1` polynomial pseudorandomly from `seed`.
    ///
    /// Each coefficient is derived independently via a domain-separated
    /// KDF and retried on a zero result, so `a_0 != 0` (and hence the
    /// commitment to the secret is not `∞`) with overwhelming probability.
    pub fn generate(seed: &[u8], t: u32) -> Result<Self, Error> {
        let mut coefficients = Vec::with_capacity(t as usize);
        for j in 0..t as usize {
            coefficients.push(derive_coefficient(seed, j)?);
        }
        Ok(Polynomial { coefficients })
    }

    pub fn secret(&self) -> &Scalar {
        &self.coefficients[0]
    }

    pub fn threshold(&self) -> usize {
        self.coefficients.len()
    }

    /// Evaluate `f(x)` via Horner's method.
    fn evaluate(&self, x: &Scalar) -> Scalar {
        let mut acc = Scalar::from(0u64);
        for coeff in self.coefficients.iter().rev() {
            acc = acc * x + coeff;
        }
        acc
    }

    /// `shares(f, n) -> [f(1), ..., f(n)]`.
    pub fn shares(&self, n: u32) -> Vec<Scalar> {
        (1..=n)
            .map(|i| self.evaluate(&Scalar::from(i as u64)))
            .collect()
    }

    /// The Feldman commitment `(a_0 G, a_1 G, ..., a_{t-1} G)`.
    pub fn commit(&self) -> VssCommitment {
        VssCommitment {
            points: self
                .coefficients
                .iter()
                .map(|a| GroupElement::generator().mul_scalar(a))
                .collect(),
        }
    }
}

/// A Feldman VSS commitment `C = (A_0, ..., A_{t-1})`. `A_0` is the
/// commitment to the secret (and, once all dealers' contributions are
/// summed, the threshold public key).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VssCommitment {
    pub points: Vec<GroupElement>,
}

impl VssCommitment {
    pub fn t(&self) -> usize {
        self.points.len()
    }

    pub fn commitment_to_secret(&self) -> GroupElement {
        self.points[0]
    }

    pub fn commitment_to_nonconst_terms(&self) -> &[GroupElement] {
        &self.points[1..]
    }

    /// `verify(i, s, C)`: does `s * G == Σ_j i^j * A_j`?
    ///
    /// `index` is one-based (`i = idx + 1`), matching the convention that
    /// shares never sit at `f(0)`.
    pub fn verify(&self, index: u32, share: &Scalar) -> bool {
        let x = Scalar::from(index as u64);
        let exponents: Vec<Scalar> = (0..self.points.len() as u64)
            .map(|j| scalar_pow(&x, j))
            .collect();
        let rhs = GroupElement::msm(&self.points, &exponents);
        let lhs = GroupElement::generator().mul_scalar(share);
        lhs == rhs
    }

    /// Evaluate the committed polynomial in the exponent at `index`
    /// (one-based), yielding the corresponding public share.
    pub fn evaluate_in_exponent(&self, index: u32) -> GroupElement {
        let x = Scalar::from(index as u64);
        let exponents: Vec<Scalar> = (0..self.points.len() as u64)
            .map(|j| scalar_pow(&x, j))
            .collect();
        GroupElement::msm(&self.points, &exponents)
    }

    /// 33-bytes-per-point encoding, `∞` as 33 zero bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(33 * self.points.len());
        for p in &self.points {
            out.extend_from_slice(&p.to_bytes_compressed_with_infinity());
        }
        out
    }
}
