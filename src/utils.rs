//! Lagrange interpolation and other small helpers, grounded on the
//! grounding crate's own `utils.rs`.

use crate::error::Error;
use crate::group::{GroupElement, Scalar};

/// `λ_i(0) = Π_{j≠i} j / (j - i)`, the Lagrange coefficient for
/// reconstructing the constant term of a polynomial from one-based
/// indices.
pub fn lagrange_coefficient_at_zero(my_index: u32, all_indices: &[u32]) -> Result<Scalar, Error> {
    let mut numerator = Scalar::from(1u64);
    let mut denominator = Scalar::from(1u64);
    let my = Scalar::from(my_index as u64);

    for &j in all_indices {
        if j == my_index {
            continue;
        }
        let s = Scalar::from(j as u64);
        numerator *= s;
        denominator *= s - my;
    }

    if denominator == Scalar::from(0u64) {
        return Err(Error::Config("duplicate indices in Lagrange interpolation"));
    }
    Ok(numerator * denominator.inverse().expect("checked non-zero above"))
}

/// Reconstruct the group secret's image under `G`, i.e. the threshold
/// public key, from a size-`t` set of `(index, share)` pairs (one-based
/// indices). Used by tests to check threshold reconstruction (spec §8).
pub fn reconstruct_group_pubkey(shares: &[(u32, Scalar)]) -> Result<GroupElement, Error> {
    let indices: Vec<u32> = shares.iter().map(|(i, _)| *i).collect();
    let mut acc = GroupElement::identity();
    for (idx, share) in shares {
        let coeff = lagrange_coefficient_at_zero(*idx, &indices)?;
        acc = acc.add(&GroupElement::generator().mul_scalar(&(coeff * share)));
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lagrange_rejects_duplicate_indices() {
        assert!(lagrange_coefficient_at_zero(1, &[1, 1, 2]).is_err());
    }
}
