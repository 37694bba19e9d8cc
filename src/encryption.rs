//! Encrypted share transport (spec §4.E): an ECDH-derived one-time pad per
//! (dealer, recipient) pair, aggregated by the coordinator so only the
//! per-recipient sum crosses the wire.

use zeroize::Zeroize;

use crate::bip340::tagged_hash;
use crate::group::{scalar_from_bytes, Scalar};
use crate::keys::{DiffieHellmanPrivateKey, DiffieHellmanPublicKey};

/// `H(TAG("ecdh") ‖ ecdh(deckey, enckey) ‖ be32(recipient))`, the pad
/// added to (or subtracted from) a share.
fn pad(deckey: &DiffieHellmanPrivateKey, enckey: &DiffieHellmanPublicKey, recipient: u32) -> Scalar {
    let shared_point = deckey.ecdh(enckey);
    let mut data = shared_point.to_bytes_compressed_with_infinity().to_vec();
    data.extend_from_slice(&recipient.to_be_bytes());
    let digest = tagged_hash("ecdh", &data);
    scalar_from_bytes(&digest)
}

/// Encrypt `share`, destined for `recipient`, as seen from a dealer
/// holding `deckey` who knows the recipient's public `enckey`.
pub fn encrypt_share(
    share: &Scalar,
    deckey: &DiffieHellmanPrivateKey,
    recipient_enckey: &DiffieHellmanPublicKey,
    recipient: u32,
) -> Scalar {
    *share + pad(deckey, recipient_enckey, recipient)
}

/// Recover a dealer's plaintext contribution to this recipient's share
/// sum from the dealer's ciphertext.
pub fn decrypt_share(
    ciphertext: &Scalar,
    deckey: &DiffieHellmanPrivateKey,
    dealer_enckey: &DiffieHellmanPublicKey,
    recipient: u32,
) -> Scalar {
    *ciphertext - pad(deckey, dealer_enckey, recipient)
}

/// Sum per-dealer ciphertexts for a single recipient, as the coordinator
/// does before forwarding (halves bandwidth vs. per-pair ciphertexts).
pub fn sum_ciphertexts(ciphertexts: &[Scalar]) -> Scalar {
    ciphertexts
        .iter()
        .fold(Scalar::from(0u64), |acc, c| acc + c)
}

/// Recover `share_sum_i` from the aggregated ciphertext sum, given every
/// dealer's enckey in participant order (spec §4.E).
pub fn decrypt_sum(
    enc_sum: &Scalar,
    deckey: &DiffieHellmanPrivateKey,
    dealer_enckeys: &[DiffieHellmanPublicKey],
    recipient: u32,
) -> Scalar {
    let mut pads_sum = Scalar::from(0u64);
    for enckey in dealer_enckeys {
        pads_sum += pad(deckey, enckey, recipient);
    }
    let result = *enc_sum - pads_sum;
    pads_sum.zeroize();
    result
}
