//! EncPedPop: SimplPedPop driven over encrypted shares (spec §4.F),
//! removing the need for private point-to-point channels.

use tracing::instrument;

use crate::encryption::{self};
use crate::error::Error;
use crate::group::Scalar;
use crate::keys::{DiffieHellmanPrivateKey, DiffieHellmanPublicKey};
use crate::params::ThresholdParams;
use crate::simplpedpop::{self, CoordinatorMessage as SimplCoordinatorMessage, DealerState};
use crate::vss::VssCommitment;

/// Message a dealer sends to the coordinator: a SimplPedPop dealer message
/// plus one ciphertext per recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealerMessage {
    pub commitment: VssCommitment,
    pub pop: crate::pop::Pop,
    pub ciphertexts: Vec<Scalar>,
}

/// Message the coordinator broadcasts: the SimplPedPop aggregate plus one
/// aggregated ciphertext sum per recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorMessage {
    pub simpl: SimplCoordinatorMessage,
    pub enc_shares_sum: Vec<Scalar>,
}

/// Dealer state, extended with the dealer's own decryption key and the
/// plain enckeys of every recipient (needed to decrypt its own sum later).
pub struct DealerFullState {
    pub inner: DealerState,
    pub deckey: DiffieHellmanPrivateKey,
}

#[instrument(skip(seed, recipient_enckeys), fields(idx = idx, t = params.t, n = params.n))]
pub fn dealer_step(
    seed: &[u8],
    params: ThresholdParams,
    idx: u32,
    deckey: DiffieHellmanPrivateKey,
    recipient_enckeys: &[DiffieHellmanPublicKey],
) -> Result<(DealerFullState, DealerMessage), Error> {
    let (inner, simpl_msg, shares) = simplpedpop::dealer_step(seed, params, idx)?;
    let ciphertexts = shares
        .iter()
        .zip(recipient_enckeys.iter())
        .enumerate()
        .map(|(r, (share, enckey))| encryption::encrypt_share(share, &deckey, enckey, r as u32))
        .collect();

    Ok((
        DealerFullState { inner, deckey },
        DealerMessage {
            commitment: simpl_msg.commitment,
            pop: simpl_msg.pop,
            ciphertexts,
        },
    ))
}

/// Aggregate dealer messages: forwards the SimplPedPop aggregate and sums
/// each recipient's ciphertexts across dealers.
#[instrument(skip(messages), fields(t = params.t, n = params.n))]
pub fn coordinator_step(
    messages: &[DealerMessage],
    params: ThresholdParams,
) -> Result<(CoordinatorMessage, crate::keys::DkgOutput, Vec<u8>), Error> {
    let n = params.n as usize;
    if messages.len() != n {
        return Err(Error::SessionMismatch);
    }
    for (i, m) in messages.iter().enumerate() {
        if m.ciphertexts.len() != n {
            return Err(Error::DecryptionFailure(i as u32));
        }
    }

    let simpl_messages: Vec<simplpedpop::DealerMessage> = messages
        .iter()
        .map(|m| simplpedpop::DealerMessage {
            commitment: m.commitment.clone(),
            pop: m.pop,
        })
        .collect();
    let (simpl, output, eta) = simplpedpop::coordinator_step(&simpl_messages, params)?;

    let enc_shares_sum: Vec<Scalar> = (0..n)
        .map(|r| {
            let column: Vec<Scalar> = messages.iter().map(|m| m.ciphertexts[r]).collect();
            encryption::sum_ciphertexts(&column)
        })
        .collect();

    Ok((
        CoordinatorMessage {
            simpl,
            enc_shares_sum,
        },
        output,
        eta,
    ))
}

/// Decrypt this participant's share sum, then run the SimplPedPop
/// pre-finalize check on it.
#[instrument(skip(state, cmsg, dealer_enckeys), fields(idx = state.inner.idx))]
pub fn pre_finalize(
    state: &DealerFullState,
    cmsg: &CoordinatorMessage,
    dealer_enckeys: &[DiffieHellmanPublicKey],
) -> Result<(crate::keys::DkgOutput, Vec<u8>), Error> {
    let idx = state.inner.idx;
    if cmsg.enc_shares_sum.len() != dealer_enckeys.len() {
        return Err(Error::DecryptionFailure(idx));
    }
    let enc_sum = cmsg
        .enc_shares_sum
        .get(idx as usize)
        .ok_or(Error::DecryptionFailure(idx))?;
    let share_sum =
        encryption::decrypt_sum(enc_sum, &state.deckey, dealer_enckeys, idx);
    simplpedpop::pre_finalize(&state.inner, &cmsg.simpl, share_sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn honest_session_agrees() {
        let params = ThresholdParams::new(2, 4).unwrap();
        let deckeys: Vec<DiffieHellmanPrivateKey> = (0..4)
            .map(|_| {
                DiffieHellmanPrivateKey::from_scalar(crate::group::random_nonzero_scalar(
                    rand::rngs::OsRng,
                ))
            })
            .collect();
        let enckeys: Vec<DiffieHellmanPublicKey> = deckeys.iter().map(|k| k.public_key()).collect();

        let mut states = Vec::new();
        let mut messages = Vec::new();
        for (idx, deckey) in deckeys.into_iter().enumerate() {
            let idx = idx as u32;
            let seed = format!("enc pedpop dealer seed number {idx:05}....");
            let (state, msg) =
                dealer_step(seed.as_bytes(), params, idx, deckey, &enckeys).unwrap();
            states.push(state);
            messages.push(msg);
        }

        let (cmsg, coord_output, coord_eta) = coordinator_step(&messages, params).unwrap();

        for state in &states {
            let (output, eta) = pre_finalize(state, &cmsg, &enckeys).unwrap();
            assert_eq!(eta, coord_eta);
            assert_eq!(output.group_pubkey, coord_output.group_pubkey);
        }
    }

    #[test]
    fn malformed_ciphertext_length_is_attributed_to_the_sending_dealer() {
        let params = ThresholdParams::new(2, 3).unwrap();
        let deckeys: Vec<DiffieHellmanPrivateKey> = (0..3)
            .map(|_| {
                DiffieHellmanPrivateKey::from_scalar(crate::group::random_nonzero_scalar(
                    rand::rngs::OsRng,
                ))
            })
            .collect();
        let enckeys: Vec<DiffieHellmanPublicKey> = deckeys.iter().map(|k| k.public_key()).collect();

        let mut messages = Vec::new();
        for (idx, deckey) in deckeys.into_iter().enumerate() {
            let idx = idx as u32;
            let seed = format!("malformed ciphertext dealer seed {idx:05}.....");
            let (_state, msg) =
                dealer_step(seed.as_bytes(), params, idx, deckey, &enckeys).unwrap();
            messages.push(msg);
        }
        // Dealer 1 (not dealer 0) sends a truncated ciphertext vector.
        messages[1].ciphertexts.pop();

        let err = coordinator_step(&messages, params).unwrap_err();
        assert_eq!(err, Error::DecryptionFailure(1));
    }
}
