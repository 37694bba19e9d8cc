//! SimplPedPop: Pedersen-style DKG with per-dealer Feldman VSS
//! commitments and proofs of possession (spec §4.C). Assumes an external
//! broadcast/equality check and authenticated point-to-point channels for
//! shares; [`crate::chilldkg`] supplies both.

use tracing::{debug, instrument, warn};
use zeroize::Zeroize;

use crate::error::{ContributionError, Error};
use crate::group::{GroupElement, Scalar};
use crate::keys::{DkgOutput, GroupPublicKey, VerifyingShare};
use crate::params::ThresholdParams;
use crate::pop::{self, Pop};
use crate::vss::{Polynomial, VssCommitment};

/// Message a dealer sends to the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DealerMessage {
    pub commitment: VssCommitment,
    pub pop: Pop,
}

/// Message the coordinator broadcasts to all participants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorMessage {
    pub coms_to_secrets: Vec<GroupElement>,
    pub sum_nonconst: Vec<GroupElement>,
    pub pops: Vec<Pop>,
}

impl CoordinatorMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for p in self.coms_to_secrets.iter().chain(self.sum_nonconst.iter()) {
            out.extend_from_slice(&p.to_bytes_compressed_with_infinity());
        }
        for pop in &self.pops {
            out.extend_from_slice(&pop.to_bytes());
        }
        out
    }
}

/// A dealer's state after its own dealer step, retained to validate the
/// coordinator's response to the pre-finalize call.
#[derive(Clone)]
pub struct DealerState {
    pub params: ThresholdParams,
    pub idx: u32,
    pub commitment_to_secret: GroupElement,
}

/// `signer_step(seed, t, n, idx) -> (state, message, shares)`.
#[instrument(skip(seed), fields(idx = idx, t = params.t, n = params.n))]
pub fn dealer_step(
    seed: &[u8],
    params: ThresholdParams,
    idx: u32,
) -> Result<(DealerState, DealerMessage, Vec<Scalar>), Error> {
    let poly = Polynomial::generate(seed, params.t)?;
    let shares = poly.shares(params.n);
    let pop = pop::prove(poly.secret(), idx);
    let commitment = poly.commit();
    let commitment_to_secret = commitment.commitment_to_secret();

    debug!("dealer produced commitment and {} shares", shares.len());

    Ok((
        DealerState {
            params,
            idx,
            commitment_to_secret,
        },
        DealerMessage { commitment, pop },
        shares,
    ))
}

/// Sum the commitments to the secrets and the non-constant terms into a
/// single aggregated VSS commitment (spec §3 "sum commitment").
pub fn assemble_sum_commitment(
    coms_to_secrets: &[GroupElement],
    sum_nonconst: &[GroupElement],
) -> VssCommitment {
    let summed_secret = GroupElement::sum(coms_to_secrets.iter().copied());
    let mut points = Vec::with_capacity(1 + sum_nonconst.len());
    points.push(summed_secret);
    points.extend_from_slice(sum_nonconst);
    VssCommitment { points }
}

/// Derive the group public key and every participant's public share from
/// the aggregated commitment.
pub fn common_dkg_output(commitment: &VssCommitment, n: u32) -> (GroupPublicKey, Vec<VerifyingShare>) {
    let group_pubkey = GroupPublicKey(commitment.commitment_to_secret());
    let pubshares = (0..n)
        .map(|i| VerifyingShare {
            index: i,
            share: commitment.evaluate_in_exponent(i + 1),
        })
        .collect();
    (group_pubkey, pubshares)
}

/// `η = be32(t) ‖ serialize(sum_commitment)`.
pub fn transcript(t: u32, sum_commitment: &VssCommitment) -> Vec<u8> {
    let mut out = t.to_be_bytes().to_vec();
    out.extend_from_slice(&sum_commitment.to_bytes());
    out
}

/// `coordinator_step(dealer messages, t, n) -> (message, output, eta)`.
#[instrument(skip(messages), fields(t = params.t, n = params.n))]
pub fn coordinator_step(
    messages: &[DealerMessage],
    params: ThresholdParams,
) -> Result<(CoordinatorMessage, DkgOutput, Vec<u8>), Error> {
    if messages.len() != params.n as usize {
        return Err(Error::SessionMismatch);
    }
    let coms_to_secrets: Vec<GroupElement> = messages
        .iter()
        .map(|m| m.commitment.commitment_to_secret())
        .collect();
    let sum_nonconst: Vec<GroupElement> = (0..params.degree())
        .map(|j| {
            GroupElement::sum(
                messages
                    .iter()
                    .map(|m| m.commitment.commitment_to_nonconst_terms()[j]),
            )
        })
        .collect();
    let pops: Vec<Pop> = messages.iter().map(|m| m.pop).collect();

    let sum_commitment = assemble_sum_commitment(&coms_to_secrets, &sum_nonconst);
    let (group_pubkey, pubshares) = common_dkg_output(&sum_commitment, params.n);
    let eta = transcript(params.t, &sum_commitment);

    Ok((
        CoordinatorMessage {
            coms_to_secrets,
            sum_nonconst,
            pops,
        },
        DkgOutput {
            secshare: None,
            group_pubkey,
            pubshares,
        },
        eta,
    ))
}

/// `signer_pre_finalize(state, cmsg, shares_sum) -> (output, eta)`.
///
/// Steps 2–3 of spec §4.C are attributable (the returned error carries the
/// culprit index); step 4 (VSS verify) is not.
#[instrument(skip(state, shares_sum, cmsg), fields(idx = state.idx))]
pub fn pre_finalize(
    state: &DealerState,
    cmsg: &CoordinatorMessage,
    mut shares_sum: Scalar,
) -> Result<(DkgOutput, Vec<u8>), Error> {
    let n = state.params.n as usize;
    let t = state.params.t as usize;
    if cmsg.coms_to_secrets.len() != n || cmsg.sum_nonconst.len() != t - 1 || cmsg.pops.len() != n
    {
        return Err(Error::SessionMismatch);
    }

    if cmsg.coms_to_secrets[state.idx as usize] != state.commitment_to_secret {
        warn!("coordinator equivocated on our own commitment");
        return Err(Error::InvalidContribution(ContributionError::Attributed(
            state.idx,
        )));
    }

    for i in 0..n as u32 {
        if i == state.idx {
            continue;
        }
        let com = cmsg.coms_to_secrets[i as usize];
        if com.is_identity() {
            warn!(culprit = i, "participant sent infinity commitment");
            return Err(Error::InvalidContribution(ContributionError::Attributed(i)));
        }
        if !pop::verify(&cmsg.pops[i as usize], &com, i) {
            warn!(culprit = i, "participant sent invalid proof of possession");
            shares_sum.zeroize();
            return Err(Error::InvalidContribution(ContributionError::Attributed(i)));
        }
    }

    let sum_commitment = assemble_sum_commitment(&cmsg.coms_to_secrets, &cmsg.sum_nonconst);
    if !sum_commitment.verify(state.idx + 1, &shares_sum) {
        shares_sum.zeroize();
        return Err(Error::VSSVerify);
    }

    let (group_pubkey, pubshares) = common_dkg_output(&sum_commitment, state.params.n);
    let eta = transcript(state.params.t, &sum_commitment);

    Ok((
        DkgOutput {
            secshare: Some(shares_sum),
            group_pubkey,
            pubshares,
        },
        eta,
    ))
}
