//! The coordinator/participant cooperative driver (spec §4.H).
//!
//! Both roles are long-running cooperative tasks exchanging framed
//! messages over per-peer FIFO queues. This crate models that with plain
//! `std::sync::mpsc` channels rather than an async runtime, per spec §9
//! "Coroutine driver": the state machine in [`crate::chilldkg`] is the
//! contract, not any particular executor.

use std::sync::mpsc::{Receiver, Sender};

use tracing::{instrument, warn};

use crate::bip340::Signature;
use crate::encpedpop::{CoordinatorMessage, DealerMessage};
use crate::error::Error;
use crate::keys::DiffieHellmanPublicKey;

/// One coordinator-facing channel pair for a single participant.
pub struct ParticipantChannel {
    pub to_coordinator: Sender<DealerMessage>,
    pub from_coordinator: Receiver<CoordinatorMessage>,
    pub cert_share_out: Sender<Signature>,
    pub certificate_in: Receiver<Vec<Signature>>,
}

/// The coordinator's view of a single participant's channel pair.
pub struct CoordinatorChannel {
    pub from_participant: Receiver<DealerMessage>,
    pub to_participant: Sender<CoordinatorMessage>,
    pub cert_share_in: Receiver<Signature>,
    pub certificate_out: Sender<Vec<Signature>>,
}

/// Run the coordinator side of a single session: collect `n` dealer
/// messages, aggregate, broadcast, collect `n` cert shares, assemble and
/// broadcast the certificate.
///
/// Out-of-order or duplicate messages cannot occur with this transport
/// (each channel carries exactly one message per phase), so the only
/// failure mode here is a channel closing early, surfaced as
/// [`Error::UnexpectedMessage`].
#[instrument(skip_all, fields(t = params.t, n = params.n))]
pub fn run_coordinator(
    params: crate::params::ThresholdParams,
    mut channels: Vec<CoordinatorChannel>,
) -> Result<(), Error> {
    let n = params.n as usize;
    if channels.len() != n {
        return Err(Error::SessionMismatch);
    }

    let mut dealer_msgs = Vec::with_capacity(n);
    for channel in &channels {
        let msg = channel
            .from_participant
            .recv()
            .map_err(|_| Error::UnexpectedMessage)?;
        dealer_msgs.push(msg);
    }

    let (cmsg, _output, _eta) = crate::encpedpop::coordinator_step(&dealer_msgs, params)?;

    for channel in &channels {
        channel
            .to_participant
            .send(cmsg.clone())
            .map_err(|_| Error::UnexpectedMessage)?;
    }

    let mut cert_shares = Vec::with_capacity(n);
    for channel in &channels {
        let share = channel
            .cert_share_in
            .recv()
            .map_err(|_| Error::UnexpectedMessage)?;
        cert_shares.push(share);
    }
    let certificate = crate::chilldkg::assemble_certificate(&cert_shares, n)?;

    for channel in channels.drain(..) {
        channel
            .certificate_out
            .send(certificate.clone())
            .map_err(|_| Error::UnexpectedMessage)?;
    }
    Ok(())
}

/// Run one participant's side of a single session from `INIT` through
/// `DONE`/`ABORTED`, using a pre-built dealer message produced out of
/// band (the caller must first gather recipient enckeys and construct
/// `state` via [`crate::chilldkg::ParticipantState::new`] then
/// [`crate::chilldkg::ParticipantState::deal`], which is where the
/// participant's own hostpubkey is checked).
#[instrument(skip_all, fields(idx))]
pub fn run_participant(
    state: crate::chilldkg::ParticipantState,
    dealer_message: DealerMessage,
    channel: ParticipantChannel,
) -> crate::chilldkg::ParticipantState {
    if channel.to_coordinator.send(dealer_message).is_err() {
        return crate::chilldkg::ParticipantState::Aborted {
            error: Error::UnexpectedMessage,
        };
    }

    let cmsg = match channel.from_coordinator.recv() {
        Ok(cmsg) => cmsg,
        Err(_) => {
            warn!("coordinator channel closed before aggregation");
            return crate::chilldkg::ParticipantState::Aborted {
                error: Error::UnexpectedMessage,
            };
        }
    };

    let state = state.pre_finalize(&cmsg);
    if state.is_aborted() {
        return state;
    }

    let (state, cert_share) = state.sign_equality_check();
    let Some(cert_share) = cert_share else {
        return state;
    };
    if channel.cert_share_out.send(cert_share).is_err() {
        return crate::chilldkg::ParticipantState::Aborted {
            error: Error::UnexpectedMessage,
        };
    }

    let certificate = match channel.certificate_in.recv() {
        Ok(cert) => cert,
        Err(_) => {
            return crate::chilldkg::ParticipantState::Aborted {
                error: Error::UnexpectedMessage,
            }
        }
    };

    state.finalize(&certificate)
}

/// Derive the enckeys every dealer needs before it can call
/// [`crate::chilldkg::ParticipantState::deal`]; a purely local computation
/// that does not go over a channel, since enckeys are published at
/// session setup (spec §4.E).
pub fn enckeys_from_seeds(dh_seeds: &[Vec<u8>]) -> Vec<DiffieHellmanPublicKey> {
    dh_seeds
        .iter()
        .map(|seed| {
            let bytes = crate::kdf::kdf(seed, "deckey");
            let scalar = crate::group::scalar_from_bytes(&bytes);
            crate::keys::DiffieHellmanPrivateKey::from_scalar(scalar).public_key()
        })
        .collect()
}
