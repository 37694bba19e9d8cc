//! ChillDKG: host long-term keys, session-parameter binding, and the
//! certifying equality check, producing a recoverable backup (spec §4.G).

use tracing::{info, instrument, warn};
use zeroize::Zeroize;

use crate::bip340::{self, Signature, XOnlyPublicKey};
use crate::encpedpop;
use crate::error::Error;
use crate::group::{GroupElement, Scalar};
use crate::kdf::kdf;
use crate::keys::{Backup, DiffieHellmanPrivateKey, DiffieHellmanPublicKey, DkgOutput};
use crate::params::SessionConfig;

/// A host's long-term key pair, derived once from a seed and reused
/// across sessions to sign certifying equality-check shares.
pub struct HostKeyPair {
    seckey: Scalar,
    pub pubkey: XOnlyPublicKey,
}

impl Drop for HostKeyPair {
    fn drop(&mut self) {
        self.seckey.zeroize();
    }
}

impl HostKeyPair {
    /// `(hostseckey, hostpubkey) = (KDF(seed, "hostseckey"), hostseckey * G)`.
    pub fn derive(seed: &[u8]) -> Result<Self, Error> {
        let bytes = kdf(seed, "hostseckey");
        let seckey = crate::group::scalar_from_bytes(&bytes);
        if seckey == Scalar::from(0u64) {
            return Err(Error::RandomnessFailure);
        }
        let point = GroupElement::generator().mul_scalar(&seckey);
        let pubkey = XOnlyPublicKey::from_point(&point)?;
        Ok(HostKeyPair { seckey, pubkey })
    }
}

/// The participant-side driving state, tracking spec §4.G's state
/// machine: `INIT -> DEALT -> PRE_FINAL -> SIGNED -> DONE`, with
/// `ABORTED` reachable (and irreversible) from any of them.
pub enum ParticipantState {
    Init {
        config: SessionConfig,
        idx: u32,
        seed: Vec<u8>,
        host_keys: HostKeyPair,
    },
    Dealt {
        config: SessionConfig,
        idx: u32,
        host_keys: HostKeyPair,
        enc_state: encpedpop::DealerFullState,
        dealer_enckeys: Vec<DiffieHellmanPublicKey>,
    },
    PreFinal {
        config: SessionConfig,
        idx: u32,
        host_keys: HostKeyPair,
        dkg_output: DkgOutput,
        eta: Vec<u8>,
    },
    Signed {
        config: SessionConfig,
        idx: u32,
        dkg_output: DkgOutput,
        eta: Vec<u8>,
        own_cert_share: Signature,
    },
    Done {
        dkg_output: DkgOutput,
        backup: Backup,
    },
    Aborted {
        error: Error,
    },
}

impl ParticipantState {
    /// Construct the `INIT` state, refusing to participate up front if our
    /// own hostpubkey doesn't appear at `idx` in `config` (spec §3: "Each
    /// participant refuses to participate unless its own hostpubkey
    /// appears at its declared index"). This must happen before any dealer
    /// work runs, not merely before pre-finalize.
    pub fn new(config: SessionConfig, idx: u32, seed: Vec<u8>, host_seed: &[u8]) -> Self {
        let host_keys = match HostKeyPair::derive(host_seed) {
            Ok(k) => k,
            Err(error) => return ParticipantState::Aborted { error },
        };
        if let Err(error) = config.check_own_index(idx, &host_keys.pubkey) {
            return ParticipantState::Aborted { error };
        }
        ParticipantState::Init {
            config,
            idx,
            seed,
            host_keys,
        }
    }

    /// Step `INIT -> DEALT`: run the EncPedPop dealer step.
    #[instrument(skip(self, dh_seed, recipient_enckeys))]
    pub fn deal(
        self,
        dh_seed: &[u8],
        recipient_enckeys: Vec<DiffieHellmanPublicKey>,
    ) -> (Self, Option<encpedpop::DealerMessage>) {
        let ParticipantState::Init {
            config,
            idx,
            seed,
            host_keys,
        } = self
        else {
            return (
                ParticipantState::Aborted {
                    error: Error::UnexpectedMessage,
                },
                None,
            );
        };

        let deckey_bytes = kdf(dh_seed, "deckey");
        let deckey_scalar = crate::group::scalar_from_bytes(&deckey_bytes);
        let deckey = DiffieHellmanPrivateKey::from_scalar(deckey_scalar);

        match encpedpop::dealer_step(&seed, config.params, idx, deckey, &recipient_enckeys) {
            Ok((enc_state, msg)) => (
                ParticipantState::Dealt {
                    config,
                    idx,
                    host_keys,
                    enc_state,
                    dealer_enckeys: recipient_enckeys,
                },
                Some(msg),
            ),
            Err(error) => (ParticipantState::Aborted { error }, None),
        }
    }

    /// Step `DEALT -> PRE_FINAL`: consume the coordinator's aggregated
    /// message and decrypt/verify our share sum.
    #[instrument(skip(self, cmsg))]
    pub fn pre_finalize(self, cmsg: &encpedpop::CoordinatorMessage) -> Self {
        let ParticipantState::Dealt {
            config,
            idx,
            host_keys,
            enc_state,
            dealer_enckeys,
        } = self
        else {
            return ParticipantState::Aborted {
                error: Error::UnexpectedMessage,
            };
        };

        match encpedpop::pre_finalize(&enc_state, cmsg, &dealer_enckeys) {
            Ok((dkg_output, eta)) => ParticipantState::PreFinal {
                config,
                idx,
                host_keys,
                dkg_output,
                eta,
            },
            Err(error) => {
                warn!(?error, "pre-finalize failed");
                ParticipantState::Aborted { error }
            }
        }
    }

    /// Step `PRE_FINAL -> SIGNED`: sign `eq_msg` and return the resulting
    /// cert share for broadcast.
    #[instrument(skip(self))]
    pub fn sign_equality_check(self) -> (Self, Option<Signature>) {
        let ParticipantState::PreFinal {
            config,
            idx,
            host_keys,
            dkg_output,
            eta,
        } = self
        else {
            return (
                ParticipantState::Aborted {
                    error: Error::UnexpectedMessage,
                },
                None,
            );
        };

        let params_id = config.params_id();
        let msg = bip340::eq_msg(&params_id, &eta);
        let sig = bip340::sign(&msg, &host_keys.seckey, &[0u8; 32]);

        (
            ParticipantState::Signed {
                config,
                idx,
                dkg_output,
                eta,
                own_cert_share: sig,
            },
            Some(sig),
        )
    }

    /// Step `SIGNED -> DONE`: verify the assembled certificate under
    /// every hostpubkey, in order, over our own `η`.
    #[instrument(skip(self, certificate))]
    pub fn finalize(self, certificate: &[Signature]) -> Self {
        let ParticipantState::Signed {
            config,
            idx,
            dkg_output,
            eta,
            own_cert_share,
        } = self
        else {
            return ParticipantState::Aborted {
                error: Error::UnexpectedMessage,
            };
        };

        if certificate.len() != config.hostpubkeys.len() {
            return ParticipantState::Aborted {
                error: Error::SessionMismatch,
            };
        }
        if certificate[idx as usize].to_bytes() != own_cert_share.to_bytes() {
            return ParticipantState::Aborted {
                error: Error::CertificateInvalid(idx),
            };
        }

        let params_id = config.params_id();
        let msg = bip340::eq_msg(&params_id, &eta);
        for (i, (sig, hostpubkey)) in certificate.iter().zip(config.hostpubkeys.iter()).enumerate()
        {
            if !bip340::verify(&msg, hostpubkey, sig) {
                return ParticipantState::Aborted {
                    error: Error::CertificateInvalid(i as u32),
                };
            }
        }

        info!("session finalized");
        ParticipantState::Done {
            backup: Backup {
                eta: eta.clone(),
                share_sum: dkg_output.secshare.expect("participant always holds a share"),
            },
            dkg_output,
        }
    }

    pub fn output(&self) -> Option<&DkgOutput> {
        match self {
            ParticipantState::Done { dkg_output, .. } => Some(dkg_output),
            _ => None,
        }
    }

    pub fn backup(&self) -> Option<&Backup> {
        match self {
            ParticipantState::Done { backup, .. } => Some(backup),
            _ => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ParticipantState::Aborted { .. })
    }
}

/// Build the certificate from cert shares collected in participant order.
/// The concatenation of all `cert_share_i` is the certificate itself; this
/// helper just validates the count.
pub fn assemble_certificate(cert_shares: &[Signature], n: usize) -> Result<Vec<Signature>, Error> {
    if cert_shares.len() != n {
        return Err(Error::SessionMismatch);
    }
    Ok(cert_shares.to_vec())
}

/// Re-derive a participant's DKG output from a stored coordinator message
/// and its own backup, confirming the recovered `η` matches.
pub fn recover(
    config: &SessionConfig,
    idx: u32,
    dh_seed: &[u8],
    backup: &Backup,
    cmsg: &encpedpop::CoordinatorMessage,
    dealer_enckeys: &[DiffieHellmanPublicKey],
) -> Result<DkgOutput, Error> {
    let deckey_bytes = kdf(dh_seed, "deckey");
    let deckey = DiffieHellmanPrivateKey::from_scalar(crate::group::scalar_from_bytes(
        &deckey_bytes,
    ));
    let share_sum = crate::encryption::decrypt_sum(
        cmsg.enc_shares_sum
            .get(idx as usize)
            .ok_or(Error::DecryptionFailure(idx))?,
        &deckey,
        dealer_enckeys,
        idx,
    );
    if share_sum != backup.share_sum {
        return Err(Error::VSSVerify);
    }
    let sum_commitment = crate::simplpedpop::assemble_sum_commitment(
        &cmsg.simpl.coms_to_secrets,
        &cmsg.simpl.sum_nonconst,
    );
    let eta = crate::simplpedpop::transcript(config.params.t, &sum_commitment);
    if eta != backup.eta {
        return Err(Error::SessionMismatch);
    }
    let (group_pubkey, pubshares) = crate::simplpedpop::common_dkg_output(
        &sum_commitment,
        config.params.n,
    );
    Ok(DkgOutput {
        secshare: Some(backup.share_sum),
        group_pubkey,
        pubshares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::DiffieHellmanPrivateKey;

    fn enckey(seed: &[u8]) -> DiffieHellmanPublicKey {
        let bytes = kdf(seed, "deckey");
        let scalar = crate::group::scalar_from_bytes(&bytes);
        DiffieHellmanPrivateKey::from_scalar(scalar).public_key()
    }

    /// A participant whose declared index doesn't hold its own hostpubkey
    /// must abort at construction, before any dealer work runs.
    #[test]
    fn wrong_own_index_aborts_before_dealer_step() {
        let host_seeds: Vec<Vec<u8>> = (0..3)
            .map(|i| format!("chilldkg host seed number {i:05}.......").into_bytes())
            .collect();
        let hostpubkeys: Vec<_> = host_seeds
            .iter()
            .map(|s| HostKeyPair::derive(s).unwrap().pubkey)
            .collect();
        let config = SessionConfig::new(hostpubkeys, 2, b"wrong index test".to_vec()).unwrap();

        // Participant 0's hostkey is derived from host_seeds[0], but it
        // claims index 1 instead of its real index 0.
        let state = ParticipantState::new(config, 1, b"dealer seed.....................".to_vec(), &host_seeds[0]);
        assert!(state.is_aborted());

        let enckeys: Vec<_> = host_seeds.iter().map(|s| enckey(s)).collect();
        let (state, msg) = state.deal(&host_seeds[0], enckeys);
        assert!(state.is_aborted());
        assert!(msg.is_none());
    }
}
