//! The crate's error taxonomy (spec §7).
//!
//! Rather than a single "invalid contribution" variant with a nullable
//! culprit index, contribution failures carry an explicit
//! [`ContributionError`] so callers are forced to handle both the
//! attributable and non-attributable cases.

use thiserror::Error;

/// Whether a failure could be pinned on a specific participant index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContributionError {
    /// The culprit is the participant at this zero-based index.
    Attributed(u32),
    /// Detected only in aggregate; any dealer could be responsible.
    Unattributed,
}

impl core::fmt::Display for ContributionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ContributionError::Attributed(idx) => write!(f, "attributed to participant {idx}"),
            ContributionError::Unattributed => write!(f, "not attributable to a single party"),
        }
    }
}

/// All errors this crate can return.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A dealer's contribution failed a locally-checkable condition
    /// (bad proof of possession, `∞` commitment to the secret, or the
    /// coordinator equivocating about this participant's own commitment).
    #[error("invalid contribution: {0}")]
    InvalidContribution(ContributionError),

    /// The aggregated share sum did not satisfy the aggregated VSS
    /// commitment. Not attributable to a single dealer.
    #[error("share sum does not satisfy the aggregated VSS commitment")]
    VSSVerify,

    /// A received ciphertext had the wrong length to be decrypted.
    #[error("malformed ciphertext from participant {0}")]
    DecryptionFailure(u32),

    /// Participants disagreed on the session parameters (`params_id`).
    #[error("session parameters disagree with the expected params_id")]
    SessionMismatch,

    /// A certifying equality-check signature failed to verify.
    #[error("certificate share from participant {0} failed to verify")]
    CertificateInvalid(u32),

    /// The caller-supplied seed was too short or otherwise violated the
    /// randomness contract.
    #[error("seed does not meet the randomness contract")]
    RandomnessFailure,

    /// A `ThresholdParams`/`SessionConfig` constructor rejected its inputs.
    #[error("invalid session configuration: {0}")]
    Config(&'static str),

    /// Failed to serialize a value to its wire format.
    #[error("serialization error")]
    SerializationError,

    /// Failed to parse a value from its wire format.
    #[error("deserialization error")]
    DeserializationError,

    /// A message arrived out of order or was a duplicate within a session.
    #[error("unexpected message for the current session state")]
    UnexpectedMessage,

    /// A participant or the coordinator aborted; no further progress is possible.
    #[error("session already aborted")]
    Aborted,
}

pub type Result<T> = core::result::Result<T, Error>;
