//! ChillDKG: a certifying, encrypted, Pedersen-VSS distributed key
//! generation core for threshold BIP-340 Schnorr signatures over
//! secp256k1.
//!
//! This crate produces a threshold public key and per-participant secret
//! shares; any `t` of `n` participants can later jointly sign, and any
//! coalition smaller than `t` learns nothing about the group secret. It
//! does **not** implement signing itself — only the key generation a
//! later threshold-signing protocol consumes.
//!
//! The protocol stack layers three modules, each depending only on the
//! one below it:
//!
//! - [`simplpedpop`]: Pedersen VSS DKG with proofs of possession, over an
//!   assumed broadcast channel and authenticated point-to-point share
//!   delivery.
//! - [`encpedpop`]: wraps [`simplpedpop`], encrypting share delivery so no
//!   private channel is required.
//! - [`chilldkg`]: wraps [`encpedpop`] with host long-term keys,
//!   session-parameter binding, and a certifying equality check that
//!   produces a self-authenticating certificate and a recoverable backup.
//!
//! [`driver`] provides a minimal cooperative message-passing harness
//! around [`chilldkg`] for callers who don't want to wire up their own
//! transport.

#![deny(unsafe_code)]

pub mod bip340;
pub mod chilldkg;
pub mod driver;
pub mod encpedpop;
pub mod encryption;
pub mod error;
pub mod group;
pub mod kdf;
pub mod keys;
pub mod params;
pub mod pop;
pub mod simplpedpop;
pub mod utils;
pub mod vss;

pub use error::{ContributionError, Error};
pub use keys::DkgOutput;
pub use params::{SessionConfig, ThresholdParams};
