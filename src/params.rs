//! Session configuration (spec §3 "ChillDKG session parameters", §4.K).
//!
//! Every range/shape invariant on `t`/`n`/hostpubkeys is checked exactly
//! once here, before any cryptographic work starts, instead of being
//! re-validated (or silently assumed) throughout the protocol modules.

use crate::bip340::XOnlyPublicKey;
use crate::error::Error;

/// The threshold `t` and participant count `n` for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdParams {
    pub t: u32,
    pub n: u32,
}

impl ThresholdParams {
    /// Validate `1 <= t <= n`.
    pub fn new(t: u32, n: u32) -> Result<Self, Error> {
        if t == 0 {
            return Err(Error::Config("threshold t must be at least 1"));
        }
        if t > n {
            return Err(Error::Config("threshold t must not exceed n"));
        }
        Ok(ThresholdParams { t, n })
    }

    pub fn degree(&self) -> usize {
        self.t as usize - 1
    }
}

/// The full set of ChillDKG session parameters: host keys, threshold, and
/// an application-defined context string bound into `params_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub hostpubkeys: Vec<XOnlyPublicKey>,
    pub params: ThresholdParams,
    pub context: Vec<u8>,
}

impl SessionConfig {
    /// Validate that `hostpubkeys.len() == n`, `t` is sane, and every
    /// hostpubkey is distinct.
    pub fn new(
        hostpubkeys: Vec<XOnlyPublicKey>,
        t: u32,
        context: Vec<u8>,
    ) -> Result<Self, Error> {
        let n = hostpubkeys.len() as u32;
        let params = ThresholdParams::new(t, n)?;
        for i in 0..hostpubkeys.len() {
            for j in (i + 1)..hostpubkeys.len() {
                if hostpubkeys[i] == hostpubkeys[j] {
                    return Err(Error::Config("duplicate hostpubkey in session"));
                }
            }
        }
        Ok(SessionConfig {
            hostpubkeys,
            params,
            context,
        })
    }

    /// Verify `own_index` refers to `own_hostpubkey` within this session,
    /// per spec §3: "Each participant refuses to participate unless its
    /// own hostpubkey appears at its declared index."
    pub fn check_own_index(
        &self,
        own_index: u32,
        own_hostpubkey: &XOnlyPublicKey,
    ) -> Result<(), Error> {
        match self.hostpubkeys.get(own_index as usize) {
            Some(key) if key == own_hostpubkey => Ok(()),
            _ => Err(Error::SessionMismatch),
        }
    }

    /// `params_id = TAG("params_id") ‖ be16(n) ‖ hostpubkeys ‖ be32(t) ‖ context`.
    pub fn params_id(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(2 + 32 * self.hostpubkeys.len() + 4 + self.context.len());
        data.extend_from_slice(&(self.params.n as u16).to_be_bytes());
        for key in &self.hostpubkeys {
            data.extend_from_slice(&key.to_bytes());
        }
        data.extend_from_slice(&self.params.t.to_be_bytes());
        data.extend_from_slice(&self.context);
        crate::bip340::tagged_hash("params_id", &data)
    }
}
