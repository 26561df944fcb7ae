//! Stakeholder fingerprints
//!
//! A fingerprint is the first [`FINGERPRINT_LEN`] hex characters of the
//! SHA-512 digest of the canonical stakeholder serialization. Same inputs,
//! same fingerprint; collisions are not defended against.

mod stakeholders;

pub use stakeholders::{LockStakes, ManifestStakes, StakeholderSet, StakeholderSources};

use crate::error::QuickResult;
use sha2::{Digest, Sha512};
use std::fmt;
use tracing::debug;

/// Number of hex characters kept from the digest
pub const FINGERPRINT_LEN: usize = 16;

/// Short deterministic identifier of a stakeholder combination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Digest a stakeholder set
    pub fn of(set: &StakeholderSet) -> QuickResult<Self> {
        let bytes = set.canonical_bytes()?;
        let digest = Sha512::digest(&bytes);

        let mut hex = hex::encode(digest);
        hex.truncate(FINGERPRINT_LEN);
        Ok(Self(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the stakeholders from disk and fingerprint them.
///
/// Always reflects the files as they are right now; call it again after
/// anything that may have rewritten the lock file.
pub async fn compute_fingerprint(sources: &StakeholderSources) -> QuickResult<Fingerprint> {
    let set = StakeholderSet::load(sources).await;
    let fingerprint = Fingerprint::of(&set)?;
    debug!("Stakeholder fingerprint: {}", fingerprint);
    Ok(fingerprint)
}
