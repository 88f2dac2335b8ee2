//! Archive signature helpers.

use anyhow::{Error, bail};
use sha2::{Digest, Sha256};

/// Signature algorithm closing the archive. Only SHA-256 is produced and
/// verified.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SignatureAlgorithm {
    /// SHA-256, flag `0x0003`.
    Sha256,
}
impl SignatureAlgorithm {
    /// Flag value written after the digest.
    pub fn flag(self) -> u32 {
        match self {
            Self::Sha256 => 0x0003,
        }
    }

    /// Reads algorithm from its flag value.
    pub fn from_flag(flag: u32) -> Result<Self, Error> {
        match flag {
            0x0003 => Ok(Self::Sha256),
            other => bail!("unsupported signature algorithm: {:#x}", other),
        }
    }

    /// Length of the digest in bytes.
    pub fn digest_length(self) -> usize {
        match self {
            Self::Sha256 => 32,
        }
    }

    /// Computes digest of `content`.
    pub fn digest(
        self,
        content: &[u8],
    ) -> Box<[u8]> {
        match self {
            Self::Sha256 => Sha256::digest(content).to_vec().into_boxed_slice(),
        }
    }
}
