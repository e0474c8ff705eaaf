//! Hash algorithm selection.
//!
//! # Design Decisions
//! - MD5 is the default (128-bit digest, matching existing cache keys)
//! - Names are resolved lazily at compute time, so an unknown name surfaces
//!   as a `HashAlgorithm` error on the first request rather than at startup
//! - Each node is hashed in one shot over a call-local buffer

use std::fmt;
use std::str::FromStr;

use sha2::{Digest as _, Sha256};

use crate::digest::error::DigestError;

/// Name of the default algorithm.
pub const DEFAULT_ALGORITHM: &str = "MD5";

/// Supported message digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl DigestAlgorithm {
    /// Hash `data` and return the raw digest bytes.
    pub fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Md5 => md5::compute(data).0.to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha256 => 32,
        }
    }

    /// Canonical name, also used as a metrics label.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha256 => "SHA-256",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MD5" => Ok(DigestAlgorithm::Md5),
            "SHA-256" | "SHA256" => Ok(DigestAlgorithm::Sha256),
            other => Err(DigestError::HashAlgorithm(format!(
                "unsupported algorithm: {other}"
            ))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
