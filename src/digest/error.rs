//! Digest error definitions.

use thiserror::Error;

/// Errors that can occur while fingerprinting a request.
///
/// A missing body is not an error: it is the absence path of
/// [`DigestGenerator::compute_digest`](crate::digest::DigestGenerator::compute_digest).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The body is present but cannot be parsed or canonicalized.
    #[error("Malformed body for {}: {reason}", .destination.as_deref().unwrap_or("<no address>"))]
    MalformedBody {
        reason: String,
        destination: Option<String>,
    },

    /// The header source cannot be read as text.
    #[error("Malformed header source: {0}")]
    MalformedHeaders(String),

    /// The digest could not be produced (e.g. unsupported algorithm).
    #[error("Hash algorithm failure: {0}")]
    HashAlgorithm(String),
}

impl DigestError {
    /// True for failures caused by the request itself rather than the environment.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            DigestError::MalformedBody { .. } | DigestError::MalformedHeaders(_)
        )
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DigestError::MalformedBody { .. } => "malformed_body",
            DigestError::MalformedHeaders(_) => "malformed_headers",
            DigestError::HashAlgorithm(_) => "hash_algorithm",
        }
    }
}

/// Result type for digest operations.
pub type DigestResult<T> = Result<T, DigestError>;
