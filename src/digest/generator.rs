//! Request fingerprint generation.
//!
//! # Responsibilities
//! - Return the absence value for bodyless requests
//! - Canonicalize headers, body and destination address
//! - Hash them in a fixed order and render lowercase hex
//!
//! # Design Decisions
//! - Hosts depend on the `DigestGenerator` capability, not on this type
//! - `&self` only: configuration is immutable and shared between threads
//! - Algorithm names resolve per call (lazy validation)
//! - Failures are returned, never retried; the host decides to bypass caching

use std::fmt;
use std::time::Instant;

use crate::config::schema::GeneratorConfig;
use crate::digest::algorithm::DigestAlgorithm;
use crate::digest::domhash::{push_count, push_utf16, DomHasher};
use crate::digest::error::{DigestError, DigestResult};
use crate::digest::exclusion::ExclusionConfig;
use crate::digest::headers::CanonicalHeaders;
use crate::observability::metrics;
use crate::request::RequestView;

const ADDRESS_ABSENT: [u8; 4] = [0, 0, 0, 0];
const ADDRESS_PRESENT: [u8; 4] = [0, 0, 0, 1];

/// Capability consumed by the host pipeline.
pub trait DigestGenerator: Send + Sync {
    /// Fingerprint `view`; `Ok(None)` means "not cacheable by content".
    fn compute_digest(&self, view: &RequestView) -> DigestResult<Option<Digest>>;
}

/// Lowercase hexadecimal request fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(String);

impl Digest {
    fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fingerprint generator over body, destination address and filtered headers.
#[derive(Debug, Clone)]
pub struct FingerprintGenerator {
    exclusions: ExclusionConfig,
    algorithm: String,
    max_body_depth: usize,
    metrics_enabled: bool,
}

impl FingerprintGenerator {
    /// Build from configuration. Nothing is validated here.
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            exclusions: config.exclusions(),
            algorithm: config.hash_algorithm.clone(),
            max_body_depth: config.max_body_depth,
            metrics_enabled: true,
        }
    }

    /// Toggle `metrics` facade recording.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn exclusions(&self) -> &ExclusionConfig {
        &self.exclusions
    }

    pub fn algorithm_name(&self) -> &str {
        &self.algorithm
    }

    fn fingerprint(&self, view: &RequestView) -> DigestResult<Option<Digest>> {
        let Some(body) = view.body.as_ref() else {
            return Ok(None);
        };

        let algorithm: DigestAlgorithm = self.algorithm.parse()?;

        let headers =
            CanonicalHeaders::collapse(view.header_pairs()).without_excluded(&self.exclusions);

        let document = body
            .to_document(self.max_body_depth)
            .map_err(|e| malformed_body(view, e.to_string()))?;
        let body_digest = DomHasher::new(algorithm, self.max_body_depth)
            .document_digest(&document)
            .map_err(|reason| malformed_body(view, reason))?;

        let mut buf = Vec::with_capacity(body_digest.len() * (headers.len() + 2) + 64);
        buf.extend_from_slice(&body_digest);
        write_address(&mut buf, view.destination_address.as_deref())
            .map_err(DigestError::HashAlgorithm)?;
        headers
            .write_digests(algorithm, &mut buf)
            .map_err(DigestError::HashAlgorithm)?;

        Ok(Some(Digest::from_bytes(&algorithm.hash(&buf))))
    }
}

impl Default for FingerprintGenerator {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

impl DigestGenerator for FingerprintGenerator {
    fn compute_digest(&self, view: &RequestView) -> DigestResult<Option<Digest>> {
        let start = Instant::now();
        let result = self.fingerprint(view);

        let outcome = match &result {
            Ok(Some(digest)) => {
                tracing::debug!(
                    digest = %digest,
                    destination = ?view.destination_address,
                    headers = view.headers.len(),
                    "Computed request digest"
                );
                metrics::OUTCOME_COMPUTED
            }
            Ok(None) => {
                tracing::trace!(
                    destination = ?view.destination_address,
                    "Request has no body, not fingerprinted"
                );
                metrics::OUTCOME_ABSENT
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = e.kind(),
                    destination = ?view.destination_address,
                    "Failed to compute request digest"
                );
                metrics::OUTCOME_FAILED
            }
        };

        if self.metrics_enabled {
            let algorithm = self
                .algorithm
                .parse::<DigestAlgorithm>()
                .map(DigestAlgorithm::name)
                .unwrap_or("unknown");
            metrics::record_digest(outcome, algorithm, start);
        }

        result
    }
}

fn malformed_body(view: &RequestView, reason: String) -> DigestError {
    DigestError::MalformedBody {
        reason,
        destination: view.destination_address.clone(),
    }
}

fn write_address(buf: &mut Vec<u8>, address: Option<&str>) -> Result<(), String> {
    match address {
        None => buf.extend_from_slice(&ADDRESS_ABSENT),
        Some(address) => {
            buf.extend_from_slice(&ADDRESS_PRESENT);
            push_count(buf, address.encode_utf16().count())?;
            push_utf16(buf, address);
        }
    }
    Ok(())
}
