//! Request view subsystem.
//!
//! # Data Flow
//! ```text
//! Host pipeline (buffered HTTP request)
//!     → adapter.rs (address, headers, raw body + media type)
//!     → RequestView (per-call, owned by the caller)
//!     → digest::FingerprintGenerator
//!
//! Raw body, on demand inside the generator:
//!     → document.rs (XML via roxmltree, JSON via serde_json)
//!     → Document tree
//! ```
//!
//! # Design Decisions
//! - Views are plain data; nothing here knows about exclusion or hashing
//! - Headers keep source order and duplicates; collapsing is the generator's job
//! - Raw bodies are parsed lazily so parse failures surface as digest errors

pub mod adapter;
pub mod document;

use std::borrow::Cow;

use axum::body::Bytes;

pub use document::{Attribute, Document, Element, Node, ParseError, QName, XML_NAMESPACE};

/// Normalized view of an inbound request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestView {
    /// Addressable target of the request, if any.
    pub destination_address: Option<String>,

    /// Header name/value pairs in source order; names may repeat.
    pub headers: Vec<(String, String)>,

    /// Request payload, absent for bodyless requests.
    pub body: Option<RequestBody>,
}

impl RequestView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_destination(mut self, address: impl Into<String>) -> Self {
        self.destination_address = Some(address.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Iterate headers as borrowed pairs.
    pub fn header_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Request payload: either an already-parsed tree or raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Document(Document),
    Raw {
        media_type: Option<String>,
        bytes: Bytes,
    },
}

impl RequestBody {
    /// Raw XML payload.
    pub fn xml(text: impl Into<String>) -> Self {
        RequestBody::Raw {
            media_type: Some("application/xml".to_string()),
            bytes: Bytes::from(text.into()),
        }
    }

    /// Raw JSON payload.
    pub fn json(text: impl Into<String>) -> Self {
        RequestBody::Raw {
            media_type: Some("application/json".to_string()),
            bytes: Bytes::from(text.into()),
        }
    }

    /// Raw payload with an optional `Content-Type` value.
    pub fn raw(media_type: Option<&str>, bytes: impl Into<Bytes>) -> Self {
        RequestBody::Raw {
            media_type: media_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// Produce the document tree, parsing raw payloads by media type.
    ///
    /// Pre-parsed documents are borrowed, not copied.
    pub fn to_document(&self, max_depth: usize) -> Result<Cow<'_, Document>, ParseError> {
        match self {
            RequestBody::Document(doc) => Ok(Cow::Borrowed(doc)),
            RequestBody::Raw { media_type, bytes } => {
                let text = std::str::from_utf8(bytes)?;
                let doc = if is_json(media_type.as_deref()) {
                    Document::parse_json(text, max_depth)?
                } else {
                    Document::parse_xml(text, max_depth)?
                };
                Ok(Cow::Owned(doc))
            }
        }
    }
}

impl From<Document> for RequestBody {
    fn from(doc: Document) -> Self {
        RequestBody::Document(doc)
    }
}

/// Media types routed to the JSON parser; everything else is treated as XML.
fn is_json(media_type: Option<&str>) -> bool {
    let Some(media_type) = media_type else {
        return false;
    };
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence == "text/json" || essence.ends_with("+json")
}
