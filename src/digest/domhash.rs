//! DOMHASH-style body canonicalization.
//!
//! Every node is reduced to a fixed-size digest built from a type code, its
//! UTF-16BE encoded name/content and the digests of its parts:
//!
//! ```text
//! element    00 00 00 01 | name | 00 00 | u32 #attrs | attr digests | u32 #children | child digests
//! attribute  00 00 00 02 | name | 00 00 | value
//! text       00 00 00 03 | text
//! pi         00 00 00 07 | target | 00 00 | data
//! ```
//!
//! # Design Decisions
//! - Attributes are sorted by expanded name, so attribute order is irrelevant
//! - Comments are dropped, adjacent text runs merged, whitespace-only text
//!   dropped, so indentation and comments never change the digest
//! - Under `xml:space="preserve"` (inherited) whitespace-only text is kept
//! - Child order is document order
//! - Recursion is bounded by `max_depth`

use std::cmp::Ordering;

use crate::digest::algorithm::DigestAlgorithm;
use crate::request::{Attribute, Document, Element, Node, XML_NAMESPACE};

const ELEMENT_NODE: [u8; 4] = [0, 0, 0, 1];
const ATTRIBUTE_NODE: [u8; 4] = [0, 0, 0, 2];
const TEXT_NODE: [u8; 4] = [0, 0, 0, 3];
const PROCESSING_INSTRUCTION_NODE: [u8; 4] = [0, 0, 0, 7];
const SEPARATOR: [u8; 2] = [0, 0];

/// Computes node digests for one algorithm and depth bound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DomHasher {
    algorithm: DigestAlgorithm,
    max_depth: usize,
}

/// A child that survives canonicalization.
enum Canonical<'a> {
    Element(&'a Element),
    Text(String),
    ProcessingInstruction(&'a str, Option<&'a str>),
}

impl DomHasher {
    pub(crate) fn new(algorithm: DigestAlgorithm, max_depth: usize) -> Self {
        Self {
            algorithm,
            max_depth,
        }
    }

    /// Digest of the document's root element.
    ///
    /// Returns a human-readable reason on failure.
    pub(crate) fn document_digest(&self, doc: &Document) -> Result<Vec<u8>, String> {
        self.element_digest(&doc.root, 1, false)
    }

    fn element_digest(
        &self,
        element: &Element,
        depth: usize,
        inherited_preserve: bool,
    ) -> Result<Vec<u8>, String> {
        if depth > self.max_depth {
            return Err(format!("document nesting exceeds {} levels", self.max_depth));
        }

        let mut buf = Vec::new();
        buf.extend_from_slice(&ELEMENT_NODE);
        push_utf16(&mut buf, &element.name.expanded());
        buf.extend_from_slice(&SEPARATOR);

        let mut attributes: Vec<&Attribute> = element.attributes.iter().collect();
        attributes.sort_by(|a, b| compare_attributes(a, b));
        push_count(&mut buf, attributes.len())?;
        for attr in attributes {
            buf.extend_from_slice(&self.attribute_digest(attr));
        }

        let preserve = preserves_space(element).unwrap_or(inherited_preserve);
        let children = canonical_children(&element.children, preserve);
        push_count(&mut buf, children.len())?;
        for child in &children {
            let digest = match child {
                Canonical::Element(el) => self.element_digest(el, depth + 1, preserve)?,
                Canonical::Text(text) => self.text_digest(text),
                Canonical::ProcessingInstruction(target, data) => {
                    self.pi_digest(target, data.unwrap_or_default())
                }
            };
            buf.extend_from_slice(&digest);
        }

        Ok(self.algorithm.hash(&buf))
    }

    fn attribute_digest(&self, attr: &Attribute) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&ATTRIBUTE_NODE);
        push_utf16(&mut buf, &attr.name.expanded());
        buf.extend_from_slice(&SEPARATOR);
        push_utf16(&mut buf, &attr.value);
        self.algorithm.hash(&buf)
    }

    fn text_digest(&self, text: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&TEXT_NODE);
        push_utf16(&mut buf, text);
        self.algorithm.hash(&buf)
    }

    fn pi_digest(&self, target: &str, data: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&PROCESSING_INSTRUCTION_NODE);
        push_utf16(&mut buf, target);
        buf.extend_from_slice(&SEPARATOR);
        push_utf16(&mut buf, data);
        self.algorithm.hash(&buf)
    }
}

fn compare_attributes(a: &Attribute, b: &Attribute) -> Ordering {
    a.name
        .expanded()
        .cmp(&b.name.expanded())
        .then_with(|| a.value.cmp(&b.value))
}

/// The element's own `xml:space` setting, if it has one.
fn preserves_space(element: &Element) -> Option<bool> {
    element
        .attributes
        .iter()
        .find(|a| a.name.local == "space" && a.name.namespace.as_deref() == Some(XML_NAMESPACE))
        .map(|a| a.value == "preserve")
}

fn canonical_children(children: &[Node], preserve: bool) -> Vec<Canonical<'_>> {
    let mut out = Vec::with_capacity(children.len());
    let mut pending = String::new();

    for child in children {
        match child {
            Node::Text(text) => pending.push_str(text),
            Node::Comment(_) => {}
            Node::Element(el) => {
                flush_text(&mut pending, preserve, &mut out);
                out.push(Canonical::Element(el));
            }
            Node::ProcessingInstruction { target, data } => {
                flush_text(&mut pending, preserve, &mut out);
                out.push(Canonical::ProcessingInstruction(target, data.as_deref()));
            }
        }
    }
    flush_text(&mut pending, preserve, &mut out);
    out
}

fn flush_text<'a>(pending: &mut String, preserve: bool, out: &mut Vec<Canonical<'a>>) {
    let insignificant = if preserve {
        pending.is_empty()
    } else {
        pending.trim().is_empty()
    };
    if insignificant {
        pending.clear();
    } else {
        out.push(Canonical::Text(std::mem::take(pending)));
    }
}

/// Append `s` as UTF-16 big-endian code units.
pub(crate) fn push_utf16(buf: &mut Vec<u8>, s: &str) {
    for unit in s.encode_utf16() {
        buf.extend_from_slice(&unit.to_be_bytes());
    }
}

/// Append a big-endian u32 count.
pub(crate) fn push_count(buf: &mut Vec<u8>, n: usize) -> Result<(), String> {
    let n = u32::try_from(n).map_err(|_| format!("too many items to encode: {n}"))?;
    buf.extend_from_slice(&n.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::QName;

    fn hasher() -> DomHasher {
        DomHasher::new(DigestAlgorithm::Md5, 64)
    }

    fn digest_of(xml: &str) -> Vec<u8> {
        let doc = Document::parse_xml(xml, 64).unwrap();
        hasher().document_digest(&doc).unwrap()
    }

    #[test]
    fn test_text_digest_matches_domhash_layout() {
        let mut expected = vec![0, 0, 0, 3];
        expected.extend_from_slice(&[0, b'h', 0, b'i']);
        assert_eq!(hasher().text_digest("hi"), DigestAlgorithm::Md5.hash(&expected));
    }

    #[test]
    fn test_attribute_order_is_irrelevant() {
        assert_eq!(
            digest_of(r#"<a x="1" y="2"/>"#),
            digest_of(r#"<a y="2" x="1"/>"#)
        );
    }

    #[test]
    fn test_indentation_and_comments_are_irrelevant() {
        let compact = digest_of("<a><b>1</b><c>2</c></a>");
        let pretty = digest_of("<a>\n  <!-- first -->\n  <b>1</b>\n  <c>2</c>\n</a>");
        assert_eq!(compact, pretty);
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let split = Document::new(
            Element::new(QName::new("a"))
                .with_text("he")
                .with_child(Node::Comment("x".into()))
                .with_text("llo"),
        );
        let whole = Document::new(Element::new(QName::new("a")).with_text("hello"));
        assert_eq!(
            hasher().document_digest(&split).unwrap(),
            hasher().document_digest(&whole).unwrap()
        );
    }

    #[test]
    fn test_content_changes_digest() {
        assert_ne!(digest_of("<a><b>1</b></a>"), digest_of("<a><b>2</b></a>"));
        assert_ne!(digest_of("<a><b/><c/></a>"), digest_of("<a><c/><b/></a>"));
        assert_ne!(digest_of(r#"<a x="1"/>"#), digest_of(r#"<a x="2"/>"#));
        assert_ne!(
            digest_of(r#"<a xmlns="urn:one"/>"#),
            digest_of(r#"<a xmlns="urn:two"/>"#)
        );
    }

    #[test]
    fn test_preserved_whitespace_is_significant() {
        assert_ne!(
            digest_of(r#"<a xml:space="preserve"> </a>"#),
            digest_of(r#"<a xml:space="preserve"/>"#)
        );
        // inherited by descendants, reset by xml:space="default"
        assert_ne!(
            digest_of(r#"<a xml:space="preserve"><b> </b></a>"#),
            digest_of(r#"<a xml:space="preserve"><b/></a>"#)
        );
        assert_eq!(
            digest_of(r#"<a xml:space="preserve"><b xml:space="default"> </b></a>"#),
            digest_of(r#"<a xml:space="preserve"><b xml:space="default"/></a>"#)
        );
    }

    #[test]
    fn test_prefix_choice_is_irrelevant() {
        assert_eq!(
            digest_of(r#"<p:a xmlns:p="urn:x"/>"#),
            digest_of(r#"<q:a xmlns:q="urn:x"/>"#)
        );
    }

    #[test]
    fn test_depth_bound() {
        let doc = Document::parse_xml("<a><b><c/></b></a>", 64).unwrap();
        assert!(DomHasher::new(DigestAlgorithm::Md5, 3).document_digest(&doc).is_ok());
        let err = DomHasher::new(DigestAlgorithm::Md5, 2)
            .document_digest(&doc)
            .unwrap_err();
        assert!(err.contains("exceeds 2 levels"));
    }

    #[test]
    fn test_digest_size_follows_algorithm() {
        let doc = Document::parse_xml("<a/>", 64).unwrap();
        let sha = DomHasher::new(DigestAlgorithm::Sha256, 64);
        assert_eq!(sha.document_digest(&doc).unwrap().len(), 32);
        assert_eq!(hasher().document_digest(&doc).unwrap().len(), 16);
    }
}
