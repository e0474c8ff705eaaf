//! Canonical header map.
//!
//! # Responsibilities
//! - Collapse header names case-insensitively (last write wins)
//! - Order names case-insensitively
//! - Remove permanently and operator-excluded headers
//!
//! # Design Decisions
//! - Names are lowercased explicitly and kept in a `BTreeMap`, so source order,
//!   casing and duplication never reach the hash
//! - Values are compared after trimming optional surrounding whitespace

use std::collections::BTreeMap;

use crate::digest::algorithm::DigestAlgorithm;
use crate::digest::domhash::{push_count, push_utf16};
use crate::digest::exclusion::ExclusionConfig;

const SEPARATOR: [u8; 2] = [0, 0];

/// Headers keyed by lowercased name, in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalHeaders {
    entries: BTreeMap<String, String>,
}

impl CanonicalHeaders {
    /// Collapse raw pairs; later duplicates overwrite earlier ones.
    pub fn collapse<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries = BTreeMap::new();
        for (name, value) in headers {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            entries.insert(name.to_ascii_lowercase(), value.trim().to_string());
        }
        Self { entries }
    }

    /// Drop everything in the permanent list, then everything in the configurable list.
    pub fn without_excluded(mut self, exclusions: &ExclusionConfig) -> Self {
        for name in exclusions.permanent() {
            self.entries.remove(name);
        }
        for name in exclusions.configurable() {
            self.entries.remove(name);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Append the header count and one digest per header to `buf`.
    pub(crate) fn write_digests(
        &self,
        algorithm: DigestAlgorithm,
        buf: &mut Vec<u8>,
    ) -> Result<(), String> {
        push_count(buf, self.entries.len())?;
        for (name, value) in &self.entries {
            let mut pair = Vec::with_capacity(2 * (name.len() + value.len()) + 2);
            push_utf16(&mut pair, name);
            pair.extend_from_slice(&SEPARATOR);
            push_utf16(&mut pair, value);
            buf.extend_from_slice(&algorithm.hash(&pair));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_last_write_wins() {
        let headers = CanonicalHeaders::collapse([
            ("Accept", "text/xml"),
            ("ACCEPT", "application/json"),
            ("content-type", " text/xml "),
        ]);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("accept"), Some("application/json"));
        assert_eq!(headers.get("Content-Type"), Some("text/xml"));
    }

    #[test]
    fn test_canonical_order_is_case_insensitive() {
        let headers = CanonicalHeaders::collapse([("b-Header", "2"), ("A-Header", "1"), ("c", "3")]);
        let names: Vec<_> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a-header", "b-header", "c"]);
    }

    #[test]
    fn test_exclusion_is_set_difference() {
        let exclusions = ExclusionConfig::new(["Date"], ["X-Trace"]);
        let headers = CanonicalHeaders::collapse([
            ("date", "Mon"),
            ("x-trace", "abc"),
            ("Content-Type", "text/xml"),
        ])
        .without_excluded(&exclusions);

        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("content-type", "text/xml")]);
    }

    #[test]
    fn test_write_digests_layout() {
        let headers = CanonicalHeaders::collapse([("a", "b")]);
        let mut buf = Vec::new();
        headers.write_digests(DigestAlgorithm::Md5, &mut buf).unwrap();

        assert_eq!(&buf[..4], &[0, 0, 0, 1]);
        let expected = DigestAlgorithm::Md5.hash(&[0, b'a', 0, 0, 0, b'b']);
        assert_eq!(&buf[4..], expected.as_slice());
    }

    #[test]
    fn test_blank_names_are_dropped() {
        let headers = CanonicalHeaders::collapse([(" ", "x"), ("a", "1")]);
        assert_eq!(headers.len(), 1);
    }
}
