//! Header exclusion lists.
//!
//! # Responsibilities
//! - Hold the permanent (built-in) and configurable exclusion sets
//! - Answer case-insensitive membership queries
//!
//! # Design Decisions
//! - Names are lowercased once at construction; lookups never allocate twice
//! - The permanent list is injectable; `PERMANENTLY_EXCLUDED_HEADERS` is only
//!   the default
//! - Immutable after construction, shared read-only between calls

use std::collections::BTreeSet;

/// Headers that vary per hop or per attempt without changing what is asked for.
pub const PERMANENTLY_EXCLUDED_HEADERS: &[&str] = &[
    "Connection",
    "Content-Length",
    "Date",
    "Keep-Alive",
    "Proxy-Connection",
    "TE",
    "Trailer",
    "Transfer-Encoding",
    "Upgrade",
    "X-Request-ID",
];

/// Permanent and operator-supplied header exclusions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionConfig {
    permanent: BTreeSet<String>,
    configurable: BTreeSet<String>,
}

impl ExclusionConfig {
    /// Build from an explicit permanent list and a configurable list.
    pub fn new<P, C>(permanent: P, configurable: C) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            permanent: normalize(permanent),
            configurable: normalize(configurable),
        }
    }

    /// Built-in permanent list plus the given configurable list.
    pub fn with_configurable<C>(configurable: C) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self::new(PERMANENTLY_EXCLUDED_HEADERS, configurable)
    }

    pub fn is_permanently_excluded(&self, name: &str) -> bool {
        self.permanent.contains(&name.trim().to_ascii_lowercase())
    }

    pub fn is_configured_excluded(&self, name: &str) -> bool {
        self.configurable.contains(&name.trim().to_ascii_lowercase())
    }

    /// True if `name` is in either list.
    pub fn is_excluded(&self, name: &str) -> bool {
        let name = name.trim().to_ascii_lowercase();
        self.permanent.contains(&name) || self.configurable.contains(&name)
    }

    /// Lowercased permanent names, in order.
    pub fn permanent(&self) -> impl Iterator<Item = &str> {
        self.permanent.iter().map(String::as_str)
    }

    /// Lowercased configurable names, in order.
    pub fn configurable(&self) -> impl Iterator<Item = &str> {
        self.configurable.iter().map(String::as_str)
    }
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self::with_configurable(std::iter::empty::<&str>())
    }
}

fn normalize<I>(names: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_ascii_lowercase())
        .filter(|n| !n.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_empty_configurable_set() {
        let config = ExclusionConfig::default();
        assert_eq!(config.configurable().count(), 0);
        assert!(config.is_permanently_excluded("date"));
        assert!(config.is_excluded("TRANSFER-ENCODING"));
        assert!(!config.is_excluded("Content-Type"));
    }

    #[test]
    fn test_case_insensitive_membership() {
        let config = ExclusionConfig::with_configurable(["X-Trace", "x-correlation-id"]);
        assert!(config.is_configured_excluded("x-trace"));
        assert!(config.is_configured_excluded("X-Correlation-ID"));
        assert!(!config.is_permanently_excluded("X-Trace"));
        assert!(config.is_excluded("X-TRACE"));
    }

    #[test]
    fn test_injected_permanent_list_replaces_default() {
        let config = ExclusionConfig::new(["Via"], ["X-Trace"]);
        assert!(config.is_excluded("via"));
        assert!(!config.is_excluded("Date"));
        assert_eq!(config.permanent().collect::<Vec<_>>(), vec!["via"]);
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let config = ExclusionConfig::with_configurable(["", "  ", "X-Trace"]);
        assert_eq!(config.configurable().collect::<Vec<_>>(), vec!["x-trace"]);
    }
}
