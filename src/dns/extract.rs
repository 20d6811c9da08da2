//! DNS record extraction utilities.
//!
//! This module provides functions to extract SPF and DMARC records from TXT
//! record collections and to score them.

use std::collections::HashMap;

/// Terminal `all` qualifier of an SPF record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpfPolicy {
    /// `+all`: anyone may send
    PassAll,
    /// `-all`
    Fail,
    /// `~all`
    SoftFail,
    /// No recognised terminal qualifier
    Missing,
}

impl SpfPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpfPolicy::PassAll => "+all",
            SpfPolicy::Fail => "-all",
            SpfPolicy::SoftFail => "~all",
            SpfPolicy::Missing => "none",
        }
    }
}

impl std::fmt::Display for SpfPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts every SPF record from TXT records.
///
/// SPF records start with "v=spf1" (case-insensitive).
///
/// # Arguments
///
/// * `txt_records` - TXT record strings
///
/// # Returns
///
/// All SPF records in the order given; more than one is a misconfiguration.
pub fn extract_spf_records(txt_records: &[String]) -> Vec<String> {
    txt_records
        .iter()
        .filter(|txt| txt.trim().to_ascii_lowercase().starts_with("v=spf1"))
        .map(|s| s.trim().to_string())
        .collect()
}

/// Extracts the DMARC record from TXT records.
///
/// DMARC records start with "v=DMARC1" (case-insensitive). All whitespace
/// is removed from the returned record.
///
/// # Arguments
///
/// * `txt_records` - TXT record strings from `_dmarc.<domain>`
///
/// # Returns
///
/// The first DMARC record found, or `None` if no DMARC record exists.
pub fn extract_dmarc_record(txt_records: &[String]) -> Option<String> {
    txt_records
        .iter()
        .map(|txt| txt.split_whitespace().collect::<String>())
        .find(|txt| txt.to_ascii_lowercase().starts_with("v=dmarc1"))
}

/// Rough count of DNS-querying mechanisms in an SPF record.
///
/// Counts occurrences of `include:`, `exists:` and `redirect=`, plus
/// whitespace-separated terms that are exactly `a` or `mx` or start with
/// `a:`, `mx:` or `ptr`. Qualified (`+a`), CIDR-suffixed (`a/24`) and macro
/// terms are not recognised, and nested includes are not followed.
pub fn spf_lookup_count(spf: &str) -> usize {
    let mechanisms = spf.matches("include:").count()
        + spf.matches("exists:").count()
        + spf.matches("redirect=").count();
    let terms = spf
        .split_whitespace()
        .filter(|t| {
            *t == "a" || *t == "mx" || t.starts_with("a:") || t.starts_with("mx:") || t.starts_with("ptr")
        })
        .count();
    mechanisms + terms
}

/// Terminal qualifier of an SPF record. `+all` anywhere wins over `-all`,
/// which wins over `~all`.
pub fn spf_policy(spf: &str) -> SpfPolicy {
    if spf.contains("+all") {
        SpfPolicy::PassAll
    } else if spf.contains("-all") {
        SpfPolicy::Fail
    } else if spf.contains("~all") {
        SpfPolicy::SoftFail
    } else {
        SpfPolicy::Missing
    }
}

/// Splits a DMARC record into its tags. Later duplicates win.
pub fn parse_dmarc_tags(record: &str) -> HashMap<String, String> {
    record
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .map(|(tag, value)| (tag.trim().to_string(), value.trim().to_string()))
        .collect()
}
