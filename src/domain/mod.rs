//! Domain name normalization utilities.
//!
//! Names coming back from the wire carry trailing dots and arbitrary case;
//! names typed by users carry whitespace and sometimes a scheme. Everything
//! that compares or displays names goes through these helpers.
//!
//! Key functions:
//! - `normalize_name()` - Lowercases and strips the trailing dot
//! - `validate_domain()` - Strict validation of user input
//! - `is_in_bailiwick()` - Whether a nameserver lives inside the zone it serves

use crate::error_handling::DomainError;

/// Lowercases a DNS name and strips surrounding whitespace and the trailing dot.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Returns the name in absolute form (with a trailing dot).
pub fn fqdn(name: &str) -> String {
    let name = normalize_name(name);
    format!("{name}.")
}

/// Validates and normalizes a domain supplied by a user.
///
/// # Errors
///
/// Returns a `DomainError` if the input is empty, looks like a URL, contains
/// characters that cannot appear in a hostname, or has an empty or overlong
/// label.
pub fn validate_domain(input: &str) -> Result<String, DomainError> {
    let trimmed = input.trim();
    if trimmed.contains("://") || trimmed.contains('/') {
        return Err(DomainError::NotAHostname(trimmed.to_string()));
    }

    let domain = normalize_name(trimmed);
    if domain.is_empty() {
        return Err(DomainError::Empty);
    }

    if let Some(c) = domain
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.' || *c == '_'))
    {
        return Err(DomainError::InvalidCharacter(c));
    }

    if let Some(label) = domain
        .split('.')
        .find(|label| label.is_empty() || label.len() > 63)
    {
        return Err(DomainError::InvalidLabel(label.to_string()));
    }

    Ok(domain)
}

/// Returns the top-level label of a domain, or `None` for single-label names.
pub fn tld_of(domain: &str) -> Option<&str> {
    let domain = domain.trim_end_matches('.');
    match domain.rsplit_once('.') {
        Some((_, tld)) if !tld.is_empty() => Some(tld),
        _ => None,
    }
}

/// Returns true if `name` equals `zone` or is a subdomain of it.
pub fn is_subdomain_of(name: &str, zone: &str) -> bool {
    let name = normalize_name(name);
    let zone = normalize_name(zone);
    name == zone || name.ends_with(&format!(".{zone}"))
}

/// Returns true if a nameserver host sits inside the zone it serves and so
/// needs glue in the parent.
pub fn is_in_bailiwick(nameserver: &str, domain: &str) -> bool {
    is_subdomain_of(nameserver, domain)
}
