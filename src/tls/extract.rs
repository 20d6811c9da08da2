//! Certificate extraction utilities.

use anyhow::Result;
use x509_parser::extensions::{GeneralName, ParsedExtension};

/// Extracts the subject common name from a DER-encoded certificate.
///
/// # Returns
///
/// The first CN of the subject, or `None` if the subject has none.
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed.
pub(crate) fn extract_common_name(der: &[u8]) -> Result<Option<String>> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)?;
    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string);
    Ok(common_name)
}

/// Extracts DNS Subject Alternative Names from a DER-encoded certificate.
///
/// Used as a fallback label when the subject carries no CN, which is common
/// for certificates issued under the CA/Browser baseline requirements.
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed.
pub(crate) fn extract_dns_sans(der: &[u8]) -> Result<Vec<String>> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)?;
    let mut sans = Vec::new();
    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(ref san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    sans.push(dns_name.to_string());
                }
            }
        }
    }
    Ok(sans)
}
