//! Configuration constants.
//!
//! This module defines all constants used throughout the engine, including
//! timeouts, thresholds for the zone and mail checks, and the fixed host and
//! zone lists the checks walk.

use std::time::Duration;

// Network operation timeouts
/// UDP DNS query timeout in seconds
/// Most authoritative servers answer in well under a second; 3s fails fast on dead servers
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP DNS query timeout in seconds (connect + send + receive)
pub const TCP_QUERY_TIMEOUT_SECS: u64 = 5;
/// Recursive resolver timeout in seconds (per attempt)
pub const RESOLVER_TIMEOUT_SECS: u64 = 5;
/// Per-step SMTP timeout in seconds (connect, banner, EHLO, STARTTLS, handshake)
pub const SMTP_TIMEOUT_SECS: u64 = 10;
/// Overall timeout for one diagnostic run, enforced by the caller
pub const OVERALL_TIMEOUT: Duration = Duration::from_secs(120);

// Query primitive
/// Standard DNS port
pub const DNS_PORT: u16 = 53;
/// EDNS UDP payload size advertised by the EDNS probe (DNS flag day 2020 value)
pub const EDNS_PAYLOAD_SIZE: u16 = 1232;
/// Receive buffer for UDP responses
pub const UDP_RECEIVE_BUFFER: usize = 4096;

// Delegation inspector
/// Maximum number of referrals followed from the TLD down to the domain's parent
pub const MAX_DELEGATION_DEPTH: usize = 4;

// Nameserver prober
/// Below this latency a nameserver is "excellent"
pub const LATENCY_EXCELLENT_MS: u128 = 100;
/// Below this latency a nameserver is "good"; above it the check warns
pub const LATENCY_WARN_MS: u128 = 500;
/// Only the first N nameservers get a zone transfer attempt
pub const MAX_ZONE_TRANSFER_CHECKS: usize = 2;
/// Prefix of the random names used by the open-recursion test
pub const RECURSION_PROBE_PREFIX: &str = "recursion-test-";
/// Length of the random part of the open-recursion test names
pub const RECURSION_PROBE_LABEL_LEN: usize = 24;
/// Generic TLD the open-recursion test names live under
pub const RECURSION_PROBE_TLD: &str = "com.";

// Zone consistency
/// Lower bound of the recommended SOA refresh interval (seconds)
pub const SOA_REFRESH_MIN: i32 = 1200;
/// Upper bound of the recommended SOA refresh interval (seconds)
pub const SOA_REFRESH_MAX: i32 = 43200;
/// SOA TTL at or below this value is reported as low (seconds)
pub const SOA_TTL_MIN: u32 = 3600;
/// SOA TTL above this value is reported as high (seconds)
pub const SOA_TTL_MAX: u32 = 86400;
/// A records are compared against at most this many nameservers
pub const MAX_CROSS_NS_CHECKS: usize = 3;

// Record sanity
/// Conventional host labels checked for CNAMEs and dangling targets
pub const COMMON_HOSTS: [&str; 5] = ["www", "mail", "ftp", "webmail", "smtp"];

// Mail
/// SMTP port probed for STARTTLS
pub const SMTP_PORT: u16 = 25;
/// Name sent in EHLO unless overridden
pub const DEFAULT_HELO_NAME: &str = "example.com";
/// Only the first N MX hosts get a STARTTLS probe
pub const MAX_STARTTLS_PROBES: usize = 3;
/// SMTP banners are truncated to this many characters in evidence
pub const BANNER_EVIDENCE_LEN: usize = 80;
/// RFC 7208 limit on DNS-querying SPF mechanisms
pub const SPF_MAX_LOOKUPS: usize = 10;

// ASN / blacklists
/// Team Cymru origin-ASN zone for IPv4
pub const ASN_ORIGIN_ZONE: &str = "origin.asn.cymru.com";
/// Team Cymru origin-ASN zone for IPv6
pub const ASN_ORIGIN6_ZONE: &str = "origin6.asn.cymru.com";
/// DNS blocklists queried for the domain's first A record
pub const DNSBL_ZONES: [&str; 5] = [
    "zen.spamhaus.org",
    "bl.spamcop.net",
    "b.barracudacentral.org",
    "dnsbl.sorbs.net",
    "cbl.abuseat.org",
];

// Report formatting
/// Width of the horizontal rules in the text report
pub const REPORT_RULE_WIDTH: usize = 80;
