//! Per-nameserver probes: latency, open recursion, TCP/53, EDNS,
//! authority and zone transfer.

use std::collections::BTreeSet;
use std::time::Instant;

use hickory_resolver::proto::rr::RecordType;

use crate::checks::nameservers::NameserverInfo;
use crate::checks::recursion::test_open_recursion;
use crate::config::{Config, LATENCY_EXCELLENT_MS, LATENCY_WARN_MS, MAX_ZONE_TRANSFER_CHECKS};
use crate::dns::QueryOptions;
use crate::network::Network;
use crate::report::CheckResult;

const PERFORMANCE: &str = "Performance";
const SECURITY: &str = "Security";

/// Labels a latency in milliseconds; `None` means too slow.
fn latency_quality(ms: u128) -> Option<&'static str> {
    if ms < LATENCY_EXCELLENT_MS {
        Some("excellent")
    } else if ms < LATENCY_WARN_MS {
        Some("good")
    } else {
        None
    }
}

/// Builds the latency result for a measured SOA round trip.
pub fn latency_check(host: &str, ms: u128) -> CheckResult {
    let name = format!("{host} Response");
    match latency_quality(ms) {
        Some(quality) => CheckResult::pass(PERFORMANCE, name, format!("{ms}ms ({quality})")),
        None => CheckResult::warn(PERFORMANCE, name, format!("{ms}ms (slow)")),
    }
}

/// Runs every per-nameserver probe against the first address of `ns`.
///
/// `listed` is the child NS set; a server outside it is a stealth candidate.
/// A nameserver without addresses yields no results.
pub async fn probe_nameserver<N: Network>(
    network: &N,
    domain: &str,
    ns: &NameserverInfo,
    listed: &BTreeSet<String>,
    config: &Config,
) -> Vec<CheckResult> {
    let Some(ip) = ns.primary_ip() else {
        return Vec::new();
    };
    let host = ns.hostname.as_str();
    let is_listed = listed.contains(host);
    let mut checks = Vec::new();

    // Nameservers outside the child set are only checked for authority
    if is_listed {
        let started = Instant::now();
        match network.lookup_at(&[ip], domain, RecordType::SOA).await {
            Ok(_) => checks.push(latency_check(host, started.elapsed().as_millis())),
            Err(e) => {
                log::debug!("SOA from {host} ({ip}) failed: {e}");
                checks.push(CheckResult::error(
                    PERFORMANCE,
                    format!("{host} Response"),
                    format!("{host} timeout"),
                ));
            }
        }

        let verdict = test_open_recursion(network, ip, config).await;
        let name = format!("{host} Recursion");
        let check = if verdict.is_open() {
            CheckResult::error(SECURITY, name, format!("{host} allows open recursion - RISK!"))
        } else {
            CheckResult::pass(SECURITY, name, format!("{host} denies recursion"))
        };
        checks.push(check.with_evidence([verdict.reason()]));

        let name = format!("{host} TCP 53");
        match network
            .probe(ip, domain, RecordType::SOA, QueryOptions::tcp(config.tcp_timeout()))
            .await
        {
            Ok(_) => checks.push(CheckResult::pass(SECURITY, name, "TCP/53 OK")),
            Err(e) => {
                log::debug!("TCP/53 to {host} failed ({}): {e}", e.kind());
                checks.push(CheckResult::error(SECURITY, name, "TCP/53 failed or blocked"));
            }
        }

        let name = format!("{host} EDNS");
        let options = QueryOptions::udp(config.dns_timeout()).with_edns(config.edns_payload);
        match network.probe(ip, domain, RecordType::SOA, options).await {
            Ok(response) => checks.push(CheckResult::pass(
                SECURITY,
                name,
                format!("EDNS OK ({})", response.rcode_name()),
            )),
            Err(e) => checks.push(CheckResult::warn(SECURITY, name, format!("EDNS issue: {e}"))),
        }
    }

    let options = QueryOptions::udp(config.dns_timeout());
    match network.probe(ip, domain, RecordType::SOA, options).await {
        Ok(response) if response.authoritative => {
            if is_listed {
                checks.push(CheckResult::pass(
                    SECURITY,
                    format!("{host} Authority"),
                    "Authoritative and listed",
                ));
            } else {
                checks.push(CheckResult::warn(
                    SECURITY,
                    format!("{host} Stealth"),
                    "Authoritative but not listed in NS set",
                ));
            }
        }
        Ok(_) => {
            if is_listed {
                checks.push(CheckResult::error(
                    SECURITY,
                    format!("{host} Lame"),
                    "Listed as NS but not authoritative (AA=0)",
                ));
            }
        }
        Err(e) => {
            if is_listed {
                checks.push(CheckResult::error(
                    SECURITY,
                    format!("{host} Lame"),
                    format!("No authoritative response: {e}"),
                ));
            }
        }
    }

    checks
}

/// Attempts AXFR from the first nameservers that have an address.
pub async fn zone_transfer_checks<N: Network>(
    network: &N,
    domain: &str,
    nameservers: &[NameserverInfo],
) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    for ns in nameservers
        .iter()
        .filter(|ns| ns.primary_ip().is_some())
        .take(MAX_ZONE_TRANSFER_CHECKS)
    {
        let Some(ip) = ns.primary_ip() else {
            continue;
        };
        let host = &ns.hostname;
        let allowed = match network.zone_transfer(ip, domain).await {
            Ok(allowed) => allowed,
            Err(e) => {
                log::debug!("AXFR from {host} failed: {e}");
                false
            }
        };
        let name = format!("Zone XFR {host}");
        if allowed {
            checks.push(CheckResult::error(
                SECURITY,
                name,
                format!("Zone transfer ALLOWED on {host} - RISK!"),
            ));
        } else {
            checks.push(CheckResult::pass(
                SECURITY,
                name,
                format!("Zone XFR restricted on {host}"),
            ));
        }
    }
    checks
}
