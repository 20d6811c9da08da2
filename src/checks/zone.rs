//! Zone consistency: SOA timers and serials, apex A/AAAA and cross-NS
//! agreement.

use std::collections::BTreeSet;
use std::net::IpAddr;

use futures::future::join_all;
use hickory_resolver::proto::rr::RecordType;

use crate::checks::nameservers::NameserverInfo;
use crate::config::{
    MAX_CROSS_NS_CHECKS, SOA_REFRESH_MAX, SOA_REFRESH_MIN, SOA_TTL_MAX, SOA_TTL_MIN,
};
use crate::dns::{Answer, SoaData};
use crate::error_handling::LookupError;
use crate::network::Network;
use crate::report::CheckResult;

const SOA: &str = "SOA";
const A_RECORDS: &str = "A Records";
const IPV6: &str = "IPv6";

fn ip_list(ips: &[IpAddr]) -> String {
    let ips: Vec<String> = ips.iter().map(ToString::to_string).collect();
    format!("[{}]", ips.join(", "))
}

/// Serial agreement across nameservers; `None` when no nameserver answered.
pub fn serial_consistency(serials: &[(String, u32)]) -> Option<CheckResult> {
    let distinct: BTreeSet<u32> = serials.iter().map(|(_, serial)| *serial).collect();
    match distinct.len() {
        0 => None,
        1 => Some(CheckResult::pass(
            SOA,
            "Serial Consistency",
            format!("All NS return: {}", serials[0].1),
        )),
        _ => Some(
            CheckResult::error(SOA, "Serial Consistency", "NS have DIFFERENT serials!")
                .with_details(serials.iter().map(|(host, serial)| format!("{host}: {serial}"))),
        ),
    }
}

/// Refresh, retry, expire and TTL sanity for the zone's SOA.
pub fn soa_timer_checks(soa: &SoaData, ttl: Option<u32>) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    if (SOA_REFRESH_MIN..=SOA_REFRESH_MAX).contains(&soa.refresh) {
        checks.push(CheckResult::pass(SOA, "Refresh", format!("Refresh: {}s", soa.refresh)));
    } else {
        checks.push(CheckResult::warn(
            SOA,
            "Refresh",
            format!(
                "Refresh: {}s (outside {SOA_REFRESH_MIN}-{SOA_REFRESH_MAX})",
                soa.refresh
            ),
        ));
    }

    if soa.retry < soa.refresh {
        checks.push(CheckResult::pass(SOA, "Retry", "Retry < Refresh"));
    } else {
        checks.push(CheckResult::warn(SOA, "Retry", "Retry should be < Refresh"));
    }

    if i64::from(soa.expire) > 2 * i64::from(soa.refresh) {
        checks.push(CheckResult::pass(SOA, "Expire", format!("Expire: {}s", soa.expire)));
    } else {
        checks.push(CheckResult::warn(SOA, "Expire", "Expire may be low"));
    }

    if let Some(ttl) = ttl {
        let check = if ttl <= SOA_TTL_MIN {
            CheckResult::warn(SOA, "SOA TTL", format!("SOA TTL low ({ttl}s)"))
        } else if ttl > SOA_TTL_MAX {
            CheckResult::warn(SOA, "SOA TTL", format!("SOA TTL high ({ttl}s)"))
        } else {
            CheckResult::pass(SOA, "SOA TTL", format!("SOA TTL: {ttl}s"))
        };
        checks.push(check);
    }

    checks
}

/// SOA via the default resolver, per-nameserver serials and timer sanity.
pub async fn check_soa<N: Network>(
    network: &N,
    domain: &str,
    nameservers: &[NameserverInfo],
) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    let answer = match network.lookup(domain, RecordType::SOA).await {
        Ok(answer) => answer,
        Err(e) => {
            checks.push(CheckResult::error(SOA, "SOA Lookup", format!("Failed: {e}")));
            return checks;
        }
    };
    let Some(soa) = answer.soa().cloned() else {
        checks.push(CheckResult::error(SOA, "SOA Lookup", "Failed: no SOA in answer"));
        return checks;
    };

    let mut details = vec![
        format!("Serial: {}", soa.serial),
        format!("Refresh: {}s", soa.refresh),
        format!("Retry: {}s", soa.retry),
        format!("Expire: {}s", soa.expire),
        format!("Min TTL: {}s", soa.minimum),
    ];
    if let Some(ttl) = answer.ttl {
        details.push(format!("TTL: {ttl}s"));
    }
    checks.push(
        CheckResult::pass(
            SOA,
            "SOA Record",
            format!("Primary: {}, Admin: {}", soa.mname, soa.rname),
        )
        .with_details(details),
    );

    let with_ips: Vec<&NameserverInfo> = nameservers.iter().filter(|ns| !ns.ips.is_empty()).collect();
    let answers = join_all(
        with_ips
            .iter()
            .map(|ns| network.lookup_at(&ns.ips, domain, RecordType::SOA)),
    )
    .await;

    let mut serials = Vec::new();
    for (ns, answer) in with_ips.iter().zip(answers) {
        match answer.ok().and_then(|a| a.soa().map(|soa| soa.serial)) {
            Some(serial) => serials.push((ns.hostname.clone(), serial)),
            None => checks.push(CheckResult::error(
                SOA,
                format!("SOA from {}", ns.hostname),
                format!("{} no SOA (lame!)", ns.hostname),
            )),
        }
    }
    checks.extend(serial_consistency(&serials));
    checks.extend(soa_timer_checks(&soa, answer.ttl));
    checks
}

/// Apex A records and their agreement across the first nameservers.
///
/// Returns the default-resolver answer for later checks.
pub async fn check_a_records<N: Network>(
    network: &N,
    domain: &str,
    nameservers: &[NameserverInfo],
) -> (Vec<CheckResult>, Option<Answer>) {
    let mut checks = Vec::new();

    let answer = match network.lookup(domain, RecordType::A).await {
        Ok(answer) => answer,
        Err(LookupError::NoAnswer) => {
            checks.push(CheckResult::warn(A_RECORDS, "A Record", "No A records"));
            return (checks, None);
        }
        Err(e) => {
            checks.push(CheckResult::error(A_RECORDS, "A Lookup", format!("Failed: {e}")));
            return (checks, None);
        }
    };

    let default_ips = answer.ips();
    checks.push(
        CheckResult::pass(
            A_RECORDS,
            "A Record",
            format!(
                "{} A record(s) (TTL: {})",
                default_ips.len(),
                answer.ttl_label()
            ),
        )
        .with_details(default_ips.iter().map(ToString::to_string)),
    );

    let sampled: Vec<&NameserverInfo> = nameservers
        .iter()
        .filter(|ns| !ns.ips.is_empty())
        .take(MAX_CROSS_NS_CHECKS)
        .collect();
    let answers = join_all(
        sampled
            .iter()
            .map(|ns| network.lookup_at(&ns.ips, domain, RecordType::A)),
    )
    .await;

    let default_set: BTreeSet<IpAddr> = default_ips.iter().copied().collect();
    for (ns, ns_answer) in sampled.iter().zip(answers) {
        let Ok(ns_answer) = ns_answer else {
            log::debug!("A lookup at {} failed, skipping comparison", ns.hostname);
            continue;
        };
        let ns_ips = ns_answer.ips();
        let ns_set: BTreeSet<IpAddr> = ns_ips.iter().copied().collect();
        let name = format!("A from {}", ns.hostname);
        let evidence = [
            format!("default={}", ip_list(&default_ips)),
            format!("{}={}", ns.hostname, ip_list(&ns_ips)),
        ];
        let check = if ns_set == default_set {
            CheckResult::pass(A_RECORDS, name, "Consistent")
        } else {
            CheckResult::warn(A_RECORDS, name, "Different!")
        };
        checks.push(check.with_evidence(evidence));
    }

    (checks, Some(answer))
}

/// Apex AAAA records.
pub async fn check_aaaa_records<N: Network>(network: &N, domain: &str) -> Option<CheckResult> {
    match network.lookup(domain, RecordType::AAAA).await {
        Ok(answer) => {
            let ips = answer.ips();
            Some(
                CheckResult::pass(
                    IPV6,
                    "AAAA Record",
                    format!("{} IPv6 address(es) - IPv6 ready!", ips.len()),
                )
                .with_details(ips.iter().map(ToString::to_string)),
            )
        }
        Err(LookupError::NoAnswer) => Some(CheckResult::warn(IPV6, "AAAA Record", "No IPv6 support")),
        Err(e) => {
            log::debug!("AAAA lookup for {domain}: {e}");
            None
        }
    }
}
