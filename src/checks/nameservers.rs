//! Nameserver set checks: count, parent/child agreement, glue, ASN
//! diversity and address sanity.

use std::collections::BTreeSet;
use std::net::IpAddr;

use futures::future::join_all;
use hickory_resolver::proto::rr::RecordType;

use crate::checks::asn::{asn_for_ip, is_bogon};
use crate::checks::delegation::ParentView;
use crate::checks::resolve_host;
use crate::domain::{is_in_bailiwick, normalize_name};
use crate::network::Network;
use crate::report::CheckResult;

const NAMESERVERS: &str = "Nameservers";
const PARENT_ZONE: &str = "Parent Zone";

/// A nameserver host and what is known about it for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameserverInfo {
    pub hostname: String,
    /// IPv4 addresses first, then IPv6; the first one is probed
    pub ips: Vec<IpAddr>,
    pub asn: Option<String>,
}

impl NameserverInfo {
    pub fn primary_ip(&self) -> Option<IpAddr> {
        self.ips.first().copied()
    }
}

/// Result of the nameserver set checks.
#[derive(Debug, Default)]
pub struct NameserverSurvey {
    pub checks: Vec<CheckResult>,
    /// The child NS set in name order, `None` when the NS lookup failed
    pub listed: Option<Vec<NameserverInfo>>,
}

/// Resolves a nameserver host to its addresses, A records then AAAA.
pub async fn resolve_nameserver<N: Network>(network: &N, host: &str) -> NameserverInfo {
    NameserverInfo {
        hostname: host.to_string(),
        ips: resolve_host(network, host).await,
        asn: None,
    }
}

fn join_ips(ips: &[IpAddr]) -> String {
    ips.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn bracketed(ips: &[IpAddr]) -> String {
    format!("[{}]", join_ips(ips))
}

/// Runs the nameserver set checks in report order.
pub async fn survey_nameservers<N: Network>(
    network: &N,
    domain: &str,
    parent: Option<&ParentView>,
) -> NameserverSurvey {
    let mut survey = NameserverSurvey::default();

    if let Some(parent) = parent {
        survey.checks.push(
            CheckResult::pass(
                PARENT_ZONE,
                "Parent NS Records",
                format!("Parent zone lists {} nameserver(s)", parent.nameservers.len()),
            )
            .with_details(parent.nameservers.iter().cloned()),
        );
    }

    let child: BTreeSet<String> = match network.lookup(domain, RecordType::NS).await {
        Ok(answer) => answer.targets().iter().map(|ns| normalize_name(ns)).collect(),
        Err(e) => {
            survey
                .checks
                .push(CheckResult::error(NAMESERVERS, "NS Lookup", format!("Failed: {e}")));
            return survey;
        }
    };

    if child.len() < 2 {
        survey.checks.push(
            CheckResult::warn(
                NAMESERVERS,
                "NS Count",
                format!("Only {} nameserver(s). Best practice: 2+", child.len()),
            )
            .with_details(child.iter().cloned()),
        );
    } else {
        survey.checks.push(
            CheckResult::pass(
                NAMESERVERS,
                "NS Count",
                format!("{} nameservers found", child.len()),
            )
            .with_details(child.iter().cloned()),
        );
    }

    if let Some(parent) = parent {
        survey.checks.push(compare_parent_child(&parent.nameservers, &child));
    }

    let needs_glue: Vec<String> = child
        .iter()
        .filter(|ns| is_in_bailiwick(ns, domain))
        .cloned()
        .collect();
    if needs_glue.is_empty() {
        survey
            .checks
            .push(CheckResult::pass(NAMESERVERS, "Glue Records", "No glue records needed"));
    } else {
        survey.checks.push(
            CheckResult::warn(
                NAMESERVERS,
                "Glue Records",
                format!("{} NS need glue records", needs_glue.len()),
            )
            .with_details(needs_glue),
        );
    }

    let mut listed: Vec<NameserverInfo> =
        join_all(child.iter().map(|host| resolve_nameserver(network, host))).await;
    for info in &listed {
        let name = format!("NS {}", info.hostname);
        if info.ips.is_empty() {
            survey.checks.push(CheckResult::error(
                NAMESERVERS,
                name,
                format!("{} no resolve", info.hostname),
            ));
        } else {
            survey.checks.push(CheckResult::pass(
                NAMESERVERS,
                name,
                format!("{} → {}", info.hostname, join_ips(&info.ips)),
            ));
        }
    }

    let asns = join_all(listed.iter().map(|info| async move {
        match info.primary_ip() {
            Some(ip) => asn_for_ip(network, ip).await,
            None => None,
        }
    }))
    .await;
    for (info, asn) in listed.iter_mut().zip(asns) {
        info.asn = asn;
    }
    if let Some(check) = network_diversity(&listed) {
        survey.checks.push(check);
    }

    if let Some(parent) = parent {
        survey.checks.extend(glue_consistency(domain, parent, &listed));
    }

    if let Some(check) = ip_sanity(&listed) {
        survey.checks.push(check);
    }

    survey.listed = Some(listed);
    survey
}

/// Compares the parent and child NS sets.
pub fn compare_parent_child(parent: &BTreeSet<String>, child: &BTreeSet<String>) -> CheckResult {
    let parent: BTreeSet<String> = parent.iter().map(|ns| normalize_name(ns)).collect();
    let child: BTreeSet<String> = child.iter().map(|ns| normalize_name(ns)).collect();
    if parent == child {
        return CheckResult::pass(PARENT_ZONE, "Parent/Child Match", "Parent and child nameservers match");
    }

    let mut details = Vec::new();
    let only_parent: Vec<&str> = parent.difference(&child).map(String::as_str).collect();
    if !only_parent.is_empty() {
        details.push(format!("In parent not child: {}", only_parent.join(", ")));
    }
    let only_child: Vec<&str> = child.difference(&parent).map(String::as_str).collect();
    if !only_child.is_empty() {
        details.push(format!("In child not parent: {}", only_child.join(", ")));
    }
    CheckResult::error(PARENT_ZONE, "Parent/Child Match", "Parent/child NS mismatch!")
        .with_details(details)
}

/// Classifies ASN spread; `None` when no ASN is known.
pub fn network_diversity(nameservers: &[NameserverInfo]) -> Option<CheckResult> {
    let known: Vec<(&str, &str)> = nameservers
        .iter()
        .filter_map(|ns| ns.asn.as_deref().map(|asn| (ns.hostname.as_str(), asn)))
        .collect();
    if known.is_empty() {
        return None;
    }

    let distinct: BTreeSet<&str> = known.iter().map(|(_, asn)| *asn).collect();
    let details: Vec<String> = known
        .iter()
        .map(|(host, asn)| format!("{host}: ASN {asn}"))
        .collect();
    let check = match distinct.iter().next() {
        Some(only) if distinct.len() == 1 => CheckResult::warn(
            NAMESERVERS,
            "Network Diversity",
            format!("All NS on same network (ASN {only})"),
        ),
        _ => CheckResult::pass(
            NAMESERVERS,
            "Network Diversity",
            format!("NS across {} network(s)", distinct.len()),
        ),
    };
    Some(check.with_details(details))
}

/// Compares parent glue with the child's own addresses for in-bailiwick NS.
pub fn glue_consistency(
    domain: &str,
    parent: &ParentView,
    nameservers: &[NameserverInfo],
) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    for ns in nameservers {
        if !is_in_bailiwick(&ns.hostname, domain) {
            continue;
        }
        let Some(parent_ips) = parent.glue.get(&ns.hostname).filter(|ips| !ips.is_empty()) else {
            continue;
        };
        let parent_set: BTreeSet<&IpAddr> = parent_ips.iter().collect();
        let child_set: BTreeSet<&IpAddr> = ns.ips.iter().collect();
        let evidence = [
            format!("parent={}", bracketed(parent_ips)),
            format!("child={}", bracketed(&ns.ips)),
        ];
        let check = if parent_set == child_set {
            CheckResult::pass(
                NAMESERVERS,
                "Glue Consistency",
                format!("{} glue matches child", ns.hostname),
            )
        } else {
            CheckResult::error(
                NAMESERVERS,
                "Glue Consistency",
                format!("{} glue mismatch between parent and child", ns.hostname),
            )
        };
        checks.push(check.with_evidence(evidence));
    }
    checks
}

/// Flags NS addresses that are not globally routable; `None` when no NS
/// address is known.
pub fn ip_sanity(nameservers: &[NameserverInfo]) -> Option<CheckResult> {
    if nameservers.iter().all(|ns| ns.ips.is_empty()) {
        return None;
    }
    let bad: Vec<String> = nameservers
        .iter()
        .flat_map(|ns| {
            ns.ips
                .iter()
                .filter(|ip| is_bogon(**ip))
                .map(move |ip| format!("{} → {ip}", ns.hostname))
        })
        .collect();
    if bad.is_empty() {
        Some(CheckResult::pass(
            NAMESERVERS,
            "NS IP Sanity",
            "All NS IPs are public/routable",
        ))
    } else {
        Some(
            CheckResult::error(
                NAMESERVERS,
                "NS IP Sanity",
                "One or more NS have non-public/bogon IPs.",
            )
            .with_details(bad),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CheckStatus;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn info(host: &str, ips: &[&str], asn: Option<&str>) -> NameserverInfo {
        NameserverInfo {
            hostname: host.to_string(),
            ips: ips.iter().map(|ip| ip.parse().unwrap()).collect(),
            asn: asn.map(str::to_string),
        }
    }

    #[test]
    fn test_parent_child_match_ignores_case_and_dots() {
        let check = compare_parent_child(
            &set(&["NS1.Example.com.", "ns2.example.com"]),
            &set(&["ns1.example.com", "ns2.example.com."]),
        );
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn test_parent_child_mismatch_details() {
        let check = compare_parent_child(
            &set(&["ns1.example.com", "ns3.example.com"]),
            &set(&["ns1.example.com", "ns2.example.com"]),
        );
        assert_eq!(check.status, CheckStatus::Error);
        assert_eq!(
            check.details,
            vec![
                "In parent not child: ns3.example.com",
                "In child not parent: ns2.example.com"
            ]
        );
    }

    #[test]
    fn test_network_diversity_single_asn() {
        let check = network_diversity(&[
            info("ns1.example.com", &["45.33.20.1"], Some("63949")),
            info("ns2.example.com", &["45.33.20.2"], Some("63949")),
        ])
        .unwrap();
        assert_eq!(check.status, CheckStatus::Warn);
        assert_eq!(check.message, "All NS on same network (ASN 63949)");
        assert_eq!(check.details[0], "ns1.example.com: ASN 63949");
    }

    #[test]
    fn test_network_diversity_multiple_asns() {
        let check = network_diversity(&[
            info("ns1.example.com", &["45.33.20.1"], Some("63949")),
            info("ns2.example.net", &["151.101.1.1"], Some("54113")),
            info("ns3.example.org", &["93.184.216.34"], None),
        ])
        .unwrap();
        assert_eq!(check.status, CheckStatus::Pass);
        assert_eq!(check.message, "NS across 2 network(s)");
        assert_eq!(check.details.len(), 2);
    }

    #[test]
    fn test_network_diversity_unknown() {
        assert!(network_diversity(&[info("ns1.example.com", &["45.33.20.1"], None)]).is_none());
    }

    #[test]
    fn test_glue_consistency() {
        let mut parent = ParentView::default();
        parent
            .glue
            .insert("ns1.example.com".into(), vec!["45.33.20.1".parse().unwrap()]);
        parent
            .glue
            .insert("ns2.example.com".into(), vec!["45.33.20.9".parse().unwrap()]);

        let checks = glue_consistency(
            "example.com",
            &parent,
            &[
                info("ns1.example.com", &["45.33.20.1"], None),
                info("ns2.example.com", &["45.33.20.2"], None),
                info("ns.provider.net", &["151.101.1.1"], None),
            ],
        );
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].status, CheckStatus::Pass);
        assert_eq!(checks[1].status, CheckStatus::Error);
        assert_eq!(
            checks[1].evidence,
            vec!["parent=[45.33.20.9]", "child=[45.33.20.2]"]
        );
    }

    #[test]
    fn test_ip_sanity() {
        let good = ip_sanity(&[info("ns1.example.com", &["45.33.20.1"], None)]).unwrap();
        assert_eq!(good.status, CheckStatus::Pass);

        let bad = ip_sanity(&[
            info("ns1.example.com", &["45.33.20.1", "10.0.0.53"], None),
            info("ns2.example.com", &["192.0.2.1"], None),
        ])
        .unwrap();
        assert_eq!(bad.status, CheckStatus::Error);
        assert_eq!(
            bad.details,
            vec!["ns1.example.com → 10.0.0.53", "ns2.example.com → 192.0.2.1"]
        );

        assert!(ip_sanity(&[info("ns1.example.com", &[], None)]).is_none());
    }
}
