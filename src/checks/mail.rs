//! Mail checks: MX hosts, reverse DNS, STARTTLS, SPF and DMARC.

use std::net::IpAddr;

use futures::future::join_all;
use hickory_resolver::proto::rr::RecordType;

use crate::checks::resolve_host;
use crate::config::{Config, BANNER_EVIDENCE_LEN, MAX_STARTTLS_PROBES, SPF_MAX_LOOKUPS};
use crate::dns::{
    extract_dmarc_record, extract_spf_records, parse_dmarc_tags, spf_lookup_count, spf_policy,
    SpfPolicy,
};
use crate::error_handling::{LookupError, ProbeError};
use crate::network::Network;
use crate::report::CheckResult;
use crate::tls::SmtpProbe;

const MAIL: &str = "Mail";

fn truncate_banner(banner: &str) -> String {
    banner.trim().chars().take(BANNER_EVIDENCE_LEN).collect()
}

/// Classifies the MX set; `mx` must already be sorted by preference.
pub fn mx_records_check(mx: &[(u16, String)], ttl_label: &str) -> CheckResult {
    let details = mx
        .iter()
        .map(|(preference, host)| format!("Priority {preference}: {host}"));
    match mx.len() {
        0 => CheckResult::warn(MAIL, "MX Records", "No MX - email broken"),
        1 => CheckResult::warn(MAIL, "MX Records", format!("Only 1 MX (TTL: {ttl_label})"))
            .with_details(details),
        n => CheckResult::pass(MAIL, "MX Records", format!("{n} MX records (TTL: {ttl_label})"))
            .with_details(details),
    }
}

/// Turns a STARTTLS probe outcome into a check.
pub fn starttls_check(host: &str, outcome: Result<SmtpProbe, ProbeError>) -> CheckResult {
    let name = format!("STARTTLS {host}");
    match outcome {
        Ok(SmtpProbe::Established {
            banner,
            common_name,
            tls_version,
        }) => CheckResult::pass(MAIL, name, "STARTTLS OK").with_evidence([
            format!("CN={}", common_name.unwrap_or_default()),
            format!("TLS={tls_version}"),
            format!("Banner={}", truncate_banner(&banner)),
        ]),
        Ok(SmtpProbe::NotAdvertised { banner }) => {
            CheckResult::warn(MAIL, name, "No STARTTLS advertised")
                .with_evidence([format!("Banner={}", truncate_banner(&banner))])
        }
        Ok(SmtpProbe::Rejected { reply, .. }) => {
            CheckResult::error(MAIL, name, "STARTTLS advertised but failed to start")
                .with_evidence([reply])
        }
        Ok(SmtpProbe::HandshakeFailed { reason, .. }) => {
            CheckResult::error(MAIL, name, format!("TLS handshake failed: {reason}"))
        }
        Err(e) => CheckResult::warn(MAIL, name, format!("Port 25 probe failed: {e}")),
    }
}

/// MX set, MX host resolution, PTR of each MX and STARTTLS probes.
pub async fn check_mx<N: Network>(network: &N, domain: &str, config: &Config) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    let answer = match network.lookup(domain, RecordType::MX).await {
        Ok(answer) => answer,
        Err(e) if e.is_no_data() => {
            checks.push(CheckResult::warn(MAIL, "MX Records", "No MX records"));
            return checks;
        }
        Err(e) => {
            checks.push(CheckResult::error(MAIL, "MX Lookup", format!("Failed: {e}")));
            return checks;
        }
    };
    let mx = answer.mx();
    checks.push(mx_records_check(&mx, &answer.ttl_label()));

    let resolved: Vec<Vec<IpAddr>> =
        join_all(mx.iter().map(|(_, host)| resolve_host(network, host))).await;
    let mut hosts: Vec<(&str, IpAddr)> = Vec::new();
    for ((_, host), ips) in mx.iter().zip(&resolved) {
        let name = format!("MX {host}");
        match ips.first() {
            Some(first) => {
                let joined: Vec<String> = ips.iter().map(ToString::to_string).collect();
                checks.push(CheckResult::pass(
                    MAIL,
                    name,
                    format!("{host} → {}", joined.join(", ")),
                ));
                hosts.push((host.as_str(), *first));
            }
            None => checks.push(CheckResult::error(MAIL, name, format!("{host} no resolve"))),
        }
    }

    for (_, ip) in &hosts {
        match network.reverse_lookup(*ip).await {
            Ok(names) => checks.push(CheckResult::pass(
                MAIL,
                format!("PTR {ip}"),
                format!("PTR: {}", names.join(", ")),
            )),
            Err(e) if e.is_no_data() => checks.push(CheckResult::warn(
                MAIL,
                format!("PTR {ip}"),
                format!("No PTR for {ip}"),
            )),
            Err(e) => log::debug!("PTR lookup for {ip}: {e}"),
        }
    }

    if config.check_smtp {
        let probed: Vec<(&str, IpAddr)> = hosts.into_iter().take(MAX_STARTTLS_PROBES).collect();
        let outcomes = join_all(
            probed
                .iter()
                .map(|(host, ip)| network.smtp_starttls(host, *ip)),
        )
        .await;
        for ((host, _), outcome) in probed.iter().zip(outcomes) {
            checks.push(starttls_check(host, outcome));
        }
    } else {
        log::debug!("SMTP probing disabled, skipping STARTTLS");
    }

    checks
}

/// Scores the SPF records found among the apex TXT records.
pub fn spf_check(txt_records: &[String]) -> CheckResult {
    let spf_records = extract_spf_records(txt_records);
    let spf = match spf_records.as_slice() {
        [] => return CheckResult::warn(MAIL, "SPF Health", "No SPF - recommend adding"),
        [spf] => spf,
        _ => {
            return CheckResult::error(MAIL, "SPF Health", "Multiple SPF records found")
                .with_details(spf_records)
        }
    };

    let lookups = spf_lookup_count(spf);
    let policy = spf_policy(spf);
    let evidence = [
        format!("lookups≈{lookups}"),
        format!("policy={policy}"),
        spf.clone(),
    ];
    let check = if lookups > SPF_MAX_LOOKUPS {
        CheckResult::error(
            MAIL,
            "SPF Health",
            format!("SPF exceeds {SPF_MAX_LOOKUPS} DNS lookups"),
        )
    } else if policy == SpfPolicy::PassAll {
        CheckResult::error(MAIL, "SPF Health", "SPF uses +all (overly permissive)")
    } else if policy == SpfPolicy::Missing {
        CheckResult::warn(MAIL, "SPF Health", "SPF missing terminal ~all or -all")
    } else {
        CheckResult::pass(MAIL, "SPF Health", "SPF OK")
    };
    check.with_evidence(evidence)
}

/// SPF record health.
pub async fn check_spf<N: Network>(network: &N, domain: &str) -> CheckResult {
    match network.lookup(domain, RecordType::TXT).await {
        Ok(answer) => spf_check(&answer.txt()),
        Err(e) if e.is_no_data() => spf_check(&[]),
        Err(e) => CheckResult::warn(MAIL, "SPF Health", format!("SPF check error: {e}")),
    }
}

/// Classifies the DMARC record found among `_dmarc` TXT records.
pub fn dmarc_check(txt_records: &[String]) -> CheckResult {
    let Some(record) = extract_dmarc_record(txt_records) else {
        return CheckResult::warn(MAIL, "DMARC Policy", "No DMARC - strongly recommended");
    };
    let tags = parse_dmarc_tags(&record);
    let tag = |name: &str, default: &str| {
        tags.get(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };
    let policy = tag("p", "none");
    let evidence = vec![
        record.clone(),
        format!("p={policy}"),
        format!("adkim={}", tag("adkim", "r")),
        format!("aspf={}", tag("aspf", "r")),
        format!("rua={}", tag("rua", "")),
    ];
    let check = match policy.as_str() {
        "reject" => CheckResult::pass(MAIL, "DMARC Policy", "Policy: reject (strong)"),
        "quarantine" => CheckResult::pass(MAIL, "DMARC Policy", "Policy: quarantine (good)"),
        _ => CheckResult::warn(MAIL, "DMARC Policy", "Policy: none (monitor only)"),
    };
    check.with_evidence(evidence)
}

/// DMARC record health.
pub async fn check_dmarc<N: Network>(network: &N, domain: &str) -> CheckResult {
    match network
        .lookup(&format!("_dmarc.{domain}"), RecordType::TXT)
        .await
    {
        Ok(answer) => dmarc_check(&answer.txt()),
        Err(LookupError::Failed(reason)) => CheckResult::warn(
            MAIL,
            "DMARC Policy",
            format!("DMARC check error: {reason}"),
        ),
        Err(_) => dmarc_check(&[]),
    }
}
