//! Record sanity: common host CNAMEs, apex CNAME, dangling CNAMEs, CAA and
//! the www convention.

use hickory_resolver::proto::rr::RecordType;

use crate::config::COMMON_HOSTS;
use crate::dns::RecordData;
use crate::error_handling::LookupError;
use crate::network::Network;
use crate::report::CheckResult;

/// CAA presence.
pub async fn check_caa<N: Network>(network: &N, domain: &str) -> CheckResult {
    match network.lookup(domain, RecordType::CAA).await {
        Ok(answer) => {
            let values: Vec<String> = answer
                .records
                .iter()
                .filter_map(|record| match record {
                    RecordData::Caa(text) => Some(text.clone()),
                    _ => None,
                })
                .collect();
            CheckResult::pass("Policy", "CAA", format!("CAA present ({})", values.len()))
                .with_details(values)
        }
        Err(e) => {
            log::debug!("CAA lookup for {domain}: {e}");
            CheckResult::warn("Policy", "CAA", "No CAA records")
        }
    }
}

/// What each common host name points at: a CNAME target, or A records.
pub async fn check_common_hosts<N: Network>(network: &N, domain: &str) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    for sub in COMMON_HOSTS {
        let full = format!("{sub}.{domain}");
        match network.lookup(&full, RecordType::CNAME).await {
            Ok(answer) => {
                if let Some(target) = answer.targets().first() {
                    checks.push(CheckResult::pass(
                        "CNAME",
                        sub,
                        format!("CNAME → {target} (TTL: {})", answer.ttl_label()),
                    ));
                }
            }
            Err(LookupError::NoAnswer) => {
                if let Ok(answer) = network.lookup(&full, RecordType::A).await {
                    checks.push(
                        CheckResult::pass(
                            "CNAME",
                            sub,
                            format!("A record (TTL: {})", answer.ttl_label()),
                        )
                        .with_details(answer.ips().iter().map(ToString::to_string)),
                    );
                }
            }
            Err(e) => log::debug!("CNAME lookup for {full}: {e}"),
        }
    }
    checks
}

/// A CNAME at the zone apex.
pub async fn check_apex_cname<N: Network>(network: &N, domain: &str) -> CheckResult {
    match network.lookup(domain, RecordType::CNAME).await {
        Ok(answer) if !answer.is_empty() => {
            CheckResult::error("Records", "Apex CNAME", "Apex has a CNAME (illegal)")
                .with_details(answer.targets())
        }
        _ => CheckResult::pass("Records", "Apex CNAME", "No apex CNAME"),
    }
}

/// Returns the CNAME target of `name` when it resolves to neither A nor AAAA.
async fn dangling_target<N: Network>(network: &N, name: &str) -> Option<String> {
    let answer = network.lookup(name, RecordType::CNAME).await.ok()?;
    let target = answer.targets().into_iter().next()?;
    for record_type in [RecordType::A, RecordType::AAAA] {
        if network.lookup(&target, record_type).await.is_ok() {
            return None;
        }
    }
    Some(target)
}

/// CNAMEs among the common hosts whose targets do not resolve.
pub async fn check_dangling_cnames<N: Network>(network: &N, domain: &str) -> Vec<CheckResult> {
    let mut checks = Vec::new();
    for sub in COMMON_HOSTS {
        let full = format!("{sub}.{domain}");
        if let Some(target) = dangling_target(network, &full).await {
            checks.push(
                CheckResult::error(
                    "Records",
                    format!("Dangling CNAME {sub}"),
                    format!("{full} CNAME target does not resolve"),
                )
                .with_evidence([format!("target={target}")]),
            );
        }
    }
    checks
}

/// Whether `www.{domain}` resolves.
pub async fn check_www<N: Network>(network: &N, domain: &str) -> Option<CheckResult> {
    match network.lookup(&format!("www.{domain}"), RecordType::A).await {
        Ok(answer) => Some(
            CheckResult::pass(
                "Web",
                "WWW Record",
                format!("www resolves (TTL: {})", answer.ttl_label()),
            )
            .with_details(answer.ips().iter().map(ToString::to_string)),
        ),
        Err(LookupError::NxDomain) => Some(CheckResult::warn(
            "Web",
            "WWW Record",
            format!("www.{domain} does not exist"),
        )),
        Err(e) => {
            log::debug!("www lookup for {domain}: {e}");
            None
        }
    }
}
