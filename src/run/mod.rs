//! The diagnostic pipeline.
//!
//! One call runs every check against one domain, in a fixed order, and
//! returns the accumulated report. Nothing is shared between calls.

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Instant;

use futures::future::join_all;

use crate::checks::blacklist::check_blacklists;
use crate::checks::delegation::inspect_delegation;
use crate::checks::mail::{check_dmarc, check_mx, check_spf};
use crate::checks::nameservers::{resolve_nameserver, survey_nameservers, NameserverInfo};
use crate::checks::prober::{probe_nameserver, zone_transfer_checks};
use crate::checks::records::{
    check_apex_cname, check_caa, check_common_hosts, check_dangling_cnames, check_www,
};
use crate::checks::zone::{check_a_records, check_aaaa_records, check_soa};
use crate::config::{Config, FailOn};
use crate::domain::normalize_name;
use crate::network::{LiveNetwork, Network};
use crate::report::{CheckResult, Report, Summary};

/// Runs every check against `domain` over the live network.
///
/// Uses `Config::default()`. The caller bounds the run with its own overall
/// timeout; see `OVERALL_TIMEOUT`.
///
/// # Example
///
/// ```no_run
/// use dns_health::{format_report, run_diagnostics};
///
/// # #[tokio::main]
/// # async fn main() {
/// let report = run_diagnostics("example.com").await;
/// println!("{}", format_report(&report));
/// # }
/// ```
pub async fn run_diagnostics(domain: &str) -> Report {
    let config = Config::default();
    let network = LiveNetwork::new(&config);
    run_diagnostics_with(&network, domain, &config).await
}

/// Runs every check against `domain` over the given network backend.
///
/// The order is fixed:
/// 1. Parent view and nameserver set checks
/// 2. Per-nameserver probes (concurrent, appended per nameserver)
/// 3. SOA, apex A/AAAA, CAA and common host records
/// 4. MX, PTR, STARTTLS, SPF, DMARC, www and blocklists
/// 5. Zone transfer, apex CNAME and dangling CNAMEs
///
/// Individual check failures become results; the only early return is an
/// unusable resolver, reported as `Resolver::Resolver Availability`.
pub async fn run_diagnostics_with<N: Network>(network: &N, domain: &str, config: &Config) -> Report {
    let domain = normalize_name(domain);
    let mut report = Report::new(&domain);
    let started = Instant::now();
    log::info!("Starting DNS health check for {domain}");

    let parent = match inspect_delegation(network, &domain, config).await {
        Ok(parent) => parent,
        Err(e) => {
            log::warn!("Resolver unavailable: {e}");
            report.append(CheckResult::error(
                "Resolver",
                "Resolver Availability",
                e.to_string(),
            ));
            return report;
        }
    };

    let survey = survey_nameservers(network, &domain, parent.as_ref()).await;
    report.extend(survey.checks);
    let nameservers = survey.listed.unwrap_or_default();

    let listed: BTreeSet<String> = nameservers.iter().map(|ns| ns.hostname.clone()).collect();
    let parent_only: Vec<&String> = parent
        .as_ref()
        .map(|p| p.nameservers.iter().filter(|ns| !listed.contains(*ns)).collect())
        .unwrap_or_default();
    let mut probed: Vec<NameserverInfo> = nameservers.clone();
    probed.extend(join_all(parent_only.iter().map(|host| resolve_nameserver(network, host))).await);

    let blocks = join_all(
        probed
            .iter()
            .map(|ns| probe_nameserver(network, &domain, ns, &listed, config)),
    )
    .await;
    for block in blocks {
        report.extend(block);
    }

    report.extend(check_soa(network, &domain, &nameservers).await);
    let (a_checks, apex_a) = check_a_records(network, &domain, &nameservers).await;
    report.extend(a_checks);
    report.extend(check_aaaa_records(network, &domain).await);
    report.append(check_caa(network, &domain).await);
    report.extend(check_common_hosts(network, &domain).await);

    report.extend(check_mx(network, &domain, config).await);
    report.append(check_spf(network, &domain).await);
    report.append(check_dmarc(network, &domain).await);
    report.extend(check_www(network, &domain).await);

    if config.check_blacklists {
        let first_v4 = apex_a.as_ref().and_then(|answer| {
            answer.ips().into_iter().find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
        });
        if let Some(ip) = first_v4 {
            report.append(check_blacklists(network, ip).await);
        }
    } else {
        log::debug!("Blocklist lookups disabled");
    }

    report.extend(zone_transfer_checks(network, &domain, &nameservers).await);
    report.append(check_apex_cname(network, &domain).await);
    report.extend(check_dangling_cnames(network, &domain).await);

    let summary = report.summary();
    log::info!(
        "Finished {domain} in {:.1}s: {} passed, {} warnings, {} errors",
        started.elapsed().as_secs_f64(),
        summary.passed,
        summary.warnings,
        summary.errors
    );
    report
}

/// Maps a finished report's summary to the CLI exit code for `fail_on`.
///
/// Returns 0 when the policy is satisfied and 2 when it trips.
pub fn evaluate_exit_code(fail_on: FailOn, summary: &Summary) -> i32 {
    let tripped = match fail_on {
        FailOn::Never => false,
        FailOn::Errors => summary.errors > 0,
        FailOn::Warnings => summary.errors > 0 || summary.warnings > 0,
    };
    if tripped {
        2
    } else {
        0
    }
}
