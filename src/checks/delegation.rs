//! Parent-zone view of a delegation.
//!
//! Resolvers never see the child zone's own NS set first; they follow the
//! referral handed out by the parent. This module asks a TLD server
//! directly (RD clear, no cache in between) for the domain's NS and for the
//! addresses of in-bailiwick nameservers, which approximates the glue the
//! registry publishes.

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use hickory_resolver::proto::rr::RecordType;

use crate::config::{Config, MAX_DELEGATION_DEPTH};
use crate::dns::{ProbeRecord, ProbeResponse, QueryOptions, RecordData};
use crate::domain::{is_in_bailiwick, is_subdomain_of, normalize_name, tld_of};
use crate::error_handling::{DelegationError, LookupError};
use crate::network::Network;

/// Delegation as seen from the parent zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentView {
    /// NS hostnames in the referral
    pub nameservers: BTreeSet<String>,
    /// In-bailiwick NS hostname to the addresses the parent hands out
    pub glue: BTreeMap<String, Vec<IpAddr>>,
}

/// Resolves the first address of `host`, IPv4 first.
async fn first_address<N: Network>(network: &N, host: &str) -> Option<IpAddr> {
    for record_type in [RecordType::A, RecordType::AAAA] {
        if let Ok(answer) = network.lookup(host, record_type).await {
            if let Some(ip) = answer.ips().into_iter().next() {
                return Some(ip);
            }
        }
    }
    None
}

/// NS records grouped by owner, from the answer and authority sections.
fn ns_by_owner(response: &ProbeResponse) -> BTreeMap<String, BTreeSet<String>> {
    let mut owners: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in response.answers.iter().chain(&response.authority) {
        if let RecordData::Ns(target) = &record.data {
            owners
                .entry(record.name.clone())
                .or_default()
                .insert(target.clone());
        }
    }
    owners
}

/// Addresses owned by `host` in the answer and additional sections.
fn addresses_for<'a>(
    records: impl IntoIterator<Item = &'a ProbeRecord>,
    host: &str,
) -> Vec<IpAddr> {
    records
        .into_iter()
        .filter(|r| r.name == host)
        .filter_map(|r| r.data.ip())
        .collect()
}

fn push_unique(ips: &mut Vec<IpAddr>, more: impl IntoIterator<Item = IpAddr>) {
    for ip in more {
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }
}

/// Asks the servers in order until one answers.
async fn ask_ns<N: Network>(
    network: &N,
    servers: &[IpAddr],
    domain: &str,
    options: QueryOptions,
) -> Option<(IpAddr, ProbeResponse)> {
    for server in servers {
        match network.probe(*server, domain, RecordType::NS, options).await {
            Ok(response) => return Some((*server, response)),
            Err(e) => log::debug!("NS query for {domain} at {server} failed: {e}"),
        }
    }
    None
}

/// Builds the parent view of `domain`.
///
/// Returns `Ok(None)` whenever any step fails in a way that only affects the
/// parent view (single-label domain, unreachable TLD server, no referral).
///
/// # Errors
///
/// Returns `DelegationError::ResolverUnavailable` when the resolver cannot
/// produce the TLD's own NS set.
pub async fn inspect_delegation<N: Network>(
    network: &N,
    domain: &str,
    config: &Config,
) -> Result<Option<ParentView>, DelegationError> {
    let domain = normalize_name(domain);
    let Some(tld) = tld_of(&domain) else {
        log::debug!("{domain} is a single label, skipping the parent view");
        return Ok(None);
    };

    let tld_servers = match network.lookup(tld, RecordType::NS).await {
        Ok(answer) => {
            let mut targets = answer.targets();
            targets.sort();
            targets
        }
        Err(LookupError::Failed(reason)) => {
            return Err(DelegationError::ResolverUnavailable {
                tld: tld.to_string(),
                reason,
            })
        }
        Err(e) => {
            log::warn!("No NS set for TLD .{tld}: {e}");
            return Ok(None);
        }
    };

    let mut vantage = None;
    for host in &tld_servers {
        if let Some(ip) = first_address(network, host).await {
            vantage = Some(ip);
            break;
        }
    }
    let Some(vantage) = vantage else {
        log::warn!("None of the .{tld} nameservers resolved");
        return Ok(None);
    };

    let options = QueryOptions::udp(config.dns_timeout());
    let mut servers = vec![vantage];
    for step in 0..MAX_DELEGATION_DEPTH {
        let Some((server, referral)) = ask_ns(network, &servers, &domain, options).await else {
            return Ok(None);
        };
        let owners = ns_by_owner(&referral);

        if let Some(nameservers) = owners.get(&domain) {
            let mut view = ParentView {
                nameservers: nameservers.clone(),
                glue: BTreeMap::new(),
            };
            for host in nameservers.iter().filter(|ns| is_in_bailiwick(ns, &domain)) {
                let mut ips = addresses_for(referral.answers.iter().chain(&referral.additional), host);
                for record_type in [RecordType::A, RecordType::AAAA] {
                    match network.probe(server, host, record_type, options).await {
                        Ok(response) => push_unique(
                            &mut ips,
                            addresses_for(response.answers.iter().chain(&response.additional), host),
                        ),
                        Err(e) => log::debug!("Glue query for {host} at {server} failed: {e}"),
                    }
                }
                if !ips.is_empty() {
                    view.glue.insert(host.clone(), ips);
                }
            }
            return Ok(Some(view));
        }

        // A referral to a zone between the TLD and the domain (co.uk under uk)
        let Some((zone, next_hosts)) = owners
            .iter()
            .find(|(owner, _)| is_subdomain_of(&domain, owner) && **owner != domain)
        else {
            log::debug!("No referral for {domain} from {server}");
            return Ok(None);
        };
        log::debug!("Step {step}: following referral to {zone}");

        let mut next = Vec::new();
        for host in next_hosts {
            push_unique(&mut next, addresses_for(&referral.additional, host));
        }
        if next.is_empty() {
            for host in next_hosts {
                if let Some(ip) = first_address(network, host).await {
                    next.push(ip);
                }
            }
        }
        if next.is_empty() {
            return Ok(None);
        }
        servers = next;
    }

    log::debug!("Delegation walk for {domain} exceeded {MAX_DELEGATION_DEPTH} steps");
    Ok(None)
}
