//! The diagnostic checks.
//!
//! Each submodule owns one family of checks and only talks to the outside
//! world through `network::Network`. The pure classification helpers are
//! public so they can be tested without a network.

pub mod asn;
pub mod blacklist;
pub mod delegation;
pub mod mail;
pub mod nameservers;
pub mod prober;
pub mod records;
pub mod recursion;
pub mod zone;

use std::net::IpAddr;

use hickory_resolver::proto::rr::RecordType;

use crate::network::Network;

/// Resolves `host` to its addresses, A records first then AAAA.
///
/// Lookup failures are logged and leave the list shorter; an empty list
/// means the host does not resolve at all.
pub async fn resolve_host<N: Network>(network: &N, host: &str) -> Vec<IpAddr> {
    let mut ips = Vec::new();
    for record_type in [RecordType::A, RecordType::AAAA] {
        match network.lookup(host, record_type).await {
            Ok(answer) => ips.extend(answer.ips()),
            Err(e) => log::debug!("{record_type} lookup for {host}: {e}"),
        }
    }
    ips
}
