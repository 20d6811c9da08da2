//! DNS blocklist lookups for the domain's first IPv4 address.

use std::net::Ipv4Addr;

use futures::future::join_all;
use hickory_resolver::proto::rr::RecordType;

use crate::config::DNSBL_ZONES;
use crate::network::Network;
use crate::report::CheckResult;

/// `d.c.b.a.{zone}` for the address `a.b.c.d`.
pub fn dnsbl_query_name(ip: Ipv4Addr, zone: &str) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{d}.{c}.{b}.{a}.{zone}")
}

/// Summarizes the zones that list `ip`.
pub fn blacklist_check(ip: Ipv4Addr, listed_on: &[&str]) -> CheckResult {
    if listed_on.is_empty() {
        CheckResult::pass(
            "Security",
            "Blacklist",
            format!("{ip} not listed on checked blacklists"),
        )
    } else {
        CheckResult::error(
            "Security",
            "Blacklist",
            format!("{ip} listed on {} blacklist(s)", listed_on.len()),
        )
        .with_details(listed_on.iter().copied())
    }
}

/// Queries every blocklist zone; any A answer counts as a listing.
pub async fn check_blacklists<N: Network>(network: &N, ip: Ipv4Addr) -> CheckResult {
    let names: Vec<String> = DNSBL_ZONES
        .iter()
        .map(|zone| dnsbl_query_name(ip, zone))
        .collect();
    let answers = join_all(names.iter().map(|name| network.lookup(name, RecordType::A))).await;

    let listed_on: Vec<&str> = DNSBL_ZONES
        .iter()
        .zip(answers)
        .filter_map(|(zone, answer)| match answer {
            Ok(answer) if !answer.is_empty() => Some(*zone),
            Ok(_) => None,
            Err(e) => {
                log::debug!("{zone} lookup for {ip}: {e}");
                None
            }
        })
        .collect();
    blacklist_check(ip, &listed_on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CheckStatus;

    #[test]
    fn test_dnsbl_query_name() {
        assert_eq!(
            dnsbl_query_name(Ipv4Addr::new(93, 184, 216, 34), "zen.spamhaus.org"),
            "34.216.184.93.zen.spamhaus.org"
        );
    }

    #[test]
    fn test_blacklist_check() {
        let ip = Ipv4Addr::new(93, 184, 216, 34);
        let clean = blacklist_check(ip, &[]);
        assert_eq!(clean.status, CheckStatus::Pass);
        assert_eq!(clean.message, "93.184.216.34 not listed on checked blacklists");

        let listed = blacklist_check(ip, &["zen.spamhaus.org", "bl.spamcop.net"]);
        assert_eq!(listed.status, CheckStatus::Error);
        assert_eq!(listed.message, "93.184.216.34 listed on 2 blacklist(s)");
        assert_eq!(listed.details, vec!["zen.spamhaus.org", "bl.spamcop.net"]);
    }
}
