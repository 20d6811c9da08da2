//! Origin ASN lookup and bogon classification.
//!
//! ASN data comes from Team Cymru's DNS interface: a TXT query for the
//! reversed address under `origin.asn.cymru.com` returns
//! `"ASN | prefix | CC | registry | date"`. The service is best effort, so
//! every failure collapses to `None`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use hickory_resolver::proto::rr::RecordType;

use crate::config::{ASN_ORIGIN6_ZONE, ASN_ORIGIN_ZONE};
use crate::network::Network;

/// Builds the origin query name for an address.
pub fn asn_query_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{d}.{c}.{b}.{a}.{ASN_ORIGIN_ZONE}")
        }
        IpAddr::V6(v6) => {
            let nibbles: Vec<String> = v6
                .octets()
                .iter()
                .flat_map(|byte| [byte >> 4, byte & 0x0f])
                .rev()
                .map(|nibble| format!("{nibble:x}"))
                .collect();
            format!("{}.{ASN_ORIGIN6_ZONE}", nibbles.join("."))
        }
    }
}

/// Extracts the ASN from a Cymru origin TXT string.
pub fn parse_asn(txt: &str) -> Option<String> {
    let asn = txt.split('|').next()?.trim();
    if asn.is_empty() {
        None
    } else {
        Some(asn.to_string())
    }
}

/// Returns the origin ASN of `ip`, or `None` when it cannot be determined.
pub async fn asn_for_ip<N: Network>(network: &N, ip: IpAddr) -> Option<String> {
    let name = asn_query_name(ip);
    match network.lookup(&name, RecordType::TXT).await {
        Ok(answer) => answer.txt().first().and_then(|txt| parse_asn(txt)),
        Err(e) => {
            log::debug!("ASN lookup for {ip} failed: {e}");
            None
        }
    }
}

/// Returns true if the address is not globally routable.
pub fn is_bogon(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_bogon_ipv4(v4),
        IpAddr::V6(v6) => is_bogon_ipv6(v6),
    }
}

fn is_bogon_ipv4(ip: Ipv4Addr) -> bool {
    let o = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        || ip.is_documentation()
        // This-network 0.0.0.0/8
        || o[0] == 0
        // Shared address space 100.64.0.0/10
        || (o[0] == 100 && (o[1] & 0xc0) == 64)
        // Reserved 240.0.0.0/4
        || o[0] >= 240
}

fn is_bogon_ipv6(ip: Ipv6Addr) -> bool {
    let s = ip.segments();
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_bogon_ipv4(v4);
    }
    ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // fc00::/7 unique-local
        || (s[0] & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (s[0] & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (s[0] == 0x2001 && s[1] == 0x0db8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asn_query_name_ipv4() {
        let ip: IpAddr = "93.184.216.34".parse().unwrap();
        assert_eq!(asn_query_name(ip), "34.216.184.93.origin.asn.cymru.com");
    }

    #[test]
    fn test_asn_query_name_ipv6() {
        let ip: IpAddr = "2606:4700::1".parse().unwrap();
        let name = asn_query_name(ip);
        assert!(name.starts_with("1.0.0.0.0.0.0.0."));
        assert!(name.ends_with(".0.0.7.4.6.0.6.2.origin6.asn.cymru.com"));
        assert_eq!(name.split('.').count(), 32 + 4);
    }

    #[test]
    fn test_parse_asn() {
        assert_eq!(
            parse_asn("15133 | 93.184.216.0/24 | EU | ripencc | 2008-06-02"),
            Some("15133".to_string())
        );
        assert_eq!(parse_asn(" | 10.0.0.0/8"), None);
        assert_eq!(parse_asn(""), None);
    }

    #[test]
    fn test_public_addresses_are_not_bogons() {
        for ip in ["8.8.8.8", "1.1.1.1", "93.184.216.34", "2606:4700::1111"] {
            assert!(!is_bogon(ip.parse().unwrap()), "{ip}");
        }
    }

    #[test]
    fn test_bogon_ranges() {
        for ip in [
            "10.0.0.1",
            "172.16.5.4",
            "192.168.1.1",
            "127.0.0.1",
            "169.254.1.1",
            "0.1.2.3",
            "100.64.0.1",
            "100.127.255.254",
            "192.0.2.53",
            "198.51.100.7",
            "203.0.113.4",
            "224.0.0.1",
            "240.0.0.1",
            "255.255.255.255",
            "::1",
            "::",
            "fc00::1",
            "fd12:3456::1",
            "fe80::1",
            "ff02::1",
            "2001:db8::53",
            "::ffff:192.168.0.1",
        ] {
            assert!(is_bogon(ip.parse().unwrap()), "{ip}");
        }
    }

    #[test]
    fn test_shared_space_boundary() {
        assert!(!is_bogon("100.63.255.255".parse().unwrap()));
        assert!(!is_bogon("100.128.0.1".parse().unwrap()));
    }
}
