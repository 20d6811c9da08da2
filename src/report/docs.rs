//! Check documentation registry.
//!
//! Every check name maps to a short explanation of what was tested, why it
//! matters, how to fix it and where it is standardized. Names that embed a
//! live hostname or address (`NS ns1.example.com`, `PTR 203.0.113.4`) are
//! matched through an ordered list of prefix/suffix rules after the exact
//! lookup fails.

use serde::Serialize;

/// Documentation attached to a check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocEntry {
    pub explain: &'static str,
    pub why: &'static str,
    pub fix: &'static str,
    pub refs: &'static [&'static str],
}

const fn doc(
    explain: &'static str,
    why: &'static str,
    fix: &'static str,
    refs: &'static [&'static str],
) -> DocEntry {
    DocEntry {
        explain,
        why,
        fix,
        refs,
    }
}

/// Exact-match entries, keyed by `"{category}::{name}"`.
static CHECK_DOCS: &[(&str, DocEntry)] = &[
    (
        "Resolver::Resolver Availability",
        doc(
            "Resolve the nameservers of the domain's top-level domain through the configured resolver.",
            "Every other check starts from the resolver; if it cannot answer, no result about the domain is meaningful.",
            "Check network connectivity and the resolver configuration (/etc/resolv.conf) of the host running the diagnostics.",
            &["RFC 1034 §5.3.1"],
        ),
    ),
    (
        "Parent Zone::Parent NS Records",
        doc(
            "Query the parent zone (registry) to list the nameservers delegated for this domain.",
            "Resolvers start at the parent; if delegation is wrong, the domain may fail to resolve or be unreliable.",
            "Update nameserver delegation at your registrar to the correct authoritative NS set.",
            &["RFC 1034 §4.2", "RFC 1035 §3.3.11"],
        ),
    ),
    (
        "Parent Zone::Parent/Child Match",
        doc(
            "Compare the NS set at the parent (delegation) with the NS set inside the child zone.",
            "Mismatch causes intermittent failures: resolvers may query servers the child zone doesn’t list (or vice versa).",
            "Make the NS set identical in both parent delegation and the child zone.",
            &["RFC 1034 §4.2", "RFC 1912 §2.3"],
        ),
    ),
    (
        "Nameservers::NS Count",
        doc(
            "Count how many authoritative nameservers the zone publishes.",
            "Too few nameservers is a single point of failure; best practice is two or more on diverse networks.",
            "Configure at least two authoritative nameservers on separate networks and update delegation.",
            &["RFC 2182 (Selection and Operation of Secondary DNS Servers)"],
        ),
    ),
    (
        "Nameservers::NS Host",
        doc(
            "Resolve each listed nameserver hostname to its IP address(es).",
            "If a nameserver hostname doesn’t resolve, the parent points to a dead end and resolution fails.",
            "Ensure each NS hostname has working A/AAAA records reachable from the Internet.",
            &["RFC 1035 §3.3.11"],
        ),
    ),
    (
        "Nameservers::Glue Records",
        doc(
            "Identify in-bailiwick nameservers that require glue at the parent.",
            "Without glue, resolvers can get stuck trying to find the NS IPs, causing resolution loops.",
            "Add/update glue A/AAAA at the registrar for in-bailiwick nameservers.",
            &["RFC 1034 §4.2.1"],
        ),
    ),
    (
        "Nameservers::Glue Consistency",
        doc(
            "Compare parent glue A/AAAA with child zone A/AAAA for in-bailiwick NS.",
            "Stale glue sends resolvers to the wrong server; outages and poisoning risks follow.",
            "Update glue at registrar whenever NS IPs change; keep child NS records in sync.",
            &["RFC 1034 §4.2.1"],
        ),
    ),
    (
        "Nameservers::Network Diversity",
        doc(
            "Check whether nameservers sit on diverse networks (ASN) rather than a single provider.",
            "Provider or network outages can take all nameservers down if they share the same upstream.",
            "Host secondaries with different providers/ASNs; consider geographic diversity.",
            &["RFC 2182"],
        ),
    ),
    (
        "Nameservers::NS IP Sanity",
        doc(
            "Ensure NS IPs are public, routable addresses (not private, loopback, link-local, or bogons).",
            "Public resolvers can’t reach private/bogon IPs; delegation becomes unusable.",
            "Assign globally routable IPs to authoritative NS and update glue/records accordingly.",
            &["RFC 6890"],
        ),
    ),
    (
        "Performance::NS Response",
        doc(
            "Measure per-nameserver SOA query latency.",
            "Slow or timing-out nameservers degrade user experience and may trigger resolver failovers.",
            "Tune DNS software, remove overloaded servers, distribute globally, or add capacity.",
            &["Operational best practices"],
        ),
    ),
    (
        "Security::Recursion",
        doc(
            "Check whether an authoritative nameserver performs open recursion for arbitrary clients.",
            "Open resolvers are abused in DDoS amplification and can leak internal data.",
            "Disable recursion on authoritative servers or restrict it to trusted IPs only.",
            &["BCP 140 (DNS OpSec)", "US-CERT TA13-088A"],
        ),
    ),
    (
        "Security::TCP 53",
        doc(
            "Attempt DNS queries over TCP/53 to each authoritative nameserver.",
            "DNSSEC and large responses require TCP; blocking it breaks standards-compliant resolution.",
            "Permit TCP/53 at firewalls and ensure the DNS daemon listens on TCP as well as UDP.",
            &["RFC 7766 (DNS over TCP)"],
        ),
    ),
    (
        "Security::EDNS",
        doc(
            "Send EDNS0 queries with a safe UDP payload size and inspect server behavior.",
            "Without EDNS, responses may truncate/fail (especially with DNSSEC), causing flakiness.",
            "Upgrade or reconfigure DNS servers/load-balancers to properly support EDNS.",
            &["RFC 6891 (EDNS0)"],
        ),
    ),
    (
        "Security::Stealth/Lame NS",
        doc(
            "Detect NS that are listed but not authoritative (lame) and servers that answer AA but aren’t listed (stealth).",
            "Lame NS degrade reliability; stealth NS indicate misconfiguration and surprise failure modes.",
            "Remove lame servers from parent/child; add intended authoritative servers to both NS sets.",
            &["RFC 1912 §2.8"],
        ),
    ),
    (
        "Security::Authority Pass",
        doc(
            "Confirm the server replies authoritatively (AA=1) for the zone.",
            "Non-authoritative answers from listed NS suggest lame delegation or proxying.",
            "Serve the zone on these NS with AA responses or remove them from the NS set.",
            &["RFC 1035 §4.1.1"],
        ),
    ),
    (
        "Security::Zone XFR",
        doc(
            "Attempt an AXFR (full zone transfer) from each nameserver.",
            "Unrestricted zone transfers leak your entire zone to anyone on the Internet.",
            "Restrict AXFR to specific secondary IPs or disable it.",
            &["RFC 5936 (AXFR)"],
        ),
    ),
    (
        "Security::Blacklist",
        doc(
            "Check selected DNSBLs for the site’s A record IP (informational).",
            "Listed web IPs can reflect compromised hosts or poor neighbor reputation.",
            "Investigate why the IP is listed; remediate and request delisting if appropriate.",
            &["Provider DNSBL documentation"],
        ),
    ),
    (
        "SOA::SOA Record",
        doc(
            "Fetch the zone’s SOA record and display primary MNAME, RNAME, serial and timers.",
            "SOA defines replication behavior; wrong values cause slow or broken zone propagation.",
            "Use sane refresh/retry/expire/minimum per operations policy; increment serial on changes.",
            &["RFC 1035 §3.3.13", "RFC 2308"],
        ),
    ),
    (
        "SOA::SOA Lookup",
        doc(
            "Attempt to fetch the SOA record from default resolvers.",
            "If the SOA can’t be fetched, the zone may be unreachable or misconfigured.",
            "Verify authoritative NS reachability, zone load, and delegation.",
            &["RFC 1035"],
        ),
    ),
    (
        "SOA::SOA from NS",
        doc(
            "Fetch the SOA serial individually from each authoritative nameserver.",
            "Secondaries with old serials indicate replication lag or broken transfers.",
            "Fix zone transfers/NOTIFY; check ACLs and firewall rules between primaries and secondaries.",
            &["RFC 1996 (NOTIFY)", "RFC 5936 (AXFR)"],
        ),
    ),
    (
        "SOA::Serial Consistency",
        doc(
            "Compare SOA serial across all authoritative nameservers.",
            "Inconsistent serials cause unpredictable answers and stale data.",
            "Repair replication and ensure all secondaries update promptly.",
            &["RFC 1035 §3.3.13"],
        ),
    ),
    (
        "SOA::Refresh",
        doc(
            "Validate the SOA refresh interval (how often secondaries poll for updates).",
            "Too small wastes resources; too large delays propagation.",
            "Use a reasonable refresh (e.g., 15–60 min typical; your ops policy may vary).",
            &["Ops best practices"],
        ),
    ),
    (
        "SOA::Retry",
        doc(
            "Check retry interval (how long secondaries wait to retry after a failed refresh).",
            "Retry should be smaller than refresh to recover from temporary failures.",
            "Set retry < refresh; common values are 5–15 minutes.",
            &["Ops best practices"],
        ),
    ),
    (
        "SOA::Expire",
        doc(
            "Validate expire (how long a secondary serves data without contacting primary).",
            "Too small risks zones expiring during outages; too large can serve stale data for too long.",
            "Use a balanced expire time (often days to weeks) per your SLOs.",
            &["Ops best practices"],
        ),
    ),
    (
        "SOA::SOA TTL",
        doc(
            "Check the TTL of the SOA RRset.",
            "Very low TTLs increase query load; very high TTLs slow control-plane changes.",
            "Choose a middle-ground TTL aligned with your change cadence (e.g., 1–24h).",
            &["RFC 2308"],
        ),
    ),
    (
        "A Records::A Record",
        doc(
            "Fetch the apex A record(s) and TTL.",
            "Without an A record (or equivalent), the apex won’t resolve for IPv4 clients.",
            "Add/maintain valid A records pointing to reachable servers.",
            &["RFC 1035 §3.4.1"],
        ),
    ),
    (
        "A Records::A Lookup",
        doc(
            "Attempt to resolve the apex A record(s).",
            "Lookup failures typically indicate delegation or authoritative issues.",
            "Verify authoritative NS availability and zone contents.",
            &["RFC 1035"],
        ),
    ),
    (
        "A Records::Cross-NS Consistency",
        doc(
            "Compare apex A answers returned by different authoritative nameservers.",
            "Inconsistent answers cause flapping user experience and cache confusion.",
            "Ensure all nameservers serve identical data for the apex.",
            &["RFC 2182"],
        ),
    ),
    (
        "IPv6::AAAA Record",
        doc(
            "Fetch the apex AAAA record(s) and TTL.",
            "Without AAAA, IPv6-only clients or paths won’t reach your site.",
            "Add AAAA records when your service is reachable over IPv6.",
            &["RFC 3596"],
        ),
    ),
    (
        "CNAME::Host CNAME",
        doc(
            "Check common hosts (www, mail, ftp, webmail, smtp) for CNAMEs and follow targets.",
            "CNAME chains must end at A/AAAA; broken links cause outages.",
            "Ensure CNAME targets exist and resolve; reduce unnecessary chains.",
            &["RFC 1034 §3.6.2"],
        ),
    ),
    (
        "Records::Apex CNAME",
        doc(
            "Detect a CNAME at the zone apex (illegal with SOA/NS present).",
            "Violates standards and breaks many resolvers.",
            "Remove apex CNAME; use A/AAAA or provider ALIAS/ANAME.",
            &["RFC 1034 §3.6.2"],
        ),
    ),
    (
        "Records::Dangling CNAME",
        doc(
            "Follow CNAME target and ensure it eventually resolves to A/AAAA.",
            "Dangling CNAMEs cause downtime and takeover risk if targets are reclaimed.",
            "Fix or remove CNAMEs whose targets do not resolve.",
            &["DNS hijack best practices"],
        ),
    ),
    (
        "Web::WWW Record",
        doc(
            "Check whether the common web hostname (www) resolves.",
            "Many users try www.<domain>; lack of a record may be intentional but often isn’t.",
            "Add a www record (CNAME to apex or A/AAAA) if you intend to serve it.",
            &["Operational convention"],
        ),
    ),
    (
        "Mail::MX Records",
        doc(
            "Fetch MX records, priorities, and TTL.",
            "MX directs inbound email; too few or misordered MX can reduce resilience.",
            "Publish at least two MX on distinct hosts/networks; set sensible priorities.",
            &["RFC 5321 §2.3.5"],
        ),
    ),
    (
        "Mail::MX Host",
        doc(
            "Resolve each MX hostname to its A/AAAA.",
            "If an MX hostname doesn’t resolve, mail can’t be delivered.",
            "Ensure each MX has working A/AAAA and is reachable on port 25.",
            &["RFC 5321"],
        ),
    ),
    (
        "Mail::PTR",
        doc(
            "Check PTR (reverse DNS) for MX IPs.",
            "Many receivers require valid PTR for anti-abuse; missing PTR harms deliverability.",
            "Ask your IP provider to set a matching PTR for each outbound MX IP.",
            &["RFC 1912 §2.1"],
        ),
    ),
    (
        "Mail::SPF Health",
        doc(
            "Validate SPF policy, ensure a single record, and approximate DNS lookup count.",
            "Multiple or overly complex SPF can hard-fail at receivers; missing policy invites spoofing.",
            "Consolidate to one SPF; keep lookups ≤10; end with ~all or -all.",
            &["RFC 7208"],
        ),
    ),
    (
        "Mail::DMARC Policy",
        doc(
            "Parse DMARC policy, alignment, and reporting configuration.",
            "DMARC mitigates spoofing; weak policies reduce protection and visibility.",
            "Adopt quarantine/reject when ready; validate external rua/ruf authorization tokens.",
            &["RFC 7489"],
        ),
    ),
    (
        "Mail::STARTTLS",
        doc(
            "Probe MX for STARTTLS support and perform TLS handshake.",
            "STARTTLS encrypts mail in transit; broken TLS hurts deliverability and security.",
            "Enable STARTTLS and deploy valid, non-expired certificates covering MX hostnames.",
            &["RFC 3207"],
        ),
    ),
    (
        "Policy::CAA",
        doc(
            "Check for CAA records controlling which CAs may issue certificates.",
            "Prevents unauthorized issuance and supports compliance.",
            "Add 'issue'/'issuewild' for your chosen CA(s); optionally 'iodef' for alerts.",
            &["RFC 8659"],
        ),
    ),
];

#[derive(Debug, Clone, Copy)]
enum NamePattern {
    Prefix(&'static str),
    Suffix(&'static str),
}

impl NamePattern {
    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::Prefix(prefix) => name.starts_with(prefix),
            NamePattern::Suffix(suffix) => name.ends_with(suffix),
        }
    }
}

struct DocRule {
    category: &'static str,
    pattern: NamePattern,
    doc_key: &'static str,
}

const fn prefix(category: &'static str, p: &'static str, doc_key: &'static str) -> DocRule {
    DocRule {
        category,
        pattern: NamePattern::Prefix(p),
        doc_key,
    }
}

const fn suffix(category: &'static str, s: &'static str, doc_key: &'static str) -> DocRule {
    DocRule {
        category,
        pattern: NamePattern::Suffix(s),
        doc_key,
    }
}

/// Fallback rules for dynamically named checks. First match wins.
static DOC_RULES: &[DocRule] = &[
    prefix("Nameservers", "NS ", "Nameservers::NS Host"),
    prefix("Nameservers", "Glue Consistency", "Nameservers::Glue Consistency"),
    prefix("Nameservers", "Network Diversity", "Nameservers::Network Diversity"),
    prefix("Nameservers", "NS IP Sanity", "Nameservers::NS IP Sanity"),
    suffix("Performance", " Response", "Performance::NS Response"),
    suffix("Security", " Recursion", "Security::Recursion"),
    suffix("Security", " TCP 53", "Security::TCP 53"),
    suffix("Security", " EDNS", "Security::EDNS"),
    suffix("Security", " Lame", "Security::Stealth/Lame NS"),
    suffix("Security", " Stealth", "Security::Stealth/Lame NS"),
    suffix("Security", " Authority", "Security::Authority Pass"),
    prefix("Security", "Zone XFR ", "Security::Zone XFR"),
    prefix("Security", "Blacklist", "Security::Blacklist"),
    prefix("SOA", "SOA from ", "SOA::SOA from NS"),
    prefix("SOA", "SOA Record", "SOA::SOA Record"),
    prefix("SOA", "SOA Lookup", "SOA::SOA Lookup"),
    prefix("SOA", "Serial Consistency", "SOA::Serial Consistency"),
    prefix("SOA", "Refresh", "SOA::Refresh"),
    prefix("SOA", "Retry", "SOA::Retry"),
    prefix("SOA", "Expire", "SOA::Expire"),
    prefix("SOA", "SOA TTL", "SOA::SOA TTL"),
    prefix("A Records", "A from ", "A Records::Cross-NS Consistency"),
    prefix("A Records", "A Record", "A Records::A Record"),
    prefix("A Records", "A Lookup", "A Records::A Lookup"),
    prefix("IPv6", "AAAA Record", "IPv6::AAAA Record"),
    // any host under the CNAME category
    prefix("CNAME", "", "CNAME::Host CNAME"),
    prefix("Web", "WWW Record", "Web::WWW Record"),
    prefix("Mail", "MX Records", "Mail::MX Records"),
    prefix("Mail", "MX ", "Mail::MX Host"),
    prefix("Mail", "PTR ", "Mail::PTR"),
    prefix("Mail", "SPF Health", "Mail::SPF Health"),
    prefix("Mail", "DMARC Policy", "Mail::DMARC Policy"),
    prefix("Mail", "STARTTLS ", "Mail::STARTTLS"),
    prefix("Records", "Apex CNAME", "Records::Apex CNAME"),
    prefix("Records", "Dangling CNAME", "Records::Dangling CNAME"),
    prefix("Policy", "CAA", "Policy::CAA"),
    prefix("Parent Zone", "Parent NS Records", "Parent Zone::Parent NS Records"),
    prefix("Parent Zone", "Parent/Child Match", "Parent Zone::Parent/Child Match"),
];

fn doc_by_key(key: &str) -> Option<DocEntry> {
    CHECK_DOCS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, entry)| *entry)
}

/// Looks up documentation for a check: exact `"{category}::{name}"` first,
/// then the pattern rules in order.
pub fn lookup_doc(category: &str, name: &str) -> Option<DocEntry> {
    if let Some(entry) = doc_by_key(&format!("{category}::{name}")) {
        return Some(entry);
    }
    DOC_RULES
        .iter()
        .filter(|rule| rule.category == category)
        .find(|rule| rule.pattern.matches(name))
        .and_then(|rule| doc_by_key(rule.doc_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let entry = lookup_doc("Nameservers", "NS Count").unwrap();
        assert!(entry.explain.starts_with("Count how many"));
        assert_eq!(entry.refs.len(), 1);
    }

    #[test]
    fn test_dynamic_names_use_rules() {
        let cases = [
            ("Nameservers", "NS ns1.example.com", "Nameservers::NS Host"),
            ("Performance", "ns1.example.com Response", "Performance::NS Response"),
            ("Security", "ns1.example.com Recursion", "Security::Recursion"),
            ("Security", "ns1.example.com TCP 53", "Security::TCP 53"),
            ("Security", "ns1.example.com EDNS", "Security::EDNS"),
            ("Security", "ns1.example.com Lame", "Security::Stealth/Lame NS"),
            ("Security", "ns9.example.net Stealth", "Security::Stealth/Lame NS"),
            ("Security", "ns1.example.com Authority", "Security::Authority Pass"),
            ("Security", "Zone XFR ns1.example.com", "Security::Zone XFR"),
            ("SOA", "SOA from ns2.example.com", "SOA::SOA from NS"),
            ("A Records", "A from ns2.example.com", "A Records::Cross-NS Consistency"),
            ("CNAME", "webmail", "CNAME::Host CNAME"),
            ("Mail", "MX mail.example.com", "Mail::MX Host"),
            ("Mail", "PTR 203.0.113.4", "Mail::PTR"),
            ("Mail", "STARTTLS mail.example.com", "Mail::STARTTLS"),
            ("Records", "Dangling CNAME www", "Records::Dangling CNAME"),
        ];
        for (category, name, key) in cases {
            assert_eq!(
                lookup_doc(category, name),
                doc_by_key(key),
                "{category}::{name} should document as {key}"
            );
            assert!(lookup_doc(category, name).is_some());
        }
    }

    #[test]
    fn test_rules_are_scoped_by_category() {
        // "NS " is a Nameservers rule only
        assert!(lookup_doc("Mail", "NS ns1.example.com").is_none());
        assert!(lookup_doc("Unknown", "anything").is_none());
    }

    #[test]
    fn test_lookup_failures_fall_back_to_host_docs() {
        assert_eq!(
            lookup_doc("Nameservers", "NS Lookup"),
            doc_by_key("Nameservers::NS Host")
        );
        assert_eq!(lookup_doc("Mail", "MX Lookup"), doc_by_key("Mail::MX Host"));
    }

    #[test]
    fn test_every_rule_points_at_an_entry() {
        for rule in DOC_RULES {
            assert!(
                doc_by_key(rule.doc_key).is_some(),
                "dangling rule target {}",
                rule.doc_key
            );
        }
    }

    #[test]
    fn test_resolver_availability_is_documented() {
        assert!(lookup_doc("Resolver", "Resolver Availability").is_some());
    }
}
