//! End-to-end runs of the diagnostic pipeline over scripted networks.

mod common;

use common::{address, healthy_example, soa, MockNetwork, MockServer, Recursion};
use dns_health::{run_diagnostics_with, CheckStatus, Config, LookupError, RecordData, Report};
use hickory_resolver::proto::rr::RecordType;

async fn run(network: &MockNetwork, domain: &str) -> Report {
    run_diagnostics_with(network, domain, &Config::default()).await
}

fn status(report: &Report, category: &str, name: &str) -> CheckStatus {
    report
        .find(category, name)
        .unwrap_or_else(|| panic!("missing check {category}::{name}"))
        .status
}

#[tokio::test]
async fn test_scenario_a_healthy_domain_has_no_errors() {
    let report = run(&healthy_example(), "example.com").await;

    let errors: Vec<String> = report
        .checks()
        .iter()
        .filter(|c| c.status == CheckStatus::Error)
        .map(|c| format!("{}::{} {}", c.category, c.name, c.message))
        .collect();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(report.summary().errors, 0);

    assert_eq!(status(&report, "Nameservers", "NS Count"), CheckStatus::Pass);
    assert_eq!(status(&report, "Parent Zone", "Parent/Child Match"), CheckStatus::Pass);
    assert_eq!(status(&report, "Nameservers", "Network Diversity"), CheckStatus::Pass);
    assert_eq!(status(&report, "Security", "ns1.example.com Recursion"), CheckStatus::Pass);
    assert_eq!(status(&report, "Security", "ns2.example.com Authority"), CheckStatus::Pass);
    assert_eq!(status(&report, "A Records", "A from ns2.example.com"), CheckStatus::Pass);
    assert_eq!(status(&report, "Mail", "STARTTLS mx1.example.com"), CheckStatus::Pass);
    assert_eq!(status(&report, "Mail", "SPF Health"), CheckStatus::Pass);
    assert_eq!(status(&report, "Security", "Blacklist"), CheckStatus::Pass);

    let dmarc = report.find("Mail", "DMARC Policy").unwrap();
    assert_eq!(dmarc.message, "Policy: reject (strong)");

    let mx = report.find("Mail", "MX Records").unwrap();
    assert_eq!(mx.message, "2 MX records (TTL: 3600s)");
    assert_eq!(mx.details[0], "Priority 10: mx1.example.com");
}

#[tokio::test]
async fn test_scenario_a_glue_matches_parent() {
    let report = run(&healthy_example(), "example.com").await;

    let glue: Vec<_> = report
        .checks_in("Nameservers")
        .filter(|c| c.name == "Glue Consistency")
        .collect();
    assert_eq!(glue.len(), 2);
    assert!(glue.iter().all(|c| c.status == CheckStatus::Pass));
    assert_eq!(glue[0].evidence, vec!["parent=[45.33.20.1]", "child=[45.33.20.1]"]);
}

#[tokio::test]
async fn test_scenario_b_single_open_nameserver_with_permissive_spf() {
    let network = MockNetwork::new()
        .record("example.org", RecordType::NS, 86400, vec![RecordData::Ns("ns1.example.org".into())])
        .record("ns1.example.org", RecordType::A, 86400, vec![address("45.33.20.10")])
        .server(
            "45.33.20.10",
            MockServer::authoritative()
                .with_recursion(Recursion::Open)
                .with_record("example.org", RecordType::SOA, RecordData::Soa(soa("ns1.example.org", 7))),
        )
        .record("example.org", RecordType::SOA, 7200, vec![RecordData::Soa(soa("ns1.example.org", 7))])
        .record(
            "example.org",
            RecordType::TXT,
            300,
            vec![RecordData::Txt("v=spf1 include:_spf.example.org +all".into())],
        );

    let report = run(&network, "example.org").await;

    let count = report.find("Nameservers", "NS Count").unwrap();
    assert_eq!(count.status, CheckStatus::Warn);
    assert_eq!(count.message, "Only 1 nameserver(s). Best practice: 2+");

    let recursion = report.find("Security", "ns1.example.org Recursion").unwrap();
    assert_eq!(recursion.status, CheckStatus::Error);
    assert_eq!(recursion.message, "ns1.example.org allows open recursion - RISK!");

    let spf = report.find("Mail", "SPF Health").unwrap();
    assert_eq!(spf.status, CheckStatus::Error);
    assert_eq!(spf.message, "SPF uses +all (overly permissive)");

    // No TLD servers in this network, so there is no parent view
    assert!(report.find("Parent Zone", "Parent/Child Match").is_none());
}

#[tokio::test]
async fn test_scenario_c_dangling_www_cname() {
    let network = healthy_example().record(
        "www.example.com",
        RecordType::CNAME,
        300,
        vec![RecordData::Cname("ghost.example-cdn.net".into())],
    );

    let report = run(&network, "example.com").await;

    let dangling = report.find("Records", "Dangling CNAME www").unwrap();
    assert_eq!(dangling.status, CheckStatus::Error);
    assert_eq!(dangling.message, "www.example.com CNAME target does not resolve");
    assert_eq!(dangling.evidence, vec!["target=ghost.example-cdn.net"]);
    assert!(dangling.doc.is_some());

    let cname = report.find("CNAME", "www").unwrap();
    assert_eq!(cname.message, "CNAME → ghost.example-cdn.net (TTL: 300s)");
}

#[tokio::test]
async fn test_apex_cname_round_trip() {
    let report = run(&healthy_example(), "example.com").await;
    assert_eq!(status(&report, "Records", "Apex CNAME"), CheckStatus::Pass);

    let network = healthy_example().record(
        "example.com",
        RecordType::CNAME,
        300,
        vec![RecordData::Cname("parking.example.net".into())],
    );
    let report = run(&network, "example.com").await;
    let apex = report.find("Records", "Apex CNAME").unwrap();
    assert_eq!(apex.status, CheckStatus::Error);
    assert_eq!(apex.details, vec!["parking.example.net"]);
}

#[tokio::test]
async fn test_determinism_across_runs() {
    let network = healthy_example();
    let shape = |report: &Report| -> Vec<(String, String, CheckStatus, String)> {
        report
            .checks()
            .iter()
            // Latency messages carry measured milliseconds
            .filter(|c| c.category != "Performance")
            .map(|c| (c.category.clone(), c.name.clone(), c.status, c.message.clone()))
            .collect()
    };

    let first = run(&network, "example.com").await;
    let second = run(&network, "example.com").await;
    assert_eq!(shape(&first), shape(&second));
    assert_eq!(first.summary(), second.summary());
}

#[tokio::test]
async fn test_report_sections_follow_execution_order() {
    let report = run(&healthy_example(), "example.com.").await;
    assert_eq!(report.domain(), "example.com");
    assert_eq!(
        report.categories(),
        vec![
            "Parent Zone",
            "Nameservers",
            "Performance",
            "Security",
            "SOA",
            "A Records",
            "IPv6",
            "Policy",
            "CNAME",
            "Mail",
            "Web",
            "Records",
        ]
    );
}

#[tokio::test]
async fn test_resolver_unavailable_stops_the_run() {
    let network = healthy_example().failing(
        "com",
        RecordType::NS,
        LookupError::Failed("SERVFAIL".into()),
    );

    let report = run(&network, "example.com").await;

    assert_eq!(report.checks().len(), 1);
    let check = &report.checks()[0];
    assert_eq!(check.category, "Resolver");
    assert_eq!(check.name, "Resolver Availability");
    assert_eq!(check.status, CheckStatus::Error);
    assert_eq!(check.message, "Cannot resolve nameservers for TLD .com: SERVFAIL");
    assert!(check.doc.is_some());
}

#[tokio::test]
async fn test_parent_only_nameserver_is_stealth() {
    let network = healthy_example()
        .server(
            "192.5.6.30",
            MockServer::referring(
                "example.com",
                &["ns1.example.com", "ns2.example.com", "ns3.example.com"],
                &[
                    ("ns1.example.com", "45.33.20.1"),
                    ("ns2.example.com", "151.101.1.1"),
                    ("ns3.example.com", "45.33.20.3"),
                ],
            ),
        )
        .record("ns3.example.com", RecordType::A, 86400, vec![address("45.33.20.3")])
        .server(
            "45.33.20.3",
            MockServer::authoritative().with_record(
                "example.com",
                RecordType::SOA,
                RecordData::Soa(soa("ns1.example.com", 2024010101)),
            ),
        );

    let report = run(&network, "example.com").await;

    let mismatch = report.find("Parent Zone", "Parent/Child Match").unwrap();
    assert_eq!(mismatch.status, CheckStatus::Error);
    assert_eq!(mismatch.details, vec!["In parent not child: ns3.example.com"]);

    let stealth = report.find("Security", "ns3.example.com Stealth").unwrap();
    assert_eq!(stealth.status, CheckStatus::Warn);
    // Parent-only servers get the authority probe and nothing else
    assert!(report.find("Security", "ns3.example.com Recursion").is_none());
    assert!(report.find("Performance", "ns3.example.com Response").is_none());
}

#[tokio::test]
async fn test_lame_nameserver_and_serial_drift() {
    let mut lame = MockServer::authoritative().with_record(
        "example.com",
        RecordType::SOA,
        RecordData::Soa(soa("ns1.example.com", 2024010102)),
    );
    lame.authoritative = false;
    let network = healthy_example().server("151.101.1.1", lame);

    let report = run(&network, "example.com").await;

    let check = report.find("Security", "ns2.example.com Lame").unwrap();
    assert_eq!(check.message, "Listed as NS but not authoritative (AA=0)");

    let serial = report.find("SOA", "Serial Consistency").unwrap();
    assert_eq!(serial.status, CheckStatus::Error);
    assert_eq!(
        serial.details,
        vec!["ns1.example.com: 2024010101", "ns2.example.com: 2024010102"]
    );
}

#[tokio::test]
async fn test_zone_transfer_and_tcp_failures() {
    let mut open = MockServer::authoritative()
        .with_record("example.com", RecordType::SOA, RecordData::Soa(soa("ns1.example.com", 2024010101)))
        .with_record("example.com", RecordType::A, address("93.184.216.34"));
    open.axfr = true;
    open.tcp = false;
    let network = healthy_example().server("45.33.20.1", open);

    let report = run(&network, "example.com").await;

    let xfr = report.find("Security", "Zone XFR ns1.example.com").unwrap();
    assert_eq!(xfr.status, CheckStatus::Error);
    assert_eq!(xfr.message, "Zone transfer ALLOWED on ns1.example.com - RISK!");
    assert_eq!(status(&report, "Security", "Zone XFR ns2.example.com"), CheckStatus::Pass);
    assert_eq!(status(&report, "Security", "ns1.example.com TCP 53"), CheckStatus::Error);
}

#[tokio::test]
async fn test_listed_address_on_blocklist() {
    let network = healthy_example().record(
        "34.216.184.93.zen.spamhaus.org",
        RecordType::A,
        300,
        vec![address("127.0.0.2")],
    );

    let report = run(&network, "example.com").await;

    let check = report.find("Security", "Blacklist").unwrap();
    assert_eq!(check.status, CheckStatus::Error);
    assert_eq!(check.message, "93.184.216.34 listed on 1 blacklist(s)");
    assert_eq!(check.details, vec!["zen.spamhaus.org"]);
}

#[tokio::test]
async fn test_optional_probes_can_be_disabled() {
    let config = Config {
        check_smtp: false,
        check_blacklists: false,
        ..Default::default()
    };
    let report = run_diagnostics_with(&healthy_example(), "example.com", &config).await;

    assert!(report.checks().iter().all(|c| !c.name.starts_with("STARTTLS")));
    assert!(report.find("Security", "Blacklist").is_none());
    assert!(report.find("Mail", "PTR 93.184.216.40").is_some());
}

#[tokio::test]
async fn test_missing_mail_records() {
    let network = MockNetwork::new()
        .record("example.net", RecordType::NS, 86400, vec![RecordData::Ns("ns1.dnshost.org".into())])
        .record("example.net", RecordType::A, 300, vec![address("93.184.216.50")]);

    let report = run(&network, "example.net").await;

    assert_eq!(report.find("Mail", "MX Records").unwrap().message, "No MX records");
    assert_eq!(
        report.find("Mail", "SPF Health").unwrap().message,
        "No SPF - recommend adding"
    );
    assert_eq!(
        report.find("Mail", "DMARC Policy").unwrap().message,
        "No DMARC - strongly recommended"
    );
    assert_eq!(
        report.find("Nameservers", "NS ns1.dnshost.org").unwrap().message,
        "ns1.dnshost.org no resolve"
    );
    assert_eq!(
        report.find("Web", "WWW Record").unwrap().message,
        "www.example.net does not exist"
    );
}
