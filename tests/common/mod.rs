// Shared test fixtures: an in-memory `Network` with scripted nameservers.
//
// `MockNetwork` stands in for both the recursive resolver (`lookup`) and the
// individual servers the prober talks to (`lookup_at`, `probe`). Names are
// normalized on the way in, so fixtures can be written with or without
// trailing dots.

#![allow(dead_code)] // Each test binary uses a different subset

use std::collections::HashMap;
use std::net::IpAddr;

use dns_health::{
    normalize_name, Answer, LookupError, Network, ProbeError, ProbeRecord, ProbeResponse,
    QueryOptions, RecordData, SmtpProbe, SoaData, Transport,
};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::RecordType;

/// How a scripted server treats queries for names outside its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recursion {
    /// REFUSED whatever the RD bit says
    Refuse,
    /// REFUSED with RD clear, recursive NXDOMAIN with RD set
    Open,
    /// Non-authoritative NXDOMAIN with RA set, whatever the RD bit says
    AnswerAnyway,
}

/// One scripted nameserver.
#[derive(Debug, Clone)]
pub struct MockServer {
    pub authoritative: bool,
    pub recursion: Recursion,
    pub tcp: bool,
    pub edns: bool,
    pub axfr: bool,
    /// Records this server answers directly
    pub zone: HashMap<(String, RecordType), Vec<RecordData>>,
    /// Authority section handed out for names outside `zone`
    pub referral: Vec<ProbeRecord>,
    /// Additional section sent with the referral
    pub glue: Vec<ProbeRecord>,
}

impl MockServer {
    /// A well-behaved authoritative server with an empty zone.
    pub fn authoritative() -> Self {
        Self {
            authoritative: true,
            recursion: Recursion::Refuse,
            tcp: true,
            edns: true,
            axfr: false,
            zone: HashMap::new(),
            referral: Vec::new(),
            glue: Vec::new(),
        }
    }

    /// A parent-zone server that refers `domain` to `nameservers`, with
    /// glue for the given addresses.
    pub fn referring(domain: &str, nameservers: &[&str], glue: &[(&str, &str)]) -> Self {
        Self {
            authoritative: false,
            referral: nameservers
                .iter()
                .map(|ns| ProbeRecord::new(domain, RecordData::Ns(normalize_name(ns))))
                .collect(),
            glue: glue
                .iter()
                .map(|(host, ip)| ProbeRecord::new(host, address(ip)))
                .collect(),
            ..Self::authoritative()
        }
    }

    pub fn with_record(mut self, name: &str, record_type: RecordType, data: RecordData) -> Self {
        self.zone
            .entry((normalize_name(name), record_type))
            .or_default()
            .push(data);
        self
    }

    pub fn with_recursion(mut self, recursion: Recursion) -> Self {
        self.recursion = recursion;
        self
    }

    fn recursion_probe(&self, options: &QueryOptions) -> ProbeResponse {
        let mut response = ProbeResponse::new(ResponseCode::Refused);
        match (self.recursion, options.recursion_desired) {
            (Recursion::Refuse, _) | (Recursion::Open, false) => {}
            (Recursion::Open, true) | (Recursion::AnswerAnyway, _) => {
                response.response_code = ResponseCode::NXDomain;
                response.recursion_available = true;
                response.authority = vec![ProbeRecord::new("com", RecordData::Soa(com_soa()))];
            }
        }
        response
    }
}

/// Parses an address literal into A or AAAA record data.
pub fn address(ip: &str) -> RecordData {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => RecordData::A(v4),
        Ok(IpAddr::V6(v6)) => RecordData::Aaaa(v6),
        Err(e) => panic!("bad address literal {ip}: {e}"),
    }
}

pub fn ip(ip: &str) -> IpAddr {
    ip.parse().expect("valid address literal")
}

pub fn soa(mname: &str, serial: u32) -> SoaData {
    SoaData {
        mname: mname.to_string(),
        rname: "hostmaster.example.com".to_string(),
        serial,
        refresh: 7200,
        retry: 900,
        expire: 1_209_600,
        minimum: 300,
    }
}

fn com_soa() -> SoaData {
    SoaData {
        mname: "a.gtld-servers.net".to_string(),
        rname: "nstld.verisign-grs.com".to_string(),
        serial: 1_700_000_000,
        refresh: 1800,
        retry: 900,
        expire: 604_800,
        minimum: 86400,
    }
}

/// In-memory `Network` backend.
#[derive(Debug, Clone, Default)]
pub struct MockNetwork {
    records: HashMap<(String, RecordType), Answer>,
    failures: HashMap<(String, RecordType), LookupError>,
    servers: HashMap<IpAddr, MockServer>,
    reverse: HashMap<IpAddr, Vec<String>>,
    smtp: HashMap<IpAddr, SmtpProbe>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds records the recursive resolver returns for `name`.
    pub fn record(mut self, name: &str, record_type: RecordType, ttl: u32, data: Vec<RecordData>) -> Self {
        self.records
            .insert((normalize_name(name), record_type), Answer::new(data, Some(ttl)));
        self
    }

    /// Makes the recursive resolver fail for `name` and `record_type`.
    pub fn failing(mut self, name: &str, record_type: RecordType, error: LookupError) -> Self {
        self.failures
            .insert((normalize_name(name), record_type), error);
        self
    }

    pub fn server(mut self, ip: &str, server: MockServer) -> Self {
        self.servers.insert(self::ip(ip), server);
        self
    }

    pub fn ptr(mut self, ip: &str, names: &[&str]) -> Self {
        self.reverse
            .insert(self::ip(ip), names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn smtp(mut self, ip: &str, outcome: SmtpProbe) -> Self {
        self.smtp.insert(self::ip(ip), outcome);
        self
    }

    fn resolve(&self, name: &str, record_type: RecordType) -> Result<Answer, LookupError> {
        let name = normalize_name(name);
        let key = (name.clone(), record_type);
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }
        match self.records.get(&key) {
            Some(answer) if !answer.is_empty() => Ok(answer.clone()),
            Some(_) => Err(LookupError::NoAnswer),
            None if self.records.keys().any(|(owner, _)| *owner == name) => {
                Err(LookupError::NoAnswer)
            }
            None => Err(LookupError::NxDomain),
        }
    }
}

impl Network for MockNetwork {
    async fn lookup(&self, name: &str, record_type: RecordType) -> Result<Answer, LookupError> {
        self.resolve(name, record_type)
    }

    async fn lookup_at(
        &self,
        servers: &[IpAddr],
        name: &str,
        record_type: RecordType,
    ) -> Result<Answer, LookupError> {
        let Some(server) = servers.iter().find_map(|ip| self.servers.get(ip)) else {
            return Err(LookupError::Failed("request timed out".to_string()));
        };
        match server.zone.get(&(normalize_name(name), record_type)) {
            Some(records) => Ok(Answer::new(records.clone(), Some(300))),
            None => Err(LookupError::NoAnswer),
        }
    }

    async fn reverse_lookup(&self, ip: IpAddr) -> Result<Vec<String>, LookupError> {
        self.reverse.get(&ip).cloned().ok_or(LookupError::NxDomain)
    }

    async fn probe(
        &self,
        server: IpAddr,
        name: &str,
        record_type: RecordType,
        options: QueryOptions,
    ) -> Result<ProbeResponse, ProbeError> {
        let Some(mock) = self.servers.get(&server) else {
            return Err(ProbeError::Timeout(options.timeout.as_millis()));
        };
        if options.transport == Transport::Tcp && !mock.tcp {
            return Err(ProbeError::Io("connection refused".to_string()));
        }
        if options.edns_payload.is_some() && !mock.edns {
            return Err(ProbeError::Timeout(options.timeout.as_millis()));
        }

        let name = normalize_name(name);
        if name.starts_with("recursion-test-") {
            return Ok(mock.recursion_probe(&options));
        }

        let mut response = ProbeResponse::new(ResponseCode::NoError);
        response.edns = options.edns_payload.is_some();
        if let Some(records) = mock.zone.get(&(name.clone(), record_type)) {
            response.authoritative = mock.authoritative;
            response.answers = records
                .iter()
                .map(|data| ProbeRecord::new(&name, data.clone()))
                .collect();
        } else if !mock.referral.is_empty() {
            response.authority = mock.referral.clone();
            response.additional = mock.glue.clone();
        } else {
            response.authoritative = mock.authoritative;
        }
        Ok(response)
    }

    async fn zone_transfer(&self, server: IpAddr, _zone: &str) -> Result<bool, ProbeError> {
        self.servers
            .get(&server)
            .map(|mock| mock.axfr)
            .ok_or(ProbeError::Timeout(5000))
    }

    async fn smtp_starttls(&self, _host: &str, ip: IpAddr) -> Result<SmtpProbe, ProbeError> {
        self.smtp
            .get(&ip)
            .cloned()
            .ok_or_else(|| ProbeError::Io("connection refused".to_string()))
    }
}

/// A STARTTLS success for `host`.
pub fn starttls_ok(host: &str) -> SmtpProbe {
    SmtpProbe::Established {
        banner: format!("220 {host} ESMTP ready"),
        common_name: Some(host.to_string()),
        tls_version: "TLSv1_3".to_string(),
    }
}

/// A healthy `example.com`: two in-bailiwick nameservers on different
/// networks with matching glue, consistent zone data, two MX hosts with
/// STARTTLS, SPF `~all` and DMARC `p=reject`.
pub fn healthy_example() -> MockNetwork {
    let zone = |server: MockServer| {
        server
            .with_record("example.com", RecordType::SOA, RecordData::Soa(soa("ns1.example.com", 2024010101)))
            .with_record("example.com", RecordType::A, address("93.184.216.34"))
            .with_record("example.com", RecordType::NS, RecordData::Ns("ns1.example.com".into()))
            .with_record("example.com", RecordType::NS, RecordData::Ns("ns2.example.com".into()))
    };

    MockNetwork::new()
        .record("com", RecordType::NS, 172800, vec![RecordData::Ns("a.gtld-servers.net".into())])
        .record("a.gtld-servers.net", RecordType::A, 172800, vec![address("192.5.6.30")])
        .server(
            "192.5.6.30",
            MockServer::referring(
                "example.com",
                &["ns1.example.com", "ns2.example.com"],
                &[("ns1.example.com", "45.33.20.1"), ("ns2.example.com", "151.101.1.1")],
            ),
        )
        .record(
            "example.com",
            RecordType::NS,
            86400,
            vec![
                RecordData::Ns("ns1.example.com".into()),
                RecordData::Ns("ns2.example.com".into()),
            ],
        )
        .record("ns1.example.com", RecordType::A, 86400, vec![address("45.33.20.1")])
        .record("ns2.example.com", RecordType::A, 86400, vec![address("151.101.1.1")])
        .record(
            "1.20.33.45.origin.asn.cymru.com",
            RecordType::TXT,
            14400,
            vec![RecordData::Txt("63949 | 45.33.0.0/17 | US | arin | 2011-02-09".into())],
        )
        .record(
            "1.1.101.151.origin.asn.cymru.com",
            RecordType::TXT,
            14400,
            vec![RecordData::Txt("54113 | 151.101.0.0/22 | US | arin | 2016-02-01".into())],
        )
        .server("45.33.20.1", zone(MockServer::authoritative()))
        .server("151.101.1.1", zone(MockServer::authoritative()))
        .record("example.com", RecordType::SOA, 7200, vec![RecordData::Soa(soa("ns1.example.com", 2024010101))])
        .record("example.com", RecordType::A, 300, vec![address("93.184.216.34")])
        .record("www.example.com", RecordType::A, 300, vec![address("93.184.216.34")])
        .record(
            "example.com",
            RecordType::MX,
            3600,
            vec![
                RecordData::Mx { preference: 20, exchange: "mx2.example.com".into() },
                RecordData::Mx { preference: 10, exchange: "mx1.example.com".into() },
            ],
        )
        .record("mx1.example.com", RecordType::A, 300, vec![address("93.184.216.40")])
        .record("mx2.example.com", RecordType::A, 300, vec![address("93.184.216.41")])
        .ptr("93.184.216.40", &["mx1.example.com"])
        .ptr("93.184.216.41", &["mx2.example.com"])
        .smtp("93.184.216.40", starttls_ok("mx1.example.com"))
        .smtp("93.184.216.41", starttls_ok("mx2.example.com"))
        .record(
            "example.com",
            RecordType::TXT,
            300,
            vec![RecordData::Txt("v=spf1 include:_spf.example.com ~all".into())],
        )
        .record(
            "_dmarc.example.com",
            RecordType::TXT,
            300,
            vec![RecordData::Txt("v=DMARC1; p=reject; rua=mailto:dmarc@example.com".into())],
        )
}
