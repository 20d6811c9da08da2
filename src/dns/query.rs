//! The query primitive: one raw DNS query against one server.
//!
//! Unlike the resolver lookups in `records`, these queries go straight to a
//! chosen server with a chosen RD bit, transport and EDNS setting, and the
//! caller sees the header flags of the response. The primitive itself never
//! retries; `query_with_tcp_fallback` adds the single TCP retry on
//! truncation for callers that want it.

use std::net::SocketAddr;
use std::time::Duration;

use hickory_resolver::proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_resolver::proto::rr::{Name, Record, RecordType};

use crate::dns::records::RecordData;
use crate::dns::wire::{exchange_tcp, exchange_udp};
use crate::domain::normalize_name;
use crate::error_handling::ProbeError;

/// Transport used for a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

/// Per-query knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub recursion_desired: bool,
    pub transport: Transport,
    /// Advertised EDNS UDP payload size; `None` sends no OPT record
    pub edns_payload: Option<u16>,
    /// Bound on the whole exchange (connect, send, receive)
    pub timeout: Duration,
}

impl QueryOptions {
    /// Plain UDP query with RD clear and no EDNS.
    pub fn udp(timeout: Duration) -> Self {
        Self {
            recursion_desired: false,
            transport: Transport::Udp,
            edns_payload: None,
            timeout,
        }
    }

    /// Plain TCP query with RD clear and no EDNS.
    pub fn tcp(timeout: Duration) -> Self {
        Self {
            transport: Transport::Tcp,
            ..Self::udp(timeout)
        }
    }

    pub fn with_recursion(mut self, recursion_desired: bool) -> Self {
        self.recursion_desired = recursion_desired;
        self
    }

    pub fn with_edns(mut self, payload: u16) -> Self {
        self.edns_payload = Some(payload);
        self
    }

    pub fn over(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }
}

/// One record of a probe response with its owner name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRecord {
    pub name: String,
    pub data: RecordData,
}

impl ProbeRecord {
    pub fn new(name: &str, data: RecordData) -> Self {
        Self {
            name: normalize_name(name),
            data,
        }
    }

    fn from_record(record: &Record) -> Option<Self> {
        record
            .data()
            .map(|rdata| Self::new(&record.name().to_utf8(), RecordData::from_rdata(rdata)))
    }
}

/// The parts of a raw response the prober reasons about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub response_code: ResponseCode,
    pub authoritative: bool,
    pub recursion_available: bool,
    pub truncated: bool,
    /// The response carried an OPT record
    pub edns: bool,
    pub answers: Vec<ProbeRecord>,
    pub authority: Vec<ProbeRecord>,
    pub additional: Vec<ProbeRecord>,
}

impl ProbeResponse {
    /// An empty response with the given rcode and all flags clear.
    pub fn new(response_code: ResponseCode) -> Self {
        Self {
            response_code,
            authoritative: false,
            recursion_available: false,
            truncated: false,
            edns: false,
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    pub fn from_message(message: &Message) -> Self {
        let convert = |records: &[Record]| -> Vec<ProbeRecord> {
            records.iter().filter_map(ProbeRecord::from_record).collect()
        };
        Self {
            response_code: message.response_code(),
            authoritative: message.authoritative(),
            recursion_available: message.recursion_available(),
            truncated: message.truncated(),
            edns: message.extensions().is_some(),
            answers: convert(message.answers()),
            authority: convert(message.name_servers()),
            additional: convert(message.additionals()),
        }
    }

    pub fn has_answers(&self) -> bool {
        !self.answers.is_empty()
    }

    pub fn authority_has_soa(&self) -> bool {
        self.authority
            .iter()
            .any(|r| matches!(r.data, RecordData::Soa(_)))
    }

    /// Mnemonic of the response code ("NOERROR", "NXDOMAIN", ...).
    pub fn rcode_name(&self) -> String {
        rcode_name(self.response_code)
    }
}

/// Mnemonic of a response code as written in RFC 1035 and RFC 2136.
pub fn rcode_name(code: ResponseCode) -> String {
    match code {
        ResponseCode::NoError => "NOERROR".to_string(),
        ResponseCode::FormErr => "FORMERR".to_string(),
        ResponseCode::ServFail => "SERVFAIL".to_string(),
        ResponseCode::NXDomain => "NXDOMAIN".to_string(),
        ResponseCode::NotImp => "NOTIMP".to_string(),
        ResponseCode::Refused => "REFUSED".to_string(),
        ResponseCode::YXDomain => "YXDOMAIN".to_string(),
        ResponseCode::YXRRSet => "YXRRSET".to_string(),
        ResponseCode::NXRRSet => "NXRRSET".to_string(),
        ResponseCode::NotAuth => "NOTAUTH".to_string(),
        ResponseCode::NotZone => "NOTZONE".to_string(),
        other => format!("RCODE{}", u16::from(other)),
    }
}

/// Encodes a query message. Returns the message id with the bytes.
///
/// # Errors
///
/// Returns `ProbeError::Malformed` if the name is not a valid DNS name.
pub fn build_query(
    name: &str,
    record_type: RecordType,
    options: &QueryOptions,
) -> Result<(u16, Vec<u8>), ProbeError> {
    let mut qname = Name::from_ascii(name)
        .map_err(|e| ProbeError::Malformed(format!("invalid query name {name}: {e}")))?;
    qname.set_fqdn(true);

    let id: u16 = rand::random();
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(options.recursion_desired);
    message.add_query(Query::query(qname, record_type));

    if let Some(payload) = options.edns_payload {
        let mut edns = Edns::new();
        edns.set_max_payload(payload);
        edns.set_version(0);
        message.set_edns(edns);
    }

    Ok((id, message.to_vec()?))
}

/// Sends one query to `server` and returns the decoded response message.
///
/// # Errors
///
/// Returns `ProbeError::Timeout` if the exchange exceeds
/// `options.timeout`, `ProbeError::Io` on socket failures and
/// `ProbeError::Malformed` if the response cannot be decoded or does not
/// match the query id.
pub async fn query_message(
    server: SocketAddr,
    name: &str,
    record_type: RecordType,
    options: &QueryOptions,
) -> Result<Message, ProbeError> {
    let (id, request) = build_query(name, record_type, options)?;

    let exchange = async {
        match options.transport {
            Transport::Udp => exchange_udp(server, &request).await,
            Transport::Tcp => exchange_tcp(server, &request).await,
        }
    };
    let bytes = tokio::time::timeout(options.timeout, exchange)
        .await
        .map_err(|_| ProbeError::Timeout(options.timeout.as_millis()))??;

    let message = Message::from_vec(&bytes)?;
    if message.id() != id {
        return Err(ProbeError::Malformed(format!(
            "response id {} does not match query id {id}",
            message.id()
        )));
    }
    Ok(message)
}

/// Sends one query to `server` and returns the probe view of the response.
///
/// # Errors
///
/// See `query_message`.
pub async fn query(
    server: SocketAddr,
    name: &str,
    record_type: RecordType,
    options: &QueryOptions,
) -> Result<ProbeResponse, ProbeError> {
    log::debug!(
        "Querying {server} for {name} {record_type} ({:?}, RD={})",
        options.transport,
        options.recursion_desired
    );
    let message = query_message(server, name, record_type, options).await?;
    Ok(ProbeResponse::from_message(&message))
}

/// Like `query`, but a truncated UDP response is repeated once over TCP.
///
/// # Errors
///
/// See `query_message`.
pub async fn query_with_tcp_fallback(
    server: SocketAddr,
    name: &str,
    record_type: RecordType,
    options: &QueryOptions,
) -> Result<ProbeResponse, ProbeError> {
    let response = query(server, name, record_type, options).await?;
    if response.truncated && options.transport == Transport::Udp {
        log::debug!("Truncated response from {server}, retrying over TCP");
        return query(server, name, record_type, &options.over(Transport::Tcp)).await;
    }
    Ok(response)
}

/// Attempts a full zone transfer and reports whether the server allowed it.
///
/// Only the first response message is read.
///
/// # Errors
///
/// Returns a `ProbeError` if the TCP exchange fails.
pub async fn zone_transfer(
    server: SocketAddr,
    zone: &str,
    timeout: Duration,
) -> Result<bool, ProbeError> {
    let response = query(server, zone, RecordType::AXFR, &QueryOptions::tcp(timeout)).await?;
    Ok(transfer_allowed(&response, zone))
}

/// A transfer is allowed when the server answers NOERROR and the first
/// answer record is the zone's SOA.
pub fn transfer_allowed(response: &ProbeResponse, zone: &str) -> bool {
    let zone = normalize_name(zone);
    response.response_code == ResponseCode::NoError
        && response
            .answers
            .first()
            .is_some_and(|r| r.name == zone && matches!(r.data, RecordData::Soa(_)))
}
